use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::contract::model::{NewUser, User, UserPatch};

/// REST DTO for user representation with serde/utoipa
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserDto {
    pub user_id: String,
    pub full_name: String,
    pub mob_num: String,
    pub pan_num: String,
    pub manager_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_active: bool,
}

/// REST DTO for creating a new user. Every field is required; presence is checked by the service.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct CreateUserReq {
    #[schema(example = "Asha Verma")]
    pub full_name: Option<String>,
    #[schema(example = "+919876543210")]
    pub mob_num: Option<String>,
    #[schema(example = "abcde1234f")]
    pub pan_num: Option<String>,
    pub manager_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateUserResp {
    pub message: String,
    pub user_id: String,
}

/// Query body; the first non-empty of user_id, mob_num, manager_id is used.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct GetUsersReq {
    pub user_id: Option<String>,
    pub mob_num: Option<String>,
    pub manager_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserListDto {
    pub users: Vec<UserDto>,
}

/// Patch applied to every listed user (partial)
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct UpdateDataReq {
    pub full_name: Option<String>,
    pub mob_num: Option<String>,
    pub pan_num: Option<String>,
    pub manager_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct UpdateUserReq {
    /// Anything other than a non-empty array is rejected as invalid ids.
    #[schema(value_type = Vec<String>)]
    pub user_ids: Option<serde_json::Value>,
    pub update_data: Option<UpdateDataReq>,
}

impl UpdateUserReq {
    /// Entries of `user_ids` as text; an empty list when it is missing or not an array.
    /// Non-string entries keep their JSON text so they can still resolve (or be skipped).
    pub fn ids(&self) -> Vec<String> {
        match &self.user_ids {
            Some(serde_json::Value::Array(items)) => items
                .iter()
                .map(|v| v.as_str().map_or_else(|| v.to_string(), str::to_string))
                .collect(),
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct DeleteUserReq {
    pub user_id: Option<String>,
    pub mob_num: Option<String>,
}

/// Plain `{message}` success body
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResp {
    pub message: String,
}

impl MessageResp {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResp {
    pub status: String,
    pub message: String,
    pub time: DateTime<Utc>,
}

// Conversion implementations between REST DTOs and contract models

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            user_id: user.user_id,
            full_name: user.full_name,
            mob_num: user.mob_num,
            pan_num: user.pan_num,
            manager_id: user.manager_id,
            created_at: user.created_at,
            updated_at: user.updated_at,
            is_active: user.is_active,
        }
    }
}

impl From<CreateUserReq> for NewUser {
    fn from(req: CreateUserReq) -> Self {
        Self {
            full_name: req.full_name,
            mob_num: req.mob_num,
            pan_num: req.pan_num,
            manager_id: req.manager_id,
        }
    }
}

impl From<UpdateDataReq> for UserPatch {
    fn from(req: UpdateDataReq) -> Self {
        Self {
            full_name: req.full_name,
            mob_num: req.mob_num,
            pan_num: req.pan_num,
            manager_id: req.manager_id,
        }
    }
}
