use thiserror::Error;

/// Domain-specific errors using thiserror
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Required fields are missing")]
    MissingFields,

    #[error("Manager '{manager_id}' is not active")]
    InactiveManager { manager_id: String },

    #[error("Invalid mobile number: '{value}'")]
    InvalidMobile { value: String },

    #[error("Invalid PAN: '{value}'")]
    InvalidPan { value: String },

    #[error("user_ids must be a non-empty list")]
    InvalidUserIds,

    #[error("No update data provided")]
    NoUpdateData,

    #[error("Either user_id or mob_num is required")]
    MissingLookupKey,

    #[error("User not found")]
    UserNotFound,

    #[error("Database error: {message}")]
    Database { message: String },
}

impl DomainError {
    pub fn inactive_manager(manager_id: impl Into<String>) -> Self {
        Self::InactiveManager {
            manager_id: manager_id.into(),
        }
    }

    pub fn invalid_mobile(value: impl Into<String>) -> Self {
        Self::InvalidMobile {
            value: value.into(),
        }
    }

    pub fn invalid_pan(value: impl Into<String>) -> Self {
        Self::InvalidPan {
            value: value.into(),
        }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }
}
