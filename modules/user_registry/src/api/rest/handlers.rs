use std::sync::Arc;

use axum::{extract::rejection::JsonRejection, response::Json, Extension};
use chrono::Utc;
use tracing::{error, info, warn};

use crate::api::rest::dto::{
    CreateUserReq, CreateUserResp, DeleteUserReq, GetUsersReq, HealthResp, MessageResp,
    UpdateUserReq, UserDto, UserListDto,
};
use crate::api::rest::error::{map_domain_error, ErrorBody, ErrorResponse, Operation};
use crate::contract::model::UserFilter;
use crate::domain::service::Service;

fn reject_body(rejection: JsonRejection) -> ErrorResponse {
    warn!("Rejected request body: {}", rejection.body_text());
    ErrorResponse::bad_request(rejection.body_text())
}

/// Create a new user
#[utoipa::path(
    post,
    path = "/create_user",
    tag = "users",
    request_body = CreateUserReq,
    responses(
        (status = 200, description = "User created", body = CreateUserResp),
        (status = 400, description = "Missing fields, inactive manager, invalid mobile or PAN", body = ErrorBody),
        (status = 500, description = "Internal Server Error", body = ErrorBody)
    )
)]
pub async fn create_user(
    Extension(svc): Extension<Arc<Service>>,
    payload: Result<Json<CreateUserReq>, JsonRejection>,
) -> Result<Json<CreateUserResp>, ErrorResponse> {
    let Json(req_body) = payload.map_err(reject_body)?;
    info!("Creating user: {:?}", req_body);

    match svc.create_user(req_body.into()).await {
        Ok(user) => Ok(Json(CreateUserResp {
            message: "User created successfully".to_string(),
            user_id: user.user_id,
        })),
        Err(e) => {
            error!("Failed to create user: {}", e);
            Err(map_domain_error(&e, Operation::Create))
        }
    }
}

/// List active users by id, mobile, manager, or all of them
#[utoipa::path(
    post,
    path = "/get_users",
    tag = "users",
    request_body = GetUsersReq,
    responses(
        (status = 200, description = "Matching active users", body = UserListDto),
        (status = 400, description = "Invalid mobile number", body = ErrorBody),
        (status = 500, description = "Internal Server Error", body = ErrorBody)
    )
)]
pub async fn get_users(
    Extension(svc): Extension<Arc<Service>>,
    payload: Result<Json<GetUsersReq>, JsonRejection>,
) -> Result<Json<UserListDto>, ErrorResponse> {
    let Json(req_body) = payload.map_err(reject_body)?;
    info!("Listing users with query: {:?}", req_body);

    let filter = UserFilter::from_parts(req_body.user_id, req_body.mob_num, req_body.manager_id);
    match svc.list_users(filter).await {
        Ok(users) => Ok(Json(UserListDto {
            users: users.into_iter().map(UserDto::from).collect(),
        })),
        Err(e) => {
            error!("Failed to list users: {}", e);
            Err(map_domain_error(&e, Operation::Query))
        }
    }
}

/// Apply one patch to several users
#[utoipa::path(
    post,
    path = "/update_user",
    tag = "users",
    request_body = UpdateUserReq,
    responses(
        (status = 200, description = "Batch processed", body = MessageResp),
        (status = 400, description = "Invalid ids, missing data, invalid mobile, PAN or manager", body = ErrorBody),
        (status = 500, description = "Internal Server Error", body = ErrorBody)
    )
)]
pub async fn update_user(
    Extension(svc): Extension<Arc<Service>>,
    payload: Result<Json<UpdateUserReq>, JsonRejection>,
) -> Result<Json<MessageResp>, ErrorResponse> {
    let Json(req_body) = payload.map_err(reject_body)?;
    info!("Updating users with: {:?}", req_body);

    let ids = req_body.ids();
    match svc
        .update_users(&ids, req_body.update_data.map(Into::into))
        .await
    {
        Ok(_) => Ok(Json(MessageResp::new("Update completed"))),
        Err(e) => {
            error!("Failed to update users: {}", e);
            Err(map_domain_error(&e, Operation::Update))
        }
    }
}

/// Hard delete a user by id or mobile number
#[utoipa::path(
    post,
    path = "/delete_user",
    tag = "users",
    request_body = DeleteUserReq,
    responses(
        (status = 200, description = "User deleted", body = MessageResp),
        (status = 400, description = "Neither user_id nor mob_num given", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody),
        (status = 500, description = "Internal Server Error", body = ErrorBody)
    )
)]
pub async fn delete_user(
    Extension(svc): Extension<Arc<Service>>,
    payload: Result<Json<DeleteUserReq>, JsonRejection>,
) -> Result<Json<MessageResp>, ErrorResponse> {
    let Json(req_body) = payload.map_err(reject_body)?;
    info!("Deleting user: {:?}", req_body);

    match svc.delete_user(req_body.user_id, req_body.mob_num).await {
        Ok(_) => Ok(Json(MessageResp::new("User deleted successfully"))),
        Err(e) => {
            error!("Failed to delete user: {}", e);
            Err(map_domain_error(&e, Operation::Delete))
        }
    }
}

/// Liveness probe
#[utoipa::path(
    get,
    path = "/",
    tag = "health",
    responses((status = 200, description = "Server is up", body = HealthResp))
)]
pub async fn health_check() -> Json<HealthResp> {
    Json(HealthResp {
        status: "ok".to_string(),
        message: "Server is running fine".to_string(),
        time: Utc::now(),
    })
}
