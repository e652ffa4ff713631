use std::sync::Arc;

use axum::{
    response::Json,
    routing::{get, post},
    Extension, Router,
};
use utoipa::OpenApi;

use crate::api::rest::{dto, error, handlers};
use crate::domain::service::Service;

#[derive(OpenApi)]
#[openapi(
    info(title = "User Registry API", description = "Users grouped under managers"),
    paths(
        handlers::create_user,
        handlers::get_users,
        handlers::update_user,
        handlers::delete_user,
        handlers::health_check
    ),
    components(schemas(
        dto::UserDto,
        dto::CreateUserReq,
        dto::CreateUserResp,
        dto::GetUsersReq,
        dto::UserListDto,
        dto::UpdateUserReq,
        dto::UpdateDataReq,
        dto::DeleteUserReq,
        dto::MessageResp,
        dto::HealthResp,
        error::ErrorBody
    )),
    tags(
        (name = "users", description = "User records"),
        (name = "health", description = "Liveness")
    )
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Mount every endpoint of the module on `router` and attach the service.
pub fn register_routes(router: Router, service: Arc<Service>) -> Router {
    router
        .route("/", get(handlers::health_check))
        .route("/create_user", post(handlers::create_user))
        .route("/get_users", post(handlers::get_users))
        .route("/update_user", post(handlers::update_user))
        .route("/delete_user", post(handlers::delete_user))
        .route("/openapi.json", get(openapi_json))
        .layer(Extension(service))
}
