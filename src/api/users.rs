//! User management endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use utoipa::ToSchema;

use super::DeletedResponse;
use crate::{
    error::AppResult,
    models::user::{User, UserPayload},
    AppState,
};

/// Bulk delete request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteUsersRequest {
    #[serde(default)]
    pub user_ids: Vec<String>,
}

/// List all users
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    responses(
        (status = 200, description = "List of users", body = Vec<User>)
    )
)]
pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<User>>> {
    let users = state.services.users.list().await?;
    Ok(Json(users))
}

/// Create a user
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    request_body = UserPayload,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 409, description = "Id already taken", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    Json(data): Json<UserPayload>,
) -> AppResult<(StatusCode, Json<User>)> {
    let user = state.services.users.create(data).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Replace a user
#[utoipa::path(
    put,
    path = "/users",
    tag = "users",
    request_body = UserPayload,
    responses(
        (status = 200, description = "User updated", body = User),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 404, description = "User not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    Json(data): Json<UserPayload>,
) -> AppResult<Json<User>> {
    let user = state.services.users.update(data).await?;
    Ok(Json(user))
}

/// Delete users
#[utoipa::path(
    delete,
    path = "/users",
    tag = "users",
    request_body = DeleteUsersRequest,
    responses(
        (status = 200, description = "Users deleted", body = DeletedResponse),
        (status = 400, description = "No ids given", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_users(
    State(state): State<AppState>,
    Json(request): Json<DeleteUsersRequest>,
) -> AppResult<Json<DeletedResponse>> {
    let deleted_count = state.services.users.delete(&request.user_ids).await?;
    Ok(Json(DeletedResponse {
        success: true,
        deleted_count,
    }))
}
