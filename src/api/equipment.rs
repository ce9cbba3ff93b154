//! Equipment API endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::DeletedResponse;
use crate::{
    error::AppResult,
    models::equipment::{CreateEquipment, Equipment, UpdateEquipment},
    AppState,
};

/// Bulk delete request
#[derive(Debug, Deserialize, ToSchema)]
pub struct DeleteEquipmentRequest {
    /// Ids of the equipment to delete
    #[serde(default)]
    pub items: Vec<Uuid>,
}

/// List all equipment
#[utoipa::path(
    get,
    path = "/equipments",
    tag = "equipment",
    responses(
        (status = 200, description = "Equipment list", body = Vec<Equipment>)
    )
)]
pub async fn list_equipment(State(state): State<AppState>) -> AppResult<Json<Vec<Equipment>>> {
    let equipment = state.services.equipment.list().await?;
    Ok(Json(equipment))
}

/// Create equipment
#[utoipa::path(
    post,
    path = "/equipments",
    tag = "equipment",
    request_body = CreateEquipment,
    responses(
        (status = 201, description = "Equipment created", body = Equipment),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_equipment(
    State(state): State<AppState>,
    Json(data): Json<CreateEquipment>,
) -> AppResult<(StatusCode, Json<Equipment>)> {
    let equipment = state.services.equipment.create(data).await?;
    Ok((StatusCode::CREATED, Json(equipment)))
}

/// Update equipment
#[utoipa::path(
    put,
    path = "/equipments",
    tag = "equipment",
    request_body = UpdateEquipment,
    responses(
        (status = 200, description = "Equipment updated", body = Equipment),
        (status = 400, description = "Missing or inconsistent fields", body = crate::error::ErrorResponse),
        (status = 404, description = "Equipment not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_equipment(
    State(state): State<AppState>,
    Json(data): Json<UpdateEquipment>,
) -> AppResult<Json<Equipment>> {
    let equipment = state.services.equipment.update(data).await?;
    Ok(Json(equipment))
}

/// Delete equipment and their images
#[utoipa::path(
    delete,
    path = "/equipments",
    tag = "equipment",
    request_body = DeleteEquipmentRequest,
    responses(
        (status = 200, description = "Equipment deleted", body = DeletedResponse),
        (status = 400, description = "No ids given", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_equipment(
    State(state): State<AppState>,
    Json(request): Json<DeleteEquipmentRequest>,
) -> AppResult<Json<DeletedResponse>> {
    let deleted_count = state.services.equipment.delete(&request.items).await?;
    Ok(Json(DeletedResponse {
        success: true,
        deleted_count,
    }))
}
