//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{equipment, health, history, images, ledger, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "IMS API",
        version = "0.1.0",
        description = "Equipment inventory management REST API",
        license(name = "MIT")
    ),
    servers(
        (url = "/api", description = "IMS API")
    ),
    paths(
        // Health
        health::health_check,
        // Equipment
        equipment::list_equipment,
        equipment::create_equipment,
        equipment::update_equipment,
        equipment::delete_equipment,
        // Images
        images::attach_images,
        images::detach_images,
        images::get_image,
        // Ledger
        ledger::submit_checkout,
        ledger::list_checkouts,
        ledger::submit_checkin,
        ledger::list_checkins,
        // History
        history::get_history,
        // Users
        users::list_users,
        users::create_user,
        users::update_user,
        users::delete_users,
    ),
    components(
        schemas(
            // Equipment
            crate::models::equipment::Equipment,
            crate::models::equipment::EquipmentImage,
            crate::models::equipment::CreateEquipment,
            crate::models::equipment::UpdateEquipment,
            equipment::DeleteEquipmentRequest,
            // Images
            images::AttachImagesForm,
            images::AttachImagesResponse,
            images::DetachImagesRequest,
            images::DetachImagesResponse,
            // Ledger
            crate::models::transaction::Transaction,
            crate::models::transaction::TransactionItem,
            crate::models::transaction::TransactionKind,
            crate::models::transaction::SubmitTransaction,
            crate::models::transaction::TransactionReceipt,
            crate::models::history::HistoryEntry,
            // Users
            crate::models::user::User,
            crate::models::user::UserPayload,
            users::DeleteUsersRequest,
            // Shared
            crate::api::DeletedResponse,
            health::HealthResponse,
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "equipment", description = "Equipment management"),
        (name = "images", description = "Equipment images"),
        (name = "ledger", description = "Checkouts and check-ins"),
        (name = "history", description = "Activity feed"),
        (name = "users", description = "User management")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
