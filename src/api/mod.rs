//! API handlers for IMS REST endpoints

pub mod equipment;
pub mod health;
pub mod history;
pub mod images;
pub mod ledger;
pub mod openapi;
pub mod users;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::AppState;

/// Multipart overhead allowed on top of the image payload
const MULTIPART_SLACK: usize = 1024 * 1024;

/// Outcome of a bulk delete
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeletedResponse {
    pub success: bool,
    pub deleted_count: u64,
}

/// Build the `/api` routes
pub fn router(state: AppState) -> Router {
    let images = &state.config.images;
    let upload_limit = images.max_per_equipment * images.max_file_size + MULTIPART_SLACK;

    let api = Router::new()
        .route("/health", get(health::health_check))
        // Equipment
        .route(
            "/equipments",
            get(equipment::list_equipment)
                .post(equipment::create_equipment)
                .put(equipment::update_equipment)
                .delete(equipment::delete_equipment),
        )
        .route(
            "/equipments/images",
            post(images::attach_images)
                .layer(DefaultBodyLimit::max(upload_limit))
                .delete(images::detach_images),
        )
        .route("/equipments/images/:image_id", get(images::get_image))
        // Ledger
        .route(
            "/checkout",
            get(ledger::list_checkouts).post(ledger::submit_checkout),
        )
        .route(
            "/checkin",
            get(ledger::list_checkins).post(ledger::submit_checkin),
        )
        .route("/history", get(history::get_history))
        // Users
        .route(
            "/users",
            get(users::list_users)
                .post(users::create_user)
                .put(users::update_user)
                .delete(users::delete_users),
        )
        .with_state(state);

    Router::new().nest("/api", api)
}
