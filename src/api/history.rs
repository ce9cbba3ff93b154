//! Activity feed endpoint

use axum::{extract::State, Json};

use crate::{error::AppResult, models::HistoryEntry, AppState};

/// Checkouts and check-ins flattened to one row per item, most recent first
#[utoipa::path(
    get,
    path = "/history",
    tag = "history",
    responses(
        (status = 200, description = "Activity feed", body = Vec<HistoryEntry>)
    )
)]
pub async fn get_history(State(state): State<AppState>) -> AppResult<Json<Vec<HistoryEntry>>> {
    let entries = state.services.history.get_history().await?;
    Ok(Json(entries))
}
