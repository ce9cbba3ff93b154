//! Checkout and check-in endpoints

use axum::{extract::State, Json};

use crate::{
    error::AppResult,
    models::{
        transaction::{SubmitTransaction, TransactionReceipt},
        Transaction, TransactionKind,
    },
    AppState,
};

/// Check equipment out to a user
#[utoipa::path(
    post,
    path = "/checkout",
    tag = "ledger",
    request_body = SubmitTransaction,
    responses(
        (status = 200, description = "Checkout recorded", body = TransactionReceipt),
        (status = 400, description = "Invalid request", body = crate::error::ErrorResponse),
        (status = 404, description = "Unknown equipment", body = crate::error::ErrorResponse),
        (status = 409, description = "Not enough units available", body = crate::error::ErrorResponse),
        (status = 500, description = "Partially applied", body = crate::error::ErrorResponse)
    )
)]
pub async fn submit_checkout(
    State(state): State<AppState>,
    Json(request): Json<SubmitTransaction>,
) -> AppResult<Json<TransactionReceipt>> {
    let receipt = state.services.ledger.checkout(request).await?;
    Ok(Json(receipt))
}

/// List checkouts, most recent first
#[utoipa::path(
    get,
    path = "/checkout",
    tag = "ledger",
    responses(
        (status = 200, description = "Checkouts", body = Vec<Transaction>)
    )
)]
pub async fn list_checkouts(State(state): State<AppState>) -> AppResult<Json<Vec<Transaction>>> {
    let checkouts = state.services.ledger.list(TransactionKind::Checkout).await?;
    Ok(Json(checkouts))
}

/// Return equipment
#[utoipa::path(
    post,
    path = "/checkin",
    tag = "ledger",
    request_body = SubmitTransaction,
    responses(
        (status = 200, description = "Check-in recorded", body = TransactionReceipt),
        (status = 400, description = "Invalid request", body = crate::error::ErrorResponse),
        (status = 404, description = "Unknown equipment", body = crate::error::ErrorResponse),
        (status = 409, description = "Return exceeds owned quantity", body = crate::error::ErrorResponse),
        (status = 500, description = "Partially applied", body = crate::error::ErrorResponse)
    )
)]
pub async fn submit_checkin(
    State(state): State<AppState>,
    Json(request): Json<SubmitTransaction>,
) -> AppResult<Json<TransactionReceipt>> {
    let receipt = state.services.ledger.checkin(request).await?;
    Ok(Json(receipt))
}

/// List check-ins, most recent first
#[utoipa::path(
    get,
    path = "/checkin",
    tag = "ledger",
    responses(
        (status = 200, description = "Check-ins", body = Vec<Transaction>)
    )
)]
pub async fn list_checkins(State(state): State<AppState>) -> AppResult<Json<Vec<Transaction>>> {
    let checkins = state.services.ledger.list(TransactionKind::Checkin).await?;
    Ok(Json(checkins))
}
