//! Activity feed rows

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

/// One equipment line of one checkout or check-in, ready for display
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// `{kind}-{transactionId}-{equipmentId}`
    pub id: String,
    /// Equipment name
    pub product: String,
    pub project: String,
    pub quantity: i32,
    /// "Check-Out" or "Check-In"
    pub activity: String,
    /// Display date, e.g. "05 Mar 2026"
    pub date: String,
    /// Display name of the user, or "Unknown User"
    pub by: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkout_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkin_id: Option<Uuid>,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
}
