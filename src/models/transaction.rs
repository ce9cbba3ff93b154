//! Checkout / check-in ledger records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Direction of a ledger transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Checkout,
    Checkin,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Checkout => "checkout",
            TransactionKind::Checkin => "checkin",
        }
    }

    /// Table holding transactions of this kind
    pub fn table(&self) -> &'static str {
        match self {
            TransactionKind::Checkout => "checkouts",
            TransactionKind::Checkin => "checkins",
        }
    }

    /// Status recorded when the transaction is created
    pub fn initial_status(&self) -> &'static str {
        match self {
            TransactionKind::Checkout => "active",
            TransactionKind::Checkin => "completed",
        }
    }

    /// Human-readable activity label used in the history feed
    pub fn activity(&self) -> &'static str {
        match self {
            TransactionKind::Checkout => "Check-Out",
            TransactionKind::Checkin => "Check-In",
        }
    }

    /// Signed change applied to `available` for a moved quantity
    pub fn availability_delta(&self, quantity: i32) -> i32 {
        match self {
            TransactionKind::Checkout => -quantity,
            TransactionKind::Checkin => quantity,
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One equipment line of a transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionItem {
    #[serde(alias = "id")]
    pub equipment_id: Uuid,
    /// Equipment name at the time of the transaction
    #[serde(default)]
    pub name: String,
    #[serde(alias = "checkoutQuantity", alias = "checkinQuantity")]
    pub quantity: i32,
    /// Checkout this line returns units from (check-ins only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkout_id: Option<Uuid>,
}

/// Immutable ledger entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: String,
    pub project: String,
    pub items: Vec<TransactionItem>,
    pub date: DateTime<Utc>,
    pub kind: TransactionKind,
    pub status: String,
}

/// Transaction row as stored in `checkouts` / `checkins`
#[derive(Debug, FromRow)]
pub struct TransactionRow {
    pub id: Uuid,
    pub user_id: String,
    pub project: String,
    pub items: Json<Vec<TransactionItem>>,
    pub date: DateTime<Utc>,
    pub status: String,
}

impl TransactionRow {
    pub fn into_transaction(self, kind: TransactionKind) -> Transaction {
        Transaction {
            id: self.id,
            user_id: self.user_id,
            project: self.project,
            items: self.items.0,
            date: self.date,
            kind,
            status: self.status,
        }
    }
}

/// Checkout or check-in submission
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitTransaction {
    #[serde(default)]
    #[validate(length(min = 1, message = "User is required"))]
    pub user_id: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Project is required"))]
    pub project: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "At least one item is required"))]
    pub items: Vec<TransactionItem>,
}

/// Result of a successful submission.
///
/// The id is repeated under `checkoutId` or `checkinId` for existing clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub success: bool,
    pub transaction_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkout_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkin_id: Option<Uuid>,
    pub message: String,
}

impl TransactionReceipt {
    pub fn new(kind: TransactionKind, transaction_id: Uuid) -> Self {
        let (checkout_id, checkin_id, message) = match kind {
            TransactionKind::Checkout => (Some(transaction_id), None, "Checkout completed successfully"),
            TransactionKind::Checkin => (None, Some(transaction_id), "Check-in completed successfully"),
        };
        Self {
            success: true,
            transaction_id,
            checkout_id,
            checkin_id,
            message: message.to_string(),
        }
    }
}
