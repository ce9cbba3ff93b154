//! Data models for IMS

pub mod equipment;
pub mod history;
pub mod transaction;
pub mod user;

// Re-export commonly used types
pub use equipment::{Equipment, EquipmentImage};
pub use history::HistoryEntry;
pub use transaction::{Transaction, TransactionItem, TransactionKind};
pub use user::User;
