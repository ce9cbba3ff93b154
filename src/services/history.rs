//! Activity feed built from the checkout and check-in ledgers

use std::cmp::Reverse;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use crate::{
    error::AppResult,
    models::{HistoryEntry, Transaction, TransactionKind},
    repository::{TransactionStore, UserStore},
};

pub const UNKNOWN_USER: &str = "Unknown User";

#[derive(Clone)]
pub struct HistoryService {
    transactions: Arc<dyn TransactionStore>,
    users: Arc<dyn UserStore>,
}

impl HistoryService {
    pub fn new(transactions: Arc<dyn TransactionStore>, users: Arc<dyn UserStore>) -> Self {
        Self { transactions, users }
    }

    /// One row per transaction item, most recent first
    pub async fn get_history(&self) -> AppResult<Vec<HistoryEntry>> {
        let (checkouts, checkins) = tokio::try_join!(
            self.transactions.list(TransactionKind::Checkout),
            self.transactions.list(TransactionKind::Checkin),
        )?;

        let mut transactions = checkouts;
        transactions.extend(checkins);

        let user_ids: Vec<String> = transactions
            .iter()
            .map(|t| t.user_id.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let names: HashMap<String, String> = if user_ids.is_empty() {
            HashMap::new()
        } else {
            self.users
                .get_many(&user_ids)
                .await?
                .into_iter()
                .map(|u| (u.id.clone(), u.display_name()))
                .collect()
        };

        let entries = project(transactions, &names);
        tracing::debug!(rows = entries.len(), "history projected");
        Ok(entries)
    }
}

/// Flatten transactions into feed rows
pub fn project(mut transactions: Vec<Transaction>, names: &HashMap<String, String>) -> Vec<HistoryEntry> {
    transactions.sort_by_key(|t| (Reverse(t.date.timestamp_millis()), t.id));

    transactions
        .iter()
        .flat_map(|t| {
            let by = names
                .get(&t.user_id)
                .cloned()
                .unwrap_or_else(|| UNKNOWN_USER.to_string());
            let (checkout_id, checkin_id) = match t.kind {
                TransactionKind::Checkout => (Some(t.id), None),
                TransactionKind::Checkin => (None, Some(t.id)),
            };

            t.items.iter().map(move |item| HistoryEntry {
                id: format!("{}-{}-{}", t.kind, t.id, item.equipment_id),
                product: item.name.clone(),
                project: t.project.clone(),
                quantity: item.quantity,
                activity: t.kind.activity().to_string(),
                date: t.date.format("%d %b %Y").to_string(),
                by: by.clone(),
                checkout_id,
                checkin_id,
                timestamp: t.date.timestamp_millis(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TransactionItem, User};
    use crate::repository::memory::MemoryStore;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn item(name: &str, quantity: i32) -> TransactionItem {
        TransactionItem {
            equipment_id: Uuid::new_v4(),
            name: name.to_string(),
            quantity,
            checkout_id: None,
        }
    }

    fn transaction(kind: TransactionKind, day: u32, items: Vec<TransactionItem>) -> Transaction {
        Transaction {
            id: Uuid::new_v4(),
            user_id: "u1".to_string(),
            project: "Lab".to_string(),
            items,
            date: Utc.with_ymd_and_hms(2026, 3, day, 10, 0, 0).unwrap(),
            kind,
            status: kind.initial_status().to_string(),
        }
    }

    #[test]
    fn test_project_flattens_items_in_order() {
        let older = transaction(TransactionKind::Checkout, 5, vec![item("Drill", 2), item("Saw", 1)]);
        let newer = transaction(TransactionKind::Checkin, 6, vec![item("Drill", 2)]);
        let names = HashMap::from([("u1".to_string(), "Ada Lovelace".to_string())]);

        let rows = project(vec![older.clone(), newer.clone()], &names);

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].activity, "Check-In");
        assert_eq!(rows[0].checkin_id, Some(newer.id));
        assert_eq!(rows[1].product, "Drill");
        assert_eq!(rows[2].product, "Saw");
        assert_eq!(rows[1].checkout_id, Some(older.id));
        assert_eq!(rows[2].checkout_id, Some(older.id));
        assert_eq!(rows[1].date, "05 Mar 2026");
        assert_eq!(rows[1].by, "Ada Lovelace");
        assert_eq!(
            rows[2].id,
            format!("checkout-{}-{}", older.id, older.items[1].equipment_id)
        );
        assert_eq!(rows[1].timestamp, older.date.timestamp_millis());
    }

    #[test]
    fn test_ties_are_ordered_by_transaction_id() {
        let a = transaction(TransactionKind::Checkout, 5, vec![item("Drill", 1)]);
        let b = transaction(TransactionKind::Checkin, 5, vec![item("Saw", 1)]);
        let (first, second) = if a.id < b.id { (&a, &b) } else { (&b, &a) };

        let rows = project(vec![second.clone(), first.clone()], &HashMap::new());

        assert_eq!(rows[0].product, first.items[0].name);
        assert_eq!(rows[1].product, second.items[0].name);
        assert!(rows.iter().all(|r| r.by == UNKNOWN_USER));
    }

    #[tokio::test]
    async fn test_get_history_resolves_users() {
        let store = Arc::new(MemoryStore::new());
        UserStore::create(
            store.as_ref(),
            &User {
                id: "u1".to_string(),
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
                position: "Engineer".to_string(),
                email: "ada@example.org".to_string(),
            },
        )
        .await
        .unwrap();

        let mut stranger = transaction(TransactionKind::Checkout, 7, vec![item("Saw", 1)]);
        stranger.user_id = "ghost".to_string();
        TransactionStore::insert(store.as_ref(), &stranger).await.unwrap();
        TransactionStore::insert(
            store.as_ref(),
            &transaction(TransactionKind::Checkout, 5, vec![item("Drill", 2)]),
        )
        .await
        .unwrap();

        let svc = HistoryService::new(store.clone(), store.clone());
        let rows = svc.get_history().await.unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].by, UNKNOWN_USER);
        assert_eq!(rows[1].by, "Ada Lovelace");
    }

    #[tokio::test]
    async fn test_empty_ledger_gives_empty_feed() {
        let store = Arc::new(MemoryStore::new());
        let svc = HistoryService::new(store.clone(), store);
        assert!(svc.get_history().await.unwrap().is_empty());
    }
}
