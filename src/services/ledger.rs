//! Ledger service: checkouts and check-ins
//!
//! A submission adjusts `available` once per item and then records the
//! transaction. These are separate writes; a failure after the first one is
//! reported as a partial failure and nothing is rolled back.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        transaction::{SubmitTransaction, TransactionReceipt},
        Equipment, Transaction, TransactionItem, TransactionKind,
    },
    repository::{AvailabilityGuard, EquipmentStore, TransactionStore},
};

#[derive(Clone)]
pub struct LedgerService {
    equipment: Arc<dyn EquipmentStore>,
    transactions: Arc<dyn TransactionStore>,
    enforce_availability: bool,
}

impl LedgerService {
    pub fn new(
        equipment: Arc<dyn EquipmentStore>,
        transactions: Arc<dyn TransactionStore>,
        enforce_availability: bool,
    ) -> Self {
        Self {
            equipment,
            transactions,
            enforce_availability,
        }
    }

    pub async fn checkout(&self, request: SubmitTransaction) -> AppResult<TransactionReceipt> {
        self.submit(TransactionKind::Checkout, request).await
    }

    pub async fn checkin(&self, request: SubmitTransaction) -> AppResult<TransactionReceipt> {
        self.submit(TransactionKind::Checkin, request).await
    }

    /// All transactions of one kind, most recent first
    pub async fn list(&self, kind: TransactionKind) -> AppResult<Vec<Transaction>> {
        self.transactions.list(kind).await
    }

    fn guard(&self) -> AvailabilityGuard {
        if self.enforce_availability {
            AvailabilityGuard::WithinStock
        } else {
            AvailabilityGuard::Unchecked
        }
    }

    async fn submit(&self, kind: TransactionKind, request: SubmitTransaction) -> AppResult<TransactionReceipt> {
        request.validate()?;

        let user_id = request.user_id.trim().to_string();
        let project = request.project.trim().to_string();
        if user_id.is_empty() {
            return Err(AppError::Validation("User is required".to_string()));
        }
        if project.is_empty() {
            return Err(AppError::Validation("Project is required".to_string()));
        }

        let bad_quantities: Vec<String> = request
            .items
            .iter()
            .filter(|item| item.quantity < 1)
            .map(|item| format!("{}: quantity must be at least 1", item.equipment_id))
            .collect();
        if !bad_quantities.is_empty() {
            return Err(AppError::Validation(bad_quantities.join("; ")));
        }

        let mut ids: Vec<Uuid> = request.items.iter().map(|item| item.equipment_id).collect();
        ids.sort();
        ids.dedup();

        let known: HashMap<Uuid, Equipment> = self
            .equipment
            .get_many(&ids)
            .await?
            .into_iter()
            .map(|e| (e.id, e))
            .collect();
        if let Some(missing) = ids.iter().find(|id| !known.contains_key(id)) {
            return Err(AppError::NotFound(format!("Equipment {} not found", missing)));
        }

        if self.enforce_availability {
            check_stock(kind, &request.items, &known)?;
        }

        let items: Vec<TransactionItem> = request
            .items
            .into_iter()
            .map(|mut item| {
                if item.name.trim().is_empty() {
                    if let Some(equipment) = known.get(&item.equipment_id) {
                        item.name = equipment.name.clone();
                    }
                }
                item
            })
            .collect();

        let guard = self.guard();
        let mut applied: Vec<Uuid> = Vec::with_capacity(items.len());
        for item in &items {
            let delta = kind.availability_delta(item.quantity);
            if let Err(e) = self
                .equipment
                .adjust_available(item.equipment_id, delta, guard)
                .await
            {
                if applied.is_empty() {
                    return Err(e);
                }
                tracing::error!(
                    kind = %kind,
                    applied = ?applied,
                    failed = %item.equipment_id,
                    error = %e,
                    "availability update failed midway, earlier updates were kept"
                );
                return Err(AppError::PartialFailure(format!(
                    "{} stopped at equipment {} after {} of {} items were applied: {}",
                    kind,
                    item.equipment_id,
                    applied.len(),
                    items.len(),
                    e
                )));
            }
            applied.push(item.equipment_id);
        }

        let transaction = Transaction {
            id: Uuid::new_v4(),
            user_id,
            project,
            items,
            date: Utc::now(),
            kind,
            status: kind.initial_status().to_string(),
        };

        if let Err(e) = self.transactions.insert(&transaction).await {
            tracing::error!(
                kind = %kind,
                transaction_id = %transaction.id,
                applied = ?applied,
                error = %e,
                "transaction insert failed after availability was updated"
            );
            return Err(AppError::PartialFailure(format!(
                "Availability updated but the {} record could not be saved: {}",
                kind, e
            )));
        }

        tracing::info!(
            kind = %kind,
            transaction_id = %transaction.id,
            user_id = %transaction.user_id,
            items = transaction.items.len(),
            "transaction recorded"
        );

        Ok(TransactionReceipt::new(kind, transaction.id))
    }
}

/// Up-front stock check on the per-equipment totals of a submission
fn check_stock(
    kind: TransactionKind,
    items: &[TransactionItem],
    known: &HashMap<Uuid, Equipment>,
) -> AppResult<()> {
    // i64 so summed quantities cannot overflow
    let mut totals: HashMap<Uuid, i64> = HashMap::new();
    for item in items {
        *totals.entry(item.equipment_id).or_insert(0) += i64::from(item.quantity);
    }

    let mut problems: Vec<String> = Vec::new();
    for (id, total) in &totals {
        let Some(equipment) = known.get(id) else { continue };
        match kind {
            TransactionKind::Checkout if *total > i64::from(equipment.available) => problems.push(format!(
                "{}: requested {}, only {} available",
                equipment.name, total, equipment.available
            )),
            TransactionKind::Checkin
                if i64::from(equipment.available) + total > i64::from(equipment.quantity) =>
            {
                problems.push(format!(
                    "{}: returning {} would exceed the {} owned",
                    equipment.name, total, equipment.quantity
                ))
            }
            _ => {}
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        problems.sort();
        Err(AppError::InsufficientAvailability(problems.join("; ")))
    }
}
