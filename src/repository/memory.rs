//! In-memory record store used by unit tests

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::{AvailabilityGuard, EquipmentStore, StoreHealth, TransactionStore, UserStore};
use crate::{
    error::{AppError, AppResult},
    models::{
        equipment::{EquipmentChanges, NewEquipment},
        Equipment, EquipmentImage, Transaction, TransactionKind, User,
    },
};

#[derive(Default)]
pub struct MemoryStore {
    equipments: Mutex<Vec<Equipment>>,
    transactions: Mutex<Vec<Transaction>>,
    users: Mutex<Vec<User>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state of one equipment, bypassing the trait
    pub fn equipment(&self, id: Uuid) -> Option<Equipment> {
        self.equipments.lock().unwrap().iter().find(|e| e.id == id).cloned()
    }

    pub fn transactions(&self) -> Vec<Transaction> {
        self.transactions.lock().unwrap().clone()
    }
}

fn equipment_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Equipment {} not found", id))
}

#[async_trait]
impl EquipmentStore for MemoryStore {
    async fn list(&self) -> AppResult<Vec<Equipment>> {
        let mut all = self.equipments.lock().unwrap().clone();
        all.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(all)
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Equipment> {
        self.equipment(id).ok_or_else(|| equipment_not_found(id))
    }

    async fn get_many(&self, ids: &[Uuid]) -> AppResult<Vec<Equipment>> {
        Ok(self
            .equipments
            .lock()
            .unwrap()
            .iter()
            .filter(|e| ids.contains(&e.id))
            .cloned()
            .collect())
    }

    async fn find_by_image_id(&self, image_id: Uuid) -> AppResult<Equipment> {
        self.equipments
            .lock()
            .unwrap()
            .iter()
            .find(|e| e.images.iter().any(|img| img.id == image_id))
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Image {} not found", image_id)))
    }

    async fn create(&self, data: &NewEquipment) -> AppResult<Equipment> {
        let now = Utc::now();
        let equipment = Equipment {
            id: data.id,
            name: data.name.clone(),
            location: data.location.clone(),
            quantity: data.quantity,
            available: data.available,
            unique: data.unique,
            asset_id: data.asset_id.clone(),
            images: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        self.equipments.lock().unwrap().push(equipment.clone());
        Ok(equipment)
    }

    async fn update(&self, id: Uuid, data: &EquipmentChanges) -> AppResult<Equipment> {
        let mut equipments = self.equipments.lock().unwrap();
        let equipment = equipments
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| equipment_not_found(id))?;
        equipment.name = data.name.clone();
        equipment.location = data.location.clone();
        equipment.quantity = data.quantity;
        equipment.available = data.available;
        equipment.unique = data.unique;
        equipment.asset_id = data.asset_id.clone();
        equipment.updated_at = Utc::now();
        Ok(equipment.clone())
    }

    async fn delete_many(&self, ids: &[Uuid]) -> AppResult<u64> {
        let mut equipments = self.equipments.lock().unwrap();
        let before = equipments.len();
        equipments.retain(|e| !ids.contains(&e.id));
        Ok((before - equipments.len()) as u64)
    }

    async fn adjust_available(&self, id: Uuid, delta: i32, guard: AvailabilityGuard) -> AppResult<()> {
        let mut equipments = self.equipments.lock().unwrap();
        let equipment = equipments
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| equipment_not_found(id))?;
        let rejected = || {
            AppError::InsufficientAvailability(format!(
                "Cannot change availability of equipment {} by {}",
                id, delta
            ))
        };
        let next = equipment.available.checked_add(delta).ok_or_else(rejected)?;
        if guard == AvailabilityGuard::WithinStock && !(0..=equipment.quantity).contains(&next) {
            return Err(rejected());
        }
        equipment.available = next;
        Ok(())
    }

    async fn append_images(&self, id: Uuid, images: &[EquipmentImage], limit: usize) -> AppResult<()> {
        let mut equipments = self.equipments.lock().unwrap();
        let equipment = equipments
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| equipment_not_found(id))?;
        if equipment.images.len() + images.len() > limit {
            return Err(AppError::Validation(format!(
                "Equipment {} cannot hold more than {} images",
                id, limit
            )));
        }
        equipment.images.extend_from_slice(images);
        Ok(())
    }

    async fn remove_images(&self, id: Uuid, image_ids: &[Uuid]) -> AppResult<()> {
        let mut equipments = self.equipments.lock().unwrap();
        let equipment = equipments
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| equipment_not_found(id))?;
        equipment.images.retain(|img| !image_ids.contains(&img.id));
        Ok(())
    }
}

#[async_trait]
impl TransactionStore for MemoryStore {
    async fn insert(&self, transaction: &Transaction) -> AppResult<()> {
        self.transactions.lock().unwrap().push(transaction.clone());
        Ok(())
    }

    async fn list(&self, kind: TransactionKind) -> AppResult<Vec<Transaction>> {
        let mut matching: Vec<Transaction> = self
            .transactions
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.kind == kind)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.date.cmp(&a.date).then(a.id.cmp(&b.id)));
        Ok(matching)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn list(&self) -> AppResult<Vec<User>> {
        Ok(self.users.lock().unwrap().clone())
    }

    async fn get_many(&self, ids: &[String]) -> AppResult<Vec<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .filter(|u| ids.contains(&u.id))
            .cloned()
            .collect())
    }

    async fn create(&self, user: &User) -> AppResult<User> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.id == user.id) {
            return Err(AppError::Conflict(format!("User with id {} already exists", user.id)));
        }
        users.push(user.clone());
        Ok(user.clone())
    }

    async fn update(&self, user: &User) -> AppResult<User> {
        let mut users = self.users.lock().unwrap();
        let existing = users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", user.id)))?;
        *existing = user.clone();
        Ok(user.clone())
    }

    async fn delete_many(&self, ids: &[String]) -> AppResult<u64> {
        let mut users = self.users.lock().unwrap();
        let before = users.len();
        users.retain(|u| !ids.contains(&u.id));
        Ok((before - users.len()) as u64)
    }
}

#[async_trait]
impl StoreHealth for MemoryStore {
    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}
