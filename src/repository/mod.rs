//! Repository layer for record store operations
//!
//! Each collection is reached through a trait so the ledger logic can run
//! against PostgreSQL in production and against in-memory stores in tests.

pub mod equipment;
pub mod transactions;
pub mod users;

#[cfg(test)]
pub mod memory;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        equipment::{EquipmentChanges, NewEquipment},
        Equipment, EquipmentImage, Transaction, TransactionKind, User,
    },
};

/// Bounds check applied by an availability adjustment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvailabilityGuard {
    /// Apply the delta unconditionally
    Unchecked,
    /// Apply only if the result stays within `0..=quantity`
    WithinStock,
}

/// `equipments` collection
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EquipmentStore: Send + Sync {
    async fn list(&self) -> AppResult<Vec<Equipment>>;

    /// Fails with `NotFound` for an unknown id
    async fn get_by_id(&self, id: Uuid) -> AppResult<Equipment>;

    /// Unknown ids are skipped
    async fn get_many(&self, ids: &[Uuid]) -> AppResult<Vec<Equipment>>;

    /// Equipment owning the given image, `NotFound` if none does
    async fn find_by_image_id(&self, image_id: Uuid) -> AppResult<Equipment>;

    async fn create(&self, data: &NewEquipment) -> AppResult<Equipment>;

    /// Replace the mutable fields, leaving images untouched
    async fn update(&self, id: Uuid, data: &EquipmentChanges) -> AppResult<Equipment>;

    /// Returns the number of deleted records
    async fn delete_many(&self, ids: &[Uuid]) -> AppResult<u64>;

    /// Atomically add `delta` to `available`.
    ///
    /// Fails with `NotFound` for an unknown id and with
    /// `InsufficientAvailability` when the guard rejects the change.
    async fn adjust_available(&self, id: Uuid, delta: i32, guard: AvailabilityGuard) -> AppResult<()>;

    /// Atomically append images, refusing to exceed `limit` images in total
    async fn append_images(&self, id: Uuid, images: &[EquipmentImage], limit: usize) -> AppResult<()>;

    /// Atomically remove the images with the given ids
    async fn remove_images(&self, id: Uuid, image_ids: &[Uuid]) -> AppResult<()>;
}

/// `checkouts` and `checkins` collections
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TransactionStore: Send + Sync {
    async fn insert(&self, transaction: &Transaction) -> AppResult<()>;

    /// All transactions of one kind, most recent first
    async fn list(&self, kind: TransactionKind) -> AppResult<Vec<Transaction>>;
}

/// `users` collection
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn list(&self) -> AppResult<Vec<User>>;

    /// Unknown ids are skipped
    async fn get_many(&self, ids: &[String]) -> AppResult<Vec<User>>;

    /// Fails with `Conflict` if the id is taken
    async fn create(&self, user: &User) -> AppResult<User>;

    /// Fails with `NotFound` for an unknown id
    async fn update(&self, user: &User) -> AppResult<User>;

    async fn delete_many(&self, ids: &[String]) -> AppResult<u64>;
}

/// Connectivity probe used by the health endpoint
#[async_trait]
pub trait StoreHealth: Send + Sync {
    async fn ping(&self) -> AppResult<()>;
}

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub equipment: equipment::EquipmentRepository,
    pub transactions: transactions::TransactionsRepository,
    pub users: users::UsersRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            equipment: equipment::EquipmentRepository::new(pool.clone()),
            transactions: transactions::TransactionsRepository::new(pool.clone()),
            users: users::UsersRepository::new(pool.clone()),
            pool,
        }
    }
}

#[async_trait]
impl StoreHealth for Repository {
    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
