//! Business logic services

pub mod blobs;
pub mod equipment;
pub mod history;
pub mod images;
pub mod ledger;
pub mod users;

use std::sync::Arc;

use crate::{
    config::AppConfig,
    error::AppResult,
    repository::{EquipmentStore, Repository, StoreHealth, TransactionStore, UserStore},
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub equipment: equipment::EquipmentService,
    pub ledger: ledger::LedgerService,
    pub history: history::HistoryService,
    pub users: users::UsersService,
    pub health: Arc<dyn StoreHealth>,
}

impl Services {
    /// Create all services on top of the PostgreSQL repository and the
    /// local image store
    pub async fn new(repository: Repository, config: &AppConfig) -> AppResult<Self> {
        let blobs = blobs::LocalBlobStore::new(&config.storage.root);
        blobs
            .ensure_dirs(&[images::ORIGINALS_DIR, images::THUMBNAILS_DIR])
            .await?;
        tracing::info!(root = %blobs.root().display(), "image storage ready");

        let pipeline = images::ImagePipeline::new(
            Arc::new(images::JpegRenditions::from_config(&config.images)),
            Arc::new(blobs),
        );

        Ok(Self::from_parts(
            Arc::new(repository.equipment.clone()),
            Arc::new(repository.transactions.clone()),
            Arc::new(repository.users.clone()),
            Arc::new(repository),
            pipeline,
            config,
        ))
    }

    /// Wire services from individual stores
    pub fn from_parts(
        equipment: Arc<dyn EquipmentStore>,
        transactions: Arc<dyn TransactionStore>,
        users: Arc<dyn UserStore>,
        health: Arc<dyn StoreHealth>,
        pipeline: images::ImagePipeline,
        config: &AppConfig,
    ) -> Self {
        Self {
            equipment: equipment::EquipmentService::new(
                equipment.clone(),
                pipeline,
                config.images.clone(),
            ),
            ledger: ledger::LedgerService::new(
                equipment,
                transactions.clone(),
                config.ledger.enforce_availability,
            ),
            history: history::HistoryService::new(transactions, users.clone()),
            users: users::UsersService::new(users),
            health,
        }
    }
}
