//! Equipment service: inventory records and their images

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use super::images::ImagePipeline;
use crate::{
    config::ImagesConfig,
    error::{AppError, AppResult},
    models::{
        equipment::{
            CreateEquipment, EquipmentChanges, ImageUpload, ImageVariant, NewEquipment,
            UpdateEquipment,
        },
        Equipment, EquipmentImage,
    },
    repository::EquipmentStore,
};

/// Declared upload types accepted for equipment photos
pub const ACCEPTED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp"];

#[derive(Clone)]
pub struct EquipmentService {
    store: Arc<dyn EquipmentStore>,
    pipeline: ImagePipeline,
    images: ImagesConfig,
}

/// Apply the unique-item rule, then check `0 <= available <= quantity`
fn settle_counts(quantity: i32, available: i32, unique: bool) -> AppResult<(i32, i32)> {
    let quantity = if unique { 1 } else { quantity };
    if quantity < 1 {
        return Err(AppError::Validation("Quantity must be at least 1".to_string()));
    }
    if available < 0 {
        return Err(AppError::Validation("Available cannot be negative".to_string()));
    }
    if available > quantity {
        return Err(AppError::Validation(
            "Available quantity cannot exceed total quantity".to_string(),
        ));
    }
    Ok((quantity, available))
}

fn required_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl EquipmentService {
    pub fn new(store: Arc<dyn EquipmentStore>, pipeline: ImagePipeline, images: ImagesConfig) -> Self {
        Self { store, pipeline, images }
    }

    pub async fn list(&self) -> AppResult<Vec<Equipment>> {
        self.store.list().await
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Equipment> {
        self.store.get_by_id(id).await
    }

    /// Create equipment. Unique items always get quantity and available 1.
    pub async fn create(&self, data: CreateEquipment) -> AppResult<Equipment> {
        data.validate()?;
        let name = required_text(Some(data.name))
            .ok_or_else(|| AppError::Validation("Name is required".to_string()))?;
        let location = required_text(Some(data.location))
            .ok_or_else(|| AppError::Validation("Location is required".to_string()))?;

        let (quantity, available) = if data.unique {
            (1, 1)
        } else {
            settle_counts(data.quantity, data.available.unwrap_or(data.quantity), false)?
        };

        let equipment = self
            .store
            .create(&NewEquipment {
                id: Uuid::new_v4(),
                name,
                location,
                quantity,
                available,
                unique: data.unique,
                asset_id: data.asset_id.and_then(|a| required_text(Some(a))),
            })
            .await?;

        tracing::info!(equipment_id = %equipment.id, name = %equipment.name, quantity, "equipment created");
        Ok(equipment)
    }

    /// Replace the mutable fields of an equipment; images are untouched
    pub async fn update(&self, data: UpdateEquipment) -> AppResult<Equipment> {
        let missing = || AppError::Validation("Missing required fields".to_string());
        let id = data.id.ok_or_else(missing)?;
        let name = required_text(data.name).ok_or_else(missing)?;
        let location = required_text(data.location).ok_or_else(missing)?;
        let quantity = data.quantity.ok_or_else(missing)?;
        let available = data.available.ok_or_else(missing)?;
        let unique = data.unique.unwrap_or(false);

        let (quantity, available) = settle_counts(quantity, available, unique)?;

        let equipment = self
            .store
            .update(
                id,
                &EquipmentChanges {
                    name,
                    location,
                    quantity,
                    available,
                    unique,
                    asset_id: data.asset_id.and_then(|a| required_text(Some(a))),
                },
            )
            .await?;

        tracing::info!(equipment_id = %id, quantity, available, "equipment updated");
        Ok(equipment)
    }

    /// Bulk delete. Image blobs are removed first on a best-effort basis;
    /// the records are deleted whether or not that cleanup succeeds.
    pub async fn delete(&self, ids: &[Uuid]) -> AppResult<u64> {
        if ids.is_empty() {
            return Err(AppError::Validation("No equipment ids provided".to_string()));
        }

        let doomed = self.store.get_many(ids).await?;
        let paths: Vec<&str> = doomed
            .iter()
            .flat_map(|e| e.images.iter())
            .flat_map(|img| [img.original_path.as_str(), img.thumbnail_path.as_str()])
            .collect();
        let removed = self.pipeline.discard(paths.clone()).await;
        if removed < paths.len() {
            tracing::warn!(
                failed = paths.len() - removed,
                "some image blobs could not be removed during equipment deletion"
            );
        }

        let deleted = self.store.delete_many(ids).await?;
        tracing::info!(requested = ids.len(), deleted, "equipment deleted");
        Ok(deleted)
    }

    fn check_uploads(&self, files: &[ImageUpload]) -> AppResult<()> {
        if files.is_empty() {
            return Err(AppError::Validation("No images provided".to_string()));
        }

        let max_mb = self.images.max_file_size / (1024 * 1024);
        let mut errors = Vec::new();
        for file in files {
            let name = file.display_name();
            let accepted = file
                .content_type
                .as_deref()
                .map(|t| ACCEPTED_IMAGE_TYPES.contains(&t))
                .unwrap_or(false);
            if !accepted {
                errors.push(format!("{}: Invalid file type", name));
            }
            if file.data.is_empty() {
                errors.push(format!("{}: File is empty", name));
            } else if file.data.len() > self.images.max_file_size {
                errors.push(format!("{}: File too large (max {}MB)", name, max_mb));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(errors.join("; ")))
        }
    }

    /// Attach uploaded photos. All or nothing: if any file fails, every
    /// blob written by this call is removed again.
    pub async fn attach_images(&self, equipment_id: Uuid, files: Vec<ImageUpload>) -> AppResult<Vec<EquipmentImage>> {
        self.check_uploads(&files)?;
        let equipment = self.store.get_by_id(equipment_id).await?;

        let limit = self.images.max_per_equipment;
        if equipment.images.len() + files.len() > limit {
            return Err(AppError::Validation(format!(
                "Equipment can have at most {} images ({} already attached)",
                limit,
                equipment.images.len()
            )));
        }

        let first_order = equipment.next_image_order();
        let mut attached = Vec::with_capacity(files.len());
        let mut written: Vec<String> = Vec::new();

        let outcome: AppResult<()> = async {
            for (i, file) in files.into_iter().enumerate() {
                let image_id = Uuid::new_v4();
                let filename = file.display_name();
                let size = file.data.len() as i64;
                let mime_type = file
                    .content_type
                    .clone()
                    .unwrap_or_else(|| "image/jpeg".to_string());

                let stored = self.pipeline.store(equipment_id, image_id, file.data).await?;
                written.extend(stored.paths().iter().map(|p| p.to_string()));

                attached.push(EquipmentImage {
                    id: image_id,
                    filename,
                    original_path: stored.original_path,
                    thumbnail_path: stored.thumbnail_path,
                    mime_type,
                    size,
                    uploaded_at: Utc::now(),
                    order: first_order + i as i32,
                });
            }
            self.store.append_images(equipment_id, &attached, limit).await
        }
        .await;

        if let Err(e) = outcome {
            tracing::error!(
                equipment_id = %equipment_id,
                error = %e,
                blobs = written.len(),
                "image attachment failed, removing written blobs"
            );
            self.pipeline.discard(written.iter().map(String::as_str)).await;
            return Err(e);
        }

        tracing::info!(equipment_id = %equipment_id, count = attached.len(), "images attached");
        Ok(attached)
    }

    /// Detach images by id and return how many were removed. Blob removal
    /// is best-effort and never blocks the metadata update.
    pub async fn detach_images(&self, equipment_id: Uuid, image_ids: &[Uuid]) -> AppResult<usize> {
        let equipment = self.store.get_by_id(equipment_id).await?;
        let doomed: Vec<&EquipmentImage> = equipment
            .images
            .iter()
            .filter(|img| image_ids.contains(&img.id))
            .collect();

        let paths: Vec<&str> = doomed
            .iter()
            .flat_map(|img| [img.original_path.as_str(), img.thumbnail_path.as_str()])
            .collect();
        self.pipeline.discard(paths).await;

        self.store.remove_images(equipment_id, image_ids).await?;
        tracing::info!(equipment_id = %equipment_id, count = doomed.len(), "images detached");
        Ok(doomed.len())
    }

    /// Image metadata and the bytes of the requested rendition
    pub async fn get_image(&self, image_id: Uuid, variant: ImageVariant) -> AppResult<(EquipmentImage, Vec<u8>)> {
        let equipment = self.store.find_by_image_id(image_id).await?;
        let image = equipment
            .images
            .into_iter()
            .find(|img| img.id == image_id)
            .ok_or_else(|| AppError::NotFound(format!("Image {} not found", image_id)))?;

        let data = self.pipeline.read(variant.path_of(&image)).await.map_err(|e| {
            tracing::error!(image_id = %image_id, error = %e, "image file missing from storage");
            e
        })?;
        Ok((image, data))
    }
}
