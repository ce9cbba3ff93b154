//! Equipment repository for database operations

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{types::Json, Pool, Postgres};
use uuid::Uuid;

use super::{AvailabilityGuard, EquipmentStore};
use crate::{
    error::{AppError, AppResult},
    models::{
        equipment::{EquipmentChanges, EquipmentRow, NewEquipment},
        Equipment, EquipmentImage,
    },
};

#[derive(Clone)]
pub struct EquipmentRepository {
    pool: Pool<Postgres>,
}

impl EquipmentRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    async fn exists(&self, id: Uuid) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM equipments WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    fn not_found(id: Uuid) -> AppError {
        AppError::NotFound(format!("Equipment {} not found", id))
    }
}

#[async_trait]
impl EquipmentStore for EquipmentRepository {
    async fn list(&self) -> AppResult<Vec<Equipment>> {
        let rows = sqlx::query_as::<_, EquipmentRow>("SELECT * FROM equipments ORDER BY name, id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Equipment::from).collect())
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Equipment> {
        sqlx::query_as::<_, EquipmentRow>("SELECT * FROM equipments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Equipment::from)
            .ok_or_else(|| Self::not_found(id))
    }

    async fn get_many(&self, ids: &[Uuid]) -> AppResult<Vec<Equipment>> {
        let rows = sqlx::query_as::<_, EquipmentRow>("SELECT * FROM equipments WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Equipment::from).collect())
    }

    async fn find_by_image_id(&self, image_id: Uuid) -> AppResult<Equipment> {
        sqlx::query_as::<_, EquipmentRow>(
            "SELECT * FROM equipments WHERE images @> jsonb_build_array(jsonb_build_object('id', $1::text))",
        )
        .bind(image_id.to_string())
        .fetch_optional(&self.pool)
        .await?
        .map(Equipment::from)
        .ok_or_else(|| AppError::NotFound(format!("Image {} not found", image_id)))
    }

    async fn create(&self, data: &NewEquipment) -> AppResult<Equipment> {
        let now = Utc::now();
        let row = sqlx::query_as::<_, EquipmentRow>(
            r#"
            INSERT INTO equipments (id, name, location, quantity, available, is_unique, asset_id, images, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, '[]'::jsonb, $8, $8)
            RETURNING *
            "#,
        )
        .bind(data.id)
        .bind(&data.name)
        .bind(&data.location)
        .bind(data.quantity)
        .bind(data.available)
        .bind(data.unique)
        .bind(&data.asset_id)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(equipment_id = %data.id, "equipment inserted");
        Ok(row.into())
    }

    async fn update(&self, id: Uuid, data: &EquipmentChanges) -> AppResult<Equipment> {
        sqlx::query_as::<_, EquipmentRow>(
            r#"
            UPDATE equipments
            SET name = $2, location = $3, quantity = $4, available = $5,
                is_unique = $6, asset_id = $7, updated_at = $8
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&data.name)
        .bind(&data.location)
        .bind(data.quantity)
        .bind(data.available)
        .bind(data.unique)
        .bind(&data.asset_id)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .map(Equipment::from)
        .ok_or_else(|| Self::not_found(id))
    }

    async fn delete_many(&self, ids: &[Uuid]) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM equipments WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await?;
        tracing::debug!(requested = ids.len(), deleted = result.rows_affected(), "equipments deleted");
        Ok(result.rows_affected())
    }

    async fn adjust_available(&self, id: Uuid, delta: i32, guard: AvailabilityGuard) -> AppResult<()> {
        let query = match guard {
            AvailabilityGuard::Unchecked => {
                r#"
                UPDATE equipments SET available = available + $2, updated_at = NOW()
                WHERE id = $1 AND available::bigint + $2 BETWEEN -2147483648 AND 2147483647
                "#
            }
            AvailabilityGuard::WithinStock => {
                r#"
                UPDATE equipments SET available = available + $2, updated_at = NOW()
                WHERE id = $1 AND available::bigint + $2 BETWEEN 0 AND quantity
                "#
            }
        };

        let result = sqlx::query(query)
            .bind(id)
            .bind(delta)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            if !self.exists(id).await? {
                return Err(Self::not_found(id));
            }
            return Err(AppError::InsufficientAvailability(format!(
                "Cannot change availability of equipment {} by {}",
                id, delta
            )));
        }
        Ok(())
    }

    async fn append_images(&self, id: Uuid, images: &[EquipmentImage], limit: usize) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE equipments SET images = images || $2, updated_at = NOW()
            WHERE id = $1 AND jsonb_array_length(images) + $3 <= $4
            "#,
        )
        .bind(id)
        .bind(Json(images))
        .bind(images.len() as i32)
        .bind(limit as i32)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            if !self.exists(id).await? {
                return Err(Self::not_found(id));
            }
            return Err(AppError::Validation(format!(
                "Equipment {} cannot hold more than {} images",
                id, limit
            )));
        }
        Ok(())
    }

    async fn remove_images(&self, id: Uuid, image_ids: &[Uuid]) -> AppResult<()> {
        let ids: Vec<String> = image_ids.iter().map(Uuid::to_string).collect();
        let result = sqlx::query(
            r#"
            UPDATE equipments SET images = COALESCE((
                SELECT jsonb_agg(img ORDER BY pos)
                FROM jsonb_array_elements(images) WITH ORDINALITY AS t(img, pos)
                WHERE NOT (img->>'id' = ANY($2))
            ), '[]'::jsonb), updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&ids)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Self::not_found(id));
        }
        Ok(())
    }
}
