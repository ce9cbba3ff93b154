//! Equipment model and image metadata

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// One uploaded photo of an equipment, with its two stored renditions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentImage {
    pub id: Uuid,
    /// Original upload name (display only)
    pub filename: String,
    /// Blob path of the normalized full-size rendition
    pub original_path: String,
    /// Blob path of the thumbnail rendition
    pub thumbnail_path: String,
    /// Declared type of the upload
    pub mime_type: String,
    /// Upload size in bytes
    pub size: i64,
    pub uploaded_at: DateTime<Utc>,
    /// Display order
    pub order: i32,
}

/// Trackable inventory item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Equipment {
    pub id: Uuid,
    pub name: String,
    pub location: String,
    /// Total units owned
    pub quantity: i32,
    /// Units currently not checked out
    pub available: i32,
    /// Single indivisible asset (quantity is always 1)
    pub unique: bool,
    /// External asset tag
    pub asset_id: Option<String>,
    pub images: Vec<EquipmentImage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Equipment {
    /// Order value the next attached image should take
    pub fn next_image_order(&self) -> i32 {
        self.images
            .iter()
            .map(|image| image.order + 1)
            .max()
            .unwrap_or(0)
    }
}

/// Equipment row as stored in the `equipments` table
#[derive(Debug, FromRow)]
pub struct EquipmentRow {
    pub id: Uuid,
    pub name: String,
    pub location: String,
    pub quantity: i32,
    pub available: i32,
    pub is_unique: bool,
    pub asset_id: Option<String>,
    pub images: Json<Vec<EquipmentImage>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<EquipmentRow> for Equipment {
    fn from(row: EquipmentRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            location: row.location,
            quantity: row.quantity,
            available: row.available,
            unique: row.is_unique,
            asset_id: row.asset_id,
            images: row.images.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Create equipment request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEquipment {
    #[serde(default)]
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Location is required"))]
    pub location: String,
    /// Ignored for unique items
    #[serde(default)]
    pub quantity: i32,
    /// Defaults to `quantity` when omitted
    pub available: Option<i32>,
    #[serde(default)]
    pub unique: bool,
    pub asset_id: Option<String>,
}

/// Update equipment request. Every field but `assetId` is required;
/// they are optional here so that a missing field is reported as a
/// validation error rather than a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEquipment {
    pub id: Option<Uuid>,
    pub name: Option<String>,
    pub location: Option<String>,
    pub quantity: Option<i32>,
    pub available: Option<i32>,
    pub unique: Option<bool>,
    pub asset_id: Option<String>,
}

/// Validated record ready to be inserted
#[derive(Debug, Clone)]
pub struct NewEquipment {
    pub id: Uuid,
    pub name: String,
    pub location: String,
    pub quantity: i32,
    pub available: i32,
    pub unique: bool,
    pub asset_id: Option<String>,
}

/// Validated replacement of the mutable equipment fields
#[derive(Debug, Clone)]
pub struct EquipmentChanges {
    pub name: String,
    pub location: String,
    pub quantity: i32,
    pub available: i32,
    pub unique: bool,
    pub asset_id: Option<String>,
}

/// One file received by the image upload endpoint
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

impl ImageUpload {
    pub fn display_name(&self) -> String {
        self.filename
            .clone()
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| "image".to_string())
    }
}

/// Rendition selector for image downloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ImageVariant {
    Thumbnail,
    #[default]
    Original,
}

impl ImageVariant {
    pub fn path_of<'a>(&self, image: &'a EquipmentImage) -> &'a str {
        match self {
            ImageVariant::Thumbnail => &image.thumbnail_path,
            ImageVariant::Original => &image.original_path,
        }
    }
}

impl std::str::FromStr for ImageVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "thumbnail" => Ok(ImageVariant::Thumbnail),
            "original" => Ok(ImageVariant::Original),
            _ => Err(format!("Invalid image type '{}'. Use 'original' or 'thumbnail'", s)),
        }
    }
}
