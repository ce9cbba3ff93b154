//! Equipment image endpoints

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use axum_extra::extract::Multipart;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        equipment::{ImageUpload, ImageVariant},
        EquipmentImage,
    },
    AppState,
};

const IMAGE_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

/// Multipart form of the upload endpoint
#[derive(Debug, Default, ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct AttachImagesForm {
    #[schema(value_type = String, format = Uuid)]
    pub equipment_id: Option<String>,
    /// One part per file, repeated
    #[schema(value_type = Vec<String>, format = Binary)]
    pub images: Vec<ImageUpload>,
}

impl AttachImagesForm {
    /// Collect the known parts; unknown parts are skipped
    pub async fn read(mut multipart: Multipart) -> AppResult<Self> {
        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().map(str::to_string);
            match name.as_deref() {
                Some("equipmentId") => {
                    form.equipment_id = Some(field.text().await.map_err(multipart_error)?);
                }
                Some("images") => {
                    let filename = field.file_name().map(str::to_string);
                    let content_type = field.content_type().map(str::to_string);
                    let data = field.bytes().await.map_err(multipart_error)?.to_vec();
                    form.images.push(ImageUpload {
                        filename,
                        content_type,
                        data,
                    });
                }
                _ => {}
            }
        }
        Ok(form)
    }

    /// The target equipment, required and a valid UUID
    pub fn equipment_id(&self) -> AppResult<Uuid> {
        let raw = self
            .equipment_id
            .as_deref()
            .ok_or_else(|| AppError::Validation("Equipment ID is required".to_string()))?;
        Uuid::parse_str(raw.trim())
            .map_err(|_| AppError::Validation(format!("Invalid equipment ID: {}", raw)))
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AttachImagesResponse {
    pub success: bool,
    pub images: Vec<EquipmentImage>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DetachImagesRequest {
    pub equipment_id: Option<Uuid>,
    #[serde(default)]
    pub image_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DetachImagesResponse {
    pub success: bool,
    pub deleted_count: usize,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ImageQuery {
    /// "thumbnail" or "original" (default)
    #[serde(rename = "type")]
    pub variant: Option<String>,
}

fn multipart_error(e: impl std::fmt::Display) -> AppError {
    AppError::Validation(format!("Invalid multipart request: {}", e))
}

/// Attach images to an equipment
#[utoipa::path(
    post,
    path = "/equipments/images",
    tag = "images",
    request_body(content = AttachImagesForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Images attached", body = AttachImagesResponse),
        (status = 400, description = "Invalid files or image limit reached", body = crate::error::ErrorResponse),
        (status = 404, description = "Equipment not found", body = crate::error::ErrorResponse),
        (status = 422, description = "Undecodable image", body = crate::error::ErrorResponse)
    )
)]
pub async fn attach_images(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Json<AttachImagesResponse>> {
    let form = AttachImagesForm::read(multipart).await?;
    let equipment_id = form.equipment_id()?;

    let images = state
        .services
        .equipment
        .attach_images(equipment_id, form.images)
        .await?;
    Ok(Json(AttachImagesResponse {
        success: true,
        images,
    }))
}

/// Detach images from an equipment
#[utoipa::path(
    delete,
    path = "/equipments/images",
    tag = "images",
    request_body = DetachImagesRequest,
    responses(
        (status = 200, description = "Images detached", body = DetachImagesResponse),
        (status = 404, description = "Equipment not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn detach_images(
    State(state): State<AppState>,
    Json(request): Json<DetachImagesRequest>,
) -> AppResult<Json<DetachImagesResponse>> {
    let equipment_id = request
        .equipment_id
        .ok_or_else(|| AppError::Validation("Equipment ID is required".to_string()))?;
    let deleted_count = state
        .services
        .equipment
        .detach_images(equipment_id, &request.image_ids)
        .await?;
    Ok(Json(DetachImagesResponse {
        success: true,
        deleted_count,
    }))
}

/// Download one rendition of an image
#[utoipa::path(
    get,
    path = "/equipments/images/{image_id}",
    tag = "images",
    params(
        ("image_id" = Uuid, Path, description = "Image ID"),
        ImageQuery
    ),
    responses(
        (status = 200, description = "JPEG bytes of the rendition"),
        (status = 400, description = "Unknown rendition type", body = crate::error::ErrorResponse),
        (status = 404, description = "Image not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_image(
    State(state): State<AppState>,
    Path(image_id): Path<Uuid>,
    Query(query): Query<ImageQuery>,
) -> AppResult<impl IntoResponse> {
    let variant = match query.variant.as_deref() {
        None => ImageVariant::default(),
        Some(raw) => raw.parse::<ImageVariant>().map_err(AppError::Validation)?,
    };

    let (image, data) = state.services.equipment.get_image(image_id, variant).await?;

    let headers = [
        (header::CONTENT_TYPE, "image/jpeg".to_string()),
        (header::CACHE_CONTROL, IMAGE_CACHE_CONTROL.to_string()),
        (header::ETAG, format!("\"{}\"", image.id)),
    ];
    Ok((headers, data))
}
