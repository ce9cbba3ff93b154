//! Image pipeline: render uploads into a thumbnail and a normalized
//! original, and keep both renditions in blob storage.

use std::io::Cursor;
use std::sync::Arc;

use chrono::Utc;
use image::{codecs::jpeg::JpegEncoder, imageops::FilterType, DynamicImage};
use uuid::Uuid;

use super::blobs::BlobStore;
use crate::{
    config::ImagesConfig,
    error::{AppError, AppResult},
};

pub const ORIGINALS_DIR: &str = "originals";
pub const THUMBNAILS_DIR: &str = "thumbnails";

/// Both renditions of one upload, JPEG encoded
#[derive(Debug, Clone)]
pub struct Renditions {
    pub thumbnail: Vec<u8>,
    pub original: Vec<u8>,
}

/// CPU-bound transform from raw upload bytes to renditions
#[cfg_attr(test, mockall::automock)]
pub trait ImageTransform: Send + Sync {
    fn render(&self, data: &[u8]) -> AppResult<Renditions>;
}

/// Square cover-cropped thumbnail plus a downscaled original
#[derive(Debug, Clone)]
pub struct JpegRenditions {
    thumbnail_size: u32,
    thumbnail_quality: u8,
    original_max_dimension: u32,
    original_quality: u8,
}

impl JpegRenditions {
    pub fn from_config(config: &ImagesConfig) -> Self {
        Self {
            thumbnail_size: config.thumbnail_size,
            thumbnail_quality: config.thumbnail_quality,
            original_max_dimension: config.original_max_dimension,
            original_quality: config.original_quality,
        }
    }

    fn encode(img: &DynamicImage, quality: u8) -> AppResult<Vec<u8>> {
        let mut buffer = Vec::new();
        let mut cursor = Cursor::new(&mut buffer);
        let encoder = JpegEncoder::new_with_quality(&mut cursor, quality);
        img.to_rgb8()
            .write_with_encoder(encoder)
            .map_err(|e| AppError::Internal(format!("Failed to encode image: {}", e)))?;
        Ok(buffer)
    }
}

impl ImageTransform for JpegRenditions {
    fn render(&self, data: &[u8]) -> AppResult<Renditions> {
        let img = image::load_from_memory(data)
            .map_err(|e| AppError::Image(format!("Invalid image: {}", e)))?;

        let thumbnail = img.resize_to_fill(
            self.thumbnail_size,
            self.thumbnail_size,
            FilterType::Lanczos3,
        );

        // Never enlarge
        let max = self.original_max_dimension;
        let original = if img.width() > max || img.height() > max {
            img.resize(max, max, FilterType::Lanczos3)
        } else {
            img
        };

        Ok(Renditions {
            thumbnail: Self::encode(&thumbnail, self.thumbnail_quality)?,
            original: Self::encode(&original, self.original_quality)?,
        })
    }
}

/// Blob paths of one stored upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    pub original_path: String,
    pub thumbnail_path: String,
}

impl StoredImage {
    pub fn paths(&self) -> [&str; 2] {
        [&self.original_path, &self.thumbnail_path]
    }
}

#[derive(Clone)]
pub struct ImagePipeline {
    transform: Arc<dyn ImageTransform>,
    blobs: Arc<dyn BlobStore>,
}

impl ImagePipeline {
    pub fn new(transform: Arc<dyn ImageTransform>, blobs: Arc<dyn BlobStore>) -> Self {
        Self { transform, blobs }
    }

    /// Render an upload and store both renditions under the equipment's
    /// directories. Nothing is left behind when this fails.
    pub async fn store(&self, equipment_id: Uuid, image_id: Uuid, data: Vec<u8>) -> AppResult<StoredImage> {
        let transform = self.transform.clone();
        let renditions = tokio::task::spawn_blocking(move || transform.render(&data))
            .await
            .map_err(|e| AppError::Internal(format!("Image task failed: {}", e)))??;

        let filename = format!("{}-{}.jpg", Utc::now().timestamp_millis(), image_id);
        let stored = StoredImage {
            original_path: format!("{}/{}/{}", ORIGINALS_DIR, equipment_id, filename),
            thumbnail_path: format!("{}/{}/{}", THUMBNAILS_DIR, equipment_id, filename),
        };

        self.blobs.write(&stored.original_path, renditions.original).await?;
        if let Err(e) = self.blobs.write(&stored.thumbnail_path, renditions.thumbnail).await {
            self.discard([stored.original_path.as_str()]).await;
            return Err(e);
        }

        tracing::debug!(
            equipment_id = %equipment_id,
            image_id = %image_id,
            "image renditions stored"
        );
        Ok(stored)
    }

    pub async fn read(&self, path: &str) -> AppResult<Vec<u8>> {
        self.blobs.read(path).await
    }

    /// Best-effort removal: failures are logged and skipped
    pub async fn discard<'a>(&self, paths: impl IntoIterator<Item = &'a str>) -> usize {
        let mut removed = 0;
        for path in paths {
            match self.blobs.delete(path).await {
                Ok(()) => removed += 1,
                Err(e) => tracing::warn!(path = %path, error = %e, "failed to delete image blob"),
            }
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::blobs::{LocalBlobStore, MockBlobStore};
    use image::{ImageFormat, RgbImage};

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::new(width, height));
        let mut buffer = Vec::new();
        img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png).unwrap();
        buffer
    }

    fn transform() -> JpegRenditions {
        JpegRenditions::from_config(&ImagesConfig::default())
    }

    #[test]
    fn test_thumbnail_is_square_crop() {
        let renditions = transform().render(&png(640, 480)).unwrap();

        let thumb = image::load_from_memory(&renditions.thumbnail).unwrap();
        assert_eq!((thumb.width(), thumb.height()), (300, 300));
        assert_eq!(
            image::guess_format(&renditions.thumbnail).unwrap(),
            ImageFormat::Jpeg
        );
    }

    #[test]
    fn test_original_is_never_enlarged() {
        let renditions = transform().render(&png(640, 480)).unwrap();
        let original = image::load_from_memory(&renditions.original).unwrap();
        assert_eq!((original.width(), original.height()), (640, 480));
    }

    #[test]
    fn test_original_fits_max_dimension() {
        let renditions = transform().render(&png(2400, 1200)).unwrap();
        let original = image::load_from_memory(&renditions.original).unwrap();
        assert_eq!((original.width(), original.height()), (2000, 1000));
    }

    #[test]
    fn test_rejects_undecodable_input() {
        assert!(matches!(
            transform().render(b"definitely not an image"),
            Err(AppError::Image(_))
        ));
    }

    #[tokio::test]
    async fn test_store_writes_both_renditions() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = ImagePipeline::new(
            Arc::new(transform()),
            Arc::new(LocalBlobStore::new(dir.path())),
        );
        let equipment_id = Uuid::new_v4();
        let image_id = Uuid::new_v4();

        let stored = pipeline.store(equipment_id, image_id, png(64, 64)).await.unwrap();

        let prefix = format!("originals/{}/", equipment_id);
        assert!(stored.original_path.starts_with(&prefix));
        assert!(stored.original_path.ends_with(&format!("-{}.jpg", image_id)));
        assert!(stored.thumbnail_path.starts_with("thumbnails/"));
        for path in stored.paths() {
            assert!(dir.path().join(path).is_file());
        }
    }

    #[tokio::test]
    async fn test_store_removes_original_when_thumbnail_write_fails() {
        let mut blobs = MockBlobStore::new();
        blobs
            .expect_write()
            .withf(|path, _| path.starts_with("originals/"))
            .times(1)
            .returning(|_, _| Ok(()));
        blobs
            .expect_write()
            .withf(|path, _| path.starts_with("thumbnails/"))
            .times(1)
            .returning(|_, _| Err(AppError::Storage("disk full".to_string())));
        blobs
            .expect_delete()
            .withf(|path| path.starts_with("originals/"))
            .times(1)
            .returning(|_| Ok(()));

        let pipeline = ImagePipeline::new(Arc::new(transform()), Arc::new(blobs));
        let result = pipeline.store(Uuid::new_v4(), Uuid::new_v4(), png(32, 32)).await;

        assert!(matches!(result, Err(AppError::Storage(_))));
    }

    #[tokio::test]
    async fn test_discard_continues_past_failures() {
        let mut blobs = MockBlobStore::new();
        blobs
            .expect_delete()
            .withf(|path| path == "a")
            .returning(|_| Err(AppError::Storage("permission denied".to_string())));
        blobs
            .expect_delete()
            .withf(|path| path == "b")
            .returning(|_| Ok(()));

        let pipeline = ImagePipeline::new(Arc::new(transform()), Arc::new(blobs));
        assert_eq!(pipeline.discard(["a", "b"]).await, 1);
    }
}
