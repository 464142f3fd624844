use std::path::{Path, PathBuf};

use async_trait::async_trait;
use infer::MatcherType;
use tokio::fs;
use uuid::Uuid;

use crate::{
    constants::UPLOADS_MOUNT,
    entities::project::IncomingImage,
    errors::{AppError, UploadError},
    uploads::uploader::ImageUploader,
};

/// Stores uploads as `<root>/<uuid>.<ext>`, served back under `/uploads`.
#[derive(Debug, Clone)]
pub struct LocalImageUploader {
    root: PathBuf,
    max_bytes: u64,
}

impl LocalImageUploader {
    pub fn new(root: impl Into<PathBuf>, max_bytes: u64) -> Self {
        LocalImageUploader {
            root: root.into(),
            max_bytes,
        }
    }
}

#[async_trait]
impl ImageUploader for LocalImageUploader {
    async fn accept(&self, image: &IncomingImage) -> Result<String, UploadError> {
        if image.size == 0 {
            return Err(UploadError::EmptyFile);
        }
        if image.size as u64 > self.max_bytes {
            return Err(UploadError::FileTooLarge(self.max_bytes));
        }

        let kind = infer::get_from_path(&image.path)
            .map_err(|e| UploadError::MimeDetectionFailed(e.to_string()))?
            .ok_or_else(|| UploadError::UnsupportedType("unknown".to_string()))?;

        if kind.matcher_type() != MatcherType::Image {
            return Err(UploadError::UnsupportedType(kind.mime_type().to_string()));
        }

        fs::create_dir_all(&self.root).await?;

        let file_name = format!("{}.{}", Uuid::new_v4(), kind.extension());
        fs::copy(&image.path, self.root.join(&file_name)).await?;

        tracing::debug!(
            original = image.file_name.as_deref().unwrap_or("<unnamed>"),
            stored = %file_name,
            "Stored uploaded image"
        );

        Ok(Path::new(UPLOADS_MOUNT).join(file_name).to_string_lossy().into_owned())
    }

    async fn discard(&self, storage_path: &str) {
        let Some(file_name) = stored_file_name(storage_path) else {
            tracing::warn!("Refusing to discard suspicious upload path: {}", storage_path);
            return;
        };

        if let Err(e) = fs::remove_file(self.root.join(file_name)).await {
            tracing::warn!("Failed to discard upload {}: {}", storage_path, e);
        }
    }
}

/// Reads a stored upload for static serving, returning its bytes and MIME type.
pub async fn read_upload(root: &Path, file_name: &str) -> Result<(Vec<u8>, String), AppError> {
    if !is_plain_file_name(file_name) {
        return Err(AppError::NotFound("File not found".to_string()));
    }

    let bytes = fs::read(root.join(file_name))
        .await
        .map_err(|_| AppError::NotFound("File not found".to_string()))?;

    let mime = infer::get(&bytes)
        .map(|kind| kind.mime_type().to_string())
        .unwrap_or_else(|| "application/octet-stream".to_string());

    Ok((bytes, mime))
}

/// Last component of a storage path, accepting either separator.
fn stored_file_name(storage_path: &str) -> Option<&str> {
    storage_path
        .rsplit(['/', '\\'])
        .next()
        .filter(|name| is_plain_file_name(name))
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && !name.starts_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    const PNG_HEADER: [u8; 16] = [
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52,
    ];

    fn spooled(bytes: &[u8], name: &str) -> (NamedTempFile, IncomingImage) {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(bytes).unwrap();
        let image = IncomingImage {
            file_name: Some(name.to_string()),
            path: file.path().to_path_buf(),
            size: bytes.len(),
        };
        (file, image)
    }

    #[actix_rt::test]
    async fn accepts_png_and_returns_relative_path() {
        let dir = tempdir().unwrap();
        let uploader = LocalImageUploader::new(dir.path(), 1024);
        let (_tmp, image) = spooled(&PNG_HEADER, "shot.png");

        let stored = uploader.accept(&image).await.unwrap();
        let normalized = stored.replace('\\', "/");

        assert!(normalized.starts_with("uploads/"));
        assert!(normalized.ends_with(".png"));

        let name = stored_file_name(&stored).unwrap();
        assert_eq!(std::fs::read(dir.path().join(name)).unwrap(), PNG_HEADER);
    }

    #[actix_rt::test]
    async fn rejects_non_images() {
        let dir = tempdir().unwrap();
        let uploader = LocalImageUploader::new(dir.path(), 1024);
        let (_tmp, image) = spooled(b"%PDF-1.7 not an image", "doc.png");

        let err = uploader.accept(&image).await.unwrap_err();

        assert!(matches!(err, UploadError::UnsupportedType(ref t) if t == "application/pdf"));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[actix_rt::test]
    async fn rejects_empty_and_oversized_files() {
        let dir = tempdir().unwrap();
        let uploader = LocalImageUploader::new(dir.path(), 8);

        let (_empty, empty) = spooled(b"", "empty.png");
        assert!(matches!(uploader.accept(&empty).await, Err(UploadError::EmptyFile)));

        let (_big, big) = spooled(&PNG_HEADER, "big.png");
        assert!(matches!(uploader.accept(&big).await, Err(UploadError::FileTooLarge(8))));
    }

    #[actix_rt::test]
    async fn discard_removes_stored_file() {
        let dir = tempdir().unwrap();
        let uploader = LocalImageUploader::new(dir.path(), 1024);
        let (_tmp, image) = spooled(&PNG_HEADER, "shot.png");

        let stored = uploader.accept(&image).await.unwrap();
        uploader.discard(&stored).await;

        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[actix_rt::test]
    async fn read_upload_refuses_traversal() {
        let dir = tempdir().unwrap();

        for name in ["../secret", "..", ".env", "a/b.png", "a\\b.png"] {
            assert!(matches!(
                read_upload(dir.path(), name).await,
                Err(AppError::NotFound(_))
            ));
        }
    }

    #[actix_rt::test]
    async fn read_upload_sniffs_mime() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("a.png"), PNG_HEADER).unwrap();

        let (bytes, mime) = read_upload(dir.path(), "a.png").await.unwrap();

        assert_eq!(bytes, PNG_HEADER);
        assert_eq!(mime, "image/png");
    }
}
