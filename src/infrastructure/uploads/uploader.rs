use std::sync::Arc;

use async_trait::async_trait;

use crate::{entities::project::IncomingImage, errors::UploadError};

/// Persists uploaded images and hands back a storage-relative path.
#[async_trait]
pub trait ImageUploader: Send + Sync {
    /// Copies the spooled upload into permanent storage.
    async fn accept(&self, image: &IncomingImage) -> Result<String, UploadError>;

    /// Removes a previously accepted upload. Best effort: failures are logged, not returned.
    async fn discard(&self, storage_path: &str);
}

#[async_trait]
impl<T> ImageUploader for Arc<T>
where
    T: ImageUploader + ?Sized,
{
    async fn accept(&self, image: &IncomingImage) -> Result<String, UploadError> {
        (**self).accept(image).await
    }

    async fn discard(&self, storage_path: &str) {
        (**self).discard(storage_path).await
    }
}
