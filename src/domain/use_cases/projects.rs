use std::{future::Future, time::Duration};

use tokio::time::timeout;

use crate::{
    entities::project::{public_image_path, IncomingImage, NewProjectRequest, Project, ProjectDraft},
    errors::AppError,
    repositories::project::ProjectRepository,
    settings::AppConfig,
    uploads::uploader::ImageUploader,
};

/// Create-time rules that come from configuration rather than the schema.
#[derive(Debug, Clone, Copy)]
pub struct ProjectPolicy {
    pub require_image: bool,
    pub store_timeout: Duration,
}

impl From<&AppConfig> for ProjectPolicy {
    fn from(config: &AppConfig) -> Self {
        ProjectPolicy {
            require_image: config.require_image,
            store_timeout: Duration::from_secs(config.store_timeout_secs),
        }
    }
}

pub struct ProjectHandler<R, U>
where
    R: ProjectRepository,
    U: ImageUploader,
{
    pub project_repo: R,
    pub uploader: U,
    policy: ProjectPolicy,
}

impl<R, U> ProjectHandler<R, U>
where
    R: ProjectRepository,
    U: ImageUploader,
{
    pub fn new(project_repo: R, uploader: U, policy: ProjectPolicy) -> Self {
        ProjectHandler { project_repo, uploader, policy }
    }

    /// Retrieves every project in store order
    pub async fn list_projects(&self) -> Result<Vec<Project>, AppError> {
        self.bounded(self.project_repo.list_projects())
            .await
            .inspect_err(|e| tracing::error!("Failed to list projects: {}", e))
    }

    /// Creates a project, persisting the attached image first.
    ///
    /// The image is stored before the draft is built. It is discarded when the
    /// draft is invalid or the store rejects the write. When the store does not
    /// answer in time the write may still have landed, so the file is kept.
    pub async fn create_project(
        &self,
        request: NewProjectRequest,
        image: Option<IncomingImage>,
    ) -> Result<Project, AppError> {
        let stored_path = match image {
            Some(image) => Some(self.uploader.accept(&image).await.inspect_err(|e| {
                tracing::warn!("Rejected project image upload: {}", e);
            })?),
            None => None,
        };

        let draft = request.into_draft(stored_path.as_deref().map(public_image_path));

        match self.persist(&draft).await {
            Ok(project) => Ok(project),
            Err(PersistError::Rejected(e)) => {
                tracing::warn!("Failed to create project: {}", e);
                if let Some(path) = &stored_path {
                    self.uploader.discard(path).await;
                }
                Err(e)
            }
            Err(PersistError::TimedOut) => {
                tracing::error!(
                    image = stored_path.as_deref().unwrap_or(""),
                    "Project create timed out; outcome unknown, keeping uploaded image"
                );
                Err(store_timed_out())
            }
        }
    }

    /// Reports whether the backing store answers
    pub async fn store_available(&self) -> bool {
        self.bounded(self.project_repo.check_connection()).await.is_ok()
    }

    async fn persist(&self, draft: &ProjectDraft) -> Result<Project, PersistError> {
        draft
            .validate_for_create(self.policy.require_image)
            .map_err(PersistError::Rejected)?;

        timeout(self.policy.store_timeout, self.project_repo.create_project(draft))
            .await
            .map_err(|_| PersistError::TimedOut)?
            .map_err(PersistError::Rejected)
    }

    async fn bounded<T>(
        &self,
        operation: impl Future<Output = Result<T, AppError>>,
    ) -> Result<T, AppError> {
        timeout(self.policy.store_timeout, operation)
            .await
            .map_err(|_| store_timed_out())?
    }
}

enum PersistError {
    /// Nothing was written.
    Rejected(AppError),
    /// The write was abandoned mid-flight and may have committed.
    TimedOut,
}

fn store_timed_out() -> AppError {
    AppError::StorageError("Store operation timed out".to_string())
}
