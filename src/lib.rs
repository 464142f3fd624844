use std::{path::PathBuf, sync::Arc};

mod domain;
mod interfaces;
mod infrastructure;
pub mod errors;
pub mod settings;
pub mod constants;
pub mod graceful_shutdown;
pub mod telemetry;

pub use domain::{entities, use_cases};
pub use interfaces::{handlers, repositories, routes};
pub use infrastructure::{db, uploads, web};

use repositories::project::ProjectRepository;
use uploads::{local_disk::LocalImageUploader, uploader::ImageUploader};
use use_cases::projects::{ProjectHandler, ProjectPolicy};

pub struct AppState {
    pub name: String,
    pub project_handler: AppProjectHandler,
    pub uploads_root: PathBuf,
    pub max_upload_bytes: u64,
}

pub type AppProjectHandler = ProjectHandler<Arc<dyn ProjectRepository>, Arc<dyn ImageUploader>>;

impl AppState {
    /// Wires the project use case to an already opened store and a disk uploader rooted at `upload_dir`.
    pub fn new(config: &settings::AppConfig, project_repo: Arc<dyn ProjectRepository>) -> Self {
        let uploads_root = PathBuf::from(&config.upload_dir);
        let uploader: Arc<dyn ImageUploader> = Arc::new(
            LocalImageUploader::new(uploads_root.clone(), config.max_upload_bytes)
        );

        AppState {
            name: config.name.clone(),
            project_handler: ProjectHandler::new(project_repo, uploader, ProjectPolicy::from(config)),
            uploads_root,
            max_upload_bytes: config.max_upload_bytes,
        }
    }
}
