#![allow(dead_code)]

use actix_web::{middleware::NormalizePath, web, App, HttpServer};
use async_trait::async_trait;
use portfolio_projects::{
    entities::project::{Project, ProjectDraft},
    errors::AppError,
    repositories::{memory::InMemoryProjectRepo, project::ProjectRepository},
    routes::configure_app,
    settings::{AppConfig, AppEnvironment},
    AppState,
};
use reqwest::{multipart::{Form, Part}, Client, Response};
use std::{net::TcpListener, path::Path, sync::Arc, time::Duration};
use tempfile::TempDir;

/// Smallest valid PNG signature + IHDR prefix; enough for content sniffing.
pub const PNG_BYTES: [u8; 16] = [
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52,
];

pub struct TestApp {
    pub address: String,
    pub client: Client,
    pub repo: InMemoryProjectRepo,
    pub upload_dir: TempDir,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(|_| {}).await
    }

    pub async fn spawn_with(customize: impl FnOnce(&mut AppConfig)) -> Self {
        let repo = InMemoryProjectRepo::new();
        let (address, upload_dir) = spawn_server(customize, Arc::new(repo.clone())).await;

        Self {
            address,
            client: Client::new(),
            repo,
            upload_dir,
        }
    }

    /// Spawns against a store that fails every call.
    pub async fn spawn_with_broken_store() -> Self {
        let (address, upload_dir) = spawn_server(|_| {}, Arc::new(BrokenRepo)).await;

        Self {
            address,
            client: Client::new(),
            repo: InMemoryProjectRepo::new(),
            upload_dir,
        }
    }

    pub async fn get_projects(&self) -> Response {
        self.client
            .get(format!("{}/api/projects", self.address))
            .send()
            .await
            .expect("Failed to list projects")
    }

    pub async fn list_projects(&self) -> Vec<Project> {
        self.get_projects()
            .await
            .json()
            .await
            .expect("Failed to parse project list")
    }

    pub async fn post_form(&self, form: Form) -> Response {
        self.client
            .post(format!("{}/api/projects", self.address))
            .multipart(form)
            .send()
            .await
            .expect("Failed to post project form")
    }

    pub async fn post_json(&self, body: &serde_json::Value) -> Response {
        self.client
            .post(format!("{}/api/projects", self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to post project json")
    }

    pub fn stored_upload_count(&self) -> usize {
        std::fs::read_dir(self.upload_dir.path())
            .map(|entries| entries.count())
            .unwrap_or(0)
    }
}

async fn spawn_server(
    customize: impl FnOnce(&mut AppConfig),
    repo: Arc<dyn ProjectRepository>,
) -> (String, TempDir) {
    let upload_dir = tempfile::tempdir().expect("Failed to create upload dir");

    let mut config = test_config(upload_dir.path());
    customize(&mut config);

    let state = web::Data::new(AppState::new(&config, repo));

    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(NormalizePath::trim())
            .configure(configure_app(state.clone()))
    })
    .listen(listener)
    .expect("Failed to bind server")
    .workers(1)
    .run();

    tokio::spawn(server);

    let client = Client::new();
    while client.get(format!("{}/", address)).send().await.is_err() {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    (address, upload_dir)
}

fn test_config(upload_dir: &Path) -> AppConfig {
    AppConfig {
        env: AppEnvironment::Testing,
        name: "Portfolio Projects Test".to_string(),
        port: 0,
        host: "127.0.0.1".to_string(),
        worker_count: 1,
        database_url: "memory".to_string(),
        cors_allowed_origins: vec!["*".to_string()],
        upload_dir: upload_dir.to_string_lossy().into_owned(),
        max_upload_bytes: 1024 * 1024,
        require_image: true,
        store_timeout_secs: 5,
    }
}

/// The form the admin page submits, minus the image.
pub fn demo_form() -> Form {
    Form::new()
        .text("title", "Demo")
        .text("description", "A demo")
        .text("technologies", "Go, SQL")
        .text("github", "https://github.com/me/demo")
        .text("link", "")
        .text("date", "2024-05-01")
        .text("category", "Backend")
}

pub fn png_part() -> Part {
    Part::bytes(PNG_BYTES.to_vec())
        .file_name("demo.png")
        .mime_str("image/png")
        .expect("valid mime")
}

struct BrokenRepo;

#[async_trait]
impl ProjectRepository for BrokenRepo {
    async fn list_projects(&self) -> Result<Vec<Project>, AppError> {
        Err(AppError::StorageError("connection refused".into()))
    }

    async fn create_project(&self, _draft: &ProjectDraft) -> Result<Project, AppError> {
        Err(AppError::StorageError("connection refused".into()))
    }

    async fn check_connection(&self) -> Result<(), AppError> {
        Err(AppError::StorageError("connection refused".into()))
    }
}
