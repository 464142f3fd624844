use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use validator::Validate;

use crate::{
    entities::project::{Project, ProjectDraft},
    errors::AppError,
    repositories::sqlx_repo::SqlxProjectRepo,
};

#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Every stored project, in insertion order.
    async fn list_projects(&self) -> Result<Vec<Project>, AppError>;
    /// Validates and persists the draft in one atomic write, assigning identity and timestamps.
    async fn create_project(&self, draft: &ProjectDraft) -> Result<Project, AppError>;
    async fn check_connection(&self) -> Result<(), AppError>;
}

#[async_trait]
impl<T> ProjectRepository for Arc<T>
where
    T: ProjectRepository + ?Sized,
{
    async fn list_projects(&self) -> Result<Vec<Project>, AppError> {
        (**self).list_projects().await
    }

    async fn create_project(&self, draft: &ProjectDraft) -> Result<Project, AppError> {
        (**self).create_project(draft).await
    }

    async fn check_connection(&self) -> Result<(), AppError> {
        (**self).check_connection().await
    }
}

/// `seq` is assigned by the insert itself, so it is insertion order even when timestamps tie.
const LIST_PROJECTS_SQL: &str = r#"
    SELECT id, title, description, technologies, image, github, link, "date",
           category, created_at, updated_at
    FROM projects
    ORDER BY seq ASC
"#;

impl SqlxProjectRepo {
    pub fn new(pool: PgPool) -> Self {
        SqlxProjectRepo { pool }
    }
}

#[async_trait]
impl ProjectRepository for SqlxProjectRepo {
    async fn list_projects(&self) -> Result<Vec<Project>, AppError> {
        let projects = sqlx::query_as::<_, Project>(LIST_PROJECTS_SQL)
        .fetch_all(&self.pool)
        .await?;

        Ok(projects)
    }

    async fn create_project(&self, draft: &ProjectDraft) -> Result<Project, AppError> {
        draft.validate()?;

        let project = draft.clone().into_project(Utc::now());

        let stored = sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (
                id, title, description, technologies, image, github, link, "date",
                category, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id, title, description, technologies, image, github, link, "date",
                      category, created_at, updated_at
            "#
        )
        .bind(project.id)
        .bind(&project.title)
        .bind(&project.description)
        .bind(&project.technologies)
        .bind(&project.image)
        .bind(&project.github)
        .bind(&project.link)
        .bind(&project.date)
        .bind(&project.category)
        .bind(project.created_at)
        .bind(project.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(stored)
    }

    async fn check_connection(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
