use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use validator::Validate;

use crate::{
    entities::project::{Project, ProjectDraft},
    errors::AppError,
    repositories::project::ProjectRepository,
};

/// Process-local project store. Used by tests and by `APP_DATABASE_URL=memory`.
#[derive(Clone, Default)]
pub struct InMemoryProjectRepo {
    projects: Arc<RwLock<Vec<Project>>>,
}

impl InMemoryProjectRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.projects.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.read().is_empty()
    }
}

#[async_trait]
impl ProjectRepository for InMemoryProjectRepo {
    async fn list_projects(&self) -> Result<Vec<Project>, AppError> {
        Ok(self.projects.read().clone())
    }

    async fn create_project(&self, draft: &ProjectDraft) -> Result<Project, AppError> {
        draft.validate()?;

        let project = draft.clone().into_project(Utc::now());
        self.projects.write().push(project.clone());

        Ok(project)
    }

    async fn check_connection(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(title: &str) -> ProjectDraft {
        ProjectDraft {
            title: title.to_string(),
            description: "A demo".to_string(),
            technologies: vec!["Go".to_string(), "SQL".to_string()],
            category: "Backend".to_string(),
            ..Default::default()
        }
    }

    #[actix_rt::test]
    async fn empty_store_lists_nothing() {
        let repo = InMemoryProjectRepo::new();
        assert!(repo.list_projects().await.unwrap().is_empty());
    }

    #[actix_rt::test]
    async fn created_projects_are_listed_in_insertion_order() {
        let repo = InMemoryProjectRepo::new();

        let first = repo.create_project(&draft("First")).await.unwrap();
        let second = repo.create_project(&draft("Second")).await.unwrap();

        let listed = repo.list_projects().await.unwrap();
        assert_eq!(listed, vec![first, second]);
    }

    #[actix_rt::test]
    async fn identical_drafts_produce_distinct_records() {
        let repo = InMemoryProjectRepo::new();

        let a = repo.create_project(&draft("Same")).await.unwrap();
        let b = repo.create_project(&draft("Same")).await.unwrap();

        assert_ne!(a.id, b.id);
        assert_eq!(repo.len(), 2);
    }

    #[actix_rt::test]
    async fn invalid_draft_persists_nothing() {
        let repo = InMemoryProjectRepo::new();
        let mut invalid = draft("Broken");
        invalid.category.clear();

        let result = repo.create_project(&invalid).await;

        assert!(matches!(result, Err(AppError::ValidationError(_))));
        assert!(repo.is_empty());
    }

    #[actix_rt::test]
    async fn whitespace_only_title_is_rejected_by_the_store() {
        let repo = InMemoryProjectRepo::new();

        let result = repo.create_project(&draft("   ")).await;

        match result {
            Err(AppError::ValidationError(errors)) => assert_eq!(errors[0].field, "title"),
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(repo.is_empty());
    }
}
