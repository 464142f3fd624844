use std::borrow::Cow;
use std::path::PathBuf;

use actix_multipart::form::{tempfile::TempFile, text::Text, MultipartForm};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::errors::AppError;

// ───── Database Models ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub technologies: Vec<String>,
    pub image: String,
    pub github: Option<String>,
    pub link: Option<String>,
    pub date: Option<String>,
    pub category: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Typed, trimmed project data on its way into the store.
#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct ProjectDraft {
    #[validate(custom(function = "validate_not_blank", message = "Please add a project title"))]
    pub title: String,

    #[validate(custom(function = "validate_not_blank", message = "Please add a description"))]
    pub description: String,

    pub technologies: Vec<String>,

    pub image: Option<String>,

    #[validate(custom(function = "validate_url"))]
    pub github: Option<String>,

    #[validate(custom(function = "validate_url"))]
    pub link: Option<String>,

    #[validate(custom(function = "validate_project_date"))]
    pub date: Option<String>,

    #[validate(custom(function = "validate_not_blank", message = "Please select a project category"))]
    pub category: String,
}

impl ProjectDraft {
    /// Runs the schema checks plus the image requirement of the create endpoint.
    pub fn validate_for_create(&self, require_image: bool) -> Result<(), AppError> {
        let mut errors = match self.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };

        if require_image && self.image.is_none() {
            errors.add("image", new_validation_error("image_required", "Please upload a project image"));
        }

        if errors.errors().is_empty() {
            Ok(())
        } else {
            Err(errors.into())
        }
    }

    pub fn into_project(self, created_at: DateTime<Utc>) -> Project {
        Project {
            id: Uuid::new_v4(),
            title: self.title,
            description: self.description,
            technologies: self.technologies,
            image: self.image.unwrap_or_default(),
            github: self.github,
            link: self.link,
            date: self.date,
            category: self.category,
            created_at,
            updated_at: created_at,
        }
    }
}

// ───── Input Requests ────────────────────────────────────────────────

/// Technologies arrive as comma-separated text from the form, or as a list from JSON clients.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TechnologiesInput {
    Csv(String),
    List(Vec<String>),
}

impl Default for TechnologiesInput {
    fn default() -> Self {
        TechnologiesInput::List(Vec::new())
    }
}

impl TechnologiesInput {
    pub fn into_list(self) -> Vec<String> {
        match self {
            TechnologiesInput::Csv(raw) => parse_technologies(&raw),
            TechnologiesInput::List(items) => items
                .iter()
                .map(|t| t.trim())
                .filter(|t| !t.is_empty())
                .map(String::from)
                .collect(),
        }
    }
}

/// Raw create payload. Every field is optional here so a missing field
/// surfaces as a validation message instead of a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewProjectRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub technologies: Option<TechnologiesInput>,
    pub image: Option<String>,
    pub github: Option<String>,
    pub link: Option<String>,
    pub date: Option<String>,
    pub category: Option<String>,
}

impl NewProjectRequest {
    /// Builds the draft. `uploaded_image` is the public path of a file the
    /// uploader has already persisted and takes precedence over `image`.
    pub fn into_draft(self, uploaded_image: Option<String>) -> ProjectDraft {
        ProjectDraft {
            title: trimmed(self.title).unwrap_or_default(),
            description: trimmed(self.description).unwrap_or_default(),
            technologies: self.technologies.unwrap_or_default().into_list(),
            image: uploaded_image.or_else(|| trimmed(self.image)),
            github: trimmed(self.github),
            link: trimmed(self.link),
            date: trimmed(self.date),
            category: trimmed(self.category).unwrap_or_default(),
        }
    }
}

#[derive(Debug, MultipartForm)]
pub struct ProjectUpload {
    pub title: Option<Text<String>>,
    pub description: Option<Text<String>>,
    pub technologies: Option<Text<String>>,
    pub github: Option<Text<String>>,
    pub link: Option<Text<String>>,
    pub date: Option<Text<String>>,
    pub category: Option<Text<String>>,
    pub image: Option<TempFile>,
}

impl ProjectUpload {
    /// Splits the form into its text fields and the attached image, if any.
    /// A file input submitted without a selection arrives as an unnamed empty
    /// part and is treated as no attachment.
    pub fn into_parts(self) -> (NewProjectRequest, Option<TempFile>) {
        let request = NewProjectRequest {
            title: self.title.map(|t| t.0),
            description: self.description.map(|t| t.0),
            technologies: self
                .technologies
                .map(|t| TechnologiesInput::Csv(t.0)),
            image: None,
            github: self.github.map(|t| t.0),
            link: self.link.map(|t| t.0),
            date: self.date.map(|t| t.0),
            category: self.category.map(|t| t.0),
        };

        let image = self.image.filter(|file| {
            file.size > 0 || file.file_name.as_deref().is_some_and(|n| !n.is_empty())
        });

        (request, image)
    }
}

/// An uploaded file that has been spooled to a temporary location.
#[derive(Debug, Clone, PartialEq)]
pub struct IncomingImage {
    pub file_name: Option<String>,
    pub path: PathBuf,
    pub size: usize,
}

impl From<&TempFile> for IncomingImage {
    fn from(file: &TempFile) -> Self {
        IncomingImage {
            file_name: file.file_name.clone(),
            path: file.file.path().to_path_buf(),
            size: file.size,
        }
    }
}

// ───── Helpers ────────────────────────────────────────────────────────

/// Splits comma-separated technologies, trimming each entry and dropping blanks.
pub fn parse_technologies(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

/// Maps a storage-relative upload path to the path the file is served under.
pub fn public_image_path(storage_path: &str) -> String {
    let normalized = storage_path.replace('\\', "/");
    format!("/{}", normalized.trim_start_matches('/'))
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// ───── Validation Helpers ───────────────────────────────────────────

pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new("blank"))
    } else {
        Ok(())
    }
}

pub fn validate_url(url: &str) -> Result<(), ValidationError> {
    match url::Url::parse(url) {
        Ok(parsed) if parsed.scheme() == "http" || parsed.scheme() == "https" => Ok(()),
        Ok(_) => Err(new_validation_error("invalid_url_scheme", "URL must start with http:// or https://")),
        Err(_) => Err(new_validation_error("invalid_url", "Invalid URL format")),
    }
}

/// Accepts `YYYY-MM-DD` as sent by date inputs, or `YYYY-MM`.
pub fn validate_project_date(date: &str) -> Result<(), ValidationError> {
    let full = NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok();
    let month = NaiveDate::parse_from_str(&format!("{date}-01"), "%Y-%m-%d").is_ok();

    if full || month {
        Ok(())
    } else {
        Err(new_validation_error("invalid_date", "Date must be YYYY-MM or YYYY-MM-DD"))
    }
}

fn new_validation_error(code: &'static str, msg: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(msg));
    err
}
