use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;

pub static START_TIME: Lazy<DateTime<Utc>> = Lazy::new(Utc::now);

/// URL prefix and storage-relative directory name for uploaded images.
pub const UPLOADS_MOUNT: &str = "uploads";
