use actix_multipart::form::MultipartFormConfig;
use actix_web::web;

use crate::errors::AppError;

const JSON_LIMIT: usize = 64 * 1024;
/// Room for the text fields of a project form on top of the image itself.
const FORM_FIELDS_ALLOWANCE: usize = 64 * 1024;

/// Payload limits, plus extractor errors rendered as `{ "message": ... }` bodies.
pub fn config_payloads(cfg: &mut web::ServiceConfig, max_upload_bytes: u64) {
    let upload_limit = usize::try_from(max_upload_bytes).unwrap_or(usize::MAX);

    cfg.app_data(
        web::JsonConfig::default()
            .limit(JSON_LIMIT)
            .error_handler(|err, _req| AppError::from(err).into())
    );

    cfg.app_data(
        MultipartFormConfig::default()
            .total_limit(upload_limit.saturating_add(FORM_FIELDS_ALLOWANCE))
            .memory_limit(FORM_FIELDS_ALLOWANCE)
            .error_handler(|err, _req| AppError::from(err).into())
    );
}
