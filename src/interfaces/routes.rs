use actix_web::web;

use crate::{
    handlers::{home::home, system::health_check, uploads::serve_upload},
    AppState,
};

mod payload;
mod projects;

/// Registers state, payload limits and every route on an `App`.
pub fn configure_app(state: web::Data<AppState>) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        let max_upload_bytes = state.max_upload_bytes;

        cfg.app_data(state);
        payload::config_payloads(cfg, max_upload_bytes);
        configure_routes(cfg);
    }
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(home);
    cfg.service(health_check);
    cfg.service(serve_upload);

    cfg.service(
        web::scope("/api")
            .configure(projects::config_routes)
    );
}
