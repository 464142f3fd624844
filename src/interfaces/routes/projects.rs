use actix_web::{
    guard::{self, GuardContext},
    http::header,
    web,
};

use crate::handlers::projects;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/projects")
            .route(web::get().to(projects::get_projects))
            .route(
                web::post()
                    .guard(guard::fn_guard(is_multipart))
                    .to(projects::create_project_from_form)
            )
            .route(web::post().to(projects::create_project_from_json))
    );
}

fn is_multipart(ctx: &GuardContext<'_>) -> bool {
    ctx.head()
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.trim_start().to_ascii_lowercase().starts_with("multipart/form-data"))
}
