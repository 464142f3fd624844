use actix_web::{get, web, HttpResponse, Responder};

use crate::AppState;

#[get("/")]
pub async fn home(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "message": "API is running...",
        "name": state.name,
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": ["/api/projects", "/uploads/{file_name}", "/health"]
    }))
}
