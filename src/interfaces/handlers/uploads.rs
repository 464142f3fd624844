use actix_web::{get, web, HttpResponse, Responder};

use crate::{errors::AppError, uploads::local_disk::read_upload, AppState};

#[get("/uploads/{file_name}")]
pub async fn serve_upload(
    state: web::Data<AppState>,
    file_name: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let (bytes, mime) = read_upload(&state.uploads_root, &file_name).await?;

    Ok(HttpResponse::Ok().content_type(mime).body(bytes))
}
