use actix_multipart::form::MultipartForm;
use actix_web::{web, HttpResponse, Responder};
use tracing::{info, instrument};

use crate::{
    entities::project::{IncomingImage, NewProjectRequest, ProjectUpload},
    errors::AppError,
    AppState,
};

#[instrument(skip(state))]
pub async fn get_projects(state: web::Data<AppState>) -> Result<impl Responder, AppError> {
    let projects = state.project_handler.list_projects().await?;

    Ok(HttpResponse::Ok().json(projects))
}

/// `multipart/form-data` create, as sent by the admin form.
#[instrument(skip(state, form))]
pub async fn create_project_from_form(
    state: web::Data<AppState>,
    form: MultipartForm<ProjectUpload>,
) -> Result<impl Responder, AppError> {
    let (request, image_file) = form.into_inner().into_parts();

    // The spooled temp file must outlive the create call; it is removed on drop.
    let image = image_file.as_ref().map(IncomingImage::from);

    let project = state
        .project_handler
        .create_project(request, image)
        .await?;

    info!(project_id = %project.id, image = %project.image, "Project created");
    Ok(HttpResponse::Created().json(project))
}

/// JSON create. Carries no file; `image` may reference an existing URL.
#[instrument(skip(state, data))]
pub async fn create_project_from_json(
    state: web::Data<AppState>,
    data: web::Json<NewProjectRequest>,
) -> Result<impl Responder, AppError> {
    let project = state
        .project_handler
        .create_project(data.into_inner(), None)
        .await?;

    info!(project_id = %project.id, "Project created");
    Ok(HttpResponse::Created().json(project))
}
