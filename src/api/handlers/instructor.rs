use axum::{extract::{State, Path}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::tenant::AdminContext;
use crate::api::dtos::{
    requests::{CreateInstructorRequest, UpdateInstructorRequest},
    responses::InstructorRemovedResponse,
};
use crate::domain::models::instructor::Instructor;
use std::sync::Arc;
use crate::error::AppError;
use tracing::info;

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

pub async fn create_instructor(
    State(state): State<Arc<AppState>>,
    AdminContext(ctx): AdminContext,
    Json(payload): Json<CreateInstructorRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::Validation("Instructor name is required".into()));
    }

    let instructor = Instructor::new(ctx.tenant.id, payload.name, non_empty(payload.email), non_empty(payload.phone));
    let created = state.instructor_repo.create(&instructor).await?;

    info!("Created instructor {}", created.id);
    Ok(Json(created))
}

pub async fn list_instructors(
    State(state): State<Arc<AppState>>,
    AdminContext(ctx): AdminContext,
) -> Result<impl IntoResponse, AppError> {
    let instructors = state.instructor_repo.list_by_tenant(&ctx.tenant.id).await?;
    Ok(Json(instructors))
}

pub async fn update_instructor(
    State(state): State<Arc<AppState>>,
    AdminContext(ctx): AdminContext,
    Path((_, instructor_id)): Path<(String, String)>,
    Json(payload): Json<UpdateInstructorRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut instructor = state.instructor_repo.find_by_id(&ctx.tenant.id, &instructor_id).await?
        .ok_or(AppError::NotFound("Instructor not found".into()))?;

    if let Some(name) = payload.name {
        if name.trim().is_empty() {
            return Err(AppError::Validation("Instructor name is required".into()));
        }
        instructor.name = name;
    }
    if let Some(email) = payload.email {
        instructor.email = non_empty(Some(email));
    }
    if let Some(phone) = payload.phone {
        instructor.phone = non_empty(Some(phone));
    }
    if let Some(active) = payload.active {
        instructor.active = active;
    }

    let updated = state.instructor_repo.update(&instructor).await?;
    info!("Updated instructor {}", instructor_id);
    Ok(Json(updated))
}

pub async fn delete_instructor(
    State(state): State<Arc<AppState>>,
    AdminContext(ctx): AdminContext,
    Path((_, instructor_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let status = state.instructor_repo.remove(&ctx.tenant.id, &instructor_id).await?;
    info!("Removed instructor {} ({:?})", instructor_id, status);
    Ok(Json(InstructorRemovedResponse { id: instructor_id, status }))
}
