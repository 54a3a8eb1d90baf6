use axum::{extract::{State, Path, Query}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::tenant::{AdminContext, TenantContext};
use crate::api::dtos::requests::{
    CreateSessionRequest, DeleteSessionQuery, UpdateSessionRequest, UpdateSessionStatusRequest,
};
use crate::domain::models::class_session::{ClassSession, NewSessionParams};
use crate::domain::services::lifecycle::validate_details;
use crate::error::AppError;
use std::sync::Arc;
use chrono::{NaiveDate, NaiveTime};
use tracing::info;

pub(crate) fn parse_date(value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| AppError::Validation("Invalid date format (YYYY-MM-DD)".into()))
}

fn parse_time(value: &str) -> Result<NaiveTime, AppError> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|_| AppError::Validation(format!("Invalid time '{}' (HH:MM)", value)))
}

/// Instructor must belong to the tenant and still be active.
async fn check_instructor(state: &AppState, tenant_id: &str, instructor_id: &str) -> Result<(), AppError> {
    let instructor = state.instructor_repo.find_by_id(tenant_id, instructor_id).await?
        .ok_or(AppError::NotFound("Instructor not found".into()))?;
    if !instructor.active {
        return Err(AppError::Validation("Instructor is inactive".into()));
    }
    Ok(())
}

pub async fn create_session(
    State(state): State<Arc<AppState>>,
    AdminContext(ctx): AdminContext,
    Json(payload): Json<CreateSessionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let class_date = parse_date(&payload.class_date)?;
    let start_time = parse_time(&payload.start_time)?;
    let end_time = parse_time(&payload.end_time)?;
    validate_details(&payload.title, start_time, end_time, payload.max_capacity)?;

    let instructor_id = payload.instructor_id.filter(|id| !id.is_empty());
    if let Some(id) = &instructor_id {
        check_instructor(&state, &ctx.tenant.id, id).await?;
    }

    let session = ClassSession::new(NewSessionParams {
        tenant_id: ctx.tenant.id.clone(),
        title: payload.title.trim().to_string(),
        description: payload.description.filter(|d| !d.trim().is_empty()),
        class_date,
        start_time,
        end_time,
        max_capacity: payload.max_capacity,
        instructor_id,
    });
    let created = state.class_repo.create(&session).await?;

    info!("Created session {} on {}", created.id, created.class_date);
    Ok(Json(created))
}

pub async fn list_sessions(
    State(state): State<Arc<AppState>>,
    AdminContext(ctx): AdminContext,
) -> Result<impl IntoResponse, AppError> {
    let sessions = state.class_repo.list_with_occupancy(&ctx.tenant.id).await?;
    Ok(Json(sessions))
}

pub async fn get_session(
    State(state): State<Arc<AppState>>,
    ctx: TenantContext,
    Path((_, class_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let session = state.class_repo.find_with_occupancy(&ctx.tenant.id, &class_id, Some(&ctx.caller.user_id)).await?
        .ok_or(AppError::NotFound("Session not found".into()))?;
    Ok(Json(session))
}

pub async fn update_session(
    State(state): State<Arc<AppState>>,
    AdminContext(ctx): AdminContext,
    Path((_, class_id)): Path<(String, String)>,
    Json(payload): Json<UpdateSessionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut session = state.class_repo.find_by_id(&ctx.tenant.id, &class_id).await?
        .ok_or(AppError::NotFound("Session not found".into()))?;

    if let Some(title) = payload.title {
        session.title = title.trim().to_string();
    }
    if let Some(description) = payload.description {
        session.description = if description.trim().is_empty() { None } else { Some(description) };
    }
    if let Some(date) = payload.class_date {
        session.class_date = parse_date(&date)?;
    }
    if let Some(start) = payload.start_time {
        session.start_time = parse_time(&start)?;
    }
    if let Some(end) = payload.end_time {
        session.end_time = parse_time(&end)?;
    }
    if let Some(cap) = payload.max_capacity {
        session.max_capacity = cap;
    }
    if let Some(instructor_id) = payload.instructor_id {
        if instructor_id.is_empty() {
            session.instructor_id = None;
        } else {
            if session.instructor_id.as_deref() != Some(instructor_id.as_str()) {
                check_instructor(&state, &ctx.tenant.id, &instructor_id).await?;
            }
            session.instructor_id = Some(instructor_id);
        }
    }

    validate_details(&session.title, session.start_time, session.end_time, session.max_capacity)?;

    let updated = state.class_repo.update(&session).await?;
    info!("Updated session {}", class_id);
    Ok(Json(updated))
}

pub async fn update_session_status(
    State(state): State<Arc<AppState>>,
    AdminContext(ctx): AdminContext,
    Path((_, class_id)): Path<(String, String)>,
    Json(payload): Json<UpdateSessionStatusRequest>,
) -> Result<impl IntoResponse, AppError> {
    let updated = state.class_repo.update_status(&ctx.tenant.id, &class_id, payload.status).await?;
    info!("Session {} is now {}", class_id, updated.status);
    Ok(Json(updated))
}

pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    AdminContext(ctx): AdminContext,
    Path((_, class_id)): Path<(String, String)>,
    Query(query): Query<DeleteSessionQuery>,
) -> Result<impl IntoResponse, AppError> {
    state.class_repo.delete(&ctx.tenant.id, &class_id, query.cascade).await?;
    info!("Deleted session {} (cascade={})", class_id, query.cascade);
    Ok(Json(serde_json::json!({"status": "deleted"})))
}
