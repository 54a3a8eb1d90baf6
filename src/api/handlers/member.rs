use axum::{extract::{State, Path}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::tenant::{AdminContext, TenantContext};
use crate::api::dtos::requests::{CreateMemberRequest, SetMemberActiveRequest};
use crate::domain::models::member::{MemberProfile, NewMemberParams, Role};
use crate::domain::services::booking::local_now;
use std::sync::Arc;
use crate::error::AppError;
use tracing::info;

pub async fn create_member(
    State(state): State<Arc<AppState>>,
    AdminContext(ctx): AdminContext,
    Json(payload): Json<CreateMemberRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.id.trim().is_empty() || payload.full_name.trim().is_empty() {
        return Err(AppError::Validation("Member id and full name are required".into()));
    }

    let member = MemberProfile::new(NewMemberParams {
        id: payload.id,
        tenant_id: ctx.tenant.id.clone(),
        full_name: payload.full_name,
        email: payload.email,
        role: payload.role.unwrap_or(Role::Member),
        start_date: payload.start_date.unwrap_or_else(|| local_now(&ctx.tenant.timezone).date()),
    });
    let created = state.member_repo.create(&member).await?;

    info!("Created {} profile {}", created.role, created.id);
    Ok(Json(created))
}

pub async fn list_members(
    State(state): State<Arc<AppState>>,
    AdminContext(ctx): AdminContext,
) -> Result<impl IntoResponse, AppError> {
    let members = state.member_repo.list_by_tenant(&ctx.tenant.id).await?;
    Ok(Json(members))
}

pub async fn set_member_active(
    State(state): State<Arc<AppState>>,
    AdminContext(ctx): AdminContext,
    Path((_, member_id)): Path<(String, String)>,
    Json(payload): Json<SetMemberActiveRequest>,
) -> Result<impl IntoResponse, AppError> {
    if !payload.active && ctx.caller.user_id == member_id {
        return Err(AppError::Conflict("Cannot deactivate yourself".into()));
    }

    let updated = state.member_repo.set_active(&ctx.tenant.id, &member_id, payload.active).await?;
    info!("Member {} active={}", member_id, updated.active);
    Ok(Json(updated))
}

pub async fn get_me(
    State(state): State<Arc<AppState>>,
    ctx: TenantContext,
) -> Result<impl IntoResponse, AppError> {
    let profile = state.member_repo.find_by_id(&ctx.tenant.id, &ctx.caller.user_id).await?
        .ok_or(AppError::NotFound("Member profile not found".into()))?;
    Ok(Json(profile))
}
