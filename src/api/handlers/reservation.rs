use axum::{extract::{State, Path}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::tenant::{AdminContext, MemberContext, TenantContext};
use crate::domain::services::booking::local_now;
use crate::error::AppError;
use std::sync::Arc;
use tracing::{info, warn};

pub async fn reserve(
    State(state): State<Arc<AppState>>,
    MemberContext { ctx, profile: member }: MemberContext,
    Path((_, class_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let now = local_now(&ctx.tenant.timezone);
    match state.reservation_repo.reserve(&ctx.tenant.id, &class_id, &member.id, now).await {
        Ok(reservation) => {
            info!("Member {} reserved session {}", member.id, class_id);
            Ok(Json(reservation))
        }
        Err(e) => {
            warn!("Reservation for session {} refused: {}", class_id, e);
            Err(e)
        }
    }
}

pub async fn cancel_own_reservation(
    State(state): State<Arc<AppState>>,
    MemberContext { ctx, .. }: MemberContext,
    Path((_, class_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let now = local_now(&ctx.tenant.timezone);
    let cancelled = state.reservation_repo.cancel_for_member(&ctx.tenant.id, &class_id, &ctx.caller.user_id, now).await?;

    info!("Member {} cancelled reservation {}", ctx.caller.user_id, cancelled.id);
    Ok(Json(cancelled))
}

pub async fn cancel_reservation(
    State(state): State<Arc<AppState>>,
    AdminContext(ctx): AdminContext,
    Path((_, reservation_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let cancelled = state.reservation_repo.cancel_by_id(&ctx.tenant.id, &reservation_id).await?;

    info!("Admin {} cancelled reservation {}", ctx.caller.user_id, reservation_id);
    Ok(Json(cancelled))
}

pub async fn list_session_reservations(
    State(state): State<Arc<AppState>>,
    AdminContext(ctx): AdminContext,
    Path((_, class_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    state.class_repo.find_by_id(&ctx.tenant.id, &class_id).await?
        .ok_or(AppError::NotFound("Session not found".into()))?;

    let reservations = state.reservation_repo.list_for_session(&ctx.tenant.id, &class_id).await?;
    Ok(Json(reservations))
}

pub async fn list_my_reservations(
    State(state): State<Arc<AppState>>,
    ctx: TenantContext,
) -> Result<impl IntoResponse, AppError> {
    let reservations = state.reservation_repo.list_for_member(&ctx.tenant.id, &ctx.caller.user_id).await?;
    Ok(Json(reservations))
}
