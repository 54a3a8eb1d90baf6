use axum::{extract::State, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::tenant::AdminContext;
use crate::domain::models::views::Overview;
use crate::domain::services::booking::local_now;
use crate::error::AppError;
use std::sync::Arc;

const RECENT_RESERVATIONS: i64 = 5;

pub async fn get_overview(
    State(state): State<Arc<AppState>>,
    AdminContext(ctx): AdminContext,
) -> Result<impl IntoResponse, AppError> {
    let tenant_id = &ctx.tenant.id;
    let today = local_now(&ctx.tenant.timezone).date();

    let members = state.member_repo.count_members(tenant_id).await?;
    let scheduled_classes = state.class_repo.count_from(tenant_id, today).await?;
    let today_reservations = state.reservation_repo.count_active_on(tenant_id, today).await?;
    let recent_reservations = state.reservation_repo.list_recent(tenant_id, RECENT_RESERVATIONS).await?;

    Ok(Json(Overview {
        total_members: members.total,
        active_members: members.active,
        scheduled_classes,
        today_reservations,
        recent_reservations,
    }))
}
