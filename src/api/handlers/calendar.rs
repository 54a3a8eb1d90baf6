use axum::{extract::{State, Query}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::tenant::TenantContext;
use crate::api::dtos::{
    requests::{DayQuery, MonthQuery},
    responses::{DaySession, DayViewResponse, MemberDatesResponse, MonthIndicatorsResponse},
};
use crate::api::handlers::class_session::parse_date;
use crate::domain::services::calendar::{month_bounds, month_indicators};
use crate::error::AppError;
use std::sync::Arc;
use tracing::debug;

pub async fn day_view(
    State(state): State<Arc<AppState>>,
    ctx: TenantContext,
    Query(query): Query<DayQuery>,
) -> Result<impl IntoResponse, AppError> {
    let date = parse_date(&query.date)?;
    let sessions = state.class_repo.list_day(&ctx.tenant.id, date, Some(&ctx.caller.user_id)).await?
        .into_iter()
        .map(DaySession::from)
        .collect();
    Ok(Json(DayViewResponse { date, sessions }))
}

pub async fn month_view(
    State(state): State<Arc<AppState>>,
    ctx: TenantContext,
    Query(query): Query<MonthQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (first, last) = month_bounds(&query.month)?;
    let sessions = state.class_repo.list_by_range(&ctx.tenant.id, first, last).await?;
    debug!("{} sessions between {} and {}", sessions.len(), first, last);

    Ok(Json(MonthIndicatorsResponse {
        month: query.month,
        days: month_indicators(&sessions),
    }))
}

pub async fn my_dates(
    State(state): State<Arc<AppState>>,
    ctx: TenantContext,
    Query(query): Query<MonthQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (first, last) = month_bounds(&query.month)?;
    let dates = state.reservation_repo.active_dates_for_member(&ctx.tenant.id, &ctx.caller.user_id, first, last).await?;
    Ok(Json(MemberDatesResponse { month: query.month, dates }))
}
