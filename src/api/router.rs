use axum::{
    body::Body,
    extract::Request,
    routing::{get, post, put, delete},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{health, tenant, member, instructor, class_session, reservation, calendar, overview};
use tower_http::{
    trace::TraceLayer,
    classify::ServerErrorsFailureClass,
};
use tracing::{info_span, Span, error, info};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Provisioning
        .route("/api/v1/tenants", post(tenant::create_tenant))
        .route("/api/v1/{tenant_id}", get(tenant::get_tenant))
        .route("/api/v1/{tenant_id}/me", get(member::get_me))
        .route("/api/v1/{tenant_id}/overview", get(overview::get_overview))

        // Members & Instructors
        .route("/api/v1/{tenant_id}/members", get(member::list_members).post(member::create_member))
        .route("/api/v1/{tenant_id}/members/{member_id}/active", put(member::set_member_active))
        .route("/api/v1/{tenant_id}/instructors", get(instructor::list_instructors).post(instructor::create_instructor))
        .route("/api/v1/{tenant_id}/instructors/{instructor_id}", put(instructor::update_instructor).delete(instructor::delete_instructor))

        // Sessions
        .route("/api/v1/{tenant_id}/classes", get(class_session::list_sessions).post(class_session::create_session))
        .route("/api/v1/{tenant_id}/classes/{class_id}", get(class_session::get_session).put(class_session::update_session).delete(class_session::delete_session))
        .route("/api/v1/{tenant_id}/classes/{class_id}/status", put(class_session::update_session_status))
        .route("/api/v1/{tenant_id}/classes/{class_id}/reservations", get(reservation::list_session_reservations))

        // Reservations
        .route("/api/v1/{tenant_id}/classes/{class_id}/reservation", post(reservation::reserve).delete(reservation::cancel_own_reservation))
        .route("/api/v1/{tenant_id}/reservations/{reservation_id}", delete(reservation::cancel_reservation))
        .route("/api/v1/{tenant_id}/my/reservations", get(reservation::list_my_reservations))

        // Calendar
        .route("/api/v1/{tenant_id}/calendar/day", get(calendar::day_view))
        .route("/api/v1/{tenant_id}/calendar/month", get(calendar::month_view))
        .route("/api/v1/{tenant_id}/calendar/my-dates", get(calendar::my_dates))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                        tenant_id = tracing::field::Empty,
                        user_id = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .with_state(state)
}
