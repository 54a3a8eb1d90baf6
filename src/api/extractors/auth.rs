use axum::{
    extract::{FromRequestParts, FromRef},
    http::{header::AUTHORIZATION, request::Parts},
};
use crate::state::AppState;
use crate::domain::models::auth::Caller;
use crate::error::AppError;
use std::sync::Arc;
use tracing::Span;

/// Caller identity taken from a verified `Authorization: Bearer` token.
pub struct AuthUser(pub Caller);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let header = parts.headers.get(AUTHORIZATION)
            .ok_or(AppError::Unauthorized)?
            .to_str()
            .map_err(|_| AppError::Unauthorized)?;

        let token = header.strip_prefix("Bearer ").ok_or(AppError::Unauthorized)?;

        let app_state = <Arc<AppState> as FromRef<S>>::from_ref(state);
        let caller = app_state.auth_service.verify(token.trim())?;

        Span::current().record("tenant_id", caller.tenant_id.as_str());
        Span::current().record("user_id", caller.user_id.as_str());

        Ok(AuthUser(caller))
    }
}
