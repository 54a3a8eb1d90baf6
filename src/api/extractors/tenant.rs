use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use std::collections::HashMap;
use crate::state::AppState;
use crate::domain::models::{auth::Caller, member::MemberProfile, tenant::Tenant};
use crate::error::AppError;
use super::auth::AuthUser;
use std::sync::Arc;
use tracing::warn;

/// The tenant named in the path, resolved for a caller who belongs to it.
pub struct TenantContext {
    pub tenant: Tenant,
    pub caller: Caller,
}

impl FromRequestParts<Arc<AppState>> for TenantContext {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let AuthUser(caller) = AuthUser::from_request_parts(parts, state).await?;

        let params: Path<HashMap<String, String>> = Path::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::Validation("Invalid path parameters".into()))?;
        let tenant_id = params.get("tenant_id")
            .ok_or(AppError::Validation("Missing tenant id".into()))?;

        // Foreign tenants look exactly like missing ones.
        if &caller.tenant_id != tenant_id {
            warn!("User {} tried to access tenant {}", caller.user_id, tenant_id);
            return Err(AppError::NotFound("Tenant not found".into()));
        }

        let tenant = state.tenant_repo.find_by_id(tenant_id).await?
            .ok_or(AppError::NotFound("Tenant not found".into()))?;

        Ok(TenantContext { tenant, caller })
    }
}

/// Loads the caller's profile; missing profiles are `NotFound`, deactivated ones `Forbidden`.
async fn active_profile(state: &AppState, ctx: &TenantContext) -> Result<MemberProfile, AppError> {
    let profile = state.member_repo.find_by_id(&ctx.tenant.id, &ctx.caller.user_id).await?
        .ok_or(AppError::NotFound("Member profile not found".into()))?;
    if !profile.active {
        warn!("Inactive profile {} rejected in tenant {}", profile.id, ctx.tenant.id);
        return Err(AppError::Forbidden("Member account is inactive".into()));
    }
    Ok(profile)
}

/// A `TenantContext` whose caller acts through an active member profile.
pub struct MemberContext {
    pub ctx: TenantContext,
    pub profile: MemberProfile,
}

impl FromRequestParts<Arc<AppState>> for MemberContext {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let ctx = TenantContext::from_request_parts(parts, state).await?;
        let profile = active_profile(state, &ctx).await?;
        Ok(MemberContext { ctx, profile })
    }
}

/// A `TenantContext` whose caller holds the admin role and an active profile.
pub struct AdminContext(pub TenantContext);

impl FromRequestParts<Arc<AppState>> for AdminContext {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let ctx = TenantContext::from_request_parts(parts, state).await?;
        if !ctx.caller.is_admin() {
            return Err(AppError::Forbidden("Admin role required".into()));
        }
        active_profile(state, &ctx).await?;
        Ok(AdminContext(ctx))
    }
}
