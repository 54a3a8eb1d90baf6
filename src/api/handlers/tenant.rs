use axum::{extract::State, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::dtos::{requests::CreateTenantRequest, responses::TenantCreatedResponse};
use crate::api::extractors::tenant::TenantContext;
use crate::domain::models::{
    member::{MemberProfile, NewMemberParams, Role},
    tenant::Tenant,
};
use crate::domain::services::booking::local_now;
use std::sync::Arc;
use crate::error::AppError;
use tracing::info;

pub async fn create_tenant(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateTenantRequest>,
) -> Result<impl IntoResponse, AppError> {
    let tenant = Tenant::new(payload.name, payload.slug, payload.timezone)?;
    if state.tenant_repo.find_by_slug(&tenant.slug).await?.is_some() {
        return Err(AppError::Conflict("Slug already taken".into()));
    }

    let created_tenant = state.tenant_repo.create(&tenant).await?;
    info!("Tenant created: {}", created_tenant.id);

    let admin = match payload.admin {
        Some(admin) => {
            let profile = MemberProfile::new(NewMemberParams {
                id: admin.id,
                tenant_id: created_tenant.id.clone(),
                full_name: admin.full_name,
                email: admin.email,
                role: Role::Admin,
                start_date: local_now(&created_tenant.timezone).date(),
            });
            let created = state.member_repo.create(&profile).await?;
            info!("Created first admin {} for tenant {}", created.id, created_tenant.id);
            Some(created)
        }
        None => None,
    };

    Ok(Json(TenantCreatedResponse {
        tenant: created_tenant,
        admin,
    }))
}

pub async fn get_tenant(ctx: TenantContext) -> Result<impl IntoResponse, AppError> {
    Ok(Json(ctx.tenant))
}
