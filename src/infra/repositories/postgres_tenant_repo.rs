use crate::domain::{models::tenant::Tenant, ports::TenantRepository};
use crate::error::{is_unique_violation, AppError};
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresTenantRepo {
    pool: PgPool,
}

impl PostgresTenantRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TenantRepository for PostgresTenantRepo {
    async fn create(&self, tenant: &Tenant) -> Result<Tenant, AppError> {
        sqlx::query_as::<_, Tenant>("INSERT INTO tenants (id, name, slug, timezone, created_at) VALUES ($1, $2, $3, $4, $5) RETURNING *").bind(&tenant.id).bind(&tenant.name).bind(&tenant.slug).bind(&tenant.timezone).bind(tenant.created_at).fetch_one(&self.pool).await.map_err(|e| if is_unique_violation(&e) { AppError::Conflict("Slug already taken".into()) } else { AppError::Database(e) })
    }
    async fn find_by_id(&self, id: &str) -> Result<Option<Tenant>, AppError> {
        sqlx::query_as::<_, Tenant>("SELECT * FROM tenants WHERE id = $1").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tenant>, AppError> {
        sqlx::query_as::<_, Tenant>("SELECT * FROM tenants WHERE slug = $1").bind(slug.to_lowercase()).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
}
