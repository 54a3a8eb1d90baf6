use crate::domain::{models::tenant::Tenant, ports::TenantRepository};
use crate::error::{is_unique_violation, AppError};
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteTenantRepo {
    pool: SqlitePool,
}

impl SqliteTenantRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TenantRepository for SqliteTenantRepo {
    async fn create(&self, tenant: &Tenant) -> Result<Tenant, AppError> {
        sqlx::query_as::<_, Tenant>("INSERT INTO tenants (id, name, slug, timezone, created_at) VALUES (?, ?, ?, ?, ?) RETURNING *")
            .bind(&tenant.id).bind(&tenant.name).bind(&tenant.slug).bind(&tenant.timezone).bind(tenant.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                // Two concurrent creates can both pass the handler's slug lookup.
                e if is_unique_violation(&e) => AppError::Conflict("Slug already taken".into()),
                e => AppError::Database(e),
            })
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Tenant>, AppError> {
        sqlx::query_as::<_, Tenant>("SELECT * FROM tenants WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tenant>, AppError> {
        sqlx::query_as::<_, Tenant>("SELECT * FROM tenants WHERE slug = ?")
            .bind(slug.to_lowercase())
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
}
