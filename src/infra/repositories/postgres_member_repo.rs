use crate::domain::{models::member::{MemberCounts, MemberProfile}, ports::MemberRepository};
use crate::error::{is_unique_violation, AppError};
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresMemberRepo {
    pool: PgPool,
}

impl PostgresMemberRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MemberRepository for PostgresMemberRepo {
    async fn create(&self, member: &MemberProfile) -> Result<MemberProfile, AppError> {
        sqlx::query_as::<_, MemberProfile>("INSERT INTO member_profiles (id, tenant_id, full_name, email, role, active, start_date, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *")
            .bind(&member.id).bind(&member.tenant_id).bind(&member.full_name).bind(&member.email).bind(member.role.as_str()).bind(member.active).bind(member.start_date).bind(member.created_at)
            .fetch_one(&self.pool).await
            .map_err(|e| if is_unique_violation(&e) { AppError::Conflict("Member already exists".into()) } else { AppError::Database(e) })
    }
    async fn find_by_id(&self, tenant_id: &str, id: &str) -> Result<Option<MemberProfile>, AppError> {
        sqlx::query_as::<_, MemberProfile>("SELECT * FROM member_profiles WHERE tenant_id = $1 AND id = $2").bind(tenant_id).bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
    async fn list_by_tenant(&self, tenant_id: &str) -> Result<Vec<MemberProfile>, AppError> {
        sqlx::query_as::<_, MemberProfile>("SELECT * FROM member_profiles WHERE tenant_id = $1 ORDER BY created_at DESC").bind(tenant_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }
    async fn set_active(&self, tenant_id: &str, id: &str, active: bool) -> Result<MemberProfile, AppError> {
        sqlx::query_as::<_, MemberProfile>("UPDATE member_profiles SET active = $1 WHERE tenant_id = $2 AND id = $3 RETURNING *").bind(active).bind(tenant_id).bind(id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)?
            .ok_or(AppError::NotFound("Member not found".into()))
    }
    async fn count_members(&self, tenant_id: &str) -> Result<MemberCounts, AppError> {
        let (total, active) = sqlx::query_as::<_, (i64, i64)>("SELECT COUNT(*), COUNT(*) FILTER (WHERE active) FROM member_profiles WHERE tenant_id = $1 AND role = 'member'")
            .bind(tenant_id).fetch_one(&self.pool).await.map_err(AppError::Database)?;
        Ok(MemberCounts { total, active })
    }
}
