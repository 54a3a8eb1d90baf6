use crate::domain::{models::instructor::{Instructor, InstructorRemoval}, ports::InstructorRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;

pub struct PostgresInstructorRepo {
    pool: PgPool,
}

impl PostgresInstructorRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InstructorRepository for PostgresInstructorRepo {
    async fn create(&self, instructor: &Instructor) -> Result<Instructor, AppError> {
        sqlx::query_as::<_, Instructor>("INSERT INTO instructors (id, tenant_id, name, email, phone, active, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *")
            .bind(&instructor.id).bind(&instructor.tenant_id).bind(&instructor.name).bind(&instructor.email).bind(&instructor.phone).bind(instructor.active).bind(instructor.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }
    async fn find_by_id(&self, tenant_id: &str, id: &str) -> Result<Option<Instructor>, AppError> {
        sqlx::query_as::<_, Instructor>("SELECT * FROM instructors WHERE tenant_id = $1 AND id = $2").bind(tenant_id).bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
    async fn list_by_tenant(&self, tenant_id: &str) -> Result<Vec<Instructor>, AppError> {
        sqlx::query_as::<_, Instructor>("SELECT * FROM instructors WHERE tenant_id = $1 ORDER BY name ASC").bind(tenant_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }
    async fn update(&self, instructor: &Instructor) -> Result<Instructor, AppError> {
        sqlx::query_as::<_, Instructor>("UPDATE instructors SET name=$1, email=$2, phone=$3, active=$4 WHERE id=$5 AND tenant_id=$6 RETURNING *")
            .bind(&instructor.name).bind(&instructor.email).bind(&instructor.phone).bind(instructor.active).bind(&instructor.id).bind(&instructor.tenant_id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)?
            .ok_or(AppError::NotFound("Instructor not found".into()))
    }
    async fn remove(&self, tenant_id: &str, id: &str) -> Result<InstructorRemoval, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        let locked = sqlx::query_scalar::<_, String>("SELECT id FROM instructors WHERE id = $1 AND tenant_id = $2 FOR UPDATE").bind(id).bind(tenant_id).fetch_optional(&mut *tx).await.map_err(AppError::Database)?;
        if locked.is_none() { return Err(AppError::NotFound("Instructor not found".into())); }

        let referenced: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM classes WHERE instructor_id = $1)").bind(id).fetch_one(&mut *tx).await.map_err(AppError::Database)?;
        let outcome = if referenced {
            sqlx::query("UPDATE instructors SET active = FALSE WHERE id = $1 AND tenant_id = $2").bind(id).bind(tenant_id).execute(&mut *tx).await.map_err(AppError::Database)?;
            info!("Instructor {} still referenced by sessions, deactivated instead", id);
            InstructorRemoval::Deactivated
        } else {
            sqlx::query("DELETE FROM instructors WHERE id = $1 AND tenant_id = $2").bind(id).bind(tenant_id).execute(&mut *tx).await.map_err(AppError::Database)?;
            InstructorRemoval::Deleted
        };
        tx.commit().await.map_err(AppError::Database)?;
        Ok(outcome)
    }
}
