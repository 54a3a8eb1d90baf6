use crate::domain::{models::instructor::{Instructor, InstructorRemoval}, ports::InstructorRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::info;

pub struct SqliteInstructorRepo {
    pool: SqlitePool,
}

impl SqliteInstructorRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InstructorRepository for SqliteInstructorRepo {
    async fn create(&self, instructor: &Instructor) -> Result<Instructor, AppError> {
        sqlx::query_as::<_, Instructor>(
            "INSERT INTO instructors (id, tenant_id, name, email, phone, active, created_at) VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING *"
        )
            .bind(&instructor.id).bind(&instructor.tenant_id).bind(&instructor.name)
            .bind(&instructor.email).bind(&instructor.phone).bind(instructor.active)
            .bind(instructor.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_id(&self, tenant_id: &str, id: &str) -> Result<Option<Instructor>, AppError> {
        sqlx::query_as::<_, Instructor>("SELECT * FROM instructors WHERE tenant_id = ? AND id = ?")
            .bind(tenant_id).bind(id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_tenant(&self, tenant_id: &str) -> Result<Vec<Instructor>, AppError> {
        sqlx::query_as::<_, Instructor>("SELECT * FROM instructors WHERE tenant_id = ? ORDER BY name ASC")
            .bind(tenant_id)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn update(&self, instructor: &Instructor) -> Result<Instructor, AppError> {
        sqlx::query_as::<_, Instructor>(
            "UPDATE instructors SET name=?, email=?, phone=?, active=? WHERE id=? AND tenant_id=? RETURNING *"
        )
            .bind(&instructor.name).bind(&instructor.email).bind(&instructor.phone).bind(instructor.active)
            .bind(&instructor.id).bind(&instructor.tenant_id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)?
            .ok_or(AppError::NotFound("Instructor not found".into()))
    }

    async fn remove(&self, tenant_id: &str, id: &str) -> Result<InstructorRemoval, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let deleted = sqlx::query(
            "DELETE FROM instructors WHERE id = ? AND tenant_id = ?
             AND NOT EXISTS (SELECT 1 FROM classes c WHERE c.instructor_id = instructors.id)"
        )
            .bind(id).bind(tenant_id)
            .execute(&mut *tx).await.map_err(AppError::Database)?;

        let outcome = if deleted.rows_affected() > 0 {
            InstructorRemoval::Deleted
        } else {
            let deactivated = sqlx::query("UPDATE instructors SET active = ? WHERE id = ? AND tenant_id = ?")
                .bind(false).bind(id).bind(tenant_id)
                .execute(&mut *tx).await.map_err(AppError::Database)?;
            if deactivated.rows_affected() == 0 {
                return Err(AppError::NotFound("Instructor not found".into()));
            }
            info!("Instructor {} still referenced by sessions, deactivated instead", id);
            InstructorRemoval::Deactivated
        };

        tx.commit().await.map_err(AppError::Database)?;
        Ok(outcome)
    }
}
