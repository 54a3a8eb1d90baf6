use crate::domain::models::{
    class_session::{ClassSession, SessionStatus},
    views::SessionOccupancy,
};
use crate::domain::ports::ClassRepository;
use crate::domain::services::lifecycle::ensure_transition;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgPool, Postgres, Transaction};

const OCCUPANCY_SELECT: &str = "SELECT c.*,
    (SELECT COUNT(*) FROM reservations r WHERE r.class_id = c.id AND r.status = 'active') AS occupancy,
    EXISTS (SELECT 1 FROM reservations r WHERE r.class_id = c.id AND r.user_id = $1 AND r.status = 'active') AS reserved_by_me
    FROM classes c";

pub struct PostgresClassRepo {
    pool: PgPool,
}

impl PostgresClassRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Locks the class row; every writer touching occupancy goes through this first.
pub(crate) async fn lock_class(tx: &mut Transaction<'_, Postgres>, tenant_id: &str, id: &str) -> Result<ClassSession, AppError> {
    sqlx::query_as::<_, ClassSession>("SELECT * FROM classes WHERE id = $1 AND tenant_id = $2 FOR UPDATE")
        .bind(id).bind(tenant_id)
        .fetch_optional(&mut **tx).await.map_err(AppError::Database)?
        .ok_or(AppError::NotFound("Session not found".into()))
}

pub(crate) async fn count_active_locked(tx: &mut Transaction<'_, Postgres>, class_id: &str, user_id: Option<&str>) -> Result<i64, AppError> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM reservations WHERE class_id = $1 AND status = 'active' AND ($2::TEXT IS NULL OR user_id = $2)")
        .bind(class_id).bind(user_id)
        .fetch_one(&mut **tx).await.map_err(AppError::Database)
}

#[async_trait]
impl ClassRepository for PostgresClassRepo {
    async fn create(&self, session: &ClassSession) -> Result<ClassSession, AppError> {
        sqlx::query_as::<_, ClassSession>("INSERT INTO classes (id, tenant_id, title, description, class_date, start_time, end_time, max_capacity, instructor_id, status, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) RETURNING *")
            .bind(&session.id).bind(&session.tenant_id).bind(&session.title).bind(&session.description).bind(session.class_date).bind(session.start_time).bind(session.end_time).bind(session.max_capacity).bind(&session.instructor_id).bind(session.status.as_str()).bind(session.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }
    async fn find_by_id(&self, tenant_id: &str, id: &str) -> Result<Option<ClassSession>, AppError> {
        sqlx::query_as::<_, ClassSession>("SELECT * FROM classes WHERE tenant_id = $1 AND id = $2").bind(tenant_id).bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
    async fn list_with_occupancy(&self, tenant_id: &str) -> Result<Vec<SessionOccupancy>, AppError> {
        sqlx::query_as::<_, SessionOccupancy>(&format!("{} WHERE c.tenant_id = $2 ORDER BY c.class_date ASC, c.start_time ASC", OCCUPANCY_SELECT))
            .bind(Option::<&str>::None).bind(tenant_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }
    async fn find_with_occupancy(&self, tenant_id: &str, id: &str, user_id: Option<&str>) -> Result<Option<SessionOccupancy>, AppError> {
        sqlx::query_as::<_, SessionOccupancy>(&format!("{} WHERE c.tenant_id = $2 AND c.id = $3", OCCUPANCY_SELECT))
            .bind(user_id).bind(tenant_id).bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
    async fn list_day(&self, tenant_id: &str, date: NaiveDate, user_id: Option<&str>) -> Result<Vec<SessionOccupancy>, AppError> {
        sqlx::query_as::<_, SessionOccupancy>(&format!("{} WHERE c.tenant_id = $2 AND c.class_date = $3 ORDER BY c.start_time ASC", OCCUPANCY_SELECT))
            .bind(user_id).bind(tenant_id).bind(date).fetch_all(&self.pool).await.map_err(AppError::Database)
    }
    async fn list_by_range(&self, tenant_id: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<ClassSession>, AppError> {
        sqlx::query_as::<_, ClassSession>("SELECT * FROM classes WHERE tenant_id = $1 AND class_date >= $2 AND class_date <= $3 ORDER BY class_date ASC, start_time ASC")
            .bind(tenant_id).bind(start).bind(end).fetch_all(&self.pool).await.map_err(AppError::Database)
    }
    async fn count_from(&self, tenant_id: &str, from: NaiveDate) -> Result<i64, AppError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM classes WHERE tenant_id = $1 AND class_date >= $2").bind(tenant_id).bind(from).fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn update(&self, session: &ClassSession) -> Result<ClassSession, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        lock_class(&mut tx, &session.tenant_id, &session.id).await?;

        let occupancy = count_active_locked(&mut tx, &session.id, None).await?;
        if occupancy > i64::from(session.max_capacity) {
            return Err(AppError::Conflict(format!(
                "Cannot reduce capacity to {}. {} active reservations already exist.", session.max_capacity, occupancy
            )));
        }

        let updated = sqlx::query_as::<_, ClassSession>("UPDATE classes SET title=$1, description=$2, class_date=$3, start_time=$4, end_time=$5, max_capacity=$6, instructor_id=$7 WHERE id=$8 AND tenant_id=$9 RETURNING *")
            .bind(&session.title).bind(&session.description).bind(session.class_date).bind(session.start_time).bind(session.end_time).bind(session.max_capacity).bind(&session.instructor_id).bind(&session.id).bind(&session.tenant_id)
            .fetch_one(&mut *tx).await.map_err(AppError::Database)?;
        tx.commit().await.map_err(AppError::Database)?;
        Ok(updated)
    }

    async fn update_status(&self, tenant_id: &str, id: &str, status: SessionStatus) -> Result<ClassSession, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        let current = lock_class(&mut tx, tenant_id, id).await?;
        ensure_transition(current.status, status)?;

        let updated = sqlx::query_as::<_, ClassSession>("UPDATE classes SET status = $1 WHERE id = $2 AND tenant_id = $3 RETURNING *")
            .bind(status.as_str()).bind(id).bind(tenant_id)
            .fetch_one(&mut *tx).await.map_err(AppError::Database)?;
        tx.commit().await.map_err(AppError::Database)?;
        Ok(updated)
    }

    async fn delete(&self, tenant_id: &str, id: &str, cascade: bool) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        lock_class(&mut tx, tenant_id, id).await?;

        if !cascade && count_active_locked(&mut tx, id, None).await? > 0 {
            return Err(AppError::ReferencedEntity("Session has active reservations; pass cascade=true to delete them".into()));
        }

        sqlx::query("DELETE FROM classes WHERE id = $1 AND tenant_id = $2").bind(id).bind(tenant_id).execute(&mut *tx).await.map_err(AppError::Database)?;
        tx.commit().await.map_err(AppError::Database)?;
        Ok(())
    }
}
