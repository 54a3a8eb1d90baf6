use crate::domain::models::{
    class_session::{ClassSession, SessionStatus},
    views::SessionOccupancy,
};
use crate::domain::ports::ClassRepository;
use crate::domain::services::lifecycle::ensure_transition;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::SqlitePool;

const OCCUPANCY_SELECT: &str = "SELECT c.*,
    (SELECT COUNT(*) FROM reservations r WHERE r.class_id = c.id AND r.status = 'active') AS occupancy,
    EXISTS (SELECT 1 FROM reservations r WHERE r.class_id = c.id AND r.user_id = ? AND r.status = 'active') AS reserved_by_me
    FROM classes c";

pub struct SqliteClassRepo {
    pool: SqlitePool,
}

impl SqliteClassRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClassRepository for SqliteClassRepo {
    async fn create(&self, session: &ClassSession) -> Result<ClassSession, AppError> {
        sqlx::query_as::<_, ClassSession>(
            "INSERT INTO classes (id, tenant_id, title, description, class_date, start_time, end_time, max_capacity, instructor_id, status, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *"
        )
            .bind(&session.id).bind(&session.tenant_id).bind(&session.title).bind(&session.description)
            .bind(session.class_date).bind(session.start_time).bind(session.end_time)
            .bind(session.max_capacity).bind(&session.instructor_id).bind(session.status.as_str())
            .bind(session.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_id(&self, tenant_id: &str, id: &str) -> Result<Option<ClassSession>, AppError> {
        sqlx::query_as::<_, ClassSession>("SELECT * FROM classes WHERE tenant_id = ? AND id = ?")
            .bind(tenant_id).bind(id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_with_occupancy(&self, tenant_id: &str) -> Result<Vec<SessionOccupancy>, AppError> {
        sqlx::query_as::<_, SessionOccupancy>(&format!(
            "{} WHERE c.tenant_id = ? ORDER BY c.class_date ASC, c.start_time ASC", OCCUPANCY_SELECT
        ))
            .bind(Option::<&str>::None).bind(tenant_id)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_with_occupancy(&self, tenant_id: &str, id: &str, user_id: Option<&str>) -> Result<Option<SessionOccupancy>, AppError> {
        sqlx::query_as::<_, SessionOccupancy>(&format!("{} WHERE c.tenant_id = ? AND c.id = ?", OCCUPANCY_SELECT))
            .bind(user_id).bind(tenant_id).bind(id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_day(&self, tenant_id: &str, date: NaiveDate, user_id: Option<&str>) -> Result<Vec<SessionOccupancy>, AppError> {
        sqlx::query_as::<_, SessionOccupancy>(&format!(
            "{} WHERE c.tenant_id = ? AND c.class_date = ? ORDER BY c.start_time ASC", OCCUPANCY_SELECT
        ))
            .bind(user_id).bind(tenant_id).bind(date)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_range(&self, tenant_id: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<ClassSession>, AppError> {
        sqlx::query_as::<_, ClassSession>(
            "SELECT * FROM classes WHERE tenant_id = ? AND class_date >= ? AND class_date <= ? ORDER BY class_date ASC, start_time ASC"
        )
            .bind(tenant_id).bind(start).bind(end)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn count_from(&self, tenant_id: &str, from: NaiveDate) -> Result<i64, AppError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM classes WHERE tenant_id = ? AND class_date >= ?")
            .bind(tenant_id).bind(from)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn update(&self, session: &ClassSession) -> Result<ClassSession, AppError> {
        // Capacity guard and write happen in one statement.
        let updated = sqlx::query_as::<_, ClassSession>(
            "UPDATE classes SET title=?, description=?, class_date=?, start_time=?, end_time=?, max_capacity=?, instructor_id=?
             WHERE id=? AND tenant_id=?
               AND (SELECT COUNT(*) FROM reservations r WHERE r.class_id = classes.id AND r.status = 'active') <= ?
             RETURNING *"
        )
            .bind(&session.title).bind(&session.description)
            .bind(session.class_date).bind(session.start_time).bind(session.end_time)
            .bind(session.max_capacity).bind(&session.instructor_id)
            .bind(&session.id).bind(&session.tenant_id)
            .bind(session.max_capacity)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)?;

        match updated {
            Some(s) => Ok(s),
            None => match self.find_by_id(&session.tenant_id, &session.id).await? {
                Some(_) => Err(AppError::Conflict(format!(
                    "Cannot reduce capacity to {}. More active reservations already exist.", session.max_capacity
                ))),
                None => Err(AppError::NotFound("Session not found".into())),
            },
        }
    }

    async fn update_status(&self, tenant_id: &str, id: &str, status: SessionStatus) -> Result<ClassSession, AppError> {
        let current = self.find_by_id(tenant_id, id).await?
            .ok_or(AppError::NotFound("Session not found".into()))?;
        ensure_transition(current.status, status)?;

        sqlx::query_as::<_, ClassSession>(
            "UPDATE classes SET status = ? WHERE id = ? AND tenant_id = ? AND status = ? RETURNING *"
        )
            .bind(status.as_str()).bind(id).bind(tenant_id).bind(current.status.as_str())
            .fetch_optional(&self.pool).await.map_err(AppError::Database)?
            .ok_or(AppError::Conflict("Session status changed concurrently, reload and retry".into()))
    }

    async fn delete(&self, tenant_id: &str, id: &str, cascade: bool) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let result = sqlx::query(
            "DELETE FROM classes WHERE id = ? AND tenant_id = ?
             AND (? OR NOT EXISTS (SELECT 1 FROM reservations r WHERE r.class_id = classes.id AND r.status = 'active'))"
        )
            .bind(id).bind(tenant_id).bind(cascade)
            .execute(&mut *tx).await.map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            let exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM classes WHERE id = ? AND tenant_id = ?")
                .bind(id).bind(tenant_id)
                .fetch_one(&mut *tx).await.map_err(AppError::Database)?;
            if exists == 0 {
                return Err(AppError::NotFound("Session not found".into()));
            }
            return Err(AppError::ReferencedEntity("Session has active reservations; pass cascade=true to delete them".into()));
        }

        tx.commit().await.map_err(AppError::Database)?;
        Ok(())
    }
}
