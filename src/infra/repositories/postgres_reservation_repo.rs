use crate::domain::models::{
    reservation::Reservation,
    views::{MemberReservation, RecentReservation, SessionReservation},
};
use crate::domain::ports::ReservationRepository;
use crate::domain::services::{booking::{check_reservable, has_started}, lifecycle::ensure_cancellable};
use crate::error::{is_unique_violation, AppError};
use crate::infra::repositories::postgres_class_repo::{count_active_locked, lock_class};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use sqlx::PgPool;
use tracing::debug;

pub struct PostgresReservationRepo {
    pool: PgPool,
}

impl PostgresReservationRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReservationRepository for PostgresReservationRepo {
    async fn reserve(&self, tenant_id: &str, class_id: &str, user_id: &str, now: NaiveDateTime) -> Result<Reservation, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        // Row lock on the class serializes concurrent reservations for the same session.
        let session = lock_class(&mut tx, tenant_id, class_id).await?;

        let already_reserved = count_active_locked(&mut tx, class_id, Some(user_id)).await? > 0;
        let occupancy = count_active_locked(&mut tx, class_id, None).await?;
        debug!(class_id, occupancy, already_reserved, "Checking reservation");
        check_reservable(&session, now, already_reserved, occupancy)?;

        let reservation = Reservation::new(tenant_id.to_string(), class_id.to_string(), user_id.to_string());
        let created = sqlx::query_as::<_, Reservation>("INSERT INTO reservations (id, tenant_id, class_id, user_id, status, created_at) VALUES ($1, $2, $3, $4, $5, $6) RETURNING *")
            .bind(&reservation.id).bind(&reservation.tenant_id).bind(&reservation.class_id).bind(&reservation.user_id).bind(reservation.status.as_str()).bind(reservation.created_at)
            .fetch_one(&mut *tx).await
            .map_err(|e| if is_unique_violation(&e) { AppError::AlreadyReserved } else { AppError::Database(e) })?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(created)
    }

    async fn cancel_for_member(&self, tenant_id: &str, class_id: &str, user_id: &str, now: NaiveDateTime) -> Result<Reservation, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        let session = lock_class(&mut tx, tenant_id, class_id).await?;

        let cancelled = sqlx::query_as::<_, Reservation>("UPDATE reservations SET status = 'cancelled' WHERE tenant_id = $1 AND class_id = $2 AND user_id = $3 AND status = 'active' RETURNING *")
            .bind(tenant_id).bind(class_id).bind(user_id)
            .fetch_optional(&mut *tx).await.map_err(AppError::Database)?
            .ok_or(AppError::NotFound("Reservation not found".into()))?;

        // Dropping the transaction rolls the update back.
        if has_started(&session, now) {
            return Err(AppError::SessionInPast);
        }

        tx.commit().await.map_err(AppError::Database)?;
        Ok(cancelled)
    }

    async fn cancel_by_id(&self, tenant_id: &str, id: &str) -> Result<Reservation, AppError> {
        let cancelled = sqlx::query_as::<_, Reservation>("UPDATE reservations SET status = 'cancelled' WHERE id = $1 AND tenant_id = $2 AND status = 'active' RETURNING *")
            .bind(id).bind(tenant_id).fetch_optional(&self.pool).await.map_err(AppError::Database)?;
        if let Some(reservation) = cancelled {
            return Ok(reservation);
        }

        let existing = self.find_by_id(tenant_id, id).await?.ok_or(AppError::NotFound("Reservation not found".into()))?;
        ensure_cancellable(existing.status)?;
        Err(AppError::Conflict("Reservation changed concurrently".into()))
    }

    async fn find_by_id(&self, tenant_id: &str, id: &str) -> Result<Option<Reservation>, AppError> {
        sqlx::query_as::<_, Reservation>("SELECT * FROM reservations WHERE tenant_id = $1 AND id = $2").bind(tenant_id).bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
    async fn count_active(&self, tenant_id: &str, class_id: &str) -> Result<i64, AppError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM reservations WHERE tenant_id = $1 AND class_id = $2 AND status = 'active'").bind(tenant_id).bind(class_id).fetch_one(&self.pool).await.map_err(AppError::Database)
    }
    async fn list_for_session(&self, tenant_id: &str, class_id: &str) -> Result<Vec<SessionReservation>, AppError> {
        sqlx::query_as::<_, SessionReservation>("SELECT r.*, m.full_name, m.email FROM reservations r LEFT JOIN member_profiles m ON m.id = r.user_id AND m.tenant_id = r.tenant_id WHERE r.tenant_id = $1 AND r.class_id = $2 ORDER BY r.created_at ASC")
            .bind(tenant_id).bind(class_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }
    async fn list_for_member(&self, tenant_id: &str, user_id: &str) -> Result<Vec<MemberReservation>, AppError> {
        sqlx::query_as::<_, MemberReservation>("SELECT r.*, c.title, c.class_date, c.start_time, c.end_time, c.status AS class_status FROM reservations r JOIN classes c ON c.id = r.class_id WHERE r.tenant_id = $1 AND r.user_id = $2 ORDER BY r.created_at DESC")
            .bind(tenant_id).bind(user_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }
    async fn active_dates_for_member(&self, tenant_id: &str, user_id: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<NaiveDate>, AppError> {
        sqlx::query_scalar::<_, NaiveDate>("SELECT DISTINCT c.class_date FROM reservations r JOIN classes c ON c.id = r.class_id WHERE r.tenant_id = $1 AND r.user_id = $2 AND r.status = 'active' AND c.class_date >= $3 AND c.class_date <= $4 ORDER BY c.class_date ASC")
            .bind(tenant_id).bind(user_id).bind(start).bind(end).fetch_all(&self.pool).await.map_err(AppError::Database)
    }
    async fn count_active_on(&self, tenant_id: &str, date: NaiveDate) -> Result<i64, AppError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM reservations r JOIN classes c ON c.id = r.class_id WHERE r.tenant_id = $1 AND r.status = 'active' AND c.class_date = $2")
            .bind(tenant_id).bind(date).fetch_one(&self.pool).await.map_err(AppError::Database)
    }
    async fn list_recent(&self, tenant_id: &str, limit: i64) -> Result<Vec<RecentReservation>, AppError> {
        sqlx::query_as::<_, RecentReservation>("SELECT r.id, r.created_at, m.full_name, c.title, c.class_date FROM reservations r JOIN classes c ON c.id = r.class_id LEFT JOIN member_profiles m ON m.id = r.user_id AND m.tenant_id = r.tenant_id WHERE r.tenant_id = $1 ORDER BY r.created_at DESC LIMIT $2")
            .bind(tenant_id).bind(limit).fetch_all(&self.pool).await.map_err(AppError::Database)
    }
}
