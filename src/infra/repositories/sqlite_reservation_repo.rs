use crate::domain::models::{
    class_session::ClassSession,
    reservation::Reservation,
    views::{MemberReservation, RecentReservation, SessionReservation},
};
use crate::domain::ports::ReservationRepository;
use crate::domain::services::{booking::check_reservable, lifecycle::ensure_cancellable};
use crate::error::{is_unique_violation, AppError};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{debug, warn};

pub struct SqliteReservationRepo {
    pool: SqlitePool,
}

impl SqliteReservationRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

async fn count_active_in(tx: &mut Transaction<'_, Sqlite>, class_id: &str, user_id: Option<&str>) -> Result<i64, AppError> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM reservations WHERE class_id = ? AND status = 'active' AND (? IS NULL OR user_id = ?)"
    )
        .bind(class_id)
        .bind(user_id)
        .bind(user_id)
        .fetch_one(&mut **tx)
        .await
        .map_err(AppError::Database)
}

#[async_trait]
impl ReservationRepository for SqliteReservationRepo {
    async fn reserve(&self, tenant_id: &str, class_id: &str, user_id: &str, now: NaiveDateTime) -> Result<Reservation, AppError> {
        let reservation = Reservation::new(tenant_id.to_string(), class_id.to_string(), user_id.to_string());
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        // The guarded insert is the first statement of the transaction, so SQLite takes the
        // write lock before evaluating any condition and no other writer can interleave.
        let inserted = sqlx::query_as::<_, Reservation>(
            "INSERT INTO reservations (id, tenant_id, class_id, user_id, status, created_at)
             SELECT ?, c.tenant_id, c.id, ?, 'active', ?
             FROM classes c
             WHERE c.id = ? AND c.tenant_id = ? AND c.status = 'active'
               AND (c.class_date > ? OR (c.class_date = ? AND c.start_time >= ?))
               AND NOT EXISTS (SELECT 1 FROM reservations r WHERE r.class_id = c.id AND r.user_id = ? AND r.status = 'active')
               AND (SELECT COUNT(*) FROM reservations r WHERE r.class_id = c.id AND r.status = 'active') < c.max_capacity
             RETURNING *"
        )
            .bind(&reservation.id).bind(user_id).bind(reservation.created_at)
            .bind(class_id).bind(tenant_id)
            .bind(now.date()).bind(now.date()).bind(now.time())
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await;

        let inserted = match inserted {
            Ok(row) => row,
            Err(e) if is_unique_violation(&e) => return Err(AppError::AlreadyReserved),
            Err(e) => return Err(AppError::Database(e)),
        };

        if let Some(created) = inserted {
            tx.commit().await.map_err(AppError::Database)?;
            return Ok(created);
        }

        // Nothing inserted: still holding the write lock, work out which rule refused it.
        let session = sqlx::query_as::<_, ClassSession>("SELECT * FROM classes WHERE id = ? AND tenant_id = ?")
            .bind(class_id).bind(tenant_id)
            .fetch_optional(&mut *tx).await.map_err(AppError::Database)?
            .ok_or(AppError::NotFound("Session not found".into()))?;
        let already_reserved = count_active_in(&mut tx, class_id, Some(user_id)).await? > 0;
        let occupancy = count_active_in(&mut tx, class_id, None).await?;

        debug!(class_id, occupancy, already_reserved, "Reservation refused");
        check_reservable(&session, now, already_reserved, occupancy)?;

        warn!("Guarded insert refused a reservation that passes all checks (class {})", class_id);
        Err(AppError::Conflict("Reservation could not be recorded".into()))
    }

    async fn cancel_for_member(&self, tenant_id: &str, class_id: &str, user_id: &str, now: NaiveDateTime) -> Result<Reservation, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let cancelled = sqlx::query_as::<_, Reservation>(
            "UPDATE reservations SET status = 'cancelled'
             WHERE tenant_id = ? AND class_id = ? AND user_id = ? AND status = 'active'
               AND EXISTS (
                   SELECT 1 FROM classes c WHERE c.id = reservations.class_id
                   AND (c.class_date > ? OR (c.class_date = ? AND c.start_time >= ?))
               )
             RETURNING *"
        )
            .bind(tenant_id).bind(class_id).bind(user_id)
            .bind(now.date()).bind(now.date()).bind(now.time())
            .fetch_optional(&mut *tx).await.map_err(AppError::Database)?;

        if let Some(reservation) = cancelled {
            tx.commit().await.map_err(AppError::Database)?;
            return Ok(reservation);
        }

        let session = sqlx::query_as::<_, ClassSession>("SELECT * FROM classes WHERE id = ? AND tenant_id = ?")
            .bind(class_id).bind(tenant_id)
            .fetch_optional(&mut *tx).await.map_err(AppError::Database)?
            .ok_or(AppError::NotFound("Session not found".into()))?;

        if count_active_in(&mut tx, &session.id, Some(user_id)).await? == 0 {
            return Err(AppError::NotFound("Reservation not found".into()));
        }
        Err(AppError::SessionInPast)
    }

    async fn cancel_by_id(&self, tenant_id: &str, id: &str) -> Result<Reservation, AppError> {
        let cancelled = sqlx::query_as::<_, Reservation>(
            "UPDATE reservations SET status = 'cancelled' WHERE id = ? AND tenant_id = ? AND status = 'active' RETURNING *"
        )
            .bind(id).bind(tenant_id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)?;

        if let Some(reservation) = cancelled {
            return Ok(reservation);
        }

        let existing = self.find_by_id(tenant_id, id).await?
            .ok_or(AppError::NotFound("Reservation not found".into()))?;
        ensure_cancellable(existing.status)?;
        Err(AppError::Conflict("Reservation changed concurrently".into()))
    }

    async fn find_by_id(&self, tenant_id: &str, id: &str) -> Result<Option<Reservation>, AppError> {
        sqlx::query_as::<_, Reservation>("SELECT * FROM reservations WHERE tenant_id = ? AND id = ?")
            .bind(tenant_id).bind(id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn count_active(&self, tenant_id: &str, class_id: &str) -> Result<i64, AppError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM reservations WHERE tenant_id = ? AND class_id = ? AND status = 'active'")
            .bind(tenant_id).bind(class_id)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_for_session(&self, tenant_id: &str, class_id: &str) -> Result<Vec<SessionReservation>, AppError> {
        sqlx::query_as::<_, SessionReservation>(
            "SELECT r.*, m.full_name, m.email
             FROM reservations r
             LEFT JOIN member_profiles m ON m.id = r.user_id AND m.tenant_id = r.tenant_id
             WHERE r.tenant_id = ? AND r.class_id = ?
             ORDER BY r.created_at ASC"
        )
            .bind(tenant_id).bind(class_id)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_for_member(&self, tenant_id: &str, user_id: &str) -> Result<Vec<MemberReservation>, AppError> {
        sqlx::query_as::<_, MemberReservation>(
            "SELECT r.*, c.title, c.class_date, c.start_time, c.end_time, c.status AS class_status
             FROM reservations r
             JOIN classes c ON c.id = r.class_id
             WHERE r.tenant_id = ? AND r.user_id = ?
             ORDER BY r.created_at DESC"
        )
            .bind(tenant_id).bind(user_id)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn active_dates_for_member(&self, tenant_id: &str, user_id: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<NaiveDate>, AppError> {
        sqlx::query_scalar::<_, NaiveDate>(
            "SELECT DISTINCT c.class_date
             FROM reservations r
             JOIN classes c ON c.id = r.class_id
             WHERE r.tenant_id = ? AND r.user_id = ? AND r.status = 'active'
               AND c.class_date >= ? AND c.class_date <= ?
             ORDER BY c.class_date ASC"
        )
            .bind(tenant_id).bind(user_id).bind(start).bind(end)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn count_active_on(&self, tenant_id: &str, date: NaiveDate) -> Result<i64, AppError> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM reservations r JOIN classes c ON c.id = r.class_id
             WHERE r.tenant_id = ? AND r.status = 'active' AND c.class_date = ?"
        )
            .bind(tenant_id).bind(date)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_recent(&self, tenant_id: &str, limit: i64) -> Result<Vec<RecentReservation>, AppError> {
        sqlx::query_as::<_, RecentReservation>(
            "SELECT r.id, r.created_at, m.full_name, c.title, c.class_date
             FROM reservations r
             JOIN classes c ON c.id = r.class_id
             LEFT JOIN member_profiles m ON m.id = r.user_id AND m.tenant_id = r.tenant_id
             WHERE r.tenant_id = ?
             ORDER BY r.created_at DESC
             LIMIT ?"
        )
            .bind(tenant_id).bind(limit)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }
}
