use serde::Serialize;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::FromRow;

use super::class_session::{ClassSession, SessionStatus};
use super::reservation::Reservation;

/// A session together with its derived occupancy.
#[derive(Debug, Serialize, FromRow, Clone)]
pub struct SessionOccupancy {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub session: ClassSession,
    pub occupancy: i64,
    /// Whether the requesting member holds an active reservation.
    pub reserved_by_me: bool,
}

impl SessionOccupancy {
    pub fn is_full(&self) -> bool {
        self.occupancy >= i64::from(self.session.max_capacity)
    }
}

#[derive(Debug, Serialize, FromRow, Clone)]
pub struct SessionReservation {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub reservation: Reservation,
    pub full_name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Serialize, FromRow, Clone)]
pub struct MemberReservation {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub reservation: Reservation,
    pub title: String,
    pub class_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    #[sqlx(try_from = "String")]
    pub class_status: SessionStatus,
}

#[derive(Debug, Serialize, FromRow, Clone)]
pub struct RecentReservation {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub full_name: Option<String>,
    pub title: String,
    pub class_date: NaiveDate,
}

#[derive(Debug, Serialize, Clone)]
pub struct Overview {
    pub total_members: i64,
    pub active_members: i64,
    pub scheduled_classes: i64,
    pub today_reservations: i64,
    pub recent_reservations: Vec<RecentReservation>,
}
