use chrono::{NaiveDateTime, Timelike, Utc};
use chrono_tz::Tz;

use crate::domain::models::class_session::{ClassSession, SessionStatus};
use crate::error::AppError;

/// Current wall-clock time in the studio's zone, truncated to whole seconds.
pub fn local_now(timezone: &str) -> NaiveDateTime {
    let tz: Tz = timezone.parse().unwrap_or(chrono_tz::UTC);
    let now = Utc::now().with_timezone(&tz).naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

pub fn session_start(session: &ClassSession) -> NaiveDateTime {
    session.class_date.and_time(session.start_time)
}

pub fn has_started(session: &ClassSession, now: NaiveDateTime) -> bool {
    session_start(session) < now
}

/// Decides whether a member may take a seat, given state read under the session lock.
///
/// Checks run in a fixed order so the reported error is deterministic: status,
/// start time, duplicate reservation, capacity.
pub fn check_reservable(
    session: &ClassSession,
    now: NaiveDateTime,
    already_reserved: bool,
    occupancy: i64,
) -> Result<(), AppError> {
    if session.status != SessionStatus::Active {
        return Err(AppError::SessionNotBookable);
    }
    if has_started(session, now) {
        return Err(AppError::SessionInPast);
    }
    if already_reserved {
        return Err(AppError::AlreadyReserved);
    }
    if occupancy >= i64::from(session.max_capacity) {
        return Err(AppError::SessionFull);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::class_session::NewSessionParams;
    use chrono::{NaiveDate, NaiveTime};

    fn session(status: SessionStatus, capacity: i32) -> ClassSession {
        let mut s = ClassSession::new(NewSessionParams {
            tenant_id: "t1".into(),
            title: "Yoga".into(),
            description: None,
            class_date: NaiveDate::from_ymd_opt(2030, 5, 10).unwrap(),
            start_time: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(19, 0, 0).unwrap(),
            max_capacity: capacity,
            instructor_id: None,
        });
        s.status = status;
        s
    }

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2030, 5, 10).unwrap().and_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_open_session_with_room_is_reservable() {
        assert!(check_reservable(&session(SessionStatus::Active, 2), at(9, 0), false, 1).is_ok());
    }

    #[test]
    fn test_closed_and_cancelled_sessions_are_not_bookable() {
        for status in [SessionStatus::Closed, SessionStatus::Cancelled] {
            let res = check_reservable(&session(status, 10), at(9, 0), false, 0);
            assert!(matches!(res, Err(AppError::SessionNotBookable)));
        }
    }

    #[test]
    fn test_status_is_checked_before_start_time() {
        let res = check_reservable(&session(SessionStatus::Closed, 10), at(20, 0), false, 0);
        assert!(matches!(res, Err(AppError::SessionNotBookable)));
    }

    #[test]
    fn test_started_session_is_in_past() {
        let res = check_reservable(&session(SessionStatus::Active, 10), at(18, 1), false, 0);
        assert!(matches!(res, Err(AppError::SessionInPast)));

        // Exactly at start time is still bookable
        assert!(check_reservable(&session(SessionStatus::Active, 10), at(18, 0), false, 0).is_ok());
    }

    #[test]
    fn test_duplicate_wins_over_full() {
        let res = check_reservable(&session(SessionStatus::Active, 1), at(9, 0), true, 1);
        assert!(matches!(res, Err(AppError::AlreadyReserved)));
    }

    #[test]
    fn test_full_session() {
        let res = check_reservable(&session(SessionStatus::Active, 2), at(9, 0), false, 2);
        assert!(matches!(res, Err(AppError::SessionFull)));
    }

    #[test]
    fn test_local_now_falls_back_to_utc() {
        let now = local_now("Not/AZone");
        let utc = Utc::now().naive_utc();
        assert!((utc - now).num_seconds().abs() < 5);
        assert_eq!(now.nanosecond(), 0);
    }
}
