use chrono::NaiveTime;

use crate::domain::models::class_session::SessionStatus;
use crate::domain::models::reservation::ReservationStatus;
use crate::error::AppError;

/// Session status transitions. Every state can be restored to `active`;
/// a cancelled session cannot go straight to `closed`.
pub fn can_transition(from: SessionStatus, to: SessionStatus) -> bool {
    use SessionStatus::*;
    matches!(
        (from, to),
        (Active, Closed) | (Active, Cancelled) | (Closed, Active) | (Closed, Cancelled) | (Cancelled, Active)
    )
}

pub fn ensure_transition(from: SessionStatus, to: SessionStatus) -> Result<(), AppError> {
    if can_transition(from, to) {
        Ok(())
    } else {
        Err(AppError::InvalidTransition(format!("{} -> {}", from, to)))
    }
}

pub fn ensure_cancellable(status: ReservationStatus) -> Result<(), AppError> {
    match status {
        ReservationStatus::Active => Ok(()),
        ReservationStatus::Cancelled => Err(AppError::InvalidTransition("reservation is already cancelled".into())),
    }
}

pub fn validate_details(title: &str, start: NaiveTime, end: NaiveTime, max_capacity: i32) -> Result<(), AppError> {
    if title.trim().is_empty() {
        return Err(AppError::Validation("Title must not be empty".into()));
    }
    if end <= start {
        return Err(AppError::Validation("End time must be after start time".into()));
    }
    if max_capacity < 1 {
        return Err(AppError::Validation("Capacity must be at least 1".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use SessionStatus::*;

    #[test]
    fn test_transition_table() {
        let allowed = [
            (Active, Closed),
            (Active, Cancelled),
            (Closed, Active),
            (Closed, Cancelled),
            (Cancelled, Active),
        ];
        for from in SessionStatus::ALL {
            for to in SessionStatus::ALL {
                assert_eq!(
                    can_transition(from, to),
                    allowed.contains(&(from, to)),
                    "{} -> {}", from, to
                );
            }
        }
    }

    #[test]
    fn test_same_state_is_rejected() {
        assert!(matches!(ensure_transition(Active, Active), Err(AppError::InvalidTransition(_))));
        assert!(matches!(ensure_transition(Cancelled, Closed), Err(AppError::InvalidTransition(_))));
    }

    #[test]
    fn test_reservation_cancel_once() {
        assert!(ensure_cancellable(ReservationStatus::Active).is_ok());
        assert!(ensure_cancellable(ReservationStatus::Cancelled).is_err());
    }

    #[test]
    fn test_validate_details() {
        let t = |h| NaiveTime::from_hms_opt(h, 0, 0).unwrap();
        assert!(validate_details("Pilates", t(9), t(10), 8).is_ok());
        assert!(validate_details("  ", t(9), t(10), 8).is_err());
        assert!(validate_details("Pilates", t(10), t(10), 8).is_err());
        assert!(validate_details("Pilates", t(9), t(10), 0).is_err());
    }
}
