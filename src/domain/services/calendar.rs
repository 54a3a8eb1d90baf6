use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use crate::domain::models::class_session::ClassSession;
use crate::error::AppError;

/// First and last day of a `YYYY-MM` month.
pub fn month_bounds(month: &str) -> Result<(NaiveDate, NaiveDate), AppError> {
    let first = NaiveDate::parse_from_str(&format!("{}-01", month), "%Y-%m-%d")
        .map_err(|_| AppError::Validation("Invalid month format (YYYY-MM)".into()))?;

    let (next_year, next_month) = if first.month() == 12 {
        (first.year() + 1, 1)
    } else {
        (first.year(), first.month() + 1)
    };
    let last = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .ok_or_else(|| AppError::Validation("Month out of range".into()))?;

    Ok((first, last))
}

/// Number of sessions per calendar day.
pub fn month_indicators(sessions: &[ClassSession]) -> BTreeMap<NaiveDate, usize> {
    let mut counts = BTreeMap::new();
    for session in sessions {
        *counts.entry(session.class_date).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::class_session::NewSessionParams;
    use chrono::NaiveTime;

    fn on(date: NaiveDate) -> ClassSession {
        ClassSession::new(NewSessionParams {
            tenant_id: "t".into(),
            title: "Spin".into(),
            description: None,
            class_date: date,
            start_time: NaiveTime::from_hms_opt(7, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            max_capacity: 5,
            instructor_id: None,
        })
    }

    #[test]
    fn test_month_bounds() {
        let (first, last) = month_bounds("2024-02").unwrap();
        assert_eq!(first, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(last, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());

        let (_, dec_last) = month_bounds("2025-12").unwrap();
        assert_eq!(dec_last, NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());
    }

    #[test]
    fn test_month_bounds_rejects_garbage() {
        assert!(month_bounds("2025-13").is_err());
        assert!(month_bounds("march").is_err());
    }

    #[test]
    fn test_indicators_group_by_day() {
        let d1 = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2025, 3, 5).unwrap();
        let counts = month_indicators(&[on(d1), on(d2), on(d1)]);
        assert_eq!(counts.len(), 2);
        assert_eq!(counts[&d1], 2);
        assert_eq!(counts[&d2], 1);
        assert!(month_indicators(&[]).is_empty());
    }
}
