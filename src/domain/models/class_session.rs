use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;
use std::fmt;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Closed,
    Cancelled,
}

impl SessionStatus {
    pub const ALL: [SessionStatus; 3] = [SessionStatus::Active, SessionStatus::Closed, SessionStatus::Cancelled];

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Active => "active",
            SessionStatus::Closed => "closed",
            SessionStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for SessionStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "active" => Ok(SessionStatus::Active),
            "closed" => Ok(SessionStatus::Closed),
            "cancelled" => Ok(SessionStatus::Cancelled),
            other => Err(format!("unknown session status '{}'", other)),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct ClassSession {
    pub id: String,
    pub tenant_id: String,
    pub title: String,
    pub description: Option<String>,
    pub class_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub max_capacity: i32,
    pub instructor_id: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
}

pub struct NewSessionParams {
    pub tenant_id: String,
    pub title: String,
    pub description: Option<String>,
    pub class_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub max_capacity: i32,
    pub instructor_id: Option<String>,
}

impl ClassSession {
    pub fn new(params: NewSessionParams) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            tenant_id: params.tenant_id,
            title: params.title,
            description: params.description,
            class_date: params.class_date,
            start_time: params.start_time,
            end_time: params.end_time,
            max_capacity: params.max_capacity,
            instructor_id: params.instructor_id,
            status: SessionStatus::Active,
            created_at: Utc::now(),
        }
    }
}
