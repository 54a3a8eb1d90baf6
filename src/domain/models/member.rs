use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use std::fmt;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Member,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Member => "member",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Role {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "member" => Ok(Role::Member),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct MemberProfile {
    /// Identity provider subject.
    pub id: String,
    pub tenant_id: String,
    pub full_name: String,
    pub email: Option<String>,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub active: bool,
    pub start_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

pub struct NewMemberParams {
    pub id: String,
    pub tenant_id: String,
    pub full_name: String,
    pub email: Option<String>,
    pub role: Role,
    pub start_date: NaiveDate,
}

impl MemberProfile {
    pub fn new(params: NewMemberParams) -> Self {
        Self {
            id: params.id,
            tenant_id: params.tenant_id,
            full_name: params.full_name,
            email: params.email,
            role: params.role,
            active: true,
            start_date: params.start_date,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct MemberCounts {
    pub total: i64,
    pub active: i64,
}
