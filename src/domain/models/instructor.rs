use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Instructor {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Instructor {
    pub fn new(tenant_id: String, name: String, email: Option<String>, phone: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            tenant_id,
            name,
            email,
            phone,
            active: true,
            created_at: Utc::now(),
        }
    }
}

/// What happened to an instructor on delete.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InstructorRemoval {
    Deleted,
    /// Still referenced by sessions, so only marked inactive.
    Deactivated,
}
