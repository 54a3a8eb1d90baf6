use crate::error::AppError;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A studio. Every other record is scoped to one.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Tenant {
    pub id: String,
    pub name: String,
    pub slug: String,
    /// IANA zone name; class dates and times are wall-clock values in this zone.
    pub timezone: String,
    pub created_at: DateTime<Utc>,
}

impl Tenant {
    /// Builds a tenant after checking the slug shape and the zone name. Defaults to UTC.
    pub fn new(name: String, slug: String, timezone: Option<String>) -> Result<Self, AppError> {
        let name = name.trim().to_string();
        let slug = slug.trim().to_lowercase();
        if name.is_empty() || slug.is_empty() {
            return Err(AppError::Validation("Name and slug are required".into()));
        }
        if !slug.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(AppError::Validation("Slug may only contain letters, digits and '-'".into()));
        }

        let timezone = timezone.unwrap_or_else(|| "UTC".to_string());
        if timezone.parse::<Tz>().is_err() {
            return Err(AppError::Validation(format!("Unknown timezone '{}'", timezone)));
        }

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            name,
            slug,
            timezone,
            created_at: Utc::now(),
        })
    }
}
