use crate::domain::models::{class_session::SessionStatus, member::Role};
use chrono::NaiveDate;
use serde::Deserialize;

#[derive(Deserialize)]
pub struct CreateTenantRequest {
    pub name: String,
    pub slug: String,
    pub timezone: Option<String>,
    /// First admin profile, keyed by the identity provider subject.
    pub admin: Option<TenantAdminRequest>,
}

#[derive(Deserialize)]
pub struct TenantAdminRequest {
    pub id: String,
    pub full_name: String,
    pub email: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateMemberRequest {
    pub id: String,
    pub full_name: String,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub start_date: Option<NaiveDate>,
}

#[derive(Deserialize)]
pub struct SetMemberActiveRequest {
    pub active: bool,
}

#[derive(Deserialize)]
pub struct CreateInstructorRequest {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateInstructorRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub active: Option<bool>,
}

#[derive(Deserialize)]
pub struct CreateSessionRequest {
    pub title: String,
    pub description: Option<String>,
    pub class_date: String,
    pub start_time: String,
    pub end_time: String,
    pub max_capacity: i32,
    pub instructor_id: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateSessionRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub class_date: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub max_capacity: Option<i32>,
    /// Empty string clears the instructor.
    pub instructor_id: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateSessionStatusRequest {
    pub status: SessionStatus,
}

#[derive(Deserialize)]
pub struct DeleteSessionQuery {
    #[serde(default)]
    pub cascade: bool,
}

#[derive(Deserialize)]
pub struct DayQuery {
    pub date: String,
}

#[derive(Deserialize)]
pub struct MonthQuery {
    pub month: String,
}
