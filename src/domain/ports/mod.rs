use crate::domain::models::{
    tenant::Tenant,
    member::{MemberCounts, MemberProfile},
    instructor::{Instructor, InstructorRemoval},
    class_session::{ClassSession, SessionStatus},
    reservation::Reservation,
    views::{MemberReservation, RecentReservation, SessionOccupancy, SessionReservation},
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};

#[async_trait]
pub trait TenantRepository: Send + Sync {
    async fn create(&self, tenant: &Tenant) -> Result<Tenant, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Tenant>, AppError>;
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tenant>, AppError>;
}

#[async_trait]
pub trait MemberRepository: Send + Sync {
    async fn create(&self, member: &MemberProfile) -> Result<MemberProfile, AppError>;
    async fn find_by_id(&self, tenant_id: &str, id: &str) -> Result<Option<MemberProfile>, AppError>;
    async fn list_by_tenant(&self, tenant_id: &str) -> Result<Vec<MemberProfile>, AppError>;
    async fn set_active(&self, tenant_id: &str, id: &str, active: bool) -> Result<MemberProfile, AppError>;
    /// Counts profiles with the `member` role.
    async fn count_members(&self, tenant_id: &str) -> Result<MemberCounts, AppError>;
}

#[async_trait]
pub trait InstructorRepository: Send + Sync {
    async fn create(&self, instructor: &Instructor) -> Result<Instructor, AppError>;
    async fn find_by_id(&self, tenant_id: &str, id: &str) -> Result<Option<Instructor>, AppError>;
    async fn list_by_tenant(&self, tenant_id: &str) -> Result<Vec<Instructor>, AppError>;
    async fn update(&self, instructor: &Instructor) -> Result<Instructor, AppError>;
    /// Hard delete when unreferenced, otherwise deactivate.
    async fn remove(&self, tenant_id: &str, id: &str) -> Result<InstructorRemoval, AppError>;
}

#[async_trait]
pub trait ClassRepository: Send + Sync {
    async fn create(&self, session: &ClassSession) -> Result<ClassSession, AppError>;
    async fn find_by_id(&self, tenant_id: &str, id: &str) -> Result<Option<ClassSession>, AppError>;
    async fn list_with_occupancy(&self, tenant_id: &str) -> Result<Vec<SessionOccupancy>, AppError>;
    async fn find_with_occupancy(&self, tenant_id: &str, id: &str, user_id: Option<&str>) -> Result<Option<SessionOccupancy>, AppError>;
    async fn list_day(&self, tenant_id: &str, date: NaiveDate, user_id: Option<&str>) -> Result<Vec<SessionOccupancy>, AppError>;
    async fn list_by_range(&self, tenant_id: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<ClassSession>, AppError>;
    async fn count_from(&self, tenant_id: &str, from: NaiveDate) -> Result<i64, AppError>;
    /// Updates details; fails with `Conflict` if the new capacity is below occupancy.
    async fn update(&self, session: &ClassSession) -> Result<ClassSession, AppError>;
    /// Compare-and-set status change, validated against the lifecycle table.
    async fn update_status(&self, tenant_id: &str, id: &str, status: SessionStatus) -> Result<ClassSession, AppError>;
    async fn delete(&self, tenant_id: &str, id: &str, cascade: bool) -> Result<(), AppError>;
}

#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// Atomically checks bookability, duplicates and capacity, then inserts.
    async fn reserve(&self, tenant_id: &str, class_id: &str, user_id: &str, now: NaiveDateTime) -> Result<Reservation, AppError>;
    async fn cancel_for_member(&self, tenant_id: &str, class_id: &str, user_id: &str, now: NaiveDateTime) -> Result<Reservation, AppError>;
    async fn cancel_by_id(&self, tenant_id: &str, id: &str) -> Result<Reservation, AppError>;
    async fn find_by_id(&self, tenant_id: &str, id: &str) -> Result<Option<Reservation>, AppError>;
    async fn count_active(&self, tenant_id: &str, class_id: &str) -> Result<i64, AppError>;
    async fn list_for_session(&self, tenant_id: &str, class_id: &str) -> Result<Vec<SessionReservation>, AppError>;
    async fn list_for_member(&self, tenant_id: &str, user_id: &str) -> Result<Vec<MemberReservation>, AppError>;
    async fn active_dates_for_member(&self, tenant_id: &str, user_id: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<NaiveDate>, AppError>;
    async fn count_active_on(&self, tenant_id: &str, date: NaiveDate) -> Result<i64, AppError>;
    async fn list_recent(&self, tenant_id: &str, limit: i64) -> Result<Vec<RecentReservation>, AppError>;
}
