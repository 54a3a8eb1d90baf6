use crate::domain::models::{
    instructor::InstructorRemoval,
    member::MemberProfile,
    tenant::Tenant,
    views::SessionOccupancy,
};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Serialize)]
pub struct TenantCreatedResponse {
    pub tenant: Tenant,
    pub admin: Option<MemberProfile>,
}

#[derive(Serialize)]
pub struct InstructorRemovedResponse {
    pub id: String,
    pub status: InstructorRemoval,
}

#[derive(Serialize)]
pub struct MonthIndicatorsResponse {
    pub month: String,
    /// Session count per day; days without sessions are absent.
    pub days: BTreeMap<NaiveDate, usize>,
}

#[derive(Serialize)]
pub struct MemberDatesResponse {
    pub month: String,
    pub dates: Vec<NaiveDate>,
}

#[derive(Serialize)]
pub struct DayViewResponse {
    pub date: NaiveDate,
    pub sessions: Vec<DaySession>,
}

#[derive(Serialize)]
pub struct DaySession {
    #[serde(flatten)]
    pub session: SessionOccupancy,
    pub full: bool,
}

impl From<SessionOccupancy> for DaySession {
    fn from(session: SessionOccupancy) -> Self {
        let full = session.is_full();
        Self { session, full }
    }
}
