use std::sync::Arc;
use crate::domain::ports::{
    TenantRepository, MemberRepository, InstructorRepository, ClassRepository, ReservationRepository,
};
use crate::domain::services::auth_service::AuthService;
use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub tenant_repo: Arc<dyn TenantRepository>,
    pub member_repo: Arc<dyn MemberRepository>,
    pub instructor_repo: Arc<dyn InstructorRepository>,
    pub class_repo: Arc<dyn ClassRepository>,
    pub reservation_repo: Arc<dyn ReservationRepository>,
    pub auth_service: Arc<AuthService>,
}
