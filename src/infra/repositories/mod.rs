pub mod sqlite_tenant_repo;
pub mod sqlite_member_repo;
pub mod sqlite_instructor_repo;
pub mod sqlite_class_repo;
pub mod sqlite_reservation_repo;

pub mod postgres_tenant_repo;
pub mod postgres_member_repo;
pub mod postgres_instructor_repo;
pub mod postgres_class_repo;
pub mod postgres_reservation_repo;
