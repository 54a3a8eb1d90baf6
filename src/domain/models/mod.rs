pub mod auth;
pub mod class_session;
pub mod instructor;
pub mod member;
pub mod reservation;
pub mod tenant;
pub mod views;
