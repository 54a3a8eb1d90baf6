pub mod calendar;
pub mod class_session;
pub mod health;
pub mod instructor;
pub mod member;
pub mod overview;
pub mod reservation;
pub mod tenant;
