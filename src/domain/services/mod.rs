pub mod auth_service;
pub mod booking;
pub mod calendar;
pub mod lifecycle;
