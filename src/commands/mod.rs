pub mod dashboard;
pub mod notifications;
pub mod tracking;
