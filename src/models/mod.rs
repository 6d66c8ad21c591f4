pub mod event;
pub mod receipt;
pub mod scooter;
