pub mod appointments;
pub mod business;
