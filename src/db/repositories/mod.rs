mod appointment_repository;
mod business_hours_repository;
mod date_override_repository;
mod service_repository;

pub use appointment_repository::AppointmentRepository;
pub use business_hours_repository::BusinessHoursRepository;
pub use date_override_repository::DateOverrideRepository;
pub use service_repository::ServiceRepository;
