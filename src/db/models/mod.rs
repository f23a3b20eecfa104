mod appointment;
mod business_date_override;
mod business_hours;
mod service;

pub use appointment::*;
pub use business_date_override::*;
pub use business_hours::*;
pub use service::*;
