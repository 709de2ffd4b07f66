pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{
    Appointment, AppointmentError, AppointmentSearchQuery, AppointmentStatus, AppointmentType,
    BookAppointmentRequest, Medication, Prescription, SearchPage,
};
pub use services::booking::BookingCoordinator;
pub use services::events::{AppointmentEvent, AppointmentEvents};
pub use services::ledger::AppointmentLedger;
