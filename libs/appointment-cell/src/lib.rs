pub mod handlers;
pub mod models;
pub mod router;
pub mod services;
pub mod state;

pub use models::*;
pub use router::{admin_routes, appointment_routes};
pub use state::AppointmentState;
