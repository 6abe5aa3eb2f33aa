// libs/appointment-cell/src/router.rs
use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, patch, post},
    Router,
};

use shared_utils::extractor::admin_middleware;

use crate::handlers;
use crate::state::AppointmentState;

/// Public booking wizard routes.
pub fn appointment_routes(state: Arc<AppointmentState>) -> Router {
    Router::new()
        .route("/", post(handlers::create_appointment))
        .route("/availability", get(handlers::get_availability))
        .with_state(state)
}

/// Appointment management, gated by the admin password.
pub fn admin_routes(state: Arc<AppointmentState>) -> Router {
    let config = Arc::clone(&state.config);

    Router::new()
        .route("/appointments", get(handlers::list_appointments))
        .route("/appointments/stats", get(handlers::get_appointment_stats))
        .route("/appointments/export", get(handlers::export_appointments))
        .route("/appointments/{appointment_id}", delete(handlers::delete_appointment))
        .route("/appointments/{appointment_id}/authorize", post(handlers::authorize_appointment))
        .route("/appointments/{appointment_id}/cancel", post(handlers::cancel_appointment))
        .route("/appointments/{appointment_id}/reactivate", post(handlers::reactivate_appointment))
        .route("/appointments/{appointment_id}/reschedule", patch(handlers::reschedule_appointment))
        .route("/integrity", get(handlers::check_day_integrity))
        .layer(middleware::from_fn_with_state(config, admin_middleware))
        .with_state(state)
}
