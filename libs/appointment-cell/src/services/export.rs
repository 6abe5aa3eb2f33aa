// libs/appointment-cell/src/services/export.rs
use chrono::NaiveDate;
use csv::Writer;
use tracing::debug;

use procedure_cell::services::format_duration;
use scheduling_cell::models::Booking;

use crate::models::AppointmentError;

const HEADERS: [&str; 8] = [
    "Fecha",
    "Hora",
    "Paciente",
    "Email",
    "Teléfono",
    "Procedimientos",
    "Duración",
    "Estado",
];

pub fn export_file_name(today: NaiveDate) -> String {
    format!("citas_{}.csv", today.format("%Y-%m-%d"))
}

/// One row per booking, in the order given.
pub fn bookings_to_csv(bookings: &[Booking]) -> Result<Vec<u8>, AppointmentError> {
    let mut writer = Writer::from_writer(Vec::new());

    writer
        .write_record(HEADERS)
        .map_err(|e| AppointmentError::Export(e.to_string()))?;

    for booking in bookings {
        writer
            .write_record([
                booking.scheduled_start.format("%d/%m/%Y").to_string(),
                booking.scheduled_start.format("%H:%M").to_string(),
                booking.patient.name.clone(),
                booking.patient.email.clone(),
                booking.patient.phone.clone(),
                booking.procedure_names().join("; "),
                format_duration(booking.total_duration_minutes),
                booking.status.to_string(),
            ])
            .map_err(|e| AppointmentError::Export(e.to_string()))?;
    }

    debug!("Exported {} bookings to CSV", bookings.len());
    writer
        .into_inner()
        .map_err(|e| AppointmentError::Export(e.to_string()))
}
