// libs/appointment-cell/src/services/notification.rs
use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use procedure_cell::services::format_duration;
use scheduling_cell::models::Booking;
use shared_config::AppConfig;

const SEND_PATH: &str = "/api/v1.0/email/send";

const MONTHS: [&str; 12] = [
    "enero", "febrero", "marzo", "abril", "mayo", "junio",
    "julio", "agosto", "septiembre", "octubre", "noviembre", "diciembre",
];

/// Booking confirmation e-mails through the EmailJS REST API. Delivery is
/// best-effort: failures are logged and reported as `false`.
pub struct NotificationService {
    client: Client,
    base_url: String,
    service_id: String,
    template_id: String,
    public_key: String,
    enabled: bool,
}

impl NotificationService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.emailjs_base_url.clone(),
            service_id: config.emailjs_service_id.clone(),
            template_id: config.emailjs_template_id.clone(),
            public_key: config.emailjs_public_key.clone(),
            enabled: config.is_email_configured(),
        }
    }

    pub async fn send_confirmation(&self, booking: &Booking) -> bool {
        if !self.enabled {
            debug!("E-mail not configured, skipping confirmation for {}", booking.id);
            return false;
        }

        let payload = json!({
            "service_id": self.service_id,
            "template_id": self.template_id,
            "user_id": self.public_key,
            "template_params": Self::template_params(booking),
        });

        let url = format!("{}{}", self.base_url, SEND_PATH);
        match self.client.post(&url).json(&payload).send().await {
            Ok(response) if response.status().is_success() => {
                info!("Confirmation e-mail sent for booking {}", booking.id);
                true
            }
            Ok(response) => {
                warn!("E-mail gateway rejected confirmation for {}: {}", booking.id, response.status());
                false
            }
            Err(e) => {
                warn!("Error sending confirmation e-mail for {}: {}", booking.id, e);
                false
            }
        }
    }

    pub fn template_params(booking: &Booking) -> Value {
        json!({
            "to_name": booking.patient.name,
            "to_email": booking.patient.email,
            "surgery_name": booking.procedure_names().join(", "),
            "appointment_date": long_date(booking.scheduled_start),
            "appointment_time": short_time(booking.scheduled_start),
            "duration": format_duration(booking.total_duration_minutes),
        })
    }
}

fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "lunes",
        Weekday::Tue => "martes",
        Weekday::Wed => "miércoles",
        Weekday::Thu => "jueves",
        Weekday::Fri => "viernes",
        Weekday::Sat => "sábado",
        Weekday::Sun => "domingo",
    }
}

/// `martes, 3 de noviembre de 2026`
pub fn long_date(at: NaiveDateTime) -> String {
    let month = MONTHS[at.month0() as usize];
    format!("{}, {} de {} de {}", weekday_name(at.weekday()), at.day(), month, at.year())
}

/// `8:30 AM`
pub fn short_time(at: NaiveDateTime) -> String {
    let (pm, hour) = at.hour12();
    format!("{}:{:02} {}", hour, at.minute(), if pm { "PM" } else { "AM" })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use procedure_cell::services::ProcedureCatalogue;
    use scheduling_cell::models::{BookingStatus, PatientContact};

    fn booking() -> Booking {
        let catalogue = ProcedureCatalogue::standard().unwrap();
        Booking::new(
            catalogue.resolve(&["rhinoplasty", "otoplasty"]).unwrap(),
            NaiveDate::from_ymd_opt(2026, 11, 3).unwrap().and_hms_opt(14, 30, 0).unwrap(),
            BookingStatus::Pending,
            PatientContact {
                name: "Ana López".to_string(),
                email: "ana@example.com".to_string(),
                phone: "5512345678".to_string(),
            },
        )
    }

    #[test]
    fn test_spanish_long_date() {
        assert_eq!(long_date(booking().scheduled_start), "martes, 3 de noviembre de 2026");
        assert_eq!(short_time(booking().scheduled_start), "2:30 PM");
    }

    #[test]
    fn test_template_params() {
        let params = NotificationService::template_params(&booking());

        assert_eq!(params["to_email"], "ana@example.com");
        assert_eq!(params["surgery_name"], "Rinoplastia, Otoplastia");
        assert_eq!(params["duration"], "1h 50min");
    }
}
