// libs/scheduling-cell/src/services/store.rs
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Booking, BookingStatus, SchedulingError};

/// Admin listing filter. Every set field must match.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookingFilter {
    pub status: Option<BookingStatus>,
    pub date: Option<NaiveDate>,
    /// Case-insensitive match on patient name, email, phone or procedure names.
    pub search: Option<String>,
}

impl BookingFilter {
    pub fn matches(&self, booking: &Booking) -> bool {
        if let Some(status) = self.status {
            if booking.status != status {
                return false;
            }
        }

        if let Some(date) = self.date {
            if booking.day() != date {
                return false;
            }
        }

        match self.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => {
                let term = term.to_lowercase();
                booking.patient.name.to_lowercase().contains(&term)
                    || booking.patient.email.to_lowercase().contains(&term)
                    || booking.patient.phone.contains(&term)
                    || booking.procedures.iter().any(|p| p.name.to_lowercase().contains(&term))
            }
            _ => true,
        }
    }
}

/// Persistence seam for bookings. The engine never talks to storage itself;
/// callers fetch a day's bookings and hand them over.
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Every booking whose start falls on `day`, cancelled ones included.
    async fn fetch_bookings_for_day(&self, day: NaiveDate) -> Result<Vec<Booking>, SchedulingError>;

    async fn list_bookings(&self, filter: &BookingFilter) -> Result<Vec<Booking>, SchedulingError>;

    async fn get_booking(&self, id: Uuid) -> Result<Booking, SchedulingError>;

    async fn create_booking(&self, booking: &Booking) -> Result<Booking, SchedulingError>;

    async fn update_booking_status(&self, id: Uuid, status: BookingStatus) -> Result<Booking, SchedulingError>;

    async fn reschedule_booking(&self, id: Uuid, start: NaiveDateTime) -> Result<Booking, SchedulingError>;

    async fn delete_booking(&self, id: Uuid) -> Result<(), SchedulingError>;

    async fn is_day_blocked(&self, day: NaiveDate) -> Result<bool, SchedulingError>;
}
