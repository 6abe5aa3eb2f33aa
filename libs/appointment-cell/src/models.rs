// libs/appointment-cell/src/models.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use procedure_cell::models::CatalogueError;
use scheduling_cell::models::{Booking, BookingStatus, SchedulingError, SizeCounts, SlotRejection, SlotTime};
use scheduling_cell::services::BookingFilter;

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct AvailabilityQuery {
    pub date: NaiveDate,
    /// Comma-separated procedure ids in selection order.
    pub procedures: String,
}

impl AvailabilityQuery {
    pub fn procedure_ids(&self) -> Vec<String> {
        self.procedures
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAppointmentRequest {
    pub procedure_ids: Vec<String>,
    pub date: NaiveDate,
    pub time: SlotTime,
    pub patient_name: String,
    pub patient_email: String,
    pub patient_phone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RescheduleAppointmentRequest {
    pub date: NaiveDate,
    pub time: SlotTime,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminAppointmentQuery {
    pub search: Option<String>,
    pub status: Option<BookingStatus>,
    pub date: Option<NaiveDate>,
}

impl From<AdminAppointmentQuery> for BookingFilter {
    fn from(query: AdminAppointmentQuery) -> Self {
        BookingFilter {
            status: query.status,
            date: query.date,
            search: query.search,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct IntegrityQuery {
    pub date: NaiveDate,
}

// ==============================================================================
// ADMIN MODELS
// ==============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AdminAction {
    Authorize,
    Cancel,
    Reactivate,
}

impl AdminAction {
    pub fn target_status(&self) -> BookingStatus {
        match self {
            AdminAction::Authorize | AdminAction::Reactivate => BookingStatus::Confirmed,
            AdminAction::Cancel => BookingStatus::Cancelled,
        }
    }
}

impl fmt::Display for AdminAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdminAction::Authorize => write!(f, "authorize"),
            AdminAction::Cancel => write!(f, "cancel"),
            AdminAction::Reactivate => write!(f, "reactivate"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppointmentStats {
    pub total: usize,
    pub pending: usize,
    pub confirmed: usize,
    pub cancelled: usize,
    /// Non-cancelled bookings starting in the current calendar month.
    pub this_month: usize,
}

/// Capacity audit of one day's committed bookings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IntegrityReport {
    pub date: NaiveDate,
    pub bookings: usize,
    pub counts: SizeCounts,
    pub admitting_shapes: Vec<String>,
    pub consistent: bool,
}

// ==============================================================================
// RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentCreated {
    pub booking: Booking,
    pub email_sent: bool,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AppointmentError {
    #[error("Appointment not found: {0}")]
    NotFound(Uuid),

    #[error("Slot not available: {0}")]
    SlotNotAvailable(SlotRejection),

    #[error("Existing bookings could not be loaded: {0}")]
    BookingsUnknown(String),

    #[error("Cannot {action} an appointment that is {from}")]
    InvalidStatusTransition { from: BookingStatus, action: AdminAction },

    #[error("Cannot reschedule an appointment that is {0}")]
    NotReschedulable(BookingStatus),

    #[error("Unknown procedure: {0}")]
    UnknownProcedure(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Export failed: {0}")]
    Export(String),
}

impl From<SchedulingError> for AppointmentError {
    fn from(e: SchedulingError) -> Self {
        match e {
            SchedulingError::Validation(msg) | SchedulingError::InvalidPolicy(msg) => {
                AppointmentError::ValidationError(msg)
            }
            SchedulingError::NotFound(id) => AppointmentError::NotFound(id),
            SchedulingError::Store(msg) => AppointmentError::DatabaseError(msg),
            e @ SchedulingError::CapacityInvariant { .. } => AppointmentError::DatabaseError(e.to_string()),
        }
    }
}

impl From<CatalogueError> for AppointmentError {
    fn from(e: CatalogueError) -> Self {
        match e {
            CatalogueError::UnknownProcedure(id) => AppointmentError::UnknownProcedure(id),
            other => AppointmentError::ValidationError(other.to_string()),
        }
    }
}
