// libs/scheduling-cell/src/models.rs
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use procedure_cell::models::{Procedure, SizeClass, SurgeryType};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ==============================================================================
// BOOKING MODELS
// ==============================================================================

/// One patient's scheduled session. `scheduled_start` is clinic wall-clock time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Booking {
    pub id: Uuid,
    pub procedures: Vec<Procedure>,
    pub total_duration_minutes: u32,
    pub scheduled_start: NaiveDateTime,
    pub status: BookingStatus,
    pub patient: PatientContact,
    pub created_at: Option<DateTime<Utc>>,
}

impl Booking {
    pub fn new(
        procedures: Vec<Procedure>,
        scheduled_start: NaiveDateTime,
        status: BookingStatus,
        patient: PatientContact,
    ) -> Self {
        let total_duration_minutes = procedures.iter().map(|p| p.duration_minutes).sum();
        Self {
            id: Uuid::new_v4(),
            procedures,
            total_duration_minutes,
            scheduled_start,
            status,
            patient,
            created_at: Some(Utc::now()),
        }
    }

    pub fn scheduled_end(&self) -> NaiveDateTime {
        self.scheduled_start + Duration::minutes(self.total_duration_minutes as i64)
    }

    pub fn day(&self) -> NaiveDate {
        self.scheduled_start.date()
    }

    /// Cancelled bookings hold no time and no capacity.
    pub fn holds_capacity(&self) -> bool {
        self.status.holds_capacity()
    }

    pub fn procedure_names(&self) -> Vec<&str> {
        self.procedures.iter().map(|p| p.name.as_str()).collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PatientContact {
    pub name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    pub fn holds_capacity(&self) -> bool {
        !matches!(self, BookingStatus::Cancelled)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingStatus::Pending => write!(f, "pending"),
            BookingStatus::Confirmed => write!(f, "confirmed"),
            BookingStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

// ==============================================================================
// CAPACITY MODELS
// ==============================================================================

/// Number of procedures of each size class booked (or proposed) on one day.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SizeCounts {
    pub large: u32,
    pub medium: u32,
    pub small: u32,
}

impl SizeCounts {
    pub fn new(large: u32, medium: u32, small: u32) -> Self {
        Self { large, medium, small }
    }

    pub fn get(&self, size: SizeClass) -> u32 {
        match size {
            SizeClass::Large => self.large,
            SizeClass::Medium => self.medium,
            SizeClass::Small => self.small,
        }
    }

    pub fn set(&mut self, size: SizeClass, value: u32) {
        match size {
            SizeClass::Large => self.large = value,
            SizeClass::Medium => self.medium = value,
            SizeClass::Small => self.small = value,
        }
    }

    pub fn increment(&mut self, size: SizeClass) {
        self.set(size, self.get(size) + 1);
    }

    /// Copy with `extra` more units of `size`.
    pub fn plus(&self, size: SizeClass, extra: u32) -> Self {
        let mut counts = *self;
        counts.set(size, self.get(size) + extra);
        counts
    }

    pub fn total(&self) -> u32 {
        self.large + self.medium + self.small
    }
}

impl fmt::Display for SizeCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{large:{}, medium:{}, small:{}}}", self.large, self.medium, self.small)
    }
}

/// One admissible daily arrangement of procedure sizes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CapacityShape {
    pub name: String,
    pub large: u32,
    pub medium: u32,
    pub small: u32,
}

impl CapacityShape {
    pub fn new(name: impl Into<String>, large: u32, medium: u32, small: u32) -> Self {
        Self { name: name.into(), large, medium, small }
    }

    pub fn limit(&self, size: SizeClass) -> u32 {
        match size {
            SizeClass::Large => self.large,
            SizeClass::Medium => self.medium,
            SizeClass::Small => self.small,
        }
    }

    /// Every count must fit under the shape's limit. A zero limit therefore
    /// forbids that size outright; a shape is never applied partially.
    pub fn admits(&self, counts: &SizeCounts) -> bool {
        SizeClass::ALL.iter().all(|&size| {
            let limit = self.limit(size);
            let count = counts.get(size);
            if limit == 0 {
                count == 0
            } else {
                count <= limit
            }
        })
    }
}

// ==============================================================================
// SLOT MODELS
// ==============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotTime {
    pub hour: u32,
    pub minute: u32,
}

impl SlotTime {
    pub fn new(hour: u32, minute: u32) -> Self {
        Self { hour, minute }
    }

    pub fn to_naive_time(&self) -> Option<NaiveTime> {
        NaiveTime::from_hms_opt(self.hour, self.minute, 0)
    }

    /// 12-hour label as shown on the time picker, e.g. `6:30 AM`.
    pub fn label(&self) -> String {
        let period = if self.hour >= 12 { "PM" } else { "AM" };
        let display_hour = match self.hour {
            0 => 12,
            h if h > 12 => h - 12,
            h => h,
        };
        format!("{}:{:02} {}", display_hour, self.minute, period)
    }
}

/// Why a slot cannot be offered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SlotRejection {
    TooSoon { earliest: NaiveDate },
    DayBlocked,
    BookingsUnknown,
    DayTypeNotAllowed { day_type: SurgeryType },
    InvalidTime,
    /// A valid time that is not one of the day's offered start times.
    OffGrid,
    OutsideBusinessHours,
    Overlap { booking_id: Uuid },
    CapacityExceeded { counts: SizeCounts },
}

impl fmt::Display for SlotRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotRejection::TooSoon { earliest } => {
                write!(f, "appointments must be booked on or after {}", earliest)
            }
            SlotRejection::DayBlocked => write!(f, "the clinic is closed on this day"),
            SlotRejection::BookingsUnknown => {
                write!(f, "existing bookings for this day could not be loaded")
            }
            SlotRejection::DayTypeNotAllowed { day_type } => {
                write!(f, "this day is reserved for {}", day_type.label())
            }
            SlotRejection::InvalidTime => write!(f, "invalid time of day"),
            SlotRejection::OffGrid => write!(f, "the start time is not one of the offered slots"),
            SlotRejection::OutsideBusinessHours => write!(f, "the session does not fit within business hours"),
            SlotRejection::Overlap { booking_id } => {
                write!(f, "overlaps existing booking {}", booking_id)
            }
            SlotRejection::CapacityExceeded { counts } => {
                write!(f, "no daily arrangement admits {}", counts)
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SlotAvailability {
    pub time: SlotTime,
    pub label: String,
    pub available: bool,
    pub rejection: Option<SlotRejection>,
}

/// Everything the time picker needs for one day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DayAvailability {
    pub date: NaiveDate,
    pub day_type: SurgeryType,
    pub day_type_label: String,
    pub bookings_known: bool,
    pub remaining_capacity: Option<SizeCounts>,
    pub total_duration_minutes: u32,
    pub slots: Vec<SlotAvailability>,
}

impl DayAvailability {
    pub fn available_slots(&self) -> impl Iterator<Item = &SlotAvailability> {
        self.slots.iter().filter(|s| s.available)
    }
}

/// What is known about a day's existing bookings. `Unknown` is distinct from
/// an empty day: nothing may be admitted against it.
#[derive(Debug, Clone, PartialEq)]
pub enum DayBookings {
    Known(Vec<Booking>),
    Unknown { reason: String },
}

/// Day-level inputs that do not come from the bookings themselves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DayConstraints {
    /// When set, days before `today + min_lead_days` are rejected.
    pub today: Option<NaiveDate>,
    pub blocked: bool,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchedulingError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid scheduling policy: {0}")]
    InvalidPolicy(String),

    /// Committed bookings on `day` fit no capacity shape.
    #[error("Bookings on {day} exceed every capacity arrangement: {counts}")]
    CapacityInvariant { day: NaiveDate, counts: SizeCounts },

    #[error("Booking store error: {0}")]
    Store(String),

    #[error("Booking not found: {0}")]
    NotFound(Uuid),
}
