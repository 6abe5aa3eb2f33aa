// libs/appointment-cell/src/services/store.rs
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use procedure_cell::models::{Procedure, ProcedureCategory, SizeClass};
use procedure_cell::services::ProcedureCatalogue;
use scheduling_cell::models::{Booking, BookingStatus, PatientContact, SchedulingError};
use scheduling_cell::services::{BookingFilter, BookingStore};
use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::AppointmentError;

const APPOINTMENTS_PATH: &str = "/rest/v1/appointments";
const BLOCKED_DATES_PATH: &str = "/rest/v1/blocked_dates";

// ==============================================================================
// STORED RECORD SHAPES
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredProcedure {
    pub id: String,
    pub name: String,
    #[serde(alias = "duration_minutes")]
    pub duration: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<ProcedureCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<SizeClass>,
}

impl StoredProcedure {
    fn from_procedure(procedure: &Procedure) -> Self {
        Self {
            id: procedure.id.clone(),
            name: procedure.name.clone(),
            duration: procedure.duration_minutes,
            category: Some(procedure.category),
            size: Some(procedure.size),
        }
    }

    /// Category falls back to the catalogue entry; size, when not recorded,
    /// is derived from the stored duration.
    fn into_procedure(self, catalogue: &ProcedureCatalogue) -> Result<Procedure, AppointmentError> {
        let known = catalogue.get(&self.id);
        let category = match (self.category, known) {
            (Some(category), _) => category,
            (None, Some(entry)) => entry.category,
            (None, None) => {
                warn!("Stored procedure {} has no category and is not in the catalogue", self.id);
                ProcedureCategory::Corporal
            }
        };

        let mut procedure = Procedure::new(self.id, self.name, self.duration, category, catalogue.thresholds())?;
        if let Some(size) = self.size {
            procedure.size = size;
        }
        Ok(procedure)
    }
}

/// One row of the `appointments` collection. Rows written by the old
/// single-surgery form carry `surgeryId`/`surgeryName`/`duration` and no
/// procedure list; both shapes deserialize into this struct.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredAppointment {
    pub id: Uuid,
    #[serde(alias = "patientName")]
    pub patient_name: String,
    #[serde(alias = "patientEmail")]
    pub patient_email: String,
    #[serde(alias = "patientPhone")]
    pub patient_phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub procedures: Option<Vec<StoredProcedure>>,
    #[serde(default, alias = "totalDuration", skip_serializing_if = "Option::is_none")]
    pub total_duration: Option<u32>,
    #[serde(default, alias = "surgeryId", skip_serializing_if = "Option::is_none")]
    pub surgery_id: Option<String>,
    #[serde(default, alias = "surgeryName", skip_serializing_if = "Option::is_none")]
    pub surgery_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<SizeClass>,
    pub scheduled_start: NaiveDateTime,
    pub status: BookingStatus,
    #[serde(default, alias = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl StoredAppointment {
    pub fn from_booking(booking: &Booking) -> Self {
        Self {
            id: booking.id,
            patient_name: booking.patient.name.clone(),
            patient_email: booking.patient.email.clone(),
            patient_phone: booking.patient.phone.clone(),
            procedures: Some(booking.procedures.iter().map(StoredProcedure::from_procedure).collect()),
            total_duration: Some(booking.total_duration_minutes),
            surgery_id: None,
            surgery_name: None,
            duration: None,
            size: None,
            scheduled_start: booking.scheduled_start,
            status: booking.status,
            created_at: booking.created_at,
        }
    }

    pub fn is_legacy(&self) -> bool {
        self.procedures.as_ref().map_or(true, |p| p.is_empty()) && self.surgery_id.is_some()
    }

    pub fn into_booking(self, catalogue: &ProcedureCatalogue) -> Result<Booking, AppointmentError> {
        let id = self.id;
        let stored = match (self.procedures, self.surgery_id) {
            (Some(procedures), _) if !procedures.is_empty() => procedures,
            (_, Some(surgery_id)) => {
                let known = catalogue.get(&surgery_id);
                let name = self
                    .surgery_name
                    .or_else(|| known.map(|p| p.name.clone()))
                    .unwrap_or_else(|| surgery_id.clone());
                let duration = self
                    .duration
                    .or_else(|| known.map(|p| p.duration_minutes))
                    .ok_or_else(|| {
                        AppointmentError::DatabaseError(format!("legacy appointment {} has no duration", id))
                    })?;

                debug!("Adapting legacy appointment {} ({})", id, surgery_id);
                vec![StoredProcedure {
                    id: surgery_id,
                    name,
                    duration,
                    category: None,
                    size: self.size,
                }]
            }
            _ => {
                return Err(AppointmentError::DatabaseError(format!(
                    "appointment {} has no procedures",
                    id
                )))
            }
        };

        let procedures = stored
            .into_iter()
            .map(|p| p.into_procedure(catalogue))
            .collect::<Result<Vec<_>, _>>()?;
        let total_duration_minutes = procedures.iter().map(|p| p.duration_minutes).sum();

        Ok(Booking {
            id,
            procedures,
            total_duration_minutes,
            scheduled_start: self.scheduled_start,
            status: self.status,
            patient: PatientContact {
                name: self.patient_name,
                email: self.patient_email,
                phone: self.patient_phone,
            },
            created_at: self.created_at,
        })
    }
}

// ==============================================================================
// STORE ADAPTER
// ==============================================================================

/// `BookingStore` over the hosted store's REST interface.
pub struct SupabaseBookingStore {
    supabase: Arc<SupabaseClient>,
    catalogue: Arc<ProcedureCatalogue>,
}

impl SupabaseBookingStore {
    pub fn new(config: &AppConfig, catalogue: Arc<ProcedureCatalogue>) -> Self {
        Self {
            supabase: Arc::new(SupabaseClient::new(config)),
            catalogue,
        }
    }

    fn representation_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));
        headers
    }

    fn day_range_query(day: NaiveDate) -> String {
        let next = day + Duration::days(1);
        format!(
            "scheduled_start=gte.{}T00:00:00&scheduled_start=lt.{}T00:00:00",
            day.format("%Y-%m-%d"),
            next.format("%Y-%m-%d")
        )
    }

    fn store_error(context: &str, e: anyhow::Error) -> SchedulingError {
        error!("{}: {}", context, e);
        SchedulingError::Store(format!("{}: {}", context, e))
    }

    /// Parse rows one by one. `strict` fails on the first unreadable row;
    /// otherwise such rows are logged and skipped.
    fn parse_rows(&self, rows: Vec<Value>, strict: bool) -> Result<Vec<Booking>, SchedulingError> {
        let mut bookings = Vec::with_capacity(rows.len());

        for row in rows {
            let parsed = serde_json::from_value::<StoredAppointment>(row)
                .map_err(|e| AppointmentError::DatabaseError(format!("unreadable appointment row: {}", e)))
                .and_then(|stored| stored.into_booking(&self.catalogue));

            match parsed {
                Ok(booking) => bookings.push(booking),
                Err(e) if strict => return Err(SchedulingError::Store(e.to_string())),
                Err(e) => warn!("Skipping appointment row: {}", e),
            }
        }

        Ok(bookings)
    }

    async fn single_row(
        &self,
        method: Method,
        id: Uuid,
        body: Option<Value>,
        context: &str,
    ) -> Result<Booking, SchedulingError> {
        let path = format!("{}?id=eq.{}", APPOINTMENTS_PATH, id);
        let rows: Vec<Value> = self
            .supabase
            .request_with_headers(method, &path, body, Some(Self::representation_headers()))
            .await
            .map_err(|e| Self::store_error(context, e))?;

        self.parse_rows(rows, true)?
            .into_iter()
            .next()
            .ok_or(SchedulingError::NotFound(id))
    }
}

#[async_trait]
impl BookingStore for SupabaseBookingStore {
    async fn fetch_bookings_for_day(&self, day: NaiveDate) -> Result<Vec<Booking>, SchedulingError> {
        debug!("Fetching bookings for {}", day);

        let path = format!(
            "{}?{}&order=scheduled_start.asc",
            APPOINTMENTS_PATH,
            Self::day_range_query(day)
        );
        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| Self::store_error("Failed to fetch bookings", e))?;

        // a row that cannot be read might hold capacity, so the day is unknown
        self.parse_rows(rows, true)
    }

    async fn list_bookings(&self, filter: &BookingFilter) -> Result<Vec<Booking>, SchedulingError> {
        let mut query_parts = vec!["order=scheduled_start.desc".to_string()];
        if let Some(status) = filter.status {
            query_parts.push(format!("status=eq.{}", status));
        }
        if let Some(date) = filter.date {
            query_parts.push(Self::day_range_query(date));
        }

        let path = format!("{}?{}", APPOINTMENTS_PATH, query_parts.join("&"));
        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| Self::store_error("Failed to list bookings", e))?;

        let bookings = self.parse_rows(rows, false)?;
        Ok(bookings.into_iter().filter(|b| filter.matches(b)).collect())
    }

    async fn get_booking(&self, id: Uuid) -> Result<Booking, SchedulingError> {
        let path = format!("{}?id=eq.{}", APPOINTMENTS_PATH, id);
        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| Self::store_error("Failed to fetch booking", e))?;

        self.parse_rows(rows, true)?
            .into_iter()
            .next()
            .ok_or(SchedulingError::NotFound(id))
    }

    async fn create_booking(&self, booking: &Booking) -> Result<Booking, SchedulingError> {
        let body = serde_json::to_value(StoredAppointment::from_booking(booking))
            .map_err(|e| SchedulingError::Store(format!("Failed to encode booking: {}", e)))?;

        let rows: Vec<Value> = self
            .supabase
            .request_with_headers(Method::POST, APPOINTMENTS_PATH, Some(body), Some(Self::representation_headers()))
            .await
            .map_err(|e| Self::store_error("Failed to create booking", e))?;

        let created = self
            .parse_rows(rows, true)?
            .into_iter()
            .next()
            .ok_or_else(|| SchedulingError::Store("store returned no created booking".to_string()))?;

        info!("Created booking {} for {}", created.id, created.scheduled_start);
        Ok(created)
    }

    async fn update_booking_status(&self, id: Uuid, status: BookingStatus) -> Result<Booking, SchedulingError> {
        let body = json!({
            "status": status,
            "updated_at": Utc::now().to_rfc3339(),
        });

        self.single_row(Method::PATCH, id, Some(body), "Failed to update booking status").await
    }

    async fn reschedule_booking(&self, id: Uuid, start: NaiveDateTime) -> Result<Booking, SchedulingError> {
        let body = json!({
            "scheduled_start": start,
            "updated_at": Utc::now().to_rfc3339(),
        });

        self.single_row(Method::PATCH, id, Some(body), "Failed to reschedule booking").await
    }

    async fn delete_booking(&self, id: Uuid) -> Result<(), SchedulingError> {
        let path = format!("{}?id=eq.{}", APPOINTMENTS_PATH, id);
        self.supabase
            .execute(Method::DELETE, &path, None)
            .await
            .map_err(|e| Self::store_error("Failed to delete booking", e))?;

        info!("Deleted booking {}", id);
        Ok(())
    }

    async fn is_day_blocked(&self, day: NaiveDate) -> Result<bool, SchedulingError> {
        let path = format!(
            "{}?date=eq.{}&is_full_day=eq.true",
            BLOCKED_DATES_PATH,
            day.format("%Y-%m-%d")
        );
        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| Self::store_error("Failed to read blocked dates", e))?;

        Ok(!rows.is_empty())
    }
}
