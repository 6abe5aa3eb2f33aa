// libs/appointment-cell/src/services/booking.rs
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{error, info};

use procedure_cell::services::ProcedureCatalogue;
use scheduling_cell::models::{
    Booking, BookingStatus, DayAvailability, DayBookings, DayConstraints, SlotRejection,
};
use scheduling_cell::services::{validate_candidates, BookingStore, DaySnapshotTracker, SlotNegotiator};

use crate::models::{AppointmentCreated, AppointmentError, AvailabilityQuery, CreateAppointmentRequest};
use crate::services::notification::NotificationService;
use crate::services::validation::ContactValidator;
use crate::state::AppointmentState;

/// A day's bookings plus whether the clinic blocked it. A failed read of
/// either leaves the bookings unknown.
pub(crate) async fn load_day(store: &dyn BookingStore, day: NaiveDate) -> (DayBookings, bool) {
    let mut tracker = DaySnapshotTracker::new();
    let ticket = tracker.select_day(day);
    let fetched = store.fetch_bookings_for_day(day).await;
    tracker.complete(ticket, fetched);

    let bookings = tracker.day_bookings().unwrap_or(DayBookings::Unknown {
        reason: "no day selected".to_string(),
    });

    match store.is_day_blocked(day).await {
        Ok(blocked) => (bookings, blocked),
        Err(e) => {
            error!("Could not read blocked dates for {}: {}", day, e);
            (DayBookings::Unknown { reason: e.to_string() }, false)
        }
    }
}

pub(crate) fn rejection_error(rejection: SlotRejection, bookings: &DayBookings) -> AppointmentError {
    match (rejection, bookings) {
        (SlotRejection::BookingsUnknown, DayBookings::Unknown { reason }) => {
            AppointmentError::BookingsUnknown(reason.clone())
        }
        (SlotRejection::BookingsUnknown, _) => AppointmentError::BookingsUnknown("unknown".to_string()),
        (rejection, _) => AppointmentError::SlotNotAvailable(rejection),
    }
}

/// The patient-facing booking wizard: day availability and booking creation.
pub struct BookingService {
    store: Arc<dyn BookingStore>,
    catalogue: Arc<ProcedureCatalogue>,
    negotiator: SlotNegotiator,
    notifier: NotificationService,
    validator: Arc<ContactValidator>,
}

impl BookingService {
    pub fn new(state: &AppointmentState) -> Self {
        Self {
            store: Arc::clone(&state.store),
            catalogue: Arc::clone(&state.catalogue),
            negotiator: state.negotiator(),
            notifier: NotificationService::new(&state.config),
            validator: Arc::clone(&state.validator),
        }
    }

    pub async fn availability(
        &self,
        query: &AvailabilityQuery,
        today: NaiveDate,
    ) -> Result<DayAvailability, AppointmentError> {
        let candidates = self.catalogue.resolve(query.procedure_ids().as_slice())?;
        validate_candidates(&candidates)?;

        let (bookings, blocked) = load_day(self.store.as_ref(), query.date).await;
        let constraints = DayConstraints {
            today: Some(today),
            blocked,
        };

        let availability = self
            .negotiator
            .evaluate_day(query.date, &bookings, &candidates, constraints)?;

        info!(
            "Availability for {} with {} procedures: {} of {} slots open",
            query.date,
            candidates.len(),
            availability.available_slots().count(),
            availability.slots.len()
        );
        Ok(availability)
    }

    /// Validate, re-check the chosen slot against freshly fetched bookings
    /// and store the booking as pending. The confirmation e-mail is sent
    /// afterwards and never fails the booking.
    pub async fn create_appointment(
        &self,
        request: CreateAppointmentRequest,
        today: NaiveDate,
    ) -> Result<AppointmentCreated, AppointmentError> {
        let patient = self.validator.validate(
            &request.patient_name,
            &request.patient_email,
            &request.patient_phone,
        )?;

        let procedures = self.catalogue.resolve(request.procedure_ids.as_slice())?;
        validate_candidates(&procedures)?;

        let (bookings, blocked) = load_day(self.store.as_ref(), request.date).await;
        let constraints = DayConstraints {
            today: Some(today),
            blocked,
        };

        self.negotiator
            .check_slot(request.date, request.time, &bookings, &procedures, constraints)
            .map_err(|rejection| rejection_error(rejection, &bookings))?;

        let start_time = request
            .time
            .to_naive_time()
            .ok_or(AppointmentError::SlotNotAvailable(SlotRejection::InvalidTime))?;

        let booking = Booking::new(
            procedures,
            request.date.and_time(start_time),
            BookingStatus::Pending,
            patient,
        );

        let created = self.store.create_booking(&booking).await?;
        let email_sent = self.notifier.send_confirmation(&created).await;

        info!(
            "Booked {} ({} min) for {} at {}",
            created.id,
            created.total_duration_minutes,
            created.patient.email,
            created.scheduled_start
        );

        Ok(AppointmentCreated {
            booking: created,
            email_sent,
        })
    }
}
