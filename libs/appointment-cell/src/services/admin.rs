// libs/appointment-cell/src/services/admin.rs
use std::sync::Arc;

use chrono::{Datelike, NaiveDate, Timelike};
use tracing::{info, warn};
use uuid::Uuid;

use scheduling_cell::models::{Booking, BookingStatus, DayBookings, DayConstraints, SchedulingError, SlotTime};
use scheduling_cell::services::{BookingFilter, BookingStore, SlotNegotiator};

use crate::models::{
    AdminAction, AppointmentError, AppointmentStats, IntegrityReport, RescheduleAppointmentRequest,
};
use crate::services::booking::{load_day, rejection_error};
use crate::services::export::{bookings_to_csv, export_file_name};
use crate::services::lifecycle::AppointmentLifecycleService;
use crate::state::AppointmentState;

pub struct CsvExport {
    pub file_name: String,
    pub content: Vec<u8>,
}

/// Appointment management behind the admin password.
pub struct AdminService {
    store: Arc<dyn BookingStore>,
    negotiator: SlotNegotiator,
    lifecycle: AppointmentLifecycleService,
}

impl AdminService {
    pub fn new(state: &AppointmentState) -> Self {
        Self {
            store: Arc::clone(&state.store),
            negotiator: state.negotiator(),
            lifecycle: AppointmentLifecycleService::new(),
        }
    }

    /// Matching bookings, latest start first.
    pub async fn list(&self, filter: &BookingFilter) -> Result<Vec<Booking>, AppointmentError> {
        let mut bookings = self.store.list_bookings(filter).await?;
        bookings.sort_by(|a, b| b.scheduled_start.cmp(&a.scheduled_start));
        Ok(bookings)
    }

    pub async fn stats(&self, today: NaiveDate) -> Result<AppointmentStats, AppointmentError> {
        let bookings = self.store.list_bookings(&BookingFilter::default()).await?;
        Ok(compute_stats(&bookings, today))
    }

    pub async fn apply_action(&self, id: Uuid, action: AdminAction) -> Result<Booking, AppointmentError> {
        let booking = self.store.get_booking(id).await?;
        let target = self.lifecycle.validate_action(booking.status, action)?;

        if self.lifecycle.requires_capacity_check(booking.status, action) {
            self.check_fits(&booking, &booking).await?;
        }

        let updated = self.store.update_booking_status(id, target).await?;
        info!("Appointment {} {}: {} -> {}", id, action, booking.status, updated.status);
        Ok(updated)
    }

    /// Move a booking to a new start, checked like a new booking on that day
    /// without the lead-time rule and without counting the booking itself.
    pub async fn reschedule(
        &self,
        id: Uuid,
        request: RescheduleAppointmentRequest,
    ) -> Result<Booking, AppointmentError> {
        let booking = self.store.get_booking(id).await?;
        if !self.lifecycle.can_reschedule(booking.status) {
            return Err(AppointmentError::NotReschedulable(booking.status));
        }

        let start_time = request.time.to_naive_time().ok_or_else(|| {
            AppointmentError::ValidationError(format!("invalid time {}:{:02}", request.time.hour, request.time.minute))
        })?;

        let mut moved = booking.clone();
        moved.scheduled_start = request.date.and_time(start_time);
        self.check_fits(&booking, &moved).await?;

        let updated = self.store.reschedule_booking(id, moved.scheduled_start).await?;
        info!("Appointment {} moved from {} to {}", id, booking.scheduled_start, updated.scheduled_start);
        Ok(updated)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppointmentError> {
        self.store.delete_booking(id).await?;
        Ok(())
    }

    /// Report whether the day's committed bookings still fit a capacity
    /// arrangement. A violation is reported as-is.
    pub async fn integrity(&self, date: NaiveDate) -> Result<IntegrityReport, AppointmentError> {
        let bookings = self
            .store
            .fetch_bookings_for_day(date)
            .await
            .map_err(|e| AppointmentError::BookingsUnknown(e.to_string()))?;

        let engine = self.negotiator.engine();
        let counts = engine.count_by_size(&bookings);
        let active = bookings.iter().filter(|b| b.holds_capacity()).count();

        let report = match engine.verify_committed(date, &bookings) {
            Ok(shapes) => IntegrityReport {
                date,
                bookings: active,
                counts,
                admitting_shapes: shapes.iter().map(|s| s.name.clone()).collect(),
                consistent: true,
            },
            Err(SchedulingError::CapacityInvariant { .. }) => {
                warn!("Day {} needs attention: {} fits no arrangement", date, counts);
                IntegrityReport {
                    date,
                    bookings: active,
                    counts,
                    admitting_shapes: Vec::new(),
                    consistent: false,
                }
            }
            Err(e) => return Err(e.into()),
        };

        Ok(report)
    }

    pub async fn export(&self, filter: &BookingFilter, today: NaiveDate) -> Result<CsvExport, AppointmentError> {
        let bookings = self.list(filter).await?;
        let content = bookings_to_csv(&bookings)?;

        info!("Exporting {} appointments", bookings.len());
        Ok(CsvExport {
            file_name: export_file_name(today),
            content,
        })
    }

    /// `candidate` must fit on its day next to every other booking there.
    async fn check_fits(&self, original: &Booking, candidate: &Booking) -> Result<(), AppointmentError> {
        let day = candidate.day();
        let (bookings, blocked) = load_day(self.store.as_ref(), day).await;

        let others = match bookings {
            DayBookings::Known(existing) => {
                DayBookings::Known(existing.into_iter().filter(|b| b.id != original.id).collect())
            }
            unknown => unknown,
        };

        let time = SlotTime::new(candidate.scheduled_start.hour(), candidate.scheduled_start.minute());
        let constraints = DayConstraints { today: None, blocked };

        self.negotiator
            .check_slot(day, time, &others, &candidate.procedures, constraints)
            .map_err(|rejection| rejection_error(rejection, &others))
    }
}

pub fn compute_stats(bookings: &[Booking], today: NaiveDate) -> AppointmentStats {
    let count = |status: BookingStatus| bookings.iter().filter(|b| b.status == status).count();

    AppointmentStats {
        total: bookings.len(),
        pending: count(BookingStatus::Pending),
        confirmed: count(BookingStatus::Confirmed),
        cancelled: count(BookingStatus::Cancelled),
        this_month: bookings
            .iter()
            .filter(|b| b.holds_capacity())
            .filter(|b| b.day().year() == today.year() && b.day().month() == today.month())
            .count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scheduling_cell::models::PatientContact;

    fn booking(day: NaiveDate, status: BookingStatus) -> Booking {
        Booking::new(
            Vec::new(),
            day.and_hms_opt(8, 0, 0).unwrap(),
            status,
            PatientContact {
                name: "Ana".to_string(),
                email: "ana@example.com".to_string(),
                phone: "5512345678".to_string(),
            },
        )
    }

    #[test]
    fn test_compute_stats() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        let this_month = NaiveDate::from_ymd_opt(2026, 10, 28).unwrap();
        let next_month = NaiveDate::from_ymd_opt(2026, 11, 3).unwrap();
        let last_year = NaiveDate::from_ymd_opt(2025, 10, 28).unwrap();

        let bookings = vec![
            booking(this_month, BookingStatus::Pending),
            booking(this_month, BookingStatus::Confirmed),
            booking(this_month, BookingStatus::Cancelled),
            booking(next_month, BookingStatus::Confirmed),
            booking(last_year, BookingStatus::Confirmed),
        ];

        let stats = compute_stats(&bookings, today);
        assert_eq!(
            stats,
            AppointmentStats {
                total: 5,
                pending: 1,
                confirmed: 3,
                cancelled: 1,
                this_month: 2,
            }
        );
    }
}
