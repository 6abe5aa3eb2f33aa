// libs/scheduling-cell/src/services/negotiator.rs
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use tracing::debug;

use procedure_cell::models::Procedure;

use crate::models::{
    Booking, DayAvailability, DayBookings, DayConstraints, SchedulingError, SlotAvailability,
    SlotRejection, SlotTime,
};
use crate::services::admissibility::AdmissibilityEngine;

/// Half-open interval overlap: `[a_start, a_end)` against `[b_start, b_end)`.
pub fn intervals_overlap(
    a_start: NaiveDateTime,
    a_end: NaiveDateTime,
    b_start: NaiveDateTime,
    b_end: NaiveDateTime,
) -> bool {
    a_start < b_end && a_end > b_start
}

/// Total duration of a candidate selection, rejecting empty selections and
/// zero-length procedures before they reach the engine.
pub fn validate_candidates(candidates: &[Procedure]) -> Result<u32, SchedulingError> {
    if candidates.is_empty() {
        return Err(SchedulingError::Validation("select at least one procedure".to_string()));
    }

    if let Some(p) = candidates.iter().find(|p| p.duration_minutes == 0) {
        return Err(SchedulingError::Validation(format!(
            "procedure {} has no duration",
            p.id
        )));
    }

    Ok(candidates.iter().map(|p| p.duration_minutes).sum())
}

/// Turns a day's booking snapshot into per-slot availability. Shared by the
/// booking wizard and by admin rescheduling so both apply the same rules.
#[derive(Debug, Clone)]
pub struct SlotNegotiator {
    engine: AdmissibilityEngine,
}

impl SlotNegotiator {
    pub fn new(engine: AdmissibilityEngine) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &AdmissibilityEngine {
        &self.engine
    }

    pub fn time_slots(&self) -> Vec<SlotTime> {
        self.engine.policy().time_slots()
    }

    /// Rejections that apply to every slot of the day.
    pub fn day_rejection(
        &self,
        day: NaiveDate,
        bookings: &DayBookings,
        constraints: DayConstraints,
    ) -> Option<SlotRejection> {
        if let Some(today) = constraints.today {
            let earliest = self.engine.policy().earliest_bookable_day(today);
            if day < earliest {
                return Some(SlotRejection::TooSoon { earliest });
            }
        }

        if constraints.blocked {
            return Some(SlotRejection::DayBlocked);
        }

        if let DayBookings::Unknown { .. } = bookings {
            return Some(SlotRejection::BookingsUnknown);
        }

        None
    }

    /// Evaluate one start time against a known set of bookings. Candidates
    /// are expected to have passed [`validate_candidates`].
    pub fn evaluate_slot(
        &self,
        day: NaiveDate,
        time: SlotTime,
        existing: &[Booking],
        candidates: &[Procedure],
    ) -> Result<(), SlotRejection> {
        let weekday = day.weekday();
        if !self.engine.are_procedures_allowed_on(candidates, weekday) {
            return Err(SlotRejection::DayTypeNotAllowed {
                day_type: self.engine.surgery_type_on(weekday),
            });
        }

        let start_time = time.to_naive_time().ok_or(SlotRejection::InvalidTime)?;
        let total: u32 = candidates.iter().map(|p| p.duration_minutes).sum();
        let slot_start = day.and_time(start_time);
        let slot_end = slot_start + Duration::minutes(i64::from(total));

        let hours = &self.engine.policy().business_hours;
        if slot_start < hours.opening_on(day) || slot_end > hours.closing_on(day) {
            return Err(SlotRejection::OutsideBusinessHours);
        }

        let same_day: Vec<Booking> = existing
            .iter()
            .filter(|b| b.holds_capacity() && b.day() == day)
            .cloned()
            .collect();

        if let Some(clash) = same_day
            .iter()
            .find(|b| intervals_overlap(slot_start, slot_end, b.scheduled_start, b.scheduled_end()))
        {
            return Err(SlotRejection::Overlap { booking_id: clash.id });
        }

        if !self.engine.can_admit(&same_day, candidates) {
            let mut counts = self.engine.count_by_size(&same_day);
            for candidate in candidates {
                counts.increment(candidate.size);
            }
            return Err(SlotRejection::CapacityExceeded { counts });
        }

        Ok(())
    }

    /// Full check for a single requested start, including day-level rules.
    /// Only starts on the policy's slot grid are accepted.
    pub fn check_slot(
        &self,
        day: NaiveDate,
        time: SlotTime,
        bookings: &DayBookings,
        candidates: &[Procedure],
        constraints: DayConstraints,
    ) -> Result<(), SlotRejection> {
        if let Some(rejection) = self.day_rejection(day, bookings, constraints) {
            return Err(rejection);
        }

        if time.to_naive_time().is_none() {
            return Err(SlotRejection::InvalidTime);
        }
        if !self.time_slots().contains(&time) {
            return Err(SlotRejection::OffGrid);
        }

        match bookings {
            DayBookings::Known(existing) => self.evaluate_slot(day, time, existing, candidates),
            DayBookings::Unknown { .. } => Err(SlotRejection::BookingsUnknown),
        }
    }

    /// Every offered slot of `day` with its outcome.
    pub fn evaluate_day(
        &self,
        day: NaiveDate,
        bookings: &DayBookings,
        candidates: &[Procedure],
        constraints: DayConstraints,
    ) -> Result<DayAvailability, SchedulingError> {
        let total_duration_minutes = validate_candidates(candidates)?;
        let day_type = self.engine.surgery_type_on(day.weekday());
        let day_rejection = self.day_rejection(day, bookings, constraints);

        let slots = self
            .time_slots()
            .into_iter()
            .map(|time| {
                let outcome = match (&day_rejection, bookings) {
                    (Some(rejection), _) => Err(rejection.clone()),
                    (None, DayBookings::Known(existing)) => {
                        self.evaluate_slot(day, time, existing, candidates)
                    }
                    (None, DayBookings::Unknown { .. }) => Err(SlotRejection::BookingsUnknown),
                };

                SlotAvailability {
                    time,
                    label: time.label(),
                    available: outcome.is_ok(),
                    rejection: outcome.err(),
                }
            })
            .collect::<Vec<_>>();

        let remaining_capacity = match bookings {
            DayBookings::Known(existing) => {
                let same_day: Vec<Booking> = existing.iter().filter(|b| b.day() == day).cloned().collect();
                Some(self.engine.remaining_capacity(&same_day))
            }
            DayBookings::Unknown { .. } => None,
        };

        debug!(
            "Evaluated {} slots for {}: {} available",
            slots.len(),
            day,
            slots.iter().filter(|s| s.available).count()
        );

        Ok(DayAvailability {
            date: day,
            day_type,
            day_type_label: day_type.label().to_string(),
            bookings_known: matches!(bookings, DayBookings::Known(_)),
            remaining_capacity,
            total_duration_minutes,
            slots,
        })
    }
}
