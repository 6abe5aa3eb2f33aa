// libs/scheduling-cell/src/services/snapshot.rs
use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::models::{Booking, DayBookings, SchedulingError};

#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotState {
    NoDateSelected,
    Fetching { day: NaiveDate },
    Ready { day: NaiveDate, bookings: Vec<Booking> },
    Unknown { day: NaiveDate, reason: String },
}

/// Handed out by [`DaySnapshotTracker::select_day`]; a fetch result is only
/// accepted with the ticket of the most recent selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    pub day: NaiveDate,
    generation: u64,
}

/// Holds the bookings snapshot for the currently selected day. Results of
/// fetches started for an earlier selection are discarded.
#[derive(Debug, Clone)]
pub struct DaySnapshotTracker {
    state: SnapshotState,
    generation: u64,
}

impl DaySnapshotTracker {
    pub fn new() -> Self {
        Self {
            state: SnapshotState::NoDateSelected,
            generation: 0,
        }
    }

    pub fn state(&self) -> &SnapshotState {
        &self.state
    }

    pub fn selected_day(&self) -> Option<NaiveDate> {
        match &self.state {
            SnapshotState::NoDateSelected => None,
            SnapshotState::Fetching { day }
            | SnapshotState::Ready { day, .. }
            | SnapshotState::Unknown { day, .. } => Some(*day),
        }
    }

    pub fn select_day(&mut self, day: NaiveDate) -> FetchTicket {
        self.generation += 1;
        self.state = SnapshotState::Fetching { day };
        debug!("Fetching bookings for {} (generation {})", day, self.generation);

        FetchTicket {
            day,
            generation: self.generation,
        }
    }

    pub fn clear(&mut self) {
        self.generation += 1;
        self.state = SnapshotState::NoDateSelected;
    }

    /// Apply a fetch result. Returns false when the ticket is stale.
    pub fn complete(&mut self, ticket: FetchTicket, result: Result<Vec<Booking>, SchedulingError>) -> bool {
        if ticket.generation != self.generation {
            debug!(
                "Discarding stale bookings for {} (generation {}, current {})",
                ticket.day, ticket.generation, self.generation
            );
            return false;
        }

        self.state = match result {
            Ok(bookings) => SnapshotState::Ready {
                day: ticket.day,
                bookings: bookings.into_iter().filter(|b| b.day() == ticket.day).collect(),
            },
            Err(e) => {
                warn!("Bookings for {} unavailable: {}", ticket.day, e);
                SnapshotState::Unknown {
                    day: ticket.day,
                    reason: e.to_string(),
                }
            }
        };

        true
    }

    /// Bookings for admissibility checks. A fetch still in flight counts as
    /// unknown, never as an empty day.
    pub fn day_bookings(&self) -> Option<DayBookings> {
        match &self.state {
            SnapshotState::NoDateSelected => None,
            SnapshotState::Fetching { .. } => Some(DayBookings::Unknown {
                reason: "bookings are still loading".to_string(),
            }),
            SnapshotState::Ready { bookings, .. } => Some(DayBookings::Known(bookings.clone())),
            SnapshotState::Unknown { reason, .. } => Some(DayBookings::Unknown { reason: reason.clone() }),
        }
    }
}

impl Default for DaySnapshotTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BookingStatus, PatientContact};
    use assert_matches::assert_matches;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 11, d).unwrap()
    }

    fn booking_on(d: u32) -> Booking {
        Booking::new(
            Vec::new(),
            day(d).and_hms_opt(7, 0, 0).unwrap(),
            BookingStatus::Confirmed,
            PatientContact {
                name: "Ana".to_string(),
                email: "ana@example.com".to_string(),
                phone: "5512345678".to_string(),
            },
        )
    }

    #[test]
    fn test_nothing_selected() {
        let tracker = DaySnapshotTracker::new();
        assert_eq!(tracker.day_bookings(), None);
        assert_eq!(tracker.selected_day(), None);
    }

    #[test]
    fn test_fetching_is_unknown() {
        let mut tracker = DaySnapshotTracker::new();
        tracker.select_day(day(3));

        assert_matches!(tracker.day_bookings(), Some(DayBookings::Unknown { .. }));
    }

    #[test]
    fn test_result_for_current_selection_applied() {
        let mut tracker = DaySnapshotTracker::new();
        let ticket = tracker.select_day(day(3));

        assert!(tracker.complete(ticket, Ok(vec![booking_on(3), booking_on(4)])));
        assert_matches!(tracker.day_bookings(), Some(DayBookings::Known(b)) if b.len() == 1);
    }

    #[test]
    fn test_stale_result_discarded() {
        let mut tracker = DaySnapshotTracker::new();
        let first = tracker.select_day(day(3));
        let second = tracker.select_day(day(4));

        assert!(!tracker.complete(first, Ok(vec![booking_on(3)])));
        assert_eq!(tracker.state(), &SnapshotState::Fetching { day: day(4) });

        assert!(tracker.complete(second, Ok(Vec::new())));
        assert_eq!(tracker.day_bookings(), Some(DayBookings::Known(Vec::new())));
    }

    #[test]
    fn test_reselecting_same_day_invalidates_older_fetch() {
        let mut tracker = DaySnapshotTracker::new();
        let first = tracker.select_day(day(3));
        let _second = tracker.select_day(day(3));

        assert!(!tracker.complete(first, Ok(Vec::new())));
    }

    #[test]
    fn test_failed_fetch_is_unknown() {
        let mut tracker = DaySnapshotTracker::new();
        let ticket = tracker.select_day(day(3));

        assert!(tracker.complete(ticket, Err(SchedulingError::Store("timeout".to_string()))));
        assert_matches!(
            tracker.day_bookings(),
            Some(DayBookings::Unknown { reason }) if reason.contains("timeout")
        );
    }

    #[test]
    fn test_clear_drops_in_flight_fetch() {
        let mut tracker = DaySnapshotTracker::new();
        let ticket = tracker.select_day(day(3));
        tracker.clear();

        assert!(!tracker.complete(ticket, Ok(Vec::new())));
        assert_eq!(tracker.state(), &SnapshotState::NoDateSelected);
    }
}
