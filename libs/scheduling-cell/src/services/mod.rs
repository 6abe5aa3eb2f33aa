pub mod admissibility;
pub mod negotiator;
pub mod snapshot;
pub mod store;

pub use admissibility::AdmissibilityEngine;
pub use negotiator::{intervals_overlap, validate_candidates, SlotNegotiator};
pub use snapshot::{DaySnapshotTracker, FetchTicket, SnapshotState};
pub use store::{BookingFilter, BookingStore};
