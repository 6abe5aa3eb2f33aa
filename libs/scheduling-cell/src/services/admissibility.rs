// libs/scheduling-cell/src/services/admissibility.rs
use chrono::{NaiveDate, Weekday};
use std::sync::Arc;
use tracing::{debug, warn};

use procedure_cell::models::{Procedure, ProcedureCategory, SizeClass, SurgeryType};

use crate::models::{Booking, CapacityShape, SchedulingError, SizeCounts};
use crate::policy::SchedulingPolicy;

/// Decides whether a set of procedures fits on a day: weekday surgery class
/// and daily capacity shapes. Independent of clock time.
#[derive(Debug, Clone)]
pub struct AdmissibilityEngine {
    policy: Arc<SchedulingPolicy>,
}

impl AdmissibilityEngine {
    pub fn new(policy: Arc<SchedulingPolicy>) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &SchedulingPolicy {
        &self.policy
    }

    pub fn surgery_type_on(&self, weekday: Weekday) -> SurgeryType {
        self.policy.day_restrictions.surgery_type_for(weekday)
    }

    pub fn is_day_type_allowed(&self, category: ProcedureCategory, weekday: Weekday) -> bool {
        category.surgery_type() == self.surgery_type_on(weekday)
    }

    /// Every procedure must be allowed on the weekday. A mix of plastic and
    /// bariatric procedures is therefore never allowed.
    pub fn are_procedures_allowed_on(&self, procedures: &[Procedure], weekday: Weekday) -> bool {
        procedures
            .iter()
            .all(|p| self.is_day_type_allowed(p.category, weekday))
    }

    /// Tally every procedure of every non-cancelled booking by size.
    pub fn count_by_size(&self, bookings: &[Booking]) -> SizeCounts {
        let mut counts = SizeCounts::default();

        for booking in bookings.iter().filter(|b| b.holds_capacity()) {
            for procedure in &booking.procedures {
                counts.increment(procedure.size);
            }
        }

        counts
    }

    pub fn valid_shapes_for(&self, counts: &SizeCounts) -> Vec<&CapacityShape> {
        self.policy
            .shapes
            .iter()
            .filter(|shape| shape.admits(counts))
            .collect()
    }

    pub fn can_admit(&self, existing: &[Booking], candidates: &[Procedure]) -> bool {
        let existing_counts = self.count_by_size(existing);

        let mut counts = existing_counts;
        for candidate in candidates {
            counts.increment(candidate.size);
        }

        let shapes = self.valid_shapes_for(&counts);

        debug!(
            "Capacity check for {} candidates: existing {}, total {}, admitting shapes {:?}",
            candidates.len(),
            existing_counts,
            counts,
            shapes.iter().map(|s| s.name.as_str()).collect::<Vec<_>>()
        );

        !shapes.is_empty()
    }

    /// Per size, how many more units fit while the other two sizes stay put.
    /// Found by adding one unit at a time, since zero limits couple the sizes.
    pub fn remaining_capacity(&self, existing: &[Booking]) -> SizeCounts {
        let counts = self.count_by_size(existing);
        self.remaining_capacity_for(&counts)
    }

    pub fn remaining_capacity_for(&self, counts: &SizeCounts) -> SizeCounts {
        let mut remaining = SizeCounts::default();

        if self.valid_shapes_for(counts).is_empty() {
            return remaining;
        }

        for size in SizeClass::ALL {
            let ceiling = self.policy.max_limit(size);
            let mut fits = 0;
            for extra in 1..=ceiling {
                if self.valid_shapes_for(&counts.plus(size, extra)).is_empty() {
                    break;
                }
                fits = extra;
            }
            remaining.set(size, fits);
        }

        remaining
    }

    /// Committed bookings must always fit some shape. A violation means data
    /// was written around the engine; it is reported, never corrected.
    pub fn verify_committed(&self, day: NaiveDate, bookings: &[Booking]) -> Result<Vec<&CapacityShape>, SchedulingError> {
        let on_day: Vec<Booking> = bookings
            .iter()
            .filter(|b| b.day() == day)
            .cloned()
            .collect();
        let counts = self.count_by_size(&on_day);
        let shapes = self.valid_shapes_for(&counts);

        if shapes.is_empty() {
            warn!("Capacity invariant violated on {}: {}", day, counts);
            return Err(SchedulingError::CapacityInvariant { day, counts });
        }

        Ok(shapes)
    }
}
