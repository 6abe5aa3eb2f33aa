// libs/appointment-cell/src/services/lifecycle.rs
use tracing::{debug, warn};

use scheduling_cell::models::BookingStatus;

use crate::models::{AdminAction, AppointmentError};

pub struct AppointmentLifecycleService;

impl AppointmentLifecycleService {
    pub fn new() -> Self {
        Self
    }

    /// Status the booking moves to, if `action` is allowed from `current`.
    pub fn validate_action(
        &self,
        current: BookingStatus,
        action: AdminAction,
    ) -> Result<BookingStatus, AppointmentError> {
        debug!("Validating {} on a {} appointment", action, current);

        if !self.get_valid_actions(current).contains(&action) {
            warn!("Invalid status transition attempted: {} on {}", action, current);
            return Err(AppointmentError::InvalidStatusTransition { from: current, action });
        }

        Ok(action.target_status())
    }

    pub fn get_valid_actions(&self, current: BookingStatus) -> Vec<AdminAction> {
        match current {
            BookingStatus::Pending => vec![AdminAction::Authorize, AdminAction::Cancel],
            BookingStatus::Confirmed => vec![AdminAction::Cancel],
            BookingStatus::Cancelled => vec![AdminAction::Reactivate],
        }
    }

    /// A cancelled booking re-enters the day's capacity when it comes back,
    /// so it has to be admitted again.
    pub fn requires_capacity_check(&self, current: BookingStatus, action: AdminAction) -> bool {
        !current.holds_capacity() && action.target_status().holds_capacity()
    }

    pub fn can_reschedule(&self, current: BookingStatus) -> bool {
        current.holds_capacity()
    }
}

impl Default for AppointmentLifecycleService {
    fn default() -> Self {
        Self::new()
    }
}
