// libs/appointment-cell/src/state.rs
use std::sync::Arc;

use procedure_cell::services::ProcedureCatalogue;
use scheduling_cell::policy::SchedulingPolicy;
use scheduling_cell::services::{AdmissibilityEngine, BookingStore, SlotNegotiator};
use shared_config::AppConfig;

use crate::models::AppointmentError;
use crate::services::store::SupabaseBookingStore;
use crate::services::validation::ContactValidator;

/// Everything the appointment handlers share across requests.
#[derive(Clone)]
pub struct AppointmentState {
    pub config: Arc<AppConfig>,
    pub catalogue: Arc<ProcedureCatalogue>,
    pub policy: Arc<SchedulingPolicy>,
    pub store: Arc<dyn BookingStore>,
    pub validator: Arc<ContactValidator>,
}

impl AppointmentState {
    pub fn new(
        config: Arc<AppConfig>,
        catalogue: Arc<ProcedureCatalogue>,
        policy: Arc<SchedulingPolicy>,
    ) -> Result<Self, AppointmentError> {
        let store: Arc<dyn BookingStore> = Arc::new(SupabaseBookingStore::new(&config, Arc::clone(&catalogue)));
        Self::with_store(config, catalogue, policy, store)
    }

    /// The catalogue must be sized with the policy's thresholds, otherwise
    /// the engine would count procedures under a different size class than
    /// the policy defines.
    pub fn with_store(
        config: Arc<AppConfig>,
        catalogue: Arc<ProcedureCatalogue>,
        policy: Arc<SchedulingPolicy>,
        store: Arc<dyn BookingStore>,
    ) -> Result<Self, AppointmentError> {
        if catalogue.thresholds() != &policy.size_thresholds {
            return Err(AppointmentError::ValidationError(format!(
                "catalogue size thresholds {:?} differ from the scheduling policy's {:?}",
                catalogue.thresholds(),
                policy.size_thresholds
            )));
        }

        let validator = Arc::new(ContactValidator::new()?);
        Ok(Self { config, catalogue, policy, store, validator })
    }

    pub fn negotiator(&self) -> SlotNegotiator {
        SlotNegotiator::new(AdmissibilityEngine::new(Arc::clone(&self.policy)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use procedure_cell::models::SizeThresholds;
    use shared_utils::test_utils::TestConfig;

    #[test]
    fn test_state_from_policy_catalogue() {
        let config = TestConfig::default().to_arc();
        let policy = SchedulingPolicy::from_config(&config).unwrap();
        let catalogue = policy.procedure_catalogue().unwrap();

        assert!(AppointmentState::new(config, Arc::new(catalogue), Arc::new(policy)).is_ok());
    }

    #[test]
    fn test_state_rejects_catalogue_with_other_thresholds() {
        let config = TestConfig::default().to_arc();
        let policy = SchedulingPolicy {
            size_thresholds: SizeThresholds {
                small_max_minutes: 30,
                medium_max_minutes: 120,
            },
            ..SchedulingPolicy::from_config(&config).unwrap()
        };
        let catalogue = ProcedureCatalogue::standard().unwrap();

        assert_matches!(
            AppointmentState::new(config, Arc::new(catalogue), Arc::new(policy)).err(),
            Some(AppointmentError::ValidationError(_))
        );
    }
}
