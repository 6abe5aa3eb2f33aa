// libs/scheduling-cell/src/policy.rs
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use procedure_cell::models::{CatalogueError, SizeClass, SizeThresholds, SurgeryType};
use procedure_cell::services::ProcedureCatalogue;
use shared_config::AppConfig;

use crate::models::{CapacityShape, SchedulingError, SlotTime};

const ALL_WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Weekday to surgery-class mapping. Days listed in `plastic_days` take
/// plastic surgery, every other weekday takes bariatric, so each weekday has
/// exactly one class.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DayRestrictions {
    pub plastic_days: Vec<Weekday>,
}

impl DayRestrictions {
    pub fn new(plastic_days: Vec<Weekday>) -> Self {
        Self { plastic_days }
    }

    pub fn surgery_type_for(&self, weekday: Weekday) -> SurgeryType {
        if self.plastic_days.contains(&weekday) {
            SurgeryType::Plastic
        } else {
            SurgeryType::Bariatric
        }
    }

    /// Plastic days form one run of consecutive weekdays, possibly wrapping
    /// from Sunday to Monday.
    pub fn is_contiguous(&self) -> bool {
        let runs = self
            .plastic_days
            .iter()
            .filter(|day| !self.plastic_days.contains(&day.pred()))
            .count();
        runs == 1
    }

    pub fn days_for(&self, surgery_type: SurgeryType) -> Vec<Weekday> {
        ALL_WEEKDAYS
            .iter()
            .copied()
            .filter(|&day| self.surgery_type_for(day) == surgery_type)
            .collect()
    }
}

impl Default for DayRestrictions {
    fn default() -> Self {
        // Tuesday to Thursday plastic, Friday to Monday bariatric
        Self::new(vec![Weekday::Tue, Weekday::Wed, Weekday::Thu])
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BusinessHours {
    pub open: NaiveTime,
    pub close: NaiveTime,
}

impl BusinessHours {
    pub fn from_hours(open_hour: u32, close_hour: u32) -> Result<Self, SchedulingError> {
        let open = NaiveTime::from_hms_opt(open_hour, 0, 0)
            .ok_or_else(|| SchedulingError::InvalidPolicy(format!("invalid opening hour {}", open_hour)))?;
        let close = NaiveTime::from_hms_opt(close_hour, 0, 0)
            .ok_or_else(|| SchedulingError::InvalidPolicy(format!("invalid closing hour {}", close_hour)))?;

        Ok(Self { open, close })
    }

    pub fn opening_on(&self, day: NaiveDate) -> NaiveDateTime {
        day.and_time(self.open)
    }

    pub fn closing_on(&self, day: NaiveDate) -> NaiveDateTime {
        day.and_time(self.close)
    }
}

/// Every clinic-specific scheduling rule in one immutable value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SchedulingPolicy {
    pub shapes: Vec<CapacityShape>,
    pub day_restrictions: DayRestrictions,
    pub business_hours: BusinessHours,
    pub slot_granularity_minutes: u32,
    pub min_lead_days: u32,
    pub size_thresholds: SizeThresholds,
}

impl SchedulingPolicy {
    /// The clinic's standing rules: four daily arrangements, plastic surgery
    /// Tuesday to Thursday, 6:00 to 16:00 in half-hour slots, one week lead time.
    pub fn clinic_default() -> Self {
        Self {
            shapes: vec![
                CapacityShape::new("Arreglo 1", 3, 3, 4),
                CapacityShape::new("Arreglo 2", 3, 0, 7),
                CapacityShape::new("Arreglo 3", 0, 5, 6),
                CapacityShape::new("Arreglo 4", 0, 0, 10),
            ],
            day_restrictions: DayRestrictions::default(),
            business_hours: BusinessHours {
                open: NaiveTime::from_hms_opt(6, 0, 0).unwrap_or(NaiveTime::MIN),
                close: NaiveTime::from_hms_opt(16, 0, 0).unwrap_or(NaiveTime::MIN),
            },
            slot_granularity_minutes: 30,
            min_lead_days: 7,
            size_thresholds: SizeThresholds::default(),
        }
    }

    /// Clinic defaults overlaid with the environment's hour, slot, lead-time
    /// and size-threshold settings.
    pub fn from_config(config: &AppConfig) -> Result<Self, SchedulingError> {
        let policy = Self {
            business_hours: BusinessHours::from_hours(config.business_open_hour, config.business_close_hour)?,
            slot_granularity_minutes: config.slot_granularity_minutes,
            min_lead_days: config.min_lead_days,
            size_thresholds: SizeThresholds {
                small_max_minutes: config.size_small_max_minutes,
                medium_max_minutes: config.size_medium_max_minutes,
            },
            ..Self::clinic_default()
        };

        policy.validate()?;
        info!(
            "Scheduling policy: {} shapes, hours {}-{}, {} minute slots, {} lead days",
            policy.shapes.len(),
            policy.business_hours.open,
            policy.business_hours.close,
            policy.slot_granularity_minutes,
            policy.min_lead_days
        );

        Ok(policy)
    }

    pub fn validate(&self) -> Result<(), SchedulingError> {
        if self.shapes.is_empty() {
            return Err(SchedulingError::InvalidPolicy("at least one capacity shape is required".to_string()));
        }

        if self.business_hours.open >= self.business_hours.close {
            return Err(SchedulingError::InvalidPolicy("business hours must open before they close".to_string()));
        }

        if self.slot_granularity_minutes == 0 || 60 % self.slot_granularity_minutes != 0 {
            return Err(SchedulingError::InvalidPolicy(format!(
                "slot granularity must divide an hour, got {} minutes",
                self.slot_granularity_minutes
            )));
        }

        let plastic = &self.day_restrictions.plastic_days;
        if plastic.is_empty() || plastic.len() >= ALL_WEEKDAYS.len() {
            return Err(SchedulingError::InvalidPolicy(
                "both plastic and bariatric surgery need at least one weekday".to_string(),
            ));
        }
        for (i, day) in plastic.iter().enumerate() {
            if plastic[..i].contains(day) {
                return Err(SchedulingError::InvalidPolicy(format!("weekday {} listed twice", day)));
            }
        }
        if !self.day_restrictions.is_contiguous() {
            return Err(SchedulingError::InvalidPolicy(
                "plastic surgery weekdays must be consecutive".to_string(),
            ));
        }

        if self.size_thresholds.small_max_minutes >= self.size_thresholds.medium_max_minutes {
            return Err(SchedulingError::InvalidPolicy("size thresholds must be increasing".to_string()));
        }

        debug!("Scheduling policy validated");
        Ok(())
    }

    /// The clinic catalogue sized with this policy's thresholds. Engines and
    /// catalogues built from the same policy agree on every size class.
    pub fn procedure_catalogue(&self) -> Result<ProcedureCatalogue, CatalogueError> {
        ProcedureCatalogue::standard_with_thresholds(self.size_thresholds)
    }

    /// Largest limit any shape grants for `size`.
    pub fn max_limit(&self, size: SizeClass) -> u32 {
        self.shapes.iter().map(|s| s.limit(size)).max().unwrap_or(0)
    }

    /// Offered start times from opening until closing, at the configured granularity.
    pub fn time_slots(&self) -> Vec<SlotTime> {
        let step = i64::from(self.slot_granularity_minutes.max(1));
        let open = self.business_hours.open;
        let close = self.business_hours.close;

        let mut slots = Vec::new();
        let mut offset = 0i64;
        loop {
            let (time, wrapped) = open.overflowing_add_signed(Duration::minutes(offset));
            if wrapped != 0 || time >= close {
                break;
            }
            slots.push(SlotTime::new(time.hour(), time.minute()));
            offset += step;
        }
        slots
    }

    pub fn earliest_bookable_day(&self, today: NaiveDate) -> NaiveDate {
        today + Duration::days(i64::from(self.min_lead_days))
    }
}

impl Default for SchedulingPolicy {
    fn default() -> Self {
        Self::clinic_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_clinic_default_is_valid() {
        assert!(SchedulingPolicy::clinic_default().validate().is_ok());
    }

    #[test]
    fn test_day_restrictions_partition_every_weekday() {
        let restrictions = DayRestrictions::default();

        assert_eq!(restrictions.days_for(SurgeryType::Plastic), vec![Weekday::Tue, Weekday::Wed, Weekday::Thu]);
        assert_eq!(
            restrictions.days_for(SurgeryType::Bariatric),
            vec![Weekday::Mon, Weekday::Fri, Weekday::Sat, Weekday::Sun]
        );
    }

    #[test]
    fn test_time_slots_half_hour() {
        let slots = SchedulingPolicy::clinic_default().time_slots();

        assert_eq!(slots.len(), 20);
        assert_eq!(slots.first(), Some(&SlotTime::new(6, 0)));
        assert_eq!(slots.last(), Some(&SlotTime::new(15, 30)));
    }

    #[test]
    fn test_time_slots_quarter_hour() {
        let policy = SchedulingPolicy {
            slot_granularity_minutes: 15,
            ..SchedulingPolicy::clinic_default()
        };

        let slots = policy.time_slots();
        assert_eq!(slots.len(), 40);
        assert_eq!(slots[1], SlotTime::new(6, 15));
    }

    #[test]
    fn test_invalid_granularity_rejected() {
        let policy = SchedulingPolicy {
            slot_granularity_minutes: 25,
            ..SchedulingPolicy::clinic_default()
        };

        assert_matches!(policy.validate(), Err(SchedulingError::InvalidPolicy(_)));
    }

    #[test]
    fn test_all_plastic_week_rejected() {
        let policy = SchedulingPolicy {
            day_restrictions: DayRestrictions::new(ALL_WEEKDAYS.to_vec()),
            ..SchedulingPolicy::clinic_default()
        };

        assert_matches!(policy.validate(), Err(SchedulingError::InvalidPolicy(_)));
    }

    #[test]
    fn test_inverted_hours_rejected() {
        assert_matches!(
            BusinessHours::from_hours(16, 6).map(|hours| SchedulingPolicy {
                business_hours: hours,
                ..SchedulingPolicy::clinic_default()
            }.validate()),
            Ok(Err(SchedulingError::InvalidPolicy(_)))
        );
        assert_matches!(BusinessHours::from_hours(25, 26), Err(SchedulingError::InvalidPolicy(_)));
    }

    #[test]
    fn test_closing_hour_must_be_a_time_of_day() {
        assert_matches!(BusinessHours::from_hours(6, 24), Err(SchedulingError::InvalidPolicy(_)));
        assert!(BusinessHours::from_hours(6, 23).is_ok());
    }

    #[test]
    fn test_split_plastic_days_rejected() {
        let policy = SchedulingPolicy {
            day_restrictions: DayRestrictions::new(vec![Weekday::Mon, Weekday::Thu]),
            ..SchedulingPolicy::clinic_default()
        };

        assert_matches!(policy.validate(), Err(SchedulingError::InvalidPolicy(_)));
    }

    #[test]
    fn test_plastic_days_may_wrap_the_week() {
        let restrictions = DayRestrictions::new(vec![Weekday::Sat, Weekday::Sun, Weekday::Mon]);
        assert!(restrictions.is_contiguous());

        let policy = SchedulingPolicy {
            day_restrictions: restrictions,
            ..SchedulingPolicy::clinic_default()
        };
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn test_catalogue_follows_policy_thresholds() {
        let policy = SchedulingPolicy {
            size_thresholds: SizeThresholds {
                small_max_minutes: 30,
                medium_max_minutes: 120,
            },
            ..SchedulingPolicy::clinic_default()
        };

        let catalogue = policy.procedure_catalogue().unwrap();
        assert_eq!(catalogue.thresholds(), &policy.size_thresholds);
        assert_eq!(catalogue.get("liposuction").map(|p| p.size), Some(SizeClass::Large));
        assert_eq!(catalogue.get("rhinoplasty").map(|p| p.size), Some(SizeClass::Medium));
    }

    #[test]
    fn test_max_limits() {
        let policy = SchedulingPolicy::clinic_default();

        assert_eq!(policy.max_limit(SizeClass::Large), 3);
        assert_eq!(policy.max_limit(SizeClass::Medium), 5);
        assert_eq!(policy.max_limit(SizeClass::Small), 10);
    }

    #[test]
    fn test_earliest_bookable_day() {
        let policy = SchedulingPolicy::clinic_default();
        let today = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();

        assert_eq!(policy.earliest_bookable_day(today), NaiveDate::from_ymd_opt(2026, 10, 24).unwrap());
    }
}
