use std::sync::Arc;

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use procedure_cell::models::{Procedure, ProcedureCategory, SizeClass, SizeThresholds, SurgeryType};
use procedure_cell::services::ProcedureCatalogue;
use scheduling_cell::models::{Booking, BookingStatus, DayBookings, DayConstraints, PatientContact, SizeCounts, SlotTime};
use scheduling_cell::policy::SchedulingPolicy;
use scheduling_cell::services::{intervals_overlap, AdmissibilityEngine, SlotNegotiator};

fn engine() -> AdmissibilityEngine {
    AdmissibilityEngine::new(Arc::new(SchedulingPolicy::clinic_default()))
}

fn sized(size: SizeClass, n: usize) -> Vec<Procedure> {
    let minutes = match size {
        SizeClass::Small => 45,
        SizeClass::Medium => 150,
        SizeClass::Large => 210,
    };
    (0..n)
        .map(|i| {
            Procedure::new(
                format!("{}-{}", size, i),
                "Procedimiento",
                minutes,
                ProcedureCategory::Corporal,
                &SizeThresholds::default(),
            )
            .unwrap()
        })
        .collect()
}

fn booking(procedures: Vec<Procedure>, status: BookingStatus) -> Booking {
    Booking::new(
        procedures,
        NaiveDate::from_ymd_opt(2026, 10, 28).unwrap().and_hms_opt(6, 0, 0).unwrap(),
        status,
        PatientContact {
            name: "Carmen".to_string(),
            email: "carmen@example.com".to_string(),
            phone: "5511122233".to_string(),
        },
    )
}

#[test]
fn test_ten_small_on_empty_day() {
    assert!(engine().can_admit(&[], &sized(SizeClass::Small, 10)));
    assert!(!engine().can_admit(&[], &sized(SizeClass::Small, 11)));
}

#[test]
fn test_three_large_three_medium_then_small() {
    let engine = engine();
    let mut existing_procs = sized(SizeClass::Large, 3);
    existing_procs.extend(sized(SizeClass::Medium, 3));
    let existing = vec![booking(existing_procs, BookingStatus::Confirmed)];

    assert!(engine.can_admit(&existing, &sized(SizeClass::Small, 4)));
    assert!(!engine.can_admit(&existing, &sized(SizeClass::Small, 5)));
}

#[test]
fn test_cancelled_booking_frees_capacity() {
    let engine = engine();
    let existing = vec![
        booking(sized(SizeClass::Large, 3), BookingStatus::Cancelled),
        booking(sized(SizeClass::Large, 3), BookingStatus::Pending),
    ];

    assert_eq!(engine.count_by_size(&existing), SizeCounts::new(3, 0, 0));
    assert!(!engine.can_admit(&existing, &sized(SizeClass::Large, 1)));
}

#[test]
fn test_shapes_are_never_applied_partially() {
    let engine = engine();

    // 4 medium only fits Arreglo 3, which allows no large
    assert!(!engine.can_admit(&[booking(sized(SizeClass::Medium, 4), BookingStatus::Confirmed)], &sized(SizeClass::Large, 1)));
    // 8 small only fits Arreglo 4, which takes nothing else
    let existing = vec![booking(sized(SizeClass::Small, 8), BookingStatus::Confirmed)];
    assert!(!engine.can_admit(&existing, &sized(SizeClass::Medium, 1)));
    assert!(!engine.can_admit(&existing, &sized(SizeClass::Large, 1)));
    assert!(engine.can_admit(&existing, &sized(SizeClass::Small, 2)));
}

#[test]
fn test_day_type_is_a_total_partition() {
    let engine = engine();
    for weekday in [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ] {
        let plastic = engine.is_day_type_allowed(ProcedureCategory::Facial, weekday);
        let bariatric = engine.is_day_type_allowed(ProcedureCategory::Bariatric, weekday);
        assert!(plastic ^ bariatric, "{} must take exactly one surgery type", weekday);
        assert_eq!(
            engine.is_day_type_allowed(ProcedureCategory::Corporal, weekday),
            plastic
        );
    }
    assert_eq!(engine.surgery_type_on(Weekday::Tue), SurgeryType::Plastic);
    assert_eq!(engine.surgery_type_on(Weekday::Mon), SurgeryType::Bariatric);
}

#[test]
fn test_mixed_plastic_and_bariatric_never_allowed() {
    let engine = engine();
    let catalogue = ProcedureCatalogue::standard().unwrap();
    let mixed = catalogue.resolve(&["rhinoplasty", "gastric-sleeve"]).unwrap();

    for offset in 0..7 {
        let day = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap() + Duration::days(offset);
        assert!(!engine.are_procedures_allowed_on(&mixed, day.weekday()));
    }
}

#[test]
fn test_overlap_symmetry() {
    let day = NaiveDate::from_ymd_opt(2026, 10, 28).unwrap();
    let at = |h: u32, m: u32| day.and_hms_opt(h, m, 0).unwrap();
    let intervals = [
        (at(6, 0), at(8, 0)),
        (at(7, 30), at(9, 0)),
        (at(8, 0), at(10, 0)),
        (at(6, 30), at(7, 0)),
    ];

    for a in intervals {
        for b in intervals {
            assert_eq!(intervals_overlap(a.0, a.1, b.0, b.1), intervals_overlap(b.0, b.1, a.0, a.1));
        }
    }
}

#[test]
fn test_remaining_capacity_on_empty_day() {
    assert_eq!(engine().remaining_capacity(&[]), SizeCounts::new(3, 5, 10));
}

#[test]
fn test_can_admit_is_idempotent() {
    let engine = engine();
    let existing = vec![booking(sized(SizeClass::Medium, 2), BookingStatus::Confirmed)];
    let candidates = sized(SizeClass::Small, 5);

    let first = engine.can_admit(&existing, &candidates);
    let second = engine.can_admit(&existing, &candidates);
    assert_eq!(first, second);
    assert_eq!(engine.policy(), &SchedulingPolicy::clinic_default());
}

#[test]
fn test_booking_wizard_and_reschedule_share_the_evaluator() {
    let negotiator = SlotNegotiator::new(engine());
    let catalogue = ProcedureCatalogue::standard().unwrap();
    let candidates = catalogue.resolve(&["liposuction"]).unwrap();
    // Wednesday
    let day = NaiveDate::from_ymd_opt(2026, 10, 28).unwrap();
    let existing = booking(catalogue.resolve(&["breast-lift"]).unwrap(), BookingStatus::Confirmed);
    let bookings = DayBookings::Known(vec![existing]);

    let availability = negotiator
        .evaluate_day(day, &bookings, &candidates, DayConstraints::default())
        .unwrap();

    // breast lift occupies 6:00-8:30; liposuction needs 3h and must end by 16:00
    let first_open = availability.available_slots().next().unwrap();
    assert_eq!(first_open.time, SlotTime::new(8, 30));
    assert_eq!(
        negotiator.check_slot(day, SlotTime::new(8, 30), &bookings, &candidates, DayConstraints::default()),
        Ok(())
    );
}

#[test]
fn test_policy_thresholds_drive_engine_sizes() {
    let policy = SchedulingPolicy {
        size_thresholds: SizeThresholds {
            small_max_minutes: 30,
            medium_max_minutes: 120,
        },
        ..SchedulingPolicy::clinic_default()
    };
    let catalogue = policy.procedure_catalogue().unwrap();
    let engine = AdmissibilityEngine::new(Arc::new(policy));

    let existing = vec![booking(catalogue.resolve(&["liposuction"]).unwrap(), BookingStatus::Confirmed)];
    assert_eq!(engine.count_by_size(&existing), SizeCounts::new(1, 0, 0));

    // liposuction counts as large here, which leaves only Arreglo 1 for medium work
    let medium = catalogue.resolve(&["blepharoplasty"]).unwrap();
    assert_eq!(engine.remaining_capacity(&existing).medium, 3);
    assert!(engine.can_admit(&existing, &medium));
}
