use chrono::NaiveDate;
use pass_planner::{
    DayClassifier, OverrideSet, OverrideState, WeekStart, WeekdayRules,
};
use std::collections::BTreeSet;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

#[test]
fn toggling_a_natural_workday_forces_a_holiday() {
    let mut overrides = OverrideSet::new();
    let tuesday = date(2025, 9, 2);
    assert_eq!(overrides.toggle(tuesday, false), OverrideState::ForcedHoliday);
    assert!(overrides.is_forced_holiday(tuesday));
    assert!(!overrides.is_forced_workday(tuesday));
}

#[test]
fn toggling_a_natural_holiday_forces_a_workday() {
    let mut overrides = OverrideSet::new();
    let saturday = date(2025, 9, 6);
    assert_eq!(overrides.toggle(saturday, true), OverrideState::ForcedWorkday);
    assert!(overrides.is_forced_workday(saturday));
}

#[test]
fn toggling_twice_returns_to_unset() {
    let mut overrides = OverrideSet::new();
    let day = date(2025, 9, 2);
    overrides.toggle(day, false);
    assert_eq!(overrides.toggle(day, false), OverrideState::Unset);
    assert_eq!(overrides.state(day), OverrideState::Unset);
    assert!(overrides.is_empty());
}

#[test]
fn toggling_twice_restores_the_classification() {
    let rules = WeekdayRules::default();
    let national: BTreeSet<NaiveDate> = BTreeSet::new();
    let mut overrides = OverrideSet::new();
    let saturday = date(2025, 9, 6);

    let before = DayClassifier::new(&rules, &overrides, &national, WeekStart::Sunday)
        .is_holiday(saturday);

    let baseline = DayClassifier::new(&rules, &overrides, &national, WeekStart::Sunday)
        .baseline_is_holiday(saturday);
    overrides.toggle(saturday, baseline);
    let flipped = DayClassifier::new(&rules, &overrides, &national, WeekStart::Sunday)
        .is_holiday(saturday);
    assert_ne!(before, flipped);

    overrides.toggle(saturday, baseline);
    let after = DayClassifier::new(&rules, &overrides, &national, WeekStart::Sunday)
        .is_holiday(saturday);
    assert_eq!(before, after);
}

#[test]
fn the_two_sets_stay_disjoint_through_any_sequence() {
    let mut overrides = OverrideSet::new();
    let days = [
        (date(2025, 9, 1), false),
        (date(2025, 9, 6), true),
        (date(2025, 9, 1), false),
        (date(2025, 9, 6), true),
        (date(2025, 9, 6), false),
        (date(2025, 9, 13), true),
        (date(2025, 9, 13), false),
        (date(2025, 9, 13), true),
    ];
    for (day, baseline) in days {
        overrides.toggle(day, baseline);
        let both: Vec<_> = overrides
            .forced_holidays()
            .intersection(overrides.forced_workdays())
            .collect();
        assert!(both.is_empty(), "sets overlap after toggling {day}");
    }
}

#[test]
fn clear_removes_either_kind_of_override() {
    let mut overrides = OverrideSet::new();
    let holiday = date(2025, 9, 2);
    let workday = date(2025, 9, 6);
    overrides.toggle(holiday, false);
    overrides.toggle(workday, true);

    assert!(overrides.clear(holiday));
    assert!(overrides.clear(workday));
    assert!(!overrides.clear(date(2025, 9, 20)));
    assert!(overrides.is_empty());
}

#[test]
fn from_parts_drops_conflicts_in_favor_of_the_workday_side() {
    let day = date(2025, 9, 3);
    let overrides = OverrideSet::from_parts(
        [day, date(2025, 9, 4)].into_iter().collect(),
        [day].into_iter().collect(),
    );
    assert!(overrides.is_forced_workday(day));
    assert!(!overrides.is_forced_holiday(day));
    assert!(overrides.is_forced_holiday(date(2025, 9, 4)));
}
