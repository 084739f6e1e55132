use chrono::{NaiveDate, Weekday};
use pass_planner::{
    DayClass, DayClassifier, DayRule, OverrideSet, WeekStart, WeekdayRules, date_key,
    parse_date_key, week_number,
};
use std::collections::BTreeSet;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

#[test]
fn date_key_round_trips_exactly() {
    let day = date(2025, 9, 1);
    assert_eq!(date_key(day), "2025-09-01");
    assert_eq!(parse_date_key(&date_key(day)), Some(day));
    // single-digit month and day keep their zero padding
    let padded = date(2026, 1, 5);
    assert_eq!(date_key(padded), "2026-01-05");
    assert_eq!(parse_date_key("2026-01-05"), Some(padded));
}

#[test]
fn parse_date_key_rejects_garbage() {
    assert_eq!(parse_date_key(""), None);
    assert_eq!(parse_date_key("not-a-date"), None);
    assert_eq!(parse_date_key("2025-13-01"), None);
    assert_eq!(parse_date_key("2025-02-30"), None);
}

#[test]
fn week_number_first_of_month_is_week_one() {
    // September 2025 starts on a Monday
    assert_eq!(week_number(date(2025, 9, 1), WeekStart::Sunday), 1);
    assert_eq!(week_number(date(2025, 9, 1), WeekStart::Monday), 1);
}

#[test]
fn week_number_depends_on_week_start() {
    // 2025-09-07 is the first Sunday of the month. Counting weeks from
    // Sunday it opens week 2; counting from Monday it closes week 1.
    let first_sunday = date(2025, 9, 7);
    assert_eq!(week_number(first_sunday, WeekStart::Sunday), 2);
    assert_eq!(week_number(first_sunday, WeekStart::Monday), 1);
}

fn classifier_parts() -> (WeekdayRules, OverrideSet, BTreeSet<NaiveDate>) {
    (WeekdayRules::default(), OverrideSet::new(), BTreeSet::new())
}

#[test]
fn default_rules_make_weekends_holidays() {
    let (rules, overrides, national) = classifier_parts();
    let classifier = DayClassifier::new(&rules, &overrides, &national, WeekStart::Sunday);
    // 2025-09-01 is a Monday; scan that whole week
    for offset in 0..7u64 {
        let day = date(2025, 9, 1) + chrono::Duration::days(offset as i64);
        let expected = matches!(day.format("%a").to_string().as_str(), "Sat" | "Sun");
        assert_eq!(classifier.is_holiday(day), expected, "day {day}");
    }
}

#[test]
fn biweekly_odd_saturdays_with_monday_week_start() {
    let mut rules = WeekdayRules::all_work();
    rules.set_rule(Weekday::Sat, DayRule::BiweeklyOddHoliday);
    let overrides = OverrideSet::new();
    let national = BTreeSet::new();
    let classifier = DayClassifier::new(&rules, &overrides, &national, WeekStart::Monday);

    // September 2025 Saturdays fall on the 6th, 13th, 20th and 27th.
    assert!(classifier.is_holiday(date(2025, 9, 6)));
    assert!(!classifier.is_holiday(date(2025, 9, 13)));
    assert!(classifier.is_holiday(date(2025, 9, 20)));
    assert!(!classifier.is_holiday(date(2025, 9, 27)));
}

#[test]
fn biweekly_even_rule_complements_odd() {
    let mut rules = WeekdayRules::all_work();
    rules.set_rule(Weekday::Sat, DayRule::BiweeklyEvenHoliday);
    let overrides = OverrideSet::new();
    let national = BTreeSet::new();
    let classifier = DayClassifier::new(&rules, &overrides, &national, WeekStart::Monday);

    assert!(!classifier.is_holiday(date(2025, 9, 6)));
    assert!(classifier.is_holiday(date(2025, 9, 13)));
    assert!(!classifier.is_holiday(date(2025, 9, 20)));
    assert!(classifier.is_holiday(date(2025, 9, 27)));
}

#[test]
fn forced_workday_overrides_national_holiday() {
    let rules = WeekdayRules::all_work();
    let holiday = date(2025, 7, 4);
    let national: BTreeSet<NaiveDate> = [holiday].into_iter().collect();
    let mut overrides = OverrideSet::new();
    overrides.toggle(holiday, true);

    let classifier = DayClassifier::new(&rules, &overrides, &national, WeekStart::Sunday);
    assert_eq!(classifier.classify(holiday), DayClass::ForcedWorkday);
    assert!(!classifier.is_holiday(holiday));
}

#[test]
fn forced_workday_wins_when_storage_delivers_a_conflict() {
    let day = date(2025, 9, 3);
    let overrides = OverrideSet::from_parts(
        [day].into_iter().collect(),
        [day].into_iter().collect(),
    );
    let rules = WeekdayRules::all_work();
    let national = BTreeSet::new();
    let classifier = DayClassifier::new(&rules, &overrides, &national, WeekStart::Sunday);
    assert_eq!(classifier.classify(day), DayClass::ForcedWorkday);
}

#[test]
fn forced_holiday_overrides_work_rule() {
    let rules = WeekdayRules::all_work();
    let tuesday = date(2025, 9, 2);
    let mut overrides = OverrideSet::new();
    overrides.toggle(tuesday, false);
    let national = BTreeSet::new();

    let classifier = DayClassifier::new(&rules, &overrides, &national, WeekStart::Sunday);
    assert_eq!(classifier.classify(tuesday), DayClass::ForcedHoliday);
}

#[test]
fn national_holiday_overrides_work_rule() {
    let rules = WeekdayRules::all_work();
    let overrides = OverrideSet::new();
    let holiday = date(2025, 12, 25);
    let national: BTreeSet<NaiveDate> = [holiday].into_iter().collect();

    let classifier = DayClassifier::new(&rules, &overrides, &national, WeekStart::Sunday);
    assert_eq!(classifier.classify(holiday), DayClass::NationalHoliday);
    assert!(classifier.is_holiday(holiday));
}

#[test]
fn unparseable_key_is_never_a_holiday() {
    let (rules, overrides, national) = classifier_parts();
    let classifier = DayClassifier::new(&rules, &overrides, &national, WeekStart::Sunday);
    assert!(!classifier.is_holiday_key("2025-99-99"));
    assert!(!classifier.is_holiday_key("yesterday"));
    assert!(!classifier.is_holiday_key(""));
    // a valid weekend key still resolves
    assert!(classifier.is_holiday_key("2025-09-06"));
}

#[test]
fn baseline_ignores_the_override_layer() {
    let (rules, _, national) = classifier_parts();
    let saturday = date(2025, 9, 6);
    let mut overrides = OverrideSet::new();
    overrides.toggle(saturday, true);

    let classifier = DayClassifier::new(&rules, &overrides, &national, WeekStart::Sunday);
    assert!(!classifier.is_holiday(saturday));
    assert!(classifier.baseline_is_holiday(saturday));
}
