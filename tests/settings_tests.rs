use chrono::{NaiveDate, Weekday};
use pass_planner::{
    DayRule, KeyValueStore, LicensePlan, MemoryKeyValueStore, OverrideSet, PassKind, Settings,
    WeekStart,
};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

#[test]
fn missing_entries_read_as_defaults() {
    let settings = Settings::in_memory();
    assert_eq!(settings.fare().unwrap(), None);
    assert_eq!(settings.start_date().unwrap(), None);
    assert!(settings.overrides().unwrap().is_empty());
    assert!(settings.include_national_holidays().unwrap());
    assert_eq!(settings.week_start().unwrap(), WeekStart::Sunday);
    let rules = settings.weekday_rules().unwrap();
    assert_eq!(rules.rule(Weekday::Sat), DayRule::WeeklyHoliday);
    assert_eq!(rules.rule(Weekday::Mon), DayRule::Work);
}

#[test]
fn malformed_entries_read_as_defaults() {
    let store = MemoryKeyValueStore::new();
    store.set("day_rules", "{definitely not json").unwrap();
    store.set("forced_holidays", "[\"2025-02-30\"]").unwrap();
    store.set("fare", "two hundred").unwrap();
    store.set("week_start", "midweek").unwrap();
    let settings = Settings::new(Box::new(store));

    assert_eq!(settings.fare().unwrap(), None);
    assert_eq!(settings.week_start().unwrap(), WeekStart::Sunday);
    assert!(settings.overrides().unwrap().is_empty());
    let rules = settings.weekday_rules().unwrap();
    assert_eq!(rules.rule(Weekday::Sun), DayRule::WeeklyHoliday);
}

#[test]
fn pass_price_and_flag_are_written_as_a_pair() {
    let settings = Settings::in_memory();
    settings.set_pass(PassKind::Monthly, Some(8000)).unwrap();
    settings.set_pass(PassKind::SixMonth, Some(40000)).unwrap();

    let prices = settings.pass_prices().unwrap();
    assert_eq!(prices.monthly, Some(8000));
    assert_eq!(prices.three_month, None);
    assert_eq!(prices.six_month, Some(40000));

    settings.set_pass(PassKind::Monthly, None).unwrap();
    let prices = settings.pass_prices().unwrap();
    assert_eq!(prices.monthly, None);
    // the stored price survives the disable and returns when re-enabled
    settings.set_pass(PassKind::SixMonth, Some(41000)).unwrap();
    assert_eq!(settings.pass_prices().unwrap().six_month, Some(41000));
}

#[test]
fn device_id_is_created_once_and_reused() {
    let settings = Settings::in_memory();
    let first = settings.device_id().unwrap();
    assert!(first.starts_with("device_"));
    let second = settings.device_id().unwrap();
    assert_eq!(first, second);
}

#[test]
fn overrides_round_trip_through_storage() {
    let settings = Settings::in_memory();
    let mut overrides = OverrideSet::new();
    overrides.toggle(date(2025, 9, 2), false);
    overrides.toggle(date(2025, 9, 6), true);
    settings.save_overrides(&overrides).unwrap();

    let restored = settings.overrides().unwrap();
    assert_eq!(restored, overrides);
}

#[test]
fn stored_duration_is_clamped_to_the_plan_on_restore() {
    let settings = Settings::in_memory();
    settings.set_fare(220).unwrap();
    settings.set_duration_months(24).unwrap();

    // no license stored: free plan bounds apply
    let request = settings.simulation_request().unwrap();
    assert_eq!(request.duration_months, LicensePlan::Free.max_duration_months());
}

#[test]
fn upgrading_resets_the_duration_to_the_new_plan_default() {
    let settings = Settings::in_memory();
    settings.set_duration_months(2).unwrap();
    settings
        .set_license(LicensePlan::Pro, "key-123", "2027-01-01")
        .unwrap();

    let request = settings.simulation_request().unwrap();
    assert_eq!(
        request.duration_months,
        LicensePlan::Pro.default_duration_months()
    );
    // the one-shot flag was consumed: an explicit edit now sticks
    settings.set_duration_months(6).unwrap();
    let request = settings.simulation_request().unwrap();
    assert_eq!(request.duration_months, 6);
}

#[test]
fn just_upgraded_flag_reads_once() {
    let settings = Settings::in_memory();
    settings
        .set_license(LicensePlan::Standard, "key-456", "2027-01-01")
        .unwrap();
    assert!(settings.take_just_upgraded().unwrap());
    assert!(!settings.take_just_upgraded().unwrap());
}

#[test]
fn result_handoff_is_consumed_exactly_once() {
    let settings = Settings::in_memory();
    assert_eq!(settings.take_result_handoff().unwrap(), None);
    settings.set_result_handoff("{\"total\":1}").unwrap();
    assert_eq!(
        settings.take_result_handoff().unwrap().as_deref(),
        Some("{\"total\":1}")
    );
    assert_eq!(settings.take_result_handoff().unwrap(), None);
}

#[test]
fn remember_request_round_trips_the_full_form() {
    use pass_planner::{PassPrices, SimulationRequest};
    let settings = Settings::in_memory();
    let mut overrides = OverrideSet::new();
    overrides.toggle(date(2025, 9, 2), false);
    let request = SimulationRequest {
        fare: 220,
        passes: PassPrices {
            monthly: Some(8000),
            three_month: None,
            six_month: Some(40000),
        },
        start_date: Some(date(2025, 9, 1)),
        duration_months: 3,
        overrides: overrides.clone(),
        include_national_holidays: false,
        week_start: WeekStart::Monday,
        ..SimulationRequest::default()
    };
    settings.remember_request(&request).unwrap();
    settings.save_overrides(&overrides).unwrap();

    let restored = settings.simulation_request().unwrap();
    assert_eq!(restored, request);
}

#[cfg(feature = "sqlite")]
#[test]
fn sqlite_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.db");

    {
        let settings = Settings::open(&path).unwrap();
        settings.set_fare(220).unwrap();
        let mut overrides = OverrideSet::new();
        overrides.toggle(date(2025, 9, 6), true);
        settings.save_overrides(&overrides).unwrap();
    }

    let settings = Settings::open(&path).unwrap();
    assert_eq!(settings.fare().unwrap(), Some(220));
    assert!(
        settings
            .overrides()
            .unwrap()
            .is_forced_workday(date(2025, 9, 6))
    );
}
