use chrono::NaiveDate;
use pass_planner::{
    CACHE_VERSION, PassPrices, SimulationParameters, SimulationRequest, canonical_holiday_list,
};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn request() -> SimulationRequest {
    SimulationRequest {
        fare: 220,
        passes: PassPrices {
            monthly: Some(8000),
            three_month: None,
            six_month: Some(40000),
        },
        start_date: Some(date(2025, 9, 1)),
        duration_months: 12,
        ..SimulationRequest::default()
    }
}

#[test]
fn canonical_list_sorts_and_deduplicates() {
    let joined = canonical_holiday_list(&[
        date(2025, 9, 13),
        date(2025, 9, 6),
        date(2025, 9, 13),
        date(2025, 9, 7),
    ]);
    assert_eq!(joined, "2025-09-06,2025-09-07,2025-09-13");
}

#[test]
fn canonical_list_of_nothing_is_empty() {
    assert_eq!(canonical_holiday_list(&[]), "");
}

#[test]
fn input_order_never_leaks_into_the_fingerprint() {
    let forward = [date(2025, 9, 6), date(2025, 9, 7)];
    let backward = [date(2025, 9, 7), date(2025, 9, 6)];
    let a = SimulationParameters::build("device_1", &request(), &forward);
    let b = SimulationParameters::build("device_1", &request(), &backward);
    assert_eq!(a, b);
}

#[test]
fn disabled_passes_are_zero_in_the_tuple() {
    let params = SimulationParameters::build("device_1", &request(), &[]);
    assert_eq!(params.monthly_pass, 8000);
    assert_eq!(params.three_month_pass, 0);
    assert_eq!(params.six_month_pass, 40000);
    assert_eq!(params.start_date, "2025-09-01");
    assert_eq!(params.duration_in_months, 12);
    assert_eq!(params.cache_version, CACHE_VERSION);
}

#[test]
fn device_identifier_separates_fingerprints() {
    let holidays = [date(2025, 9, 6)];
    let a = SimulationParameters::build("device_1", &request(), &holidays);
    let b = SimulationParameters::build("device_2", &request(), &holidays);
    assert_ne!(a, b);
}

#[test]
fn query_pairs_carry_every_tuple_field() {
    let params = SimulationParameters::build("device_1", &request(), &[date(2025, 9, 6)]);
    let pairs = params.query_pairs();
    assert_eq!(pairs.len(), 9);
    let keys: Vec<&str> = pairs.iter().map(|(key, _)| *key).collect();
    for expected in [
        "device_id",
        "fare",
        "monthly_pass",
        "three_month_pass",
        "six_month_pass",
        "start_date",
        "duration_in_months",
        "holidays",
        "cache_version",
    ] {
        assert!(keys.contains(&expected), "missing {expected}");
    }
}
