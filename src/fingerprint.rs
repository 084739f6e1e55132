use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::date_key;
use crate::request::SimulationRequest;

/// Bumping this invalidates every previously cached plan: old records
/// simply stop matching on the version field.
pub const CACHE_VERSION: &str = "1.0.0";

/// The exact tuple a calculation is cached under. Every field participates
/// in the cache key, including the device identifier, so plans are never
/// shared across devices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationParameters {
    pub device_id: String,
    pub fare: u32,
    pub monthly_pass: u32,
    pub three_month_pass: u32,
    pub six_month_pass: u32,
    pub start_date: String,
    pub duration_in_months: u32,
    pub holidays: String,
    pub cache_version: String,
}

/// Sorted, deduplicated, comma-joined date keys. Input order never leaks
/// into the fingerprint.
pub fn canonical_holiday_list(dates: &[NaiveDate]) -> String {
    let mut keys: Vec<String> = dates.iter().copied().map(date_key).collect();
    keys.sort();
    keys.dedup();
    keys.join(",")
}

impl SimulationParameters {
    pub fn build(
        device_id: impl Into<String>,
        request: &SimulationRequest,
        optimization_holidays: &[NaiveDate],
    ) -> Self {
        Self {
            device_id: device_id.into(),
            fare: request.fare,
            monthly_pass: request.passes.monthly.unwrap_or(0),
            three_month_pass: request.passes.three_month.unwrap_or(0),
            six_month_pass: request.passes.six_month.unwrap_or(0),
            start_date: request.start_date.map(date_key).unwrap_or_default(),
            duration_in_months: request.duration_months,
            holidays: canonical_holiday_list(optimization_holidays),
            cache_version: CACHE_VERSION.to_string(),
        }
    }

    /// Every tuple field as a query pair, for both the cache lookup and
    /// the optimizer request.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("device_id", self.device_id.clone()),
            ("fare", self.fare.to_string()),
            ("monthly_pass", self.monthly_pass.to_string()),
            ("three_month_pass", self.three_month_pass.to_string()),
            ("six_month_pass", self.six_month_pass.to_string()),
            ("start_date", self.start_date.clone()),
            ("duration_in_months", self.duration_in_months.to_string()),
            ("holidays", self.holidays.clone()),
            ("cache_version", self.cache_version.clone()),
        ]
    }
}
