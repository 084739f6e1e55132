use bdays::HolidayCalendar;
use chrono::{Duration, NaiveDate};
use std::collections::BTreeSet;

/// Authoritative source of national holidays. Overridable only by the
/// higher-precedence custom override layer.
pub trait NationalHolidayProvider {
    fn is_holiday(&self, date: NaiveDate) -> bool;

    /// All national holidays in the inclusive range, in chronological order.
    fn between(&self, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        let mut dates = Vec::new();
        let mut current = start;
        while current <= end {
            if self.is_holiday(current) {
                dates.push(current);
            }
            current += Duration::days(1);
        }
        dates
    }
}

pub fn national_holiday_set(
    provider: &dyn NationalHolidayProvider,
    start: NaiveDate,
    end: NaiveDate,
) -> BTreeSet<NaiveDate> {
    provider.between(start, end).into_iter().collect()
}

/// US federal holidays, observed dates included.
#[derive(Debug, Clone, Copy, Default)]
pub struct UsFederalCalendar;

impl UsFederalCalendar {
    pub fn new() -> Self {
        Self
    }
}

impl NationalHolidayProvider for UsFederalCalendar {
    fn is_holiday(&self, date: NaiveDate) -> bool {
        bdays::calendars::us::USSettlement.is_holiday(date)
    }
}

/// Holiday calendar over an explicit date set. Used for regions without a
/// bundled calendar and for tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixedDateCalendar {
    dates: BTreeSet<NaiveDate>,
}

impl FixedDateCalendar {
    pub fn new<I>(dates: I) -> Self
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        Self {
            dates: dates.into_iter().collect(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

impl NationalHolidayProvider for FixedDateCalendar {
    fn is_holiday(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }

    fn between(&self, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        self.dates.range(start..=end).copied().collect()
    }
}
