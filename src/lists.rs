use chrono::{Datelike, Duration, Months, NaiveDate};
use std::collections::BTreeSet;

use crate::calendar::{DayClassifier, WeekStart, WeekdayRules};
use crate::holidays::NationalHolidayProvider;
use crate::overrides::OverrideSet;

/// Inclusive simulation span. An N-month window ends on the day before
/// the start date's N-month anniversary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl SimulationWindow {
    pub fn new(start: NaiveDate, duration_months: u32) -> Option<Self> {
        if duration_months == 0 {
            return None;
        }
        let end = start
            .checked_add_months(Months::new(duration_months))?
            .pred_opt()?;
        Some(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// January 1 of the window's first calendar year.
    pub fn scan_start(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.start.year(), 1, 1)
            .expect("January 1 exists in every year")
    }

    /// December 31 of the window's last calendar year.
    pub fn scan_end(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.end.year(), 12, 31)
            .expect("December 31 exists in every year")
    }
}

/// The two holiday sequences one scan produces: `optimization` scoped to
/// the simulation window for the remote optimizer, `display` spanning the
/// full calendar years for rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HolidayLists {
    pub optimization: Vec<NaiveDate>,
    pub display: Vec<NaiveDate>,
}

/// Resolves every day of the window's calendar years and collects both
/// lists in one pass. The national set deliberately covers the full years
/// so both outputs filter from the same scan.
///
/// A missing start date, a zero duration, or month arithmetic overflow
/// yields two empty lists rather than an error.
pub fn generate_holiday_lists(
    start_date: Option<NaiveDate>,
    duration_months: u32,
    rules: &WeekdayRules,
    overrides: &OverrideSet,
    provider: &dyn NationalHolidayProvider,
    include_national: bool,
    week_start: WeekStart,
) -> HolidayLists {
    let Some(window) = start_date.and_then(|start| SimulationWindow::new(start, duration_months))
    else {
        return HolidayLists::default();
    };

    let national: BTreeSet<NaiveDate> = if include_national {
        provider
            .between(window.scan_start(), window.scan_end())
            .into_iter()
            .collect()
    } else {
        BTreeSet::new()
    };

    let classifier = DayClassifier::new(rules, overrides, &national, week_start);
    let mut lists = HolidayLists::default();
    let mut day = window.scan_start();
    while day <= window.scan_end() {
        if classifier.is_holiday(day) {
            lists.display.push(day);
            if window.contains(day) {
                lists.optimization.push(day);
            }
        }
        day += Duration::days(1);
    }
    lists
}
