use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Per-date override status. A date is in at most one of the two sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideState {
    Unset,
    ForcedHoliday,
    ForcedWorkday,
}

/// User-pinned dates that take precedence over every calendar rule.
///
/// The two sets stay disjoint: `toggle` and `clear` are the only mutation
/// paths, and `from_parts` drops any date that arrives in both sets from
/// storage (the forced-workday side wins, matching its higher precedence).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideSet {
    forced_holidays: BTreeSet<NaiveDate>,
    forced_workdays: BTreeSet<NaiveDate>,
}

impl OverrideSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(
        forced_holidays: BTreeSet<NaiveDate>,
        forced_workdays: BTreeSet<NaiveDate>,
    ) -> Self {
        let forced_holidays = forced_holidays
            .into_iter()
            .filter(|date| !forced_workdays.contains(date))
            .collect();
        Self {
            forced_holidays,
            forced_workdays,
        }
    }

    pub fn state(&self, date: NaiveDate) -> OverrideState {
        if self.forced_workdays.contains(&date) {
            OverrideState::ForcedWorkday
        } else if self.forced_holidays.contains(&date) {
            OverrideState::ForcedHoliday
        } else {
            OverrideState::Unset
        }
    }

    pub fn is_forced_holiday(&self, date: NaiveDate) -> bool {
        self.forced_holidays.contains(&date)
    }

    pub fn is_forced_workday(&self, date: NaiveDate) -> bool {
        self.forced_workdays.contains(&date)
    }

    pub fn forced_holidays(&self) -> &BTreeSet<NaiveDate> {
        &self.forced_holidays
    }

    pub fn forced_workdays(&self) -> &BTreeSet<NaiveDate> {
        &self.forced_workdays
    }

    pub fn is_empty(&self) -> bool {
        self.forced_holidays.is_empty() && self.forced_workdays.is_empty()
    }

    /// Flips a date relative to what it would naturally be.
    ///
    /// An existing override of either kind is removed, returning the date
    /// to its natural state. An unset date becomes a forced workday when
    /// its baseline classification (rules without the override layer) is
    /// holiday, otherwise a forced holiday. Two toggles always return a
    /// date to `Unset`.
    pub fn toggle(&mut self, date: NaiveDate, baseline_is_holiday: bool) -> OverrideState {
        if self.forced_workdays.remove(&date) {
            return OverrideState::Unset;
        }
        if self.forced_holidays.remove(&date) {
            return OverrideState::Unset;
        }
        if baseline_is_holiday {
            self.forced_workdays.insert(date);
            OverrideState::ForcedWorkday
        } else {
            self.forced_holidays.insert(date);
            OverrideState::ForcedHoliday
        }
    }

    /// Removes any override on the date. Returns whether one existed.
    pub fn clear(&mut self, date: NaiveDate) -> bool {
        self.forced_workdays.remove(&date) || self.forced_holidays.remove(&date)
    }
}
