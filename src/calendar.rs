use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;

use crate::overrides::OverrideSet;

/// Rule applied to a single weekday of the commuting calendar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayRule {
    #[default]
    Work,
    WeeklyHoliday,
    BiweeklyOddHoliday,
    BiweeklyEvenHoliday,
}

impl FromStr for DayRule {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "work" => Ok(DayRule::Work),
            "weekly_holiday" => Ok(DayRule::WeeklyHoliday),
            "biweekly_odd_holiday" => Ok(DayRule::BiweeklyOddHoliday),
            "biweekly_even_holiday" => Ok(DayRule::BiweeklyEvenHoliday),
            _ => Err(()),
        }
    }
}

/// One rule per weekday, indexed Sunday through Saturday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekdayRules([DayRule; 7]);

impl Default for WeekdayRules {
    fn default() -> Self {
        let mut rules = [DayRule::Work; 7];
        rules[Weekday::Sun.num_days_from_sunday() as usize] = DayRule::WeeklyHoliday;
        rules[Weekday::Sat.num_days_from_sunday() as usize] = DayRule::WeeklyHoliday;
        Self(rules)
    }
}

impl WeekdayRules {
    pub fn all_work() -> Self {
        Self([DayRule::Work; 7])
    }

    pub fn rule(&self, weekday: Weekday) -> DayRule {
        self.0[weekday.num_days_from_sunday() as usize]
    }

    pub fn set_rule(&mut self, weekday: Weekday, rule: DayRule) {
        self.0[weekday.num_days_from_sunday() as usize] = rule;
    }
}

/// First day of the week used when numbering the weeks of a month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeekStart {
    #[default]
    Sunday,
    Monday,
}

impl WeekStart {
    pub fn offset(self) -> u32 {
        match self {
            WeekStart::Sunday => 0,
            WeekStart::Monday => 1,
        }
    }
}

impl FromStr for WeekStart {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "sunday" | "sun" | "0" => Ok(WeekStart::Sunday),
            "monday" | "mon" | "1" => Ok(WeekStart::Monday),
            _ => Err(()),
        }
    }
}

/// Canonical `YYYY-MM-DD` key for a date. Keys are built from calendar
/// fields, never from an epoch offset, so they round-trip exactly.
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn parse_date_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key.trim(), "%Y-%m-%d").ok()
}

/// Week-of-month number for a date, counting from the configured week
/// start. The first of the month always falls in week 1.
pub fn week_number(date: NaiveDate, week_start: WeekStart) -> u32 {
    let first_weekday = date
        .with_day(1)
        .expect("first of a valid month always exists")
        .weekday()
        .num_days_from_sunday();
    let lead = (first_weekday + 7 - week_start.offset()) % 7;
    (date.day() + lead).div_ceil(7)
}

/// How a single day was classified, in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayClass {
    ForcedWorkday,
    ForcedHoliday,
    NationalHoliday,
    RuleHoliday,
    Workday,
}

impl DayClass {
    pub fn is_holiday(self) -> bool {
        matches!(
            self,
            DayClass::ForcedHoliday | DayClass::NationalHoliday | DayClass::RuleHoliday
        )
    }
}

/// Resolves a single calendar day to work or holiday.
///
/// Layers, first match wins: forced workday, forced holiday, national
/// holiday, weekday rule. Deterministic for identical inputs; nothing in
/// here consults the current date.
#[derive(Debug, Clone, Copy)]
pub struct DayClassifier<'a> {
    rules: &'a WeekdayRules,
    overrides: &'a OverrideSet,
    national_holidays: &'a BTreeSet<NaiveDate>,
    week_start: WeekStart,
}

impl<'a> DayClassifier<'a> {
    pub fn new(
        rules: &'a WeekdayRules,
        overrides: &'a OverrideSet,
        national_holidays: &'a BTreeSet<NaiveDate>,
        week_start: WeekStart,
    ) -> Self {
        Self {
            rules,
            overrides,
            national_holidays,
            week_start,
        }
    }

    pub fn classify(&self, date: NaiveDate) -> DayClass {
        if self.overrides.is_forced_workday(date) {
            return DayClass::ForcedWorkday;
        }
        if self.overrides.is_forced_holiday(date) {
            return DayClass::ForcedHoliday;
        }
        self.classify_baseline(date)
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.classify(date).is_holiday()
    }

    /// Key-based lookup for callers holding serialized dates. An
    /// unparseable key is never a holiday.
    pub fn is_holiday_key(&self, key: &str) -> bool {
        match parse_date_key(key) {
            Some(date) => self.is_holiday(date),
            None => false,
        }
    }

    /// Classification without the override layer. The toggle operation
    /// uses this so an existing override cannot feed back into the
    /// decision of what the date would naturally be.
    pub fn baseline_is_holiday(&self, date: NaiveDate) -> bool {
        self.classify_baseline(date).is_holiday()
    }

    fn classify_baseline(&self, date: NaiveDate) -> DayClass {
        if self.national_holidays.contains(&date) {
            return DayClass::NationalHoliday;
        }
        let holiday = match self.rules.rule(date.weekday()) {
            DayRule::WeeklyHoliday => true,
            DayRule::BiweeklyOddHoliday => week_number(date, self.week_start) % 2 == 1,
            DayRule::BiweeklyEvenHoliday => week_number(date, self.week_start) % 2 == 0,
            DayRule::Work => false,
        };
        if holiday {
            DayClass::RuleHoliday
        } else {
            DayClass::Workday
        }
    }
}
