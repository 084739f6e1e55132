use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::fs::File;
use std::io;
use std::path::Path;

use crate::calendar::{DayClass, DayClassifier, WeekStart, WeekdayRules, date_key};
use crate::holidays::NationalHolidayProvider;
use crate::lists::SimulationWindow;
use crate::overrides::OverrideSet;

#[derive(Debug)]
pub enum ExportError {
    Io(io::Error),
    Csv(csv::Error),
    Serialization(serde_json::Error),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::Io(err) => write!(f, "io error: {err}"),
            ExportError::Csv(err) => write!(f, "csv error: {err}"),
            ExportError::Serialization(err) => write!(f, "serialization error: {err}"),
        }
    }
}

impl std::error::Error for ExportError {}

impl From<io::Error> for ExportError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<csv::Error> for ExportError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

pub type ExportResult<T> = Result<T, ExportError>;

/// One resolved day of the scanned calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedDay {
    pub date: NaiveDate,
    pub class: DayClass,
}

/// Resolves every day of the window's calendar years, keeping the layer
/// that decided each one. Same scan bounds as the holiday list generator;
/// an absent start or zero duration yields an empty list.
pub fn classify_calendar(
    start_date: Option<NaiveDate>,
    duration_months: u32,
    rules: &WeekdayRules,
    overrides: &OverrideSet,
    provider: &dyn NationalHolidayProvider,
    include_national: bool,
    week_start: WeekStart,
) -> Vec<ClassifiedDay> {
    let Some(window) = start_date.and_then(|start| SimulationWindow::new(start, duration_months))
    else {
        return Vec::new();
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
    let mut days = Vec::new();
    let mut day = window.scan_start();
    while day <= window.scan_end() {
        days.push(ClassifiedDay {
            date: day,
            class: classifier.classify(day),
        });
        day += Duration::days(1);
    }
    days
}

#[derive(Serialize, Deserialize)]
struct CalendarDayRecord {
    date: String,
    weekday: String,
    holiday: bool,
    layer: String,
}

impl From<&ClassifiedDay> for CalendarDayRecord {
    fn from(day: &ClassifiedDay) -> Self {
        Self {
            date: date_key(day.date),
            weekday: day.date.format("%a").to_string(),
            holiday: day.class.is_holiday(),
            layer: layer_name(day.class).to_string(),
        }
    }
}

fn layer_name(class: DayClass) -> &'static str {
    match class {
        DayClass::ForcedWorkday => "forced_workday",
        DayClass::ForcedHoliday => "forced_holiday",
        DayClass::NationalHoliday => "national_holiday",
        DayClass::RuleHoliday => "weekday_rule",
        DayClass::Workday => "weekday_rule",
    }
}

pub fn export_calendar_to_csv<P: AsRef<Path>>(days: &[ClassifiedDay], path: P) -> ExportResult<()> {
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    for day in days {
        writer.serialize(CalendarDayRecord::from(day))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn export_calendar_to_json<P: AsRef<Path>>(
    days: &[ClassifiedDay],
    path: P,
) -> ExportResult<()> {
    let records: Vec<CalendarDayRecord> = days.iter().map(CalendarDayRecord::from).collect();
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, &records)?;
    Ok(())
}
