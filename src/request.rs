use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::calendar::{WeekStart, WeekdayRules};
use crate::overrides::OverrideSet;

/// The three purchasable pass durations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassKind {
    Monthly,
    ThreeMonth,
    SixMonth,
}

impl PassKind {
    pub const ALL: [PassKind; 3] = [PassKind::Monthly, PassKind::ThreeMonth, PassKind::SixMonth];

    pub fn months(self) -> u32 {
        match self {
            PassKind::Monthly => 1,
            PassKind::ThreeMonth => 3,
            PassKind::SixMonth => 6,
        }
    }
}

impl fmt::Display for PassKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PassKind::Monthly => write!(f, "1-month pass"),
            PassKind::ThreeMonth => write!(f, "3-month pass"),
            PassKind::SixMonth => write!(f, "6-month pass"),
        }
    }
}

/// Price per pass duration. `None` means the duration is not compared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassPrices {
    pub monthly: Option<u32>,
    pub three_month: Option<u32>,
    pub six_month: Option<u32>,
}

impl PassPrices {
    pub fn price(&self, kind: PassKind) -> Option<u32> {
        match kind {
            PassKind::Monthly => self.monthly,
            PassKind::ThreeMonth => self.three_month,
            PassKind::SixMonth => self.six_month,
        }
    }

    pub fn set_price(&mut self, kind: PassKind, price: Option<u32>) {
        match kind {
            PassKind::Monthly => self.monthly = price,
            PassKind::ThreeMonth => self.three_month = price,
            PassKind::SixMonth => self.six_month = price,
        }
    }

    pub fn enabled(&self) -> impl Iterator<Item = PassKind> + '_ {
        PassKind::ALL
            .into_iter()
            .filter(|kind| self.price(*kind).is_some())
    }

    pub fn shortest_enabled(&self) -> Option<PassKind> {
        self.enabled().next()
    }

    pub fn longest_enabled(&self) -> Option<PassKind> {
        self.enabled().last()
    }
}

/// Everything the user configures for one calculation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationRequest {
    pub fare: u32,
    pub passes: PassPrices,
    pub start_date: Option<NaiveDate>,
    pub duration_months: u32,
    pub rules: WeekdayRules,
    pub overrides: OverrideSet,
    pub include_national_holidays: bool,
    pub week_start: WeekStart,
}

impl Default for SimulationRequest {
    fn default() -> Self {
        Self {
            fare: 0,
            passes: PassPrices::default(),
            start_date: None,
            duration_months: 12,
            rules: WeekdayRules::default(),
            overrides: OverrideSet::default(),
            include_national_holidays: true,
            week_start: WeekStart::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    MissingFare,
    MissingStartDate,
    NoPassSelected,
    InvalidPassPrice(PassKind),
    InvalidDuration,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::MissingFare => {
                write!(f, "enter a one-way fare greater than zero")
            }
            ValidationError::MissingStartDate => {
                write!(f, "enter a simulation start date")
            }
            ValidationError::NoPassSelected => {
                write!(f, "select at least one pass duration to compare")
            }
            ValidationError::InvalidPassPrice(kind) => {
                write!(f, "enter a {kind} price greater than zero")
            }
            ValidationError::InvalidDuration => {
                write!(f, "the simulation duration must be at least one month")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

impl SimulationRequest {
    /// Checks the form fields before any I/O happens. Nothing is mutated
    /// on failure.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.fare == 0 {
            return Err(ValidationError::MissingFare);
        }
        if self.start_date.is_none() {
            return Err(ValidationError::MissingStartDate);
        }
        if self.passes.enabled().next().is_none() {
            return Err(ValidationError::NoPassSelected);
        }
        for kind in self.passes.enabled() {
            if self.passes.price(kind) == Some(0) {
                return Err(ValidationError::InvalidPassPrice(kind));
            }
        }
        if self.duration_months == 0 {
            return Err(ValidationError::InvalidDuration);
        }
        Ok(())
    }
}
