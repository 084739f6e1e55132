use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Plan tier controlling how far out a simulation may run. The key
/// activation protocol lives outside this crate; only the duration bounds
/// matter here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LicensePlan {
    #[default]
    Free,
    Standard,
    Pro,
}

impl LicensePlan {
    pub fn max_duration_months(self) -> u32 {
        match self {
            LicensePlan::Free => 4,
            LicensePlan::Standard => 12,
            LicensePlan::Pro => 24,
        }
    }

    /// Duration a fresh install or a just-upgraded one starts with.
    pub fn default_duration_months(self) -> u32 {
        self.max_duration_months()
    }

    /// Clamps a persisted duration into this plan's range. A stored value
    /// can exceed the maximum after a downgrade.
    pub fn clamp_duration(self, months: u32) -> u32 {
        months.clamp(1, self.max_duration_months())
    }
}

impl fmt::Display for LicensePlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LicensePlan::Free => write!(f, "free"),
            LicensePlan::Standard => write!(f, "standard"),
            LicensePlan::Pro => write!(f, "pro"),
        }
    }
}

impl FromStr for LicensePlan {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "free" => Ok(LicensePlan::Free),
            "standard" => Ok(LicensePlan::Standard),
            "pro" => Ok(LicensePlan::Pro),
            _ => Err(()),
        }
    }
}
