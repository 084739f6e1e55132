use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::calendar::{WeekStart, WeekdayRules, date_key, parse_date_key};
use crate::license::LicensePlan;
use crate::overrides::OverrideSet;
use crate::request::{PassKind, PassPrices, SimulationRequest};

#[derive(Debug)]
pub enum SettingsError {
    Storage(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::Storage(message) => write!(f, "settings storage error: {message}"),
        }
    }
}

impl std::error::Error for SettingsError {}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for SettingsError {
    fn from(value: rusqlite::Error) -> Self {
        SettingsError::Storage(value.to_string())
    }
}

pub type SettingsResult<T> = Result<T, SettingsError>;

/// Raw string storage underneath the typed accessors. `set_many` writes
/// all entries or none, which keeps paired fields (the two override
/// lists) consistent on disk.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> SettingsResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> SettingsResult<()>;
    fn remove(&self, key: &str) -> SettingsResult<()>;
    fn set_many(&self, entries: &[(&str, String)]) -> SettingsResult<()>;
}

#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> SettingsResult<Option<String>> {
        let entries = self.entries.lock().expect("settings mutex poisoned");
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> SettingsResult<()> {
        let mut entries = self.entries.lock().expect("settings mutex poisoned");
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> SettingsResult<()> {
        let mut entries = self.entries.lock().expect("settings mutex poisoned");
        entries.remove(key);
        Ok(())
    }

    fn set_many(&self, pairs: &[(&str, String)]) -> SettingsResult<()> {
        let mut entries = self.entries.lock().expect("settings mutex poisoned");
        for (key, value) in pairs {
            entries.insert((*key).to_string(), value.clone());
        }
        Ok(())
    }
}

#[cfg(feature = "sqlite")]
pub struct SqliteKeyValueStore {
    connection: Mutex<rusqlite::Connection>,
}

#[cfg(feature = "sqlite")]
impl SqliteKeyValueStore {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> SettingsResult<Self> {
        let connection = rusqlite::Connection::open(path)?;
        connection.execute_batch(
            "CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }
}

#[cfg(feature = "sqlite")]
impl KeyValueStore for SqliteKeyValueStore {
    fn get(&self, key: &str) -> SettingsResult<Option<String>> {
        use rusqlite::OptionalExtension;
        let connection = self.connection.lock().expect("sqlite mutex poisoned");
        let mut stmt = connection.prepare("SELECT value FROM settings WHERE key = ?1")?;
        let value = stmt
            .query_row(rusqlite::params![key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> SettingsResult<()> {
        let connection = self.connection.lock().expect("sqlite mutex poisoned");
        connection.execute(
            "INSERT INTO settings (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            rusqlite::params![key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> SettingsResult<()> {
        let connection = self.connection.lock().expect("sqlite mutex poisoned");
        connection.execute("DELETE FROM settings WHERE key = ?1", rusqlite::params![key])?;
        Ok(())
    }

    fn set_many(&self, pairs: &[(&str, String)]) -> SettingsResult<()> {
        let mut connection = self.connection.lock().expect("sqlite mutex poisoned");
        let tx = connection.transaction()?;
        for (key, value) in pairs {
            tx.execute(
                "INSERT INTO settings (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                rusqlite::params![key, value],
            )?;
        }
        tx.commit()?;
        Ok(())
    }
}

mod keys {
    pub const DEVICE_ID: &str = "device_id";
    pub const FARE: &str = "fare";
    pub const MONTHLY_PASS: &str = "monthly_pass";
    pub const THREE_MONTH_PASS: &str = "three_month_pass";
    pub const SIX_MONTH_PASS: &str = "six_month_pass";
    pub const INCLUDE_MONTHLY_PASS: &str = "include_monthly_pass";
    pub const INCLUDE_THREE_MONTH_PASS: &str = "include_three_month_pass";
    pub const INCLUDE_SIX_MONTH_PASS: &str = "include_six_month_pass";
    pub const START_DATE: &str = "start_date";
    pub const DURATION_IN_MONTHS: &str = "duration_in_months";
    pub const DAY_RULES: &str = "day_rules";
    pub const FORCED_HOLIDAYS: &str = "forced_holidays";
    pub const FORCED_WORKDAYS: &str = "forced_workdays";
    pub const INCLUDE_NATIONAL_HOLIDAYS: &str = "include_national_holidays";
    pub const WEEK_START: &str = "week_start";
    pub const LICENSE_KEY: &str = "license_key";
    pub const LICENSE_PLAN: &str = "license_plan";
    pub const LICENSE_EXPIRES_AT: &str = "license_expires_at";
    pub const JUST_UPGRADED: &str = "just_upgraded";
    pub const RESULT_HANDOFF: &str = "result_handoff";
}

/// Typed view over the preference store. Every read is parse-or-default:
/// a missing or malformed entry behaves like an absent one and never
/// surfaces as an error.
pub struct Settings {
    store: Box<dyn KeyValueStore>,
}

impl Settings {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryKeyValueStore::new()))
    }

    #[cfg(feature = "sqlite")]
    pub fn open<P: AsRef<std::path::Path>>(path: P) -> SettingsResult<Self> {
        Ok(Self::new(Box::new(SqliteKeyValueStore::new(path)?)))
    }

    fn get_parsed<T: FromStr>(&self, key: &str) -> SettingsResult<Option<T>> {
        Ok(self
            .store
            .get(key)?
            .and_then(|value| value.trim().parse().ok()))
    }

    /// The stable per-installation identifier, created on first use.
    pub fn device_id(&self) -> SettingsResult<String> {
        if let Some(existing) = self.store.get(keys::DEVICE_ID)? {
            if !existing.is_empty() {
                return Ok(existing);
            }
        }
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis())
            .unwrap_or_default();
        let id = format!("device_{millis}");
        self.store.set(keys::DEVICE_ID, &id)?;
        Ok(id)
    }

    pub fn fare(&self) -> SettingsResult<Option<u32>> {
        self.get_parsed(keys::FARE)
    }

    pub fn set_fare(&self, fare: u32) -> SettingsResult<()> {
        self.store.set(keys::FARE, &fare.to_string())
    }

    pub fn pass_prices(&self) -> SettingsResult<PassPrices> {
        let mut prices = PassPrices::default();
        for kind in PassKind::ALL {
            let (enabled_key, price_key) = Self::pass_keys(kind);
            let enabled = self
                .store
                .get(enabled_key)?
                .is_some_and(|value| value == "true");
            if enabled {
                let price: Option<u32> = self.get_parsed(price_key)?;
                prices.set_price(kind, Some(price.unwrap_or(0)));
            }
        }
        Ok(prices)
    }

    /// Enables a pass duration with its price, or disables it with `None`.
    /// The flag and the price are written together.
    pub fn set_pass(&self, kind: PassKind, price: Option<u32>) -> SettingsResult<()> {
        let (enabled_key, price_key) = Self::pass_keys(kind);
        match price {
            Some(price) => self.store.set_many(&[
                (enabled_key, "true".to_string()),
                (price_key, price.to_string()),
            ]),
            None => self.store.set(enabled_key, "false"),
        }
    }

    fn pass_keys(kind: PassKind) -> (&'static str, &'static str) {
        match kind {
            PassKind::Monthly => (keys::INCLUDE_MONTHLY_PASS, keys::MONTHLY_PASS),
            PassKind::ThreeMonth => (keys::INCLUDE_THREE_MONTH_PASS, keys::THREE_MONTH_PASS),
            PassKind::SixMonth => (keys::INCLUDE_SIX_MONTH_PASS, keys::SIX_MONTH_PASS),
        }
    }

    pub fn start_date(&self) -> SettingsResult<Option<NaiveDate>> {
        Ok(self
            .store
            .get(keys::START_DATE)?
            .as_deref()
            .and_then(parse_date_key))
    }

    pub fn set_start_date(&self, date: NaiveDate) -> SettingsResult<()> {
        self.store.set(keys::START_DATE, &date_key(date))
    }

    pub fn duration_months(&self) -> SettingsResult<Option<u32>> {
        self.get_parsed(keys::DURATION_IN_MONTHS)
    }

    pub fn set_duration_months(&self, months: u32) -> SettingsResult<()> {
        self.store
            .set(keys::DURATION_IN_MONTHS, &months.to_string())
    }

    pub fn weekday_rules(&self) -> SettingsResult<WeekdayRules> {
        Ok(self
            .store
            .get(keys::DAY_RULES)?
            .and_then(|json| serde_json::from_str(&json).ok())
            .unwrap_or_default())
    }

    pub fn set_weekday_rules(&self, rules: &WeekdayRules) -> SettingsResult<()> {
        let json = serde_json::to_string(rules).expect("weekday rules serialize to JSON");
        self.store.set(keys::DAY_RULES, &json)
    }

    pub fn overrides(&self) -> SettingsResult<OverrideSet> {
        let forced_holidays = self.date_set(keys::FORCED_HOLIDAYS)?;
        let forced_workdays = self.date_set(keys::FORCED_WORKDAYS)?;
        Ok(OverrideSet::from_parts(forced_holidays, forced_workdays))
    }

    /// Persists both override lists in a single storage transaction, so a
    /// failure cannot leave one list updated and the other stale.
    pub fn save_overrides(&self, overrides: &OverrideSet) -> SettingsResult<()> {
        let holidays = serde_json::to_string(overrides.forced_holidays())
            .expect("date set serializes to JSON");
        let workdays = serde_json::to_string(overrides.forced_workdays())
            .expect("date set serializes to JSON");
        self.store.set_many(&[
            (keys::FORCED_HOLIDAYS, holidays),
            (keys::FORCED_WORKDAYS, workdays),
        ])
    }

    fn date_set(&self, key: &str) -> SettingsResult<BTreeSet<NaiveDate>> {
        Ok(self
            .store
            .get(key)?
            .and_then(|json| serde_json::from_str(&json).ok())
            .unwrap_or_default())
    }

    pub fn include_national_holidays(&self) -> SettingsResult<bool> {
        Ok(self
            .store
            .get(keys::INCLUDE_NATIONAL_HOLIDAYS)?
            .map(|value| value == "true")
            .unwrap_or(true))
    }

    pub fn set_include_national_holidays(&self, include: bool) -> SettingsResult<()> {
        self.store
            .set(keys::INCLUDE_NATIONAL_HOLIDAYS, if include { "true" } else { "false" })
    }

    pub fn week_start(&self) -> SettingsResult<WeekStart> {
        Ok(self.get_parsed(keys::WEEK_START)?.unwrap_or_default())
    }

    pub fn set_week_start(&self, week_start: WeekStart) -> SettingsResult<()> {
        let value = match week_start {
            WeekStart::Sunday => "sunday",
            WeekStart::Monday => "monday",
        };
        self.store.set(keys::WEEK_START, value)
    }

    pub fn license_plan(&self) -> SettingsResult<Option<LicensePlan>> {
        self.get_parsed(keys::LICENSE_PLAN)
    }

    pub fn set_license(
        &self,
        plan: LicensePlan,
        key: &str,
        expires_at: &str,
    ) -> SettingsResult<()> {
        self.store.set_many(&[
            (keys::LICENSE_PLAN, plan.to_string()),
            (keys::LICENSE_KEY, key.to_string()),
            (keys::LICENSE_EXPIRES_AT, expires_at.to_string()),
            (keys::JUST_UPGRADED, "true".to_string()),
        ])
    }

    pub fn clear_license(&self) -> SettingsResult<()> {
        self.store.remove(keys::LICENSE_PLAN)?;
        self.store.remove(keys::LICENSE_KEY)?;
        self.store.remove(keys::LICENSE_EXPIRES_AT)
    }

    /// One-shot flag set when a license changes; reading it consumes it.
    pub fn take_just_upgraded(&self) -> SettingsResult<bool> {
        let upgraded = self
            .store
            .get(keys::JUST_UPGRADED)?
            .is_some_and(|value| value == "true");
        if upgraded {
            self.store.remove(keys::JUST_UPGRADED)?;
        }
        Ok(upgraded)
    }

    /// Transient handoff blob for the result view; consumed exactly once.
    pub fn set_result_handoff(&self, json: &str) -> SettingsResult<()> {
        self.store.set(keys::RESULT_HANDOFF, json)
    }

    pub fn take_result_handoff(&self) -> SettingsResult<Option<String>> {
        let blob = self.store.get(keys::RESULT_HANDOFF)?;
        if blob.is_some() {
            self.store.remove(keys::RESULT_HANDOFF)?;
        }
        Ok(blob)
    }

    /// Rebuilds the full form state from persisted preferences. The stored
    /// duration is clamped to the active plan's maximum; a consumed
    /// just-upgraded flag resets it to the new plan's default first.
    pub fn simulation_request(&self) -> SettingsResult<SimulationRequest> {
        let plan = self.license_plan()?.unwrap_or_default();
        if self.take_just_upgraded()? {
            self.set_duration_months(plan.default_duration_months())?;
        }
        let duration = self
            .duration_months()?
            .map(|months| plan.clamp_duration(months))
            .unwrap_or_else(|| plan.default_duration_months());

        Ok(SimulationRequest {
            fare: self.fare()?.unwrap_or(0),
            passes: self.pass_prices()?,
            start_date: self.start_date()?,
            duration_months: duration,
            rules: self.weekday_rules()?,
            overrides: self.overrides()?,
            include_national_holidays: self.include_national_holidays()?,
            week_start: self.week_start()?,
        })
    }

    /// Persists every form field of a request in one write.
    pub fn remember_request(&self, request: &SimulationRequest) -> SettingsResult<()> {
        let mut entries: Vec<(&str, String)> = vec![
            (keys::FARE, request.fare.to_string()),
            (
                keys::DURATION_IN_MONTHS,
                request.duration_months.to_string(),
            ),
            (
                keys::DAY_RULES,
                serde_json::to_string(&request.rules).expect("weekday rules serialize to JSON"),
            ),
            (
                keys::INCLUDE_NATIONAL_HOLIDAYS,
                request.include_national_holidays.to_string(),
            ),
            (
                keys::WEEK_START,
                match request.week_start {
                    WeekStart::Sunday => "sunday".to_string(),
                    WeekStart::Monday => "monday".to_string(),
                },
            ),
        ];
        if let Some(start) = request.start_date {
            entries.push((keys::START_DATE, date_key(start)));
        }
        for kind in PassKind::ALL {
            let (enabled_key, price_key) = Self::pass_keys(kind);
            match request.passes.price(kind) {
                Some(price) => {
                    entries.push((enabled_key, "true".to_string()));
                    entries.push((price_key, price.to_string()));
                }
                None => entries.push((enabled_key, "false".to_string())),
            }
        }
        self.store.set_many(&entries)
    }
}
