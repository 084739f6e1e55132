pub mod cache;
pub mod calendar;
pub mod config;
pub mod context;
pub mod export;
pub mod fingerprint;
pub mod gateway;
pub mod holidays;
pub mod license;
pub mod lists;
pub mod overrides;
pub mod request;
pub mod settings;
pub mod simulation;

pub use cache::{CacheError, CacheRecord, RemotePlanCache};
pub use calendar::{
    DayClass, DayClassifier, DayRule, WeekStart, WeekdayRules, date_key, parse_date_key,
    week_number,
};
pub use config::AppConfig;
pub use context::AppContext;
pub use export::{
    ClassifiedDay, ExportError, classify_calendar, export_calendar_to_csv, export_calendar_to_json,
};
pub use fingerprint::{CACHE_VERSION, SimulationParameters, canonical_holiday_list};
pub use gateway::{
    ComparisonCost, ComparisonKind, GatewayError, OptimizerClient, PlanDiagnostics, PurchasePlan,
    PurchaseStep,
};
pub use holidays::{
    FixedDateCalendar, NationalHolidayProvider, UsFederalCalendar, national_holiday_set,
};
pub use license::LicensePlan;
pub use lists::{HolidayLists, SimulationWindow, generate_holiday_lists};
pub use overrides::{OverrideSet, OverrideState};
pub use request::{PassKind, PassPrices, SimulationRequest, ValidationError};
#[cfg(feature = "sqlite")]
pub use settings::SqliteKeyValueStore;
pub use settings::{KeyValueStore, MemoryKeyValueStore, Settings, SettingsError};
pub use simulation::{
    SimulationError, SimulationOutcome, run_simulation, stash_outcome, take_stashed_outcome,
};
