use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

use crate::context::AppContext;
use crate::fingerprint::SimulationParameters;
use crate::gateway::{GatewayError, PurchasePlan};
use crate::lists::generate_holiday_lists;
use crate::request::{SimulationRequest, ValidationError};
use crate::settings::{SettingsError, SettingsResult};

/// What one calculation hands to the result view: the plan, the exact
/// parameters it was computed under, and the display-scoped holiday list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationOutcome {
    pub parameters: SimulationParameters,
    pub plan: PurchasePlan,
    pub display_holidays: Vec<NaiveDate>,
    pub from_cache: bool,
}

#[derive(Debug)]
pub enum SimulationError {
    Validation(ValidationError),
    Settings(SettingsError),
    Gateway(GatewayError),
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationError::Validation(err) => write!(f, "{err}"),
            SimulationError::Settings(err) => write!(f, "{err}"),
            SimulationError::Gateway(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for SimulationError {}

impl From<ValidationError> for SimulationError {
    fn from(value: ValidationError) -> Self {
        SimulationError::Validation(value)
    }
}

impl From<SettingsError> for SimulationError {
    fn from(value: SettingsError) -> Self {
        SimulationError::Settings(value)
    }
}

impl From<GatewayError> for SimulationError {
    fn from(value: GatewayError) -> Self {
        SimulationError::Gateway(value)
    }
}

/// Runs one user-initiated calculation: validate, resolve the holiday
/// lists, then cache-lookup, on a miss remote-computation, store, present.
///
/// A lookup failure is a miss, not an error. A store failure is logged and
/// the computed plan is still returned. A gateway failure surfaces as a
/// retryable error; nothing is retried automatically and no partial state
/// is left behind.
pub async fn run_simulation(
    context: &AppContext,
    request: &SimulationRequest,
) -> Result<SimulationOutcome, SimulationError> {
    request.validate()?;

    let lists = generate_holiday_lists(
        request.start_date,
        request.duration_months,
        &request.rules,
        &request.overrides,
        context.holidays(),
        request.include_national_holidays,
        request.week_start,
    );

    let device_id = context.settings().device_id()?;
    let params = SimulationParameters::build(device_id, request, &lists.optimization);

    match context.cache().lookup(&params).await {
        Ok(Some(plan)) => {
            info!(device_id = %params.device_id, "serving cached purchase plan");
            return Ok(SimulationOutcome {
                parameters: params,
                plan,
                display_holidays: lists.display,
                from_cache: true,
            });
        }
        Ok(None) => debug!("no cached plan for these parameters"),
        Err(err) => warn!(error = %err, "plan cache lookup failed, recomputing"),
    }

    let plan = context.optimizer().request_plan(&params).await?;

    if let Err(err) = context.cache().store(&params, &plan).await {
        warn!(error = %err, "could not store computed plan");
    }

    Ok(SimulationOutcome {
        parameters: params,
        plan,
        display_holidays: lists.display,
        from_cache: false,
    })
}

/// Stashes an outcome for the result view under the transient handoff key.
pub fn stash_outcome(context: &AppContext, outcome: &SimulationOutcome) -> SettingsResult<()> {
    let json = serde_json::to_string(outcome).expect("simulation outcome serializes to JSON");
    context.settings().set_result_handoff(&json)
}

/// Takes the stashed outcome, consuming it. A malformed blob reads as
/// absent.
pub fn take_stashed_outcome(context: &AppContext) -> SettingsResult<Option<SimulationOutcome>> {
    Ok(context
        .settings()
        .take_result_handoff()?
        .and_then(|json| serde_json::from_str(&json).ok()))
}
