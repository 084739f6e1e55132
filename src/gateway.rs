use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::fingerprint::SimulationParameters;

/// Which alternative a comparison cost belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonKind {
    /// Every trip paid as a single-ride ticket.
    AllTickets,
    /// The longest enabled pass renewed back to back.
    Baseline,
    /// The shortest enabled pass bought on the first of every month.
    ShortestPassOnFirst,
    /// The optimizer's own best schedule.
    Optimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonCost {
    pub kind: ComparisonKind,
    pub amount: i64,
}

/// One pass purchase in the optimal schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseStep {
    pub date: NaiveDate,
    pub months: u32,
}

/// Optimizer-side counters, kept for the cache log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanDiagnostics {
    #[serde(default)]
    pub execution_time_sec: f64,
    #[serde(default)]
    pub purchase_days_count: u32,
    #[serde(default)]
    pub simulation_calls: u64,
    #[serde(default)]
    pub memo_hits: u64,
}

/// The optimizer's answer. Opaque to this crate beyond the fields the
/// cache and the result view need.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchasePlan {
    pub total_cost: i64,
    pub purchase_path: Vec<PurchaseStep>,
    pub comparison_costs: Vec<ComparisonCost>,
    #[serde(default)]
    pub diagnostics: PlanDiagnostics,
}

impl PurchasePlan {
    pub fn comparison(&self, kind: ComparisonKind) -> Option<i64> {
        self.comparison_costs
            .iter()
            .find(|cost| cost.kind == kind)
            .map(|cost| cost.amount)
    }

    /// How much the optimal schedule saves against an alternative.
    pub fn savings_against(&self, kind: ComparisonKind) -> Option<i64> {
        self.comparison(kind)
            .map(|amount| amount - self.total_cost)
    }
}

#[derive(Debug, Deserialize)]
struct PlanEnvelope {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    result: Option<PurchasePlan>,
}

#[derive(Debug)]
pub enum GatewayError {
    Transport(reqwest::Error),
    Service { status: String, message: String },
    MissingResult,
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::Transport(err) => {
                write!(f, "could not reach the calculation service: {err}")
            }
            GatewayError::Service { status, message } => {
                write!(f, "the calculation service reported '{status}': {message}")
            }
            GatewayError::MissingResult => {
                write!(f, "the calculation service answered success without a result")
            }
        }
    }
}

impl std::error::Error for GatewayError {}

impl From<reqwest::Error> for GatewayError {
    fn from(value: reqwest::Error) -> Self {
        GatewayError::Transport(value)
    }
}

/// Client for the external least-cost calculation endpoint.
///
/// One plain request/response exchange per calculation: the parameter
/// tuple goes out as query parameters, the answer comes back as a JSON
/// envelope. A transport failure or timeout resolves to an error value;
/// nothing is left pending. Concurrent requests are independent.
#[derive(Debug, Clone)]
pub struct OptimizerClient {
    client: reqwest::Client,
    endpoint: String,
}

impl OptimizerClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, endpoint))
    }

    pub fn with_client(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub async fn request_plan(
        &self,
        params: &SimulationParameters,
    ) -> Result<PurchasePlan, GatewayError> {
        let envelope: PlanEnvelope = self
            .client
            .get(&self.endpoint)
            .query(&params.query_pairs())
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if envelope.status != "success" {
            return Err(GatewayError::Service {
                status: envelope.status,
                message: envelope
                    .message
                    .unwrap_or_else(|| "unknown error".to_string()),
            });
        }
        envelope.result.ok_or(GatewayError::MissingResult)
    }
}
