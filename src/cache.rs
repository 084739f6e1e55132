use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::fingerprint::SimulationParameters;
use crate::gateway::{ComparisonCost, ComparisonKind, PlanDiagnostics, PurchasePlan, PurchaseStep};

/// One row of the remote calculation log: the full fingerprint tuple plus
/// the plan it produced. The tuple fields are the natural key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheRecord {
    pub device_id: String,
    pub fare: u32,
    pub monthly_pass: u32,
    pub three_month_pass: u32,
    pub six_month_pass: u32,
    pub start_date: String,
    pub duration_in_months: u32,
    pub holidays: String,
    pub cache_version: String,
    pub total_cost: i64,
    pub purchase_path: Vec<PurchaseStep>,
    pub cost_all_tickets: i64,
    pub cost_baseline: i64,
    pub cost_shortest_on_first: i64,
    #[serde(default)]
    pub diagnostics: PlanDiagnostics,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl CacheRecord {
    pub fn from_plan(params: &SimulationParameters, plan: &PurchasePlan) -> Self {
        Self {
            device_id: params.device_id.clone(),
            fare: params.fare,
            monthly_pass: params.monthly_pass,
            three_month_pass: params.three_month_pass,
            six_month_pass: params.six_month_pass,
            start_date: params.start_date.clone(),
            duration_in_months: params.duration_in_months,
            holidays: params.holidays.clone(),
            cache_version: params.cache_version.clone(),
            total_cost: plan.total_cost,
            purchase_path: plan.purchase_path.clone(),
            cost_all_tickets: plan.comparison(ComparisonKind::AllTickets).unwrap_or(0),
            cost_baseline: plan.comparison(ComparisonKind::Baseline).unwrap_or(0),
            cost_shortest_on_first: plan
                .comparison(ComparisonKind::ShortestPassOnFirst)
                .unwrap_or(0),
            diagnostics: plan.diagnostics,
            created_at: None,
        }
    }

    pub fn into_plan(self) -> PurchasePlan {
        let mut comparison_costs = Vec::new();
        for (kind, amount) in [
            (ComparisonKind::AllTickets, self.cost_all_tickets),
            (ComparisonKind::Baseline, self.cost_baseline),
            (ComparisonKind::ShortestPassOnFirst, self.cost_shortest_on_first),
        ] {
            if amount > 0 {
                comparison_costs.push(ComparisonCost { kind, amount });
            }
        }
        PurchasePlan {
            total_cost: self.total_cost,
            purchase_path: self.purchase_path,
            comparison_costs,
            diagnostics: self.diagnostics,
        }
    }
}

#[derive(Debug)]
pub enum CacheError {
    Transport(reqwest::Error),
    Decode(serde_json::Error),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheError::Transport(err) => write!(f, "plan cache unreachable: {err}"),
            CacheError::Decode(err) => write!(f, "plan cache returned an unreadable payload: {err}"),
        }
    }
}

impl std::error::Error for CacheError {}

impl From<reqwest::Error> for CacheError {
    fn from(value: reqwest::Error) -> Self {
        CacheError::Transport(value)
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(value: serde_json::Error) -> Self {
        CacheError::Decode(value)
    }
}

/// Client for the remote calculation log.
///
/// Lookup matches every fingerprint field by equality and takes the most
/// recently written row; ties go to the latest write. Store upserts by the
/// same natural key, so recomputing with identical parameters overwrites
/// rather than duplicates. Invalidation is version-driven only: there is
/// no TTL and no eviction.
#[derive(Debug, Clone)]
pub struct RemotePlanCache {
    client: reqwest::Client,
    endpoint: String,
}

impl RemotePlanCache {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, CacheError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, endpoint))
    }

    pub fn with_client(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub async fn lookup(
        &self,
        params: &SimulationParameters,
    ) -> Result<Option<PurchasePlan>, CacheError> {
        let mut query = params.query_pairs();
        query.push(("order", "created_at.desc".to_string()));
        query.push(("limit", "1".to_string()));

        let body = self
            .client
            .get(&self.endpoint)
            .query(&query)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        let records: Vec<CacheRecord> = serde_json::from_str(&body)?;
        Ok(records.into_iter().next().map(CacheRecord::into_plan))
    }

    pub async fn store(
        &self,
        params: &SimulationParameters,
        plan: &PurchasePlan,
    ) -> Result<(), CacheError> {
        let record = CacheRecord::from_plan(params, plan);
        self.client
            .post(&self.endpoint)
            .json(&record)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
