use crate::cache::RemotePlanCache;
use crate::config::AppConfig;
use crate::gateway::OptimizerClient;
use crate::holidays::NationalHolidayProvider;
use crate::settings::Settings;

/// Everything the components share, constructed once at startup and passed
/// in explicitly. One HTTP client backs both remote collaborators so the
/// transport timeout applies uniformly.
pub struct AppContext {
    settings: Settings,
    cache: RemotePlanCache,
    optimizer: OptimizerClient,
    holidays: Box<dyn NationalHolidayProvider + Send + Sync>,
}

impl AppContext {
    pub fn new(
        config: &AppConfig,
        settings: Settings,
        holidays: Box<dyn NationalHolidayProvider + Send + Sync>,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            settings,
            cache: RemotePlanCache::with_client(client.clone(), config.cache_endpoint.clone()),
            optimizer: OptimizerClient::with_client(client, config.optimizer_endpoint.clone()),
            holidays,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn cache(&self) -> &RemotePlanCache {
        &self.cache
    }

    pub fn optimizer(&self) -> &OptimizerClient {
        &self.optimizer
    }

    pub fn holidays(&self) -> &dyn NationalHolidayProvider {
        self.holidays.as_ref()
    }
}
