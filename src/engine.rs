use crate::api::AdhanApiClient;
use crate::config::IqamaConfig;
use crate::error::ScheduleError;
use crate::normalize::normalize;
use crate::rules::build_schedule;
use crate::schedule::Schedule;

/// Orchestrates one schedule build: fetch, normalize, apply the rules.
#[derive(Debug, Clone)]
pub struct IqamaScheduleBuilder {
    config: IqamaConfig,
    client: AdhanApiClient,
}

impl IqamaScheduleBuilder {
    pub fn new(config: IqamaConfig, client: AdhanApiClient) -> Self {
        Self { config, client }
    }

    /// Produce the full year's iqama schedule.
    ///
    /// A provider failure short-circuits before normalization; every other
    /// failure aborts the whole call. No partial schedule is ever returned.
    pub async fn execute(&self) -> Result<Schedule, ScheduleError> {
        tracing::info!(
            "Fetching adhan times for {} ({})",
            self.config.address,
            self.config.year
        );
        let payload = self
            .client
            .fetch_annual_timings(&self.config.address, self.config.year, self.config.method)
            .await?;

        let schedule = normalize(&payload, self.config.year)?;
        tracing::debug!("Normalized {} daily records", schedule.len());

        let schedule = build_schedule(&self.config, schedule)?;
        tracing::info!("Iqama schedule ready: {} days", schedule.len());
        Ok(schedule)
    }
}
