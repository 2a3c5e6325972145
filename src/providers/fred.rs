use crate::core::series::{
    DATE_FORMAT, InflationTable, SeriesProvider, TimeSeriesPoint, is_valid_index,
};
use crate::providers::util::{RetryPolicy, with_retry};
use crate::store::SeriesCache;
use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

/// Observations API of the Federal Reserve Economic Data service.
pub struct FredProvider {
    base_url: String,
    api_key: String,
    cache: SeriesCache,
    ttl: Duration,
    retry: RetryPolicy,
}

impl FredProvider {
    pub fn new(base_url: &str, api_key: &str, cache: SeriesCache, ttl: Duration) -> Self {
        FredProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            cache,
            ttl,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    observations: Vec<Observation>,
}

#[derive(Debug, Deserialize)]
struct Observation {
    date: String,
    value: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error_message: String,
}

pub fn validate_api_key(api_key: &str) -> Result<()> {
    if api_key.is_empty() || !api_key.chars().all(|c| c.is_ascii_hexdigit()) {
        bail!("Invalid API key: expected a hexadecimal string");
    }
    Ok(())
}

pub fn validate_series_id(series_id: &str) -> Result<()> {
    if series_id.is_empty() || !series_id.chars().all(|c| c.is_ascii_alphanumeric()) {
        bail!("Invalid series id '{series_id}': expected letters and digits only");
    }
    Ok(())
}

fn parse_observations(
    series_id: &str,
    observations: Vec<Observation>,
) -> Result<Vec<TimeSeriesPoint>> {
    let mut points = Vec::with_capacity(observations.len());
    for observation in observations {
        // FRED reports missing values as "."
        if observation.value.trim() == "." {
            continue;
        }
        let date = NaiveDate::parse_from_str(&observation.date, DATE_FORMAT).with_context(|| {
            format!(
                "Invalid observation date '{}' in series: {series_id}",
                observation.date
            )
        })?;
        let index: f64 = observation.value.trim().parse().with_context(|| {
            format!(
                "Invalid observation value '{}' on {date} in series: {series_id}",
                observation.value
            )
        })?;
        if !is_valid_index(index) {
            bail!("Non-positive index {index} on {date} in series: {series_id}");
        }
        points.push(TimeSeriesPoint { date, index });
    }
    Ok(points)
}

#[async_trait]
impl SeriesProvider for FredProvider {
    #[instrument(name = "FredSeriesFetch", skip(self), fields(series_id = %series_id))]
    async fn fetch_series(&self, series_id: &str) -> Result<InflationTable> {
        validate_api_key(&self.api_key)?;
        validate_series_id(series_id)?;

        let cache_key = format!("fred:{series_id}");
        if let Some(cached) = self.cache.get(&cache_key).await {
            return Ok(cached);
        }

        let url = format!(
            "{}/fred/series/observations?series_id={}&api_key={}&file_type=json",
            self.base_url, series_id, self.api_key
        );
        debug!("Requesting observations from {}", self.base_url);

        let client = reqwest::Client::builder()
            .user_agent("realprice/1.0")
            .build()?;
        let response = with_retry(|| async { client.get(&url).send().await }, self.retry)
            .await
            .with_context(|| format!("Failed to send request for series: {series_id}"))?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .with_context(|| format!("Failed to get response text for series: {series_id}"))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorResponse>(&response_text)
                .map(|e| e.error_message)
                .unwrap_or_else(|_| response_text.trim().to_string());
            return Err(anyhow!(
                "Request for series {series_id} failed with status {status}: {message}"
            ));
        }

        if response_text.trim().is_empty() {
            return Err(anyhow!("Received empty response for series: {}", series_id));
        }

        let parsed: ObservationsResponse =
            serde_json::from_str(&response_text).with_context(|| {
                format!("Failed to parse observations for series: {series_id}")
            })?;

        let points = parse_observations(series_id, parsed.observations)?;
        if points.is_empty() {
            bail!("No observations found for series: {series_id}");
        }
        debug!(
            "Fetched {} observations for {} ({} to {})",
            points.len(),
            series_id,
            points[0].date,
            points[points.len() - 1].date
        );

        let table = InflationTable::new(points);
        self.cache
            .put(cache_key, table.clone(), Some(self.ttl))
            .await;

        Ok(table)
    }

    async fn evict(&self, series_id: &str) {
        debug!("Evicting cached series {series_id}");
        self.cache.remove(&format!("fred:{series_id}")).await;
    }
}
