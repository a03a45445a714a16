use std::time::{Duration as StdDuration, Instant};

use reqwest::{StatusCode, Url};
use tracing::debug;

use crate::error::{AppError, AppResult, FetchError};
use crate::models::productivity::{MonthPeriod, ProductivitySummary};
use crate::models::settings::ReportSettings;

/// Source of the monthly productivity summary for one staff member.
#[async_trait::async_trait]
pub trait ProductivitySource: Send + Sync {
    async fn monthly_summary(
        &self,
        staff_id: &str,
        period: MonthPeriod,
    ) -> Result<ProductivitySummary, FetchError>;
}

/// HTTP implementation. One GET per call, no retries.
#[derive(Debug, Clone)]
pub struct HttpProductivityClient {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpProductivityClient {
    pub fn try_new(base_url: &str, timeout: Option<StdDuration>) -> AppResult<Self> {
        let mut builder = reqwest::Client::builder()
            .pool_max_idle_per_host(2)
            .pool_idle_timeout(Some(StdDuration::from_secs(90)));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let base_url = Url::parse(base_url)
            .map_err(|err| AppError::config(format!("invalid productivity base URL {base_url}: {err}")))?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::config(format!(
                "productivity base URL {base_url} cannot carry a path"
            )));
        }

        let client = builder
            .build()
            .map_err(|err| AppError::other(format!("failed to build productivity HTTP client: {err}")))?;

        Ok(Self { client, base_url })
    }

    pub fn from_settings(settings: &ReportSettings) -> AppResult<Self> {
        Self::try_new(
            &settings.api_base_url,
            settings.http_timeout_secs.map(StdDuration::from_secs),
        )
    }

    /// Each segment is percent-encoded, so the staff id can never escape
    /// its own path segment.
    fn endpoint(&self, staff_id: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["api", "staff", staff_id, "productivity"]);
        }
        url
    }

    fn map_http_status(status: StatusCode) -> FetchError {
        FetchError::http_status(status.as_u16())
    }

    fn error_from_reqwest(err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::timeout()
        } else if let Some(status) = err.status() {
            Self::map_http_status(status)
        } else if err.is_decode() {
            FetchError::invalid_response(err.to_string())
        } else {
            FetchError::transport(err.to_string())
        }
    }
}

#[async_trait::async_trait]
impl ProductivitySource for HttpProductivityClient {
    async fn monthly_summary(
        &self,
        staff_id: &str,
        period: MonthPeriod,
    ) -> Result<ProductivitySummary, FetchError> {
        let endpoint = self.endpoint(staff_id);
        debug!(
            target: "report::fetch",
            %staff_id,
            month = period.month,
            year = period.year,
            "requesting monthly productivity summary"
        );

        let start = Instant::now();
        let response = self
            .client
            .get(endpoint)
            .query(&[
                ("month", period.month.to_string()),
                ("year", period.year.to_string()),
            ])
            .send()
            .await
            .map_err(Self::error_from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::map_http_status(status));
        }

        let body = response.bytes().await.map_err(Self::error_from_reqwest)?;
        let summary: ProductivitySummary = serde_json::from_slice(&body)
            .map_err(|err| FetchError::invalid_response(err.to_string()))?;

        debug!(
            target: "report::fetch",
            %staff_id,
            latency_ms = start.elapsed().as_millis() as u64,
            scheduled = summary.total_appointments,
            completed = summary.completed_appointments,
            "productivity summary received"
        );

        Ok(summary)
    }
}

pub mod testing {
    use super::*;

    /// Status mapping exposed for integration tests.
    pub fn map_http_status(status: StatusCode) -> FetchError {
        HttpProductivityClient::map_http_status(status)
    }

    pub fn endpoint_for(base_url: &str, staff_id: &str) -> AppResult<String> {
        Ok(HttpProductivityClient::try_new(base_url, None)?
            .endpoint(staff_id)
            .to_string())
    }
}
