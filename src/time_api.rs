// Module containing request/response data structures for the time provider
mod response;

pub use response::{ConvertResponse, CurrentTimeResponse};

use crate::error::AppError;
use serde::de::DeserializeOwned;
use tracing::{debug, error, info};

const PROVIDER: &str = "Time API";

/// Client for a timeapi.io-compatible time/timezone provider.
#[derive(Clone, Debug)]
pub struct TimeApi {
    client: reqwest::Client,
    base_url: String,
}

impl TimeApi {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Lists every IANA timezone name the provider knows about.
    pub async fn available_timezones(&self) -> Result<Vec<String>, AppError> {
        info!("Fetching available timezones");
        let url = format!("{}/api/timezone/availabletimezones", self.base_url);
        let response = self.client.get(&url).send().await?;
        let zones: Vec<String> = decode(response).await?;
        debug!("Fetched {} timezones", zones.len());
        Ok(zones)
    }

    /// Fetches the current wall-clock time in `timezone`.
    ///
    /// # Arguments
    /// * `timezone` - IANA timezone name (e.g. "Europe/London"); URL-encoded before sending
    ///
    /// # Returns
    /// * `CurrentTimeResponse` with the broken-down local time
    /// * Error if the request fails or the provider rejects the timezone
    pub async fn current_time(&self, timezone: &str) -> Result<CurrentTimeResponse, AppError> {
        info!("Fetching current time for timezone: {}", timezone);
        let url = format!("{}/api/Time/current/zone", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("timeZone", timezone)])
            .send()
            .await?;
        let time: CurrentTimeResponse = decode(response).await?;
        debug!("Time data fetched successfully: {:?}", time);
        Ok(time)
    }

    /// Converts `date_time` ("YYYY-MM-DD HH:MM:SS") from one timezone to another.
    pub async fn convert(
        &self,
        from_timezone: &str,
        to_timezone: &str,
        date_time: &str,
    ) -> Result<ConvertResponse, AppError> {
        info!(
            "Converting {} from {} to {}",
            date_time, from_timezone, to_timezone
        );
        let url = format!("{}/api/Conversion/ConvertTimeZone", self.base_url);
        let body = response::ConvertRequest {
            from_time_zone: from_timezone,
            date_time,
            to_time_zone: to_timezone,
            dst_ambiguity: "",
        };
        let response = self.client.post(&url).json(&body).send().await?;
        let converted: ConvertResponse = decode(response).await?;
        debug!("Conversion fetched successfully: {:?}", converted);
        Ok(converted)
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, AppError> {
    let status = response.status();
    if status.is_success() {
        Ok(response.json().await?)
    } else {
        error!("Failed to fetch time data: {}", status);
        Err(AppError::UpstreamStatus {
            provider: PROVIDER,
            status: status.as_u16(),
        })
    }
}
