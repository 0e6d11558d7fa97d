use std::time::Duration;

use anyhow::Result;
use reqwest::Client;
use serde::Deserialize;
use tokio::net::TcpStream;

use crate::config::City;
use crate::constants::{PROBE_ADDR, PROBE_TIMEOUT_SECS, USER_AGENT, WAQI_API_BASE};
use crate::models::{CityReport, FeedResponse};
use crate::report::CityOutcome;

/// Client for the WAQI city feed
pub struct AirQuality {
    client: Client,
    token: String,
}

impl AirQuality {
    /// Creates a new feed client
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self {
            client,
            token: token.into(),
        })
    }

    /// Makes an HTTP GET request and deserializes the JSON response.
    ///
    /// The URL carries the API token, so it is stripped from any error.
    async fn make_request<T: for<'de> Deserialize<'de>>(&self, url: &str) -> Result<T> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;

        if !response.status().is_success() {
            anyhow::bail!("Request failed with status: {}", response.status());
        }

        let data = response
            .json::<T>()
            .await
            .map_err(reqwest::Error::without_url)?;
        Ok(data)
    }

    /// Fetches the raw feed of one station
    pub async fn fetch_feed(&self, feed: &str) -> Result<FeedResponse> {
        let url = format!("{}/feed/{}/?token={}", WAQI_API_BASE, feed, self.token);
        self.make_request::<FeedResponse>(&url).await
    }

    /// Fetches and decodes one city; failures become a `Failed` outcome so the
    /// remaining cities still render
    pub async fn fetch_city(&self, city: &City) -> CityOutcome {
        tracing::info!("Fetching feed for {} ({})", city.label, city.feed);

        let failed = |reason: String| {
            tracing::warn!("{}: {}", city.label, reason);
            CityOutcome::Failed {
                label: city.label.clone(),
                reason,
            }
        };

        let response = match self.fetch_feed(&city.feed).await {
            Ok(response) => response,
            Err(e) => return failed(format!("Failed to fetch feed: {}", e)),
        };

        match CityReport::from_response(&city.label, response) {
            Ok(report) => CityOutcome::Ready(report),
            Err(e) => failed(e.to_string()),
        }
    }
}

/// Whether any network path is available, judged by a short TCP connect
pub async fn is_connected() -> bool {
    let probe = TcpStream::connect(PROBE_ADDR);
    match tokio::time::timeout(Duration::from_secs(PROBE_TIMEOUT_SECS), probe).await {
        Ok(Ok(_)) => true,
        Ok(Err(e)) => {
            tracing::debug!("Connectivity probe failed: {}", e);
            false
        }
        Err(_) => {
            tracing::debug!("Connectivity probe timed out");
            false
        }
    }
}
