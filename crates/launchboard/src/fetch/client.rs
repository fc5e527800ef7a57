//! HTTP implementation of the fetch traits.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};

use super::{AnalyticsSource, ImageSource, LaunchSource};
use crate::config::ApiConfig;
use crate::error::{Error, Result};
use crate::model::{ChartImage, Launch, LaunchGapStat, LaunchSummaryRow, Launchpad};

const USER_AGENT: &str = concat!("launchboard/", env!("CARGO_PKG_VERSION"));

/// Client for the launch data service and the analytics service.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    launches_base: String,
    analytics_base: String,
}

impl ApiClient {
    /// Create a client for the configured services.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            launches_base: config.launches_base_url.trim_end_matches('/').to_string(),
            analytics_base: config.analytics_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn launches_url(&self, path: &str) -> String {
        format!("{}/{path}", self.launches_base)
    }

    fn analytics_url(&self, path: &str) -> String {
        format!("{}/{path}", self.analytics_base)
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        trace!("GET {url}");
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|source| Error::Network {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|source| Error::Network {
            url: url.to_string(),
            source,
        })?;
        debug!(bytes = body.len(), "GET {url} -> {status}");
        Ok(body.to_vec())
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T> {
        let body = self.get_bytes(&url).await?;
        serde_json::from_slice(&body).map_err(|source| Error::Parse { url, source })
    }
}

#[async_trait]
impl LaunchSource for ApiClient {
    async fn launches(&self) -> Result<Vec<Launch>> {
        self.get_json(self.launches_url("launches")).await
    }

    async fn launchpads(&self) -> Result<Vec<Launchpad>> {
        self.get_json(self.launches_url("launchpads")).await
    }
}

#[async_trait]
impl AnalyticsSource for ApiClient {
    async fn launches_per_year_chart(&self) -> Result<ChartImage> {
        self.get_json(self.analytics_url("charts/launches-per-year"))
            .await
    }

    async fn success_by_rocket_chart(&self) -> Result<ChartImage> {
        self.get_json(self.analytics_url("charts/success-by-rocket"))
            .await
    }

    async fn average_gap(&self) -> Result<LaunchGapStat> {
        self.get_json(self.analytics_url("stats/avg-time-between-launches"))
            .await
    }

    async fn launch_table(&self) -> Result<Vec<LaunchSummaryRow>> {
        self.get_json(self.analytics_url("launches")).await
    }
}

#[async_trait]
impl ImageSource for ApiClient {
    async fn image_bytes(&self, url: &str) -> Result<Vec<u8>> {
        self.get_bytes(url).await
    }
}
