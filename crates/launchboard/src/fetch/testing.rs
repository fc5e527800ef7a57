//! In-memory sources for tests.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;

use super::{AnalyticsSource, ImageSource, LaunchSource};
use crate::error::{Error, Result};
use crate::model::{ChartImage, Launch, LaunchGapStat, LaunchSummaryRow, Launchpad};

/// A source that answers from memory. `None` fields answer with HTTP 500.
#[derive(Debug, Default)]
pub(crate) struct FakeSource {
    pub launches: Option<Vec<Launch>>,
    pub launchpads: Option<Vec<Launchpad>>,
    pub per_year: Option<ChartImage>,
    pub by_rocket: Option<ChartImage>,
    pub gap: Option<LaunchGapStat>,
    pub table: Option<Vec<LaunchSummaryRow>>,
    pub images: HashMap<String, Vec<u8>>,
    pub delay: Duration,
}

impl FakeSource {
    pub fn with_data(launches: Vec<Launch>, launchpads: Vec<Launchpad>) -> Self {
        Self {
            launches: Some(launches),
            launchpads: Some(launchpads),
            ..Self::default()
        }
    }

    async fn answer<T: Clone + Sync>(&self, path: &str, value: Option<&T>) -> Result<T> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        value.cloned().ok_or_else(|| Error::HttpStatus {
            url: format!("fake://{path}"),
            status: 500,
        })
    }
}

#[async_trait]
impl LaunchSource for FakeSource {
    async fn launches(&self) -> Result<Vec<Launch>> {
        self.answer("launches", self.launches.as_ref()).await
    }

    async fn launchpads(&self) -> Result<Vec<Launchpad>> {
        self.answer("launchpads", self.launchpads.as_ref()).await
    }
}

#[async_trait]
impl AnalyticsSource for FakeSource {
    async fn launches_per_year_chart(&self) -> Result<ChartImage> {
        self.answer("charts/launches-per-year", self.per_year.as_ref())
            .await
    }

    async fn success_by_rocket_chart(&self) -> Result<ChartImage> {
        self.answer("charts/success-by-rocket", self.by_rocket.as_ref())
            .await
    }

    async fn average_gap(&self) -> Result<LaunchGapStat> {
        self.answer("stats/avg-time-between-launches", self.gap.as_ref())
            .await
    }

    async fn launch_table(&self) -> Result<Vec<LaunchSummaryRow>> {
        self.answer("launches", self.table.as_ref()).await
    }
}

#[async_trait]
impl ImageSource for FakeSource {
    async fn image_bytes(&self, url: &str) -> Result<Vec<u8>> {
        self.answer(url, self.images.get(url)).await
    }
}

pub(crate) fn sample_launches() -> Vec<Launch> {
    serde_json::from_str(
        r#"[
            {"id":"1","name":"Falcon 9","date_utc":"2020-01-01T00:00:00Z","success":true,"launchpad":"p1",
             "links":{"patch":{"small":"https://images.example/falcon9.png"}}},
            {"id":"2","name":"FalconSat","date_utc":"2006-03-24T22:30:00Z","success":false,"launchpad":"p2"},
            {"id":"3","name":"Crew-9","date_utc":"2024-09-28T17:17:00Z","success":null,"launchpad":"p1"}
        ]"#,
    )
    .expect("sample launches parse")
}

pub(crate) fn sample_pads() -> Vec<Launchpad> {
    serde_json::from_str(
        r#"[
            {"id":"p1","full_name":"Cape Canaveral","latitude":"28.5","longitude":"-80.6"},
            {"id":"p2","full_name":"Kwajalein Atoll","latitude":9.0477,"longitude":167.7431}
        ]"#,
    )
    .expect("sample launchpads parse")
}
