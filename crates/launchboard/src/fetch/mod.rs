//! Data fetch layer.
//!
//! Read-only access to the launch data service and the analytics service. The
//! sources are traits so that views can be driven by the HTTP client in
//! production and by in-memory fakes in tests.

mod client;
mod request;
#[cfg(test)]
pub(crate) mod testing;

use std::future::Future;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{Error, Result};
use crate::model::{ChartImage, Launch, LaunchGapStat, LaunchSummaryRow, Launchpad};

pub use client::ApiClient;
pub use request::{RequestTicket, RequestTracker};

/// A source of launch and launchpad records.
#[async_trait]
pub trait LaunchSource: Send + Sync {
    /// Fetch every launch.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-success status or bad JSON.
    async fn launches(&self) -> Result<Vec<Launch>>;

    /// Fetch every launchpad.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-success status or bad JSON.
    async fn launchpads(&self) -> Result<Vec<Launchpad>>;
}

/// A source of pre-rendered analytics.
#[async_trait]
pub trait AnalyticsSource: Send + Sync {
    /// Chart of launches per year.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-success status or bad JSON.
    async fn launches_per_year_chart(&self) -> Result<ChartImage>;

    /// Chart of successes and failures per rocket.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-success status or bad JSON.
    async fn success_by_rocket_chart(&self) -> Result<ChartImage>;

    /// Average number of days between launches.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-success status or bad JSON.
    async fn average_gap(&self) -> Result<LaunchGapStat>;

    /// Launches flattened with their rocket names.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-success status or bad JSON.
    async fn launch_table(&self) -> Result<Vec<LaunchSummaryRow>>;
}

/// A source of raw image bytes, addressed by absolute URL.
#[async_trait]
pub trait ImageSource: Send + Sync {
    /// Download an image.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or non-success status.
    async fn image_bytes(&self, url: &str) -> Result<Vec<u8>>;
}

/// Launches and launchpads fetched together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LaunchData {
    /// All launches.
    pub launches: Vec<Launch>,
    /// All launchpads.
    pub launchpads: Vec<Launchpad>,
}

/// Run `fut` until it completes or `token` is cancelled.
///
/// # Errors
///
/// Returns [`Error::Cancelled`] if the token fires first, otherwise whatever
/// `fut` returns.
pub async fn cancellable<T, F>(token: &CancellationToken, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::select! {
        biased;
        () = token.cancelled() => Err(Error::Cancelled),
        result = fut => result,
    }
}

/// Fetch launches and launchpads concurrently.
///
/// Both requests are in flight at the same time; the call succeeds once both
/// have succeeded and fails as soon as either fails.
///
/// # Errors
///
/// Returns the first fetch error, or [`Error::Cancelled`].
pub async fn fetch_launches_and_pads<S>(source: &S, token: &CancellationToken) -> Result<LaunchData>
where
    S: LaunchSource + ?Sized,
{
    let (launches, launchpads) = cancellable(token, async {
        tokio::try_join!(source.launches(), source.launchpads())
    })
    .await?;

    debug!(
        launches = launches.len(),
        launchpads = launchpads.len(),
        "Fetched launch data"
    );
    Ok(LaunchData {
        launches,
        launchpads,
    })
}
