//! Analytics panel.
//!
//! Shows the two pre-rendered charts and the average launch gap served by the
//! analytics service, plus the service's flattened launch table.

use tracing::{debug, error, info};

use crate::error::{Error, Result};
use crate::fetch::{cancellable, AnalyticsSource, RequestTicket, RequestTracker};
use crate::model::{ChartImage, LaunchGapStat, LaunchSummaryRow};

/// Settled results of one analytics refresh. Each payload succeeds or fails on its own.
#[derive(Debug)]
pub struct AnalyticsResults {
    /// Launches-per-year chart.
    pub launches_per_year: Result<ChartImage>,
    /// Success-by-rocket chart.
    pub success_by_rocket: Result<ChartImage>,
    /// Average launch gap.
    pub average_gap: Result<LaunchGapStat>,
}

impl AnalyticsResults {
    /// Issue the three fetches at once and wait for all of them to settle.
    pub async fn fetch<S>(source: &S, ticket: &RequestTicket) -> Self
    where
        S: AnalyticsSource + ?Sized,
    {
        let token = ticket.token();
        let (launches_per_year, success_by_rocket, average_gap) = tokio::join!(
            cancellable(token, source.launches_per_year_chart()),
            cancellable(token, source.success_by_rocket_chart()),
            cancellable(token, source.average_gap()),
        );
        Self {
            launches_per_year,
            success_by_rocket,
            average_gap,
        }
    }
}

fn log_failure(what: &str, err: &Error) {
    if err.is_cancelled() {
        debug!("{what} request cancelled");
    } else {
        error!("Error loading {what}: {err}");
    }
}

/// State of the analytics panel.
#[derive(Debug, Default)]
pub struct AnalyticsPanel {
    launches_per_year: Option<ChartImage>,
    success_by_rocket: Option<ChartImage>,
    average_gap: Option<LaunchGapStat>,
    loading: bool,
    requests: RequestTracker,
}

impl AnalyticsPanel {
    /// Create an empty panel.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a refresh is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// The launches-per-year chart, once loaded.
    #[must_use]
    pub fn launches_per_year(&self) -> Option<&ChartImage> {
        self.launches_per_year.as_ref()
    }

    /// The success-by-rocket chart, once loaded.
    #[must_use]
    pub fn success_by_rocket(&self) -> Option<&ChartImage> {
        self.success_by_rocket.as_ref()
    }

    /// The average launch gap, once loaded.
    #[must_use]
    pub fn average_gap(&self) -> Option<LaunchGapStat> {
        self.average_gap
    }

    /// Start a refresh: show the loading state and supersede any refresh in flight.
    pub fn begin_refresh(&mut self) -> RequestTicket {
        self.loading = true;
        self.requests.begin()
    }

    /// Apply the results of the refresh identified by `ticket`.
    ///
    /// Stale results are dropped and `false` is returned. Otherwise loading
    /// ends, every successful payload replaces its slot and every failure is
    /// logged, leaving that slot as it was.
    pub fn apply(&mut self, ticket: &RequestTicket, results: AnalyticsResults) -> bool {
        if !self.requests.finish(ticket) {
            debug!(
                generation = ticket.generation(),
                "Discarding stale analytics results"
            );
            return false;
        }
        self.loading = false;

        match results.launches_per_year {
            Ok(chart) => self.launches_per_year = Some(chart),
            Err(err) => log_failure("launches-per-year chart", &err),
        }
        match results.success_by_rocket {
            Ok(chart) => self.success_by_rocket = Some(chart),
            Err(err) => log_failure("success-by-rocket chart", &err),
        }
        match results.average_gap {
            Ok(stat) => self.average_gap = Some(stat),
            Err(err) => log_failure("average launch gap", &err),
        }
        true
    }

    /// Fetch everything again and apply it.
    pub async fn refresh<S>(&mut self, source: &S) -> bool
    where
        S: AnalyticsSource + ?Sized,
    {
        let ticket = self.begin_refresh();
        let results = AnalyticsResults::fetch(source, &ticket).await;
        let applied = self.apply(&ticket, results);
        if applied {
            info!(
                charts = usize::from(self.launches_per_year.is_some())
                    + usize::from(self.success_by_rocket.is_some()),
                has_gap = self.average_gap.is_some(),
                "Analytics refreshed"
            );
        }
        applied
    }

    /// Abandon any refresh in flight.
    pub fn cancel(&mut self) {
        self.requests.cancel();
        self.loading = false;
    }
}

impl std::fmt::Display for AnalyticsPanel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.loading {
            return writeln!(f, "Loading analytics...");
        }

        let describe = |chart: Option<&ChartImage>| match chart.map(ChartImage::decode) {
            Some(Ok(bytes)) => format!("PNG, {} bytes", bytes.len()),
            Some(Err(_)) => "unreadable".to_string(),
            None => "-".to_string(),
        };

        writeln!(f, "SpaceX Analytics")?;
        writeln!(f, "================")?;
        writeln!(
            f,
            "Launches per year:   {}",
            describe(self.launches_per_year.as_ref())
        )?;
        writeln!(
            f,
            "Success by rocket:   {}",
            describe(self.success_by_rocket.as_ref())
        )?;
        if let Some(gap) = self.average_gap {
            writeln!(f)?;
            writeln!(f, "Average time between launches: {gap}")?;
        }
        Ok(())
    }
}

/// The analytics service's launch table.
#[derive(Debug, Default)]
pub struct SummaryTable {
    rows: Vec<LaunchSummaryRow>,
    loading: bool,
    requests: RequestTracker,
}

impl SummaryTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows loaded so far.
    #[must_use]
    pub fn rows(&self) -> &[LaunchSummaryRow] {
        &self.rows
    }

    /// Check if a load is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Load the table. On failure the error is logged and previous rows stay.
    pub async fn load<S>(&mut self, source: &S) -> bool
    where
        S: AnalyticsSource + ?Sized,
    {
        self.loading = true;
        let ticket = self.requests.begin();
        let result = cancellable(ticket.token(), source.launch_table()).await;

        if !self.requests.finish(&ticket) {
            return false;
        }
        self.loading = false;
        match result {
            Ok(rows) => {
                self.rows = rows;
                true
            }
            Err(err) => {
                log_failure("launch table", &err);
                false
            }
        }
    }
}
