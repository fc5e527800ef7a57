//! `launchboard` - A terminal dashboard over SpaceX launch data
//!
//! This library provides the view models behind the dashboard: a filterable,
//! sortable and paged launch table, a detail card with a launch-site map, a
//! PDF export of selected launches and an analytics panel fed by an external
//! charting service.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod analytics;
pub mod cli;
pub mod collection;
pub mod config;
pub mod dashboard;
pub mod detail;
pub mod error;
pub mod export;
pub mod fetch;
pub mod logging;
pub mod map;
pub mod model;

pub use analytics::{AnalyticsPanel, SummaryTable};
pub use collection::{CollectionView, ExportSelection, SortDirection, SortField, SortSpec};
pub use config::Config;
pub use dashboard::{Dashboard, MapModal};
pub use detail::{DetailCard, DetailSignal};
pub use error::{Error, Result};
pub use export::{ExportReport, Exporter};
pub use fetch::{ApiClient, AnalyticsSource, ImageSource, LaunchSource};
pub use logging::init_logging;
pub use map::{MapOverlay, MapOverlayConfig, MapView, MapWidget};
pub use model::{Launch, Launchpad, Outcome};
