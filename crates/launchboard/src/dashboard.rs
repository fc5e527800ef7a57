//! Dashboard root.
//!
//! Owns the launch collection, the loading flag, the launch shown in the
//! detail card and the map modal. Drives the initial load and answers the
//! detail card's signals.

use serde::Serialize;
use tracing::{debug, error, info};

use crate::collection::CollectionView;
use crate::config::Config;
use crate::detail::{DetailCard, DetailSignal};
use crate::error::Result;
use crate::fetch::{fetch_launches_and_pads, LaunchData, LaunchSource, RequestTicket, RequestTracker};
use crate::map::{MapOverlay, MapOverlayConfig, MapView, RelayoutTask};
use crate::model::{find_launchpad, Launch, Launchpad};

/// State of the map modal.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "modal", rename_all = "snake_case")]
pub enum MapModal {
    /// Not shown.
    Closed,
    /// Shown, but the launch has no known launchpad.
    LocationUnavailable,
    /// Shown for a launchpad.
    Open {
        /// Launchpad name.
        title: String,
        /// What the overlay draws.
        view: MapView,
    },
}

/// Top-level view state.
#[derive(Debug)]
pub struct Dashboard {
    collection: CollectionView,
    loading: bool,
    requests: RequestTracker,
    selected: Option<String>,
    map: MapOverlay,
}

impl Dashboard {
    /// Create an empty dashboard.
    #[must_use]
    pub fn new(collection: CollectionView, map: MapOverlayConfig) -> Self {
        Self {
            collection,
            loading: false,
            requests: RequestTracker::new(),
            selected: None,
            map: MapOverlay::new(map),
        }
    }

    /// Create an empty dashboard from the configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            CollectionView::from_config(&config.table),
            MapOverlayConfig::from(&config.map),
        )
    }

    /// The launch collection.
    #[must_use]
    pub fn collection(&self) -> &CollectionView {
        &self.collection
    }

    /// The launch collection, for filtering, sorting, paging and selection.
    pub fn collection_mut(&mut self) -> &mut CollectionView {
        &mut self.collection
    }

    /// Check if the initial load is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    // --- loading ---

    /// Start a load, superseding any load in flight.
    pub fn begin_load(&mut self) -> RequestTicket {
        self.loading = true;
        self.requests.begin()
    }

    /// Apply the result of the load identified by `ticket`.
    ///
    /// Returns `false` for stale results, which are dropped. A failed load is
    /// logged and leaves the previous data in place.
    pub fn apply_load(&mut self, ticket: &RequestTicket, result: Result<LaunchData>) -> bool {
        if !self.requests.finish(ticket) {
            debug!(generation = ticket.generation(), "Discarding stale launch data");
            return false;
        }
        self.loading = false;

        match result {
            Ok(data) => {
                info!(
                    launches = data.launches.len(),
                    launchpads = data.launchpads.len(),
                    "Launch data loaded"
                );
                self.collection.replace_data(data);
                if self.selected.is_some() && self.selected_launch().is_none() {
                    self.clear_detail();
                }
                true
            }
            Err(e) => {
                error!("Error loading data: {e}");
                false
            }
        }
    }

    /// Fetch launches and launchpads and store them.
    pub async fn load<S>(&mut self, source: &S) -> bool
    where
        S: LaunchSource + ?Sized,
    {
        let ticket = self.begin_load();
        let result = fetch_launches_and_pads(source, ticket.token()).await;
        self.apply_load(&ticket, result)
    }

    /// Abandon the load in flight.
    pub fn cancel_load(&mut self) {
        self.requests.cancel();
        self.loading = false;
    }

    // --- detail ---

    /// Show `id` in the detail card. Closes the map. Returns `false` for an unknown id.
    pub fn select_for_detail(&mut self, id: &str) -> bool {
        if self.collection.find(id).is_none() {
            return false;
        }
        self.close_map();
        self.selected = Some(id.to_string());
        true
    }

    /// Hide the detail card and the map.
    pub fn clear_detail(&mut self) {
        self.close_map();
        self.selected = None;
    }

    /// The launch shown in the detail card.
    #[must_use]
    pub fn selected_launch(&self) -> Option<&Launch> {
        self.selected.as_deref().and_then(|id| self.collection.find(id))
    }

    /// The detail card of the selected launch.
    #[must_use]
    pub fn detail_card(&self) -> Option<DetailCard> {
        self.selected_launch().map(|launch| {
            DetailCard::project(
                launch,
                self.collection.launchpads(),
                self.collection.date_format(),
            )
        })
    }

    fn selected_pad(&self) -> Option<&Launchpad> {
        self.selected_launch()
            .and_then(|launch| find_launchpad(self.collection.launchpads(), launch))
    }

    // --- map ---

    /// React to a signal from the detail card.
    ///
    /// `ShowMap` opens the modal for the selected launch's site and returns the
    /// widget relayout to run, if the map became visible with valid coordinates.
    pub fn handle_detail_signal(&mut self, signal: DetailSignal) -> Option<RelayoutTask> {
        match signal {
            DetailSignal::ShowMap => {
                self.selected.as_ref()?;
                let coordinates = self.selected_pad().map(Launchpad::coordinates);
                self.map.set_visible(true, coordinates.as_ref())
            }
        }
    }

    /// Close the map modal.
    pub fn close_map(&mut self) {
        self.map.set_visible(false, None);
    }

    /// The map modal as it should be shown.
    #[must_use]
    pub fn map_modal(&self) -> MapModal {
        if !self.map.is_visible() {
            return MapModal::Closed;
        }
        let Some(pad) = self.selected_pad() else {
            return MapModal::LocationUnavailable;
        };
        let coordinates = pad.coordinates();
        MapModal::Open {
            title: pad.display_name().to_string(),
            view: self.map.render(Some(&coordinates), pad.full_name.as_deref()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::fetch::testing::{sample_launches, sample_pads, FakeSource};
    use crate::logging::init_test_logging;
    use crate::map::MapWidget;
    use crate::model::GeoPoint;

    fn dashboard() -> Dashboard {
        Dashboard::from_config(&Config::default())
    }

    fn loaded_source() -> FakeSource {
        FakeSource::with_data(sample_launches(), sample_pads())
    }

    #[tokio::test]
    async fn test_load_fills_collection() {
        let mut dash = dashboard();
        assert!(dash.load(&loaded_source()).await);

        assert!(!dash.is_loading());
        assert_eq!(dash.collection().launches().len(), 3);
        assert_eq!(dash.collection().launchpads().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_load_keeps_previous_data() {
        init_test_logging();
        let mut dash = dashboard();
        dash.load(&loaded_source()).await;

        let mut broken = loaded_source();
        broken.launchpads = None;
        assert!(!dash.load(&broken).await);

        assert!(!dash.is_loading());
        assert_eq!(dash.collection().launches().len(), 3);
    }

    #[tokio::test]
    async fn test_first_load_failure_leaves_empty() {
        init_test_logging();
        let mut dash = dashboard();
        assert!(!dash.load(&FakeSource::default()).await);
        assert!(!dash.is_loading());
        assert!(dash.collection().launches().is_empty());
    }

    #[tokio::test]
    async fn test_stale_load_is_discarded() {
        let mut dash = dashboard();
        let first = dash.begin_load();
        let second = dash.begin_load();

        let newer = LaunchData {
            launches: sample_launches()[..1].to_vec(),
            launchpads: sample_pads(),
        };
        assert!(dash.apply_load(&second, Ok(newer)));
        let late = LaunchData {
            launches: sample_launches(),
            launchpads: sample_pads(),
        };
        assert!(!dash.apply_load(&first, Ok(late)));
        assert_eq!(dash.collection().launches().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_load_drops_late_result() {
        let mut source = loaded_source();
        source.delay = Duration::from_secs(5);
        let mut dash = dashboard();

        let ticket = dash.begin_load();
        assert!(dash.is_loading());
        dash.cancel_load();
        assert!(!dash.is_loading());
        assert!(ticket.token().is_cancelled());

        let result = fetch_launches_and_pads(&source, ticket.token()).await;
        assert!(result.as_ref().unwrap_err().is_cancelled());
        assert!(!dash.apply_load(&ticket, result));

        let late = LaunchData {
            launches: sample_launches(),
            launchpads: sample_pads(),
        };
        assert!(!dash.apply_load(&ticket, Ok(late)));
        assert!(!dash.is_loading());
        assert!(dash.collection().launches().is_empty());
    }

    #[tokio::test]
    async fn test_falcon9_detail() {
        let mut dash = dashboard();
        dash.load(&loaded_source()).await;

        assert!(dash.select_for_detail("1"));
        let card = dash.detail_card().unwrap();
        assert_eq!(card.name, "Falcon 9");
        assert_eq!(card.status, "Success");
        assert_eq!(card.location, "Cape Canaveral");

        assert!(!dash.select_for_detail("missing"));
        assert_eq!(dash.detail_card().unwrap().name, "Falcon 9");
    }

    #[tokio::test]
    async fn test_detail_selection_does_not_touch_export_selection() {
        let mut dash = dashboard();
        dash.load(&loaded_source()).await;

        dash.select_for_detail("2");
        assert!(dash.collection().selection().is_empty());
        dash.collection_mut().toggle_selection("1");
        assert_eq!(dash.detail_card().unwrap().name, "FalconSat");
    }

    #[tokio::test]
    async fn test_show_map_opens_modal() {
        let mut dash = dashboard();
        dash.load(&loaded_source()).await;
        dash.select_for_detail("1");
        assert_eq!(dash.map_modal(), MapModal::Closed);

        let task = dash.handle_detail_signal(DetailSignal::ShowMap);
        assert!(task.is_some());

        let MapModal::Open { title, view } = dash.map_modal() else {
            panic!("map should be open");
        };
        assert_eq!(title, "Cape Canaveral");
        let MapView::Map(scene) = view else {
            panic!("coordinates should be valid");
        };
        assert_eq!(
            scene.center,
            GeoPoint {
                latitude: 28.5,
                longitude: -80.6
            }
        );
        assert_eq!(scene.zoom, 10);
        assert_eq!(scene.marker.label, "Cape Canaveral");

        dash.close_map();
        assert_eq!(dash.map_modal(), MapModal::Closed);
    }

    #[tokio::test]
    async fn test_show_map_without_launchpad() {
        let launches: Vec<Launch> =
            serde_json::from_str(r#"[{"id":"x","name":"Orphan","launchpad":"nowhere"}]"#).unwrap();
        let mut dash = dashboard();
        dash.load(&FakeSource::with_data(launches, sample_pads())).await;
        dash.select_for_detail("x");

        assert!(dash.handle_detail_signal(DetailSignal::ShowMap).is_none());
        assert_eq!(dash.map_modal(), MapModal::LocationUnavailable);
    }

    #[tokio::test]
    async fn test_show_map_with_invalid_coordinates() {
        let pads: Vec<Launchpad> =
            serde_json::from_str(r#"[{"id":"p1","full_name":"Nowhere","latitude":"n/a","longitude":1.0}]"#)
                .unwrap();
        let mut dash = dashboard();
        dash.load(&FakeSource::with_data(sample_launches(), pads)).await;
        dash.select_for_detail("1");

        assert!(dash.handle_detail_signal(DetailSignal::ShowMap).is_none());
        assert_eq!(
            dash.map_modal(),
            MapModal::Open {
                title: "Nowhere".to_string(),
                view: MapView::InvalidCoordinates,
            }
        );
    }

    #[test]
    fn test_show_map_without_selection() {
        let mut dash = dashboard();
        assert!(dash.handle_detail_signal(DetailSignal::ShowMap).is_none());
        assert_eq!(dash.map_modal(), MapModal::Closed);
    }

    #[tokio::test]
    async fn test_reload_drops_vanished_detail() {
        let mut dash = dashboard();
        dash.load(&loaded_source()).await;
        dash.select_for_detail("3");

        let fewer = FakeSource::with_data(sample_launches()[..2].to_vec(), sample_pads());
        dash.load(&fewer).await;
        assert!(dash.detail_card().is_none());
    }

    #[derive(Debug, Default)]
    struct CountingWidget {
        relayouts: usize,
        center: Option<GeoPoint>,
    }

    impl MapWidget for CountingWidget {
        fn invalidate_size(&mut self) {
            self.relayouts += 1;
        }

        fn set_view(&mut self, center: GeoPoint, _zoom: u8) {
            self.center = Some(center);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_relayout_runs_after_delay() {
        let mut dash = dashboard();
        dash.load(&loaded_source()).await;
        dash.select_for_detail("2");

        let task = dash.handle_detail_signal(DetailSignal::ShowMap).unwrap();
        assert_eq!(task.delay(), Duration::from_millis(100));
        assert!(dash.handle_detail_signal(DetailSignal::ShowMap).is_none());

        let mut widget = CountingWidget::default();
        task.run(&mut widget).await;
        assert_eq!(widget.relayouts, 1);
        assert_eq!(widget.center.map(|c| c.latitude), Some(9.0477));
    }
}
