//! Map overlay for a launch site.
//!
//! The overlay validates coordinates and describes the scene the map widget
//! should show: centre, zoom, a single marker and the slippy-map tile that
//! contains it. Drawing, panning and zooming belong to the widget.

use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use crate::config::MapConfig;
use crate::model::{GeoPoint, SiteCoordinates};

/// Label used when the site has no name.
pub const DEFAULT_MARKER_LABEL: &str = "Launch site";

/// Web Mercator stops being defined past this latitude.
const MAX_MERCATOR_LATITUDE: f64 = 85.051_128_78;

/// Marker icon images.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkerIcon {
    /// Icon image.
    pub icon_url: String,
    /// Icon image for high density displays.
    pub icon_retina_url: String,
    /// Shadow image.
    pub shadow_url: String,
}

/// Settings handed to the overlay once, at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct MapOverlayConfig {
    /// Zoom level of the site map.
    pub zoom: u8,
    /// Wait before asking the widget to recompute its layout.
    pub relayout_delay: Duration,
    /// Tile URL template.
    pub tile_url: String,
    /// Tile attribution.
    pub attribution: String,
    /// Marker icon.
    pub icon: MarkerIcon,
}

impl From<&MapConfig> for MapOverlayConfig {
    fn from(config: &MapConfig) -> Self {
        Self {
            zoom: config.zoom,
            relayout_delay: Duration::from_millis(config.relayout_delay_ms),
            tile_url: config.tile_url.clone(),
            attribution: config.attribution.clone(),
            icon: MarkerIcon {
                icon_url: config.marker_icon_url.clone(),
                icon_retina_url: config.marker_icon_retina_url.clone(),
                shadow_url: config.marker_shadow_url.clone(),
            },
        }
    }
}

impl Default for MapOverlayConfig {
    fn default() -> Self {
        Self::from(&MapConfig::default())
    }
}

/// One slippy-map tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TileRef {
    /// Zoom level.
    pub z: u8,
    /// Column.
    pub x: u32,
    /// Row.
    pub y: u32,
}

/// The tile containing `point` at `zoom`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn tile_for(point: GeoPoint, zoom: u8) -> TileRef {
    let zoom = zoom.min(22);
    let n = 1_i64 << zoom;
    let n_f = f64::from(1_u32 << zoom);

    let x_raw = ((point.longitude + 180.0) / 360.0 * n_f).floor() as i64;
    let lat_rad = point
        .latitude
        .clamp(-MAX_MERCATOR_LATITUDE, MAX_MERCATOR_LATITUDE)
        .to_radians();
    let y_raw = ((1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / std::f64::consts::PI) / 2.0
        * n_f)
        .floor() as i64;

    TileRef {
        z: zoom,
        x: (((x_raw % n) + n) % n) as u32,
        y: y_raw.clamp(0, n - 1) as u32,
    }
}

/// Fill a `{s}`/`{z}`/`{x}`/`{y}` template for `tile`.
#[must_use]
pub fn tile_url(template: &str, tile: TileRef) -> String {
    template
        .replace("{s}", "a")
        .replace("{z}", &tile.z.to_string())
        .replace("{x}", &tile.x.to_string())
        .replace("{y}", &tile.y.to_string())
}

/// The single marker on the map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    /// Where the marker sits.
    pub position: GeoPoint,
    /// Popup text.
    pub label: String,
    /// Icon images.
    pub icon: MarkerIcon,
}

/// Everything the widget needs to show the site.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapScene {
    /// Map centre.
    pub center: GeoPoint,
    /// Zoom level.
    pub zoom: u8,
    /// The site marker.
    pub marker: Marker,
    /// Tile under the marker.
    pub tile: TileRef,
    /// URL of that tile.
    pub tile_url: String,
    /// Tile attribution.
    pub attribution: String,
}

impl MapScene {
    /// Link to the same view on openstreetmap.org.
    #[must_use]
    pub fn browse_url(&self) -> String {
        format!(
            "https://www.openstreetmap.org/?mlat={lat}&mlon={lon}#map={z}/{lat}/{lon}",
            lat = self.center.latitude,
            lon = self.center.longitude,
            z = self.zoom
        )
    }
}

/// What the overlay shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum MapView {
    /// Coordinates are missing or incomplete; shown inline instead of a map.
    InvalidCoordinates,
    /// Coordinates are valid but the overlay is closed.
    Hidden,
    /// The map.
    Map(MapScene),
}

/// The map widget the overlay drives.
pub trait MapWidget {
    /// Recompute the widget's size from its container.
    fn invalidate_size(&mut self);

    /// Centre the widget.
    fn set_view(&mut self, center: GeoPoint, zoom: u8);
}

/// Deferred layout pass scheduled when the overlay becomes visible.
///
/// The surrounding modal needs time to size its container before the widget
/// can measure it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelayoutTask {
    delay: Duration,
    center: GeoPoint,
    zoom: u8,
}

impl RelayoutTask {
    /// How long the task waits before touching the widget.
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Wait out the delay, then resize and re-centre the widget.
    pub async fn run<W: MapWidget + ?Sized>(self, widget: &mut W) {
        tokio::time::sleep(self.delay).await;
        widget.invalidate_size();
        widget.set_view(self.center, self.zoom);
        debug!(zoom = self.zoom, "Map layout recomputed");
    }
}

/// Modal map of a launch site.
#[derive(Debug, Clone)]
pub struct MapOverlay {
    config: MapOverlayConfig,
    visible: bool,
}

impl MapOverlay {
    /// Create a hidden overlay.
    #[must_use]
    pub fn new(config: MapOverlayConfig) -> Self {
        Self {
            config,
            visible: false,
        }
    }

    /// Check if the overlay is open.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Open or close the overlay.
    ///
    /// Returns a relayout task when the overlay goes from hidden to visible
    /// with valid coordinates.
    pub fn set_visible(
        &mut self,
        visible: bool,
        coordinates: Option<&SiteCoordinates>,
    ) -> Option<RelayoutTask> {
        let was_visible = std::mem::replace(&mut self.visible, visible);
        if was_visible || !visible {
            return None;
        }

        coordinates.and_then(SiteCoordinates::point).map(|center| RelayoutTask {
            delay: self.config.relayout_delay,
            center,
            zoom: self.config.zoom,
        })
    }

    /// Describe what the overlay shows for `coordinates`.
    #[must_use]
    pub fn render(&self, coordinates: Option<&SiteCoordinates>, label: Option<&str>) -> MapView {
        let Some(center) = coordinates.and_then(SiteCoordinates::point) else {
            return MapView::InvalidCoordinates;
        };
        if !self.visible {
            return MapView::Hidden;
        }

        let tile = tile_for(center, self.config.zoom);
        MapView::Map(MapScene {
            center,
            zoom: self.config.zoom,
            marker: Marker {
                position: center,
                label: label
                    .filter(|l| !l.is_empty())
                    .unwrap_or(DEFAULT_MARKER_LABEL)
                    .to_string(),
                icon: self.config.icon.clone(),
            },
            tile,
            tile_url: tile_url(&self.config.tile_url, tile),
            attribution: self.config.attribution.clone(),
        })
    }
}
