//! Core record types for launchboard.
//!
//! This module defines the records returned by the launch data service and the
//! analytics service, normalized into the shapes the views work with.

use base64::{engine::general_purpose::STANDARD as Base64Standard, Engine as _};
use chrono::{DateTime, Utc};
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

/// Placeholder shown for any field that is missing or cannot be resolved.
pub const UNAVAILABLE: &str = "Unavailable";

/// PNG file signature.
const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

/// Outcome of a launch.
///
/// The variant order is the sort order: unknown, then failure, then success.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(from = "Option<bool>", into = "Option<bool>")]
pub enum Outcome {
    /// No result recorded (upcoming launch or missing data).
    #[default]
    Unknown,
    /// The launch failed.
    Failure,
    /// The launch succeeded.
    Success,
}

impl Outcome {
    /// Ordinal used when sorting by status.
    #[must_use]
    pub fn rank(self) -> u8 {
        match self {
            Self::Unknown => 0,
            Self::Failure => 1,
            Self::Success => 2,
        }
    }
}

impl From<Option<bool>> for Outcome {
    fn from(value: Option<bool>) -> Self {
        match value {
            None => Self::Unknown,
            Some(false) => Self::Failure,
            Some(true) => Self::Success,
        }
    }
}

impl From<Outcome> for Option<bool> {
    fn from(value: Outcome) -> Self {
        match value {
            Outcome::Unknown => None,
            Outcome::Failure => Some(false),
            Outcome::Success => Some(true),
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown => write!(f, "{UNAVAILABLE}"),
            Self::Failure => write!(f, "Failure"),
            Self::Success => write!(f, "Success"),
        }
    }
}

/// Patch artwork links of a launch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchLinks {
    /// Small patch image.
    #[serde(default)]
    pub small: Option<String>,
    /// Large patch image.
    #[serde(default)]
    pub large: Option<String>,
}

/// Media links of a launch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchLinks {
    /// Mission patch images.
    #[serde(default)]
    pub patch: PatchLinks,
}

/// One launch as returned by `GET /launches`.
///
/// Fields the dashboard does not use are ignored when parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Launch {
    /// Launch identifier.
    pub id: String,
    /// Mission name.
    #[serde(default)]
    pub name: Option<String>,
    /// Launch time as an RFC 3339 string.
    #[serde(default)]
    pub date_utc: Option<String>,
    /// Launch outcome.
    #[serde(default)]
    pub success: Outcome,
    /// Identifier of the launchpad used.
    #[serde(default)]
    pub launchpad: Option<String>,
    /// Media links.
    #[serde(default)]
    pub links: LaunchLinks,
}

impl Launch {
    /// The mission name, or the placeholder.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(UNAVAILABLE)
    }

    /// The launch time, if present and parsable.
    #[must_use]
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.date_utc
            .as_deref()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// The launch date in UTC, rendered with a chrono format string.
    ///
    /// `date_format` must already be validated (see [`crate::Config::validate`]).
    #[must_use]
    pub fn formatted_date(&self, date_format: &str) -> Option<String> {
        self.timestamp()
            .map(|ts| ts.format(date_format).to_string())
    }

    /// URL of the small patch image, if the launch has one.
    #[must_use]
    pub fn patch_image_url(&self) -> Option<&str> {
        self.links
            .patch
            .small
            .as_deref()
            .filter(|url| !url.is_empty())
    }
}

/// A point on the globe in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude.
    pub latitude: f64,
    /// Longitude.
    pub longitude: f64,
}

/// Launch site coordinates as resolved from a launchpad.
///
/// Either axis may be missing; the map overlay treats that as invalid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteCoordinates {
    /// Latitude, if known.
    pub latitude: Option<f64>,
    /// Longitude, if known.
    pub longitude: Option<f64>,
    /// Site name, if known.
    pub name: Option<String>,
}

impl SiteCoordinates {
    /// Both axes as a point, when both are present.
    #[must_use]
    pub fn point(&self) -> Option<GeoPoint> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(GeoPoint {
                latitude,
                longitude,
            }),
            _ => None,
        }
    }
}

/// One launchpad as returned by `GET /launchpads`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Launchpad {
    /// Launchpad identifier.
    pub id: String,
    /// Full display name of the site.
    #[serde(default)]
    pub full_name: Option<String>,
    /// Latitude, normalized from a number or a numeric string.
    #[serde(default, deserialize_with = "deserialize_coordinate")]
    pub latitude: Option<f64>,
    /// Longitude, normalized from a number or a numeric string.
    #[serde(default, deserialize_with = "deserialize_coordinate")]
    pub longitude: Option<f64>,
}

impl Launchpad {
    /// The site name, or the placeholder.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().unwrap_or(UNAVAILABLE)
    }

    /// The site coordinates.
    #[must_use]
    pub fn coordinates(&self) -> SiteCoordinates {
        SiteCoordinates {
            latitude: self.latitude,
            longitude: self.longitude,
            name: self.full_name.clone(),
        }
    }
}

/// Find the launchpad a launch refers to. Matches on identifier only.
#[must_use]
pub fn find_launchpad<'a>(launchpads: &'a [Launchpad], launch: &Launch) -> Option<&'a Launchpad> {
    let id = launch.launchpad.as_deref()?;
    launchpads.iter().find(|pad| pad.id == id)
}

/// The location label of a launch: its launchpad name or the placeholder.
#[must_use]
pub fn location_name<'a>(launchpads: &'a [Launchpad], launch: &Launch) -> &'a str {
    find_launchpad(launchpads, launch).map_or(UNAVAILABLE, Launchpad::display_name)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCoordinate {
    Number(f64),
    Text(String),
    Other(IgnoredAny),
}

fn deserialize_coordinate<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawCoordinate>::deserialize(deserializer)?;
    let value = match raw {
        None => None,
        Some(RawCoordinate::Number(n)) => Some(n),
        Some(RawCoordinate::Text(s)) => s.trim().parse::<f64>().ok(),
        Some(RawCoordinate::Other(_)) => None,
    };
    Ok(value.filter(|v| v.is_finite()))
}

/// A pre-rendered chart from the analytics service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartImage {
    /// Base64-encoded PNG.
    pub image: String,
}

impl ChartImage {
    /// Decode the PNG bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is not valid base64.
    pub fn decode(&self) -> crate::Result<Vec<u8>> {
        Ok(Base64Standard.decode(self.image.trim())?)
    }

    /// Check whether the payload decodes to something carrying a PNG signature.
    #[must_use]
    pub fn is_png(&self) -> bool {
        self.decode()
            .is_ok_and(|bytes| bytes.starts_with(PNG_SIGNATURE))
    }
}

/// Average time between consecutive launches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaunchGapStat {
    /// Mean gap in days.
    pub avg_days_between_launches: f64,
}

impl std::fmt::Display for LaunchGapStat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1} days", self.avg_days_between_launches)
    }
}

/// A launch flattened together with its rocket name by the analytics service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchSummaryRow {
    /// Mission name.
    #[serde(default)]
    pub name: Option<String>,
    /// Launch date (`YYYY-MM-DD`).
    #[serde(default)]
    pub date_utc: Option<String>,
    /// Rocket name.
    #[serde(default)]
    pub rocket_name: Option<String>,
    /// Launch outcome.
    #[serde(default)]
    pub success: Outcome,
}
