//! Detail card for a single launch.

use serde::Serialize;

use crate::model::{location_name, Launch, Launchpad, UNAVAILABLE};

/// Signals the detail card can raise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailSignal {
    /// The user asked to see the launch site on a map.
    ShowMap,
}

/// Display-ready projection of one launch.
///
/// Every missing field is replaced with the placeholder, so building a card
/// never fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailCard {
    /// Launch identifier.
    pub id: String,
    /// Mission name.
    pub name: String,
    /// Formatted launch date.
    pub date: String,
    /// Outcome label.
    pub status: String,
    /// Launch site name.
    pub location: String,
    /// Patch image URL, if any.
    pub patch_image_url: Option<String>,
}

impl DetailCard {
    /// Project a launch and its launchpad into a card.
    #[must_use]
    pub fn project(launch: &Launch, launchpads: &[Launchpad], date_format: &str) -> Self {
        Self {
            id: launch.id.clone(),
            name: launch.display_name().to_string(),
            date: launch
                .formatted_date(date_format)
                .unwrap_or_else(|| UNAVAILABLE.to_string()),
            status: launch.success.to_string(),
            location: location_name(launchpads, launch).to_string(),
            patch_image_url: launch.patch_image_url().map(str::to_string),
        }
    }

    /// The "show map" action.
    #[must_use]
    pub fn show_map(&self) -> DetailSignal {
        DetailSignal::ShowMap
    }
}

impl std::fmt::Display for DetailCard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.name)?;
        writeln!(f, "{}", "-".repeat(self.name.chars().count().max(3)))?;
        writeln!(f, "Date:      {}", self.date)?;
        writeln!(f, "Status:    {}", self.status)?;
        writeln!(f, "Location:  {}", self.location)?;
        if let Some(url) = &self.patch_image_url {
            writeln!(f, "Patch:     {url}")?;
        }
        Ok(())
    }
}
