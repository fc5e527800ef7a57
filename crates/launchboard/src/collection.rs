//! Collection view model for the launch table.
//!
//! Holds the fetched launches and launchpads and derives the filtered, sorted
//! and paged rows shown in the table, plus the set of launches staged for
//! export. Nothing here performs I/O.

use std::cmp::Ordering;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::TableConfig;
use crate::error::{Error, Result};
use crate::fetch::LaunchData;
use crate::model::{Launch, Launchpad};

/// Column a table can be sorted by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    /// Mission name, case-insensitive.
    #[default]
    Name,
    /// Launch time.
    Date,
    /// Outcome: unknown, failure, success.
    Status,
}

impl std::fmt::Display for SortField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Name => write!(f, "name"),
            Self::Date => write!(f, "date"),
            Self::Status => write!(f, "status"),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    /// Smallest first.
    #[default]
    Ascending,
    /// Largest first.
    Descending,
}

impl SortDirection {
    /// Arrow shown next to the active column header.
    #[must_use]
    pub fn arrow(self) -> &'static str {
        match self {
            Self::Ascending => "▲",
            Self::Descending => "▼",
        }
    }
}

/// Active sort column and direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortSpec {
    /// Column.
    pub field: SortField,
    /// Direction.
    pub direction: SortDirection,
}

impl SortSpec {
    /// The spec that results from clicking the header of `field`.
    ///
    /// Clicking the active column while ascending flips it to descending; any
    /// other click sorts `field` ascending.
    #[must_use]
    pub fn toggled(self, field: SortField) -> Self {
        let direction =
            if self.field == field && self.direction == SortDirection::Ascending {
                SortDirection::Descending
            } else {
                SortDirection::Ascending
            };
        Self { field, direction }
    }

    /// Compare two launches under this spec.
    #[must_use]
    pub fn compare(&self, a: &Launch, b: &Launch) -> Ordering {
        let ordering = match self.field {
            SortField::Name => name_key(a).cmp(&name_key(b)),
            // Unknown dates order before every known date
            SortField::Date => a.timestamp().cmp(&b.timestamp()),
            SortField::Status => a.success.rank().cmp(&b.success.rank()),
        };
        match self.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

fn name_key(launch: &Launch) -> String {
    launch.name.as_deref().unwrap_or_default().to_lowercase()
}

/// Check whether a launch matches a free-text filter.
///
/// A launch matches when its name contains the filter ignoring case, or when
/// its formatted date contains the filter verbatim. The empty filter matches
/// everything.
#[must_use]
pub fn matches_filter(launch: &Launch, filter: &str, date_format: &str) -> bool {
    if filter.is_empty() {
        return true;
    }

    let name_match = launch
        .name
        .as_deref()
        .is_some_and(|name| name.to_lowercase().contains(&filter.to_lowercase()));

    name_match
        || launch
            .formatted_date(date_format)
            .is_some_and(|date| date.contains(filter))
}

/// Keep the launches matching `filter`, in their original order.
#[must_use]
pub fn filter_launches<'a>(launches: &'a [Launch], filter: &str, date_format: &str) -> Vec<&'a Launch> {
    launches
        .iter()
        .filter(|launch| matches_filter(launch, filter, date_format))
        .collect()
}

/// Stable sort of launch rows.
pub fn sort_launches(rows: &mut [&Launch], spec: SortSpec) {
    rows.sort_by(|a, b| spec.compare(a, b));
}

/// Number of pages needed for `count` items.
#[must_use]
pub fn page_count(count: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    count.div_ceil(page_size)
}

/// The 1-based page `page` of `items`. Out-of-range pages are empty.
#[must_use]
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    if page == 0 || page_size == 0 {
        return &[];
    }
    let start = (page - 1).saturating_mul(page_size);
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

/// View model behind the launch table.
#[derive(Debug, Clone)]
pub struct CollectionView {
    launches: Vec<Launch>,
    launchpads: Arc<[Launchpad]>,
    filter: String,
    sort: SortSpec,
    page: usize,
    page_size: usize,
    date_format: String,
    selection: Vec<String>,
}

impl Default for CollectionView {
    fn default() -> Self {
        Self::from_config(&TableConfig::default())
    }
}

impl CollectionView {
    /// Create an empty view with the given page size and date format.
    #[must_use]
    pub fn new(page_size: usize, date_format: impl Into<String>) -> Self {
        Self {
            launches: Vec::new(),
            launchpads: Arc::from(Vec::new()),
            filter: String::new(),
            sort: SortSpec::default(),
            page: 1,
            page_size: page_size.max(1),
            date_format: date_format.into(),
            selection: Vec::new(),
        }
    }

    /// Create an empty view from the table configuration.
    #[must_use]
    pub fn from_config(config: &TableConfig) -> Self {
        Self::new(config.page_size, config.date_format.clone())
    }

    /// Replace the data wholesale. Clears the selection and returns to page 1.
    pub fn replace_data(&mut self, data: LaunchData) {
        debug!(
            launches = data.launches.len(),
            launchpads = data.launchpads.len(),
            "Replacing collection data"
        );
        self.launches = data.launches;
        self.launchpads = Arc::from(data.launchpads);
        self.selection.clear();
        self.page = 1;
    }

    /// All launches, in fetch order.
    #[must_use]
    pub fn launches(&self) -> &[Launch] {
        &self.launches
    }

    /// All launchpads.
    #[must_use]
    pub fn launchpads(&self) -> &[Launchpad] {
        &self.launchpads
    }

    /// The chrono format used for dates.
    #[must_use]
    pub fn date_format(&self) -> &str {
        &self.date_format
    }

    /// Look up a launch by identifier.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&Launch> {
        self.launches.iter().find(|launch| launch.id == id)
    }

    // --- filter & sort ---

    /// The active filter text.
    #[must_use]
    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// Change the filter text. Returns to page 1.
    pub fn set_filter(&mut self, filter: impl Into<String>) {
        self.filter = filter.into();
        self.page = 1;
    }

    /// The active sort.
    #[must_use]
    pub fn sort(&self) -> SortSpec {
        self.sort
    }

    /// Set the sort explicitly. Returns to page 1.
    pub fn set_sort(&mut self, sort: SortSpec) {
        self.sort = sort;
        self.page = 1;
    }

    /// Header click on `field`. Returns to page 1.
    pub fn request_sort(&mut self, field: SortField) {
        self.set_sort(self.sort.toggled(field));
    }

    /// Filtered and sorted launches.
    #[must_use]
    pub fn visible(&self) -> Vec<&Launch> {
        let mut rows = filter_launches(&self.launches, &self.filter, &self.date_format);
        sort_launches(&mut rows, self.sort);
        rows
    }

    // --- paging ---

    /// Rows per page.
    #[must_use]
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// The current 1-based page.
    #[must_use]
    pub fn current_page(&self) -> usize {
        self.page
    }

    /// Number of pages of visible rows.
    #[must_use]
    pub fn page_count(&self) -> usize {
        page_count(self.visible().len(), self.page_size)
    }

    /// Rows of page `page` (1-based).
    #[must_use]
    pub fn page(&self, page: usize) -> Vec<&Launch> {
        paginate(&self.visible(), page, self.page_size).to_vec()
    }

    /// Rows of the current page.
    #[must_use]
    pub fn current_rows(&self) -> Vec<&Launch> {
        self.page(self.page)
    }

    /// Jump to a page, clamped to the valid range.
    pub fn go_to_page(&mut self, page: usize) {
        self.page = page.clamp(1, self.page_count().max(1));
    }

    /// Check if the previous-page action is available.
    #[must_use]
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    /// Check if the next-page action is available.
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.page < self.page_count()
    }

    /// Move to the next page. Returns `false` at the last page.
    pub fn next_page(&mut self) -> bool {
        if !self.has_next() {
            return false;
        }
        self.page += 1;
        true
    }

    /// Move to the previous page. Returns `false` at page 1.
    pub fn previous_page(&mut self) -> bool {
        if !self.has_previous() {
            return false;
        }
        self.page -= 1;
        true
    }

    // --- selection ---

    /// Add `id` to the export selection, or remove it if already present.
    ///
    /// Returns whether `id` is selected afterwards.
    pub fn toggle_selection(&mut self, id: &str) -> bool {
        if let Some(index) = self.selection.iter().position(|s| s == id) {
            self.selection.remove(index);
            false
        } else {
            self.selection.push(id.to_string());
            true
        }
    }

    /// Check whether `id` is staged for export.
    #[must_use]
    pub fn is_selected(&self, id: &str) -> bool {
        self.selection.iter().any(|s| s == id)
    }

    /// Selected identifiers, in selection order.
    #[must_use]
    pub fn selection(&self) -> &[String] {
        &self.selection
    }

    /// Selected launches, in selection order. Identifiers with no launch are skipped.
    #[must_use]
    pub fn selected_launches(&self) -> Vec<&Launch> {
        self.selection.iter().filter_map(|id| self.find(id)).collect()
    }

    /// Check if the export action is available.
    #[must_use]
    pub fn can_export(&self) -> bool {
        !self.selection.is_empty()
    }

    /// Snapshot the selection for export. The launchpad list is shared, not copied.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptySelection`] if nothing is selected.
    pub fn export_selection(&self) -> Result<ExportSelection> {
        if !self.can_export() {
            return Err(Error::EmptySelection);
        }
        Ok(ExportSelection {
            launches: self.selected_launches().into_iter().cloned().collect(),
            launchpads: Arc::clone(&self.launchpads),
        })
    }
}

/// Launches staged for export, detached from the view.
#[derive(Debug, Clone)]
pub struct ExportSelection {
    /// Selected launches, in selection order.
    pub launches: Vec<Launch>,
    /// The launchpad list of the view that produced the snapshot.
    pub launchpads: Arc<[Launchpad]>,
}
