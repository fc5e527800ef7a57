//! Page layout of the launch report.
//!
//! Positions are millimetres on an A4 page with y measured from the top edge.

use serde::Serialize;

use super::ExportRecord;

/// A4 width.
pub const PAGE_WIDTH_MM: f32 = 210.0;
/// A4 height.
pub const PAGE_HEIGHT_MM: f32 = 297.0;

const LEFT_MARGIN: f32 = 14.0;
const TITLE_Y: f32 = 20.0;
const TITLE_SIZE: f32 = 18.0;
const BODY_SIZE: f32 = 12.0;
const LINE_GAP: f32 = 6.0;
const BLOCK_HEIGHT: f32 = 50.0;
const PAGE_TOP: f32 = 20.0;
const PAGE_LIMIT: f32 = 270.0;

const IMAGE_X: f32 = 150.0;
const IMAGE_RAISE: f32 = 2.0;
const IMAGE_SIZE: f32 = 40.0;

/// A line of text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextItem {
    /// Left edge.
    pub x: f32,
    /// Baseline, from the top.
    pub y: f32,
    /// Font size in points.
    pub size: f32,
    /// The text.
    pub text: String,
}

/// Where a record's patch image goes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ImageItem {
    /// Index of the record in the export.
    pub record: usize,
    /// Left edge.
    pub x: f32,
    /// Top edge, from the top.
    pub y: f32,
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
}

/// Content of one page.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PageLayout {
    /// Text lines in drawing order.
    pub texts: Vec<TextItem>,
    /// Images in drawing order.
    pub images: Vec<ImageItem>,
}

/// Content of the whole report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentLayout {
    /// Pages in order. Never empty.
    pub pages: Vec<PageLayout>,
}

fn text(y: f32, size: f32, text: String) -> TextItem {
    TextItem {
        x: LEFT_MARGIN,
        y,
        size,
        text,
    }
}

fn image_fits(y: f32) -> bool {
    y - IMAGE_RAISE + IMAGE_SIZE <= PAGE_HEIGHT_MM
}

/// Lay out the report for `records`.
///
/// A new page is started before a record whose block starts past the bottom
/// limit or whose patch image would not fit on the page.
#[must_use]
pub fn layout(title: &str, records: &[ExportRecord]) -> DocumentLayout {
    let mut pages = vec![PageLayout::default()];
    let mut y = TITLE_Y;

    let first = &mut pages[0];
    first.texts.push(text(y, TITLE_SIZE, title.to_string()));
    y += 10.0;
    first.texts.push(text(
        y,
        BODY_SIZE,
        format!("Total records exported: {}", records.len()),
    ));
    y += 10.0;

    for (index, record) in records.iter().enumerate() {
        if y > PAGE_LIMIT || !image_fits(y) {
            pages.push(PageLayout::default());
            y = PAGE_TOP;
        }
        let Some(page) = pages.last_mut() else {
            break;
        };

        page.texts.extend([
            text(y, BODY_SIZE, format!("Name: {}", record.name)),
            text(y + LINE_GAP, BODY_SIZE, format!("Date: {}", record.date)),
            text(y + 2.0 * LINE_GAP, BODY_SIZE, format!("Status: {}", record.status)),
            text(
                y + 3.0 * LINE_GAP,
                BODY_SIZE,
                format!("Location: {}", record.location),
            ),
        ]);
        if record.image.is_some() {
            page.images.push(ImageItem {
                record: index,
                x: IMAGE_X,
                y: y - IMAGE_RAISE,
                width: IMAGE_SIZE,
                height: IMAGE_SIZE,
            });
        }

        y += BLOCK_HEIGHT;
    }

    DocumentLayout { pages }
}
