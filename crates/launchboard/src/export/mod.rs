//! PDF export of selected launches.
//!
//! Export runs in three steps: the selection is materialized into
//! [`ExportRecord`]s, patch images are fetched one record at a time, and the
//! report is laid out and rendered. A patch image that cannot be fetched or
//! decoded only costs its own block the picture.

pub mod layout;
pub mod pdf;

use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage, Rgba, RgbaImage};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::collection::ExportSelection;
use crate::config::ExportConfig;
use crate::detail::DetailCard;
use crate::error::{Error, Result};
use crate::fetch::ImageSource;
use crate::model::{Launch, Launchpad};

/// One launch as it appears in the report.
#[derive(Debug, Clone, Serialize)]
pub struct ExportRecord {
    /// Mission name.
    pub name: String,
    /// Formatted launch date.
    pub date: String,
    /// Outcome label.
    pub status: String,
    /// Launch site name.
    pub location: String,
    /// Where the patch image comes from.
    pub image_url: Option<String>,
    /// Decoded patch image, once fetched.
    #[serde(skip)]
    pub image: Option<RgbImage>,
}

impl ExportRecord {
    /// Build the record for `launch`. Missing fields get the placeholder.
    #[must_use]
    pub fn project(launch: &Launch, launchpads: &[Launchpad], date_format: &str) -> Self {
        let card = DetailCard::project(launch, launchpads, date_format);
        Self {
            name: card.name,
            date: card.date,
            status: card.status,
            location: card.location,
            image_url: card.patch_image_url,
            image: None,
        }
    }
}

/// Summary of a finished export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportReport {
    /// Where the document was written.
    pub path: PathBuf,
    /// Number of launches in the document.
    pub records: usize,
    /// Number of patch images embedded.
    pub images: usize,
    /// Number of pages.
    pub pages: usize,
}

/// Decode patch image bytes into an RGB raster.
///
/// Transparent areas are composited onto a white page background.
///
/// # Errors
///
/// Returns [`Error::Image`] if the bytes are not a supported image.
pub fn decode_patch(bytes: &[u8]) -> Result<RgbImage> {
    let decoded = image::load_from_memory(bytes).map_err(|e| Error::image(e.to_string()))?;
    Ok(flatten_on_white(&decoded.to_rgba8()))
}

fn flatten_on_white(rgba: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let Rgba([r, g, b, a]) = *rgba.get_pixel(x, y);
        let alpha = u16::from(a);
        let blend = |channel: u8| {
            let mixed = (u16::from(channel) * alpha + 255 * (255 - alpha) + 127) / 255;
            u8::try_from(mixed).unwrap_or(u8::MAX)
        };
        Rgb([blend(r), blend(g), blend(b)])
    })
}

/// Produces the launch report.
#[derive(Debug, Clone)]
pub struct Exporter {
    title: String,
    file_name: String,
    date_format: String,
}

impl Exporter {
    /// Create an exporter.
    #[must_use]
    pub fn new(config: &ExportConfig, date_format: impl Into<String>) -> Self {
        Self {
            title: config.title.clone(),
            file_name: config.file_name.clone(),
            date_format: date_format.into(),
        }
    }

    /// Path of the document inside `dir`.
    #[must_use]
    pub fn output_path(&self, dir: &Path) -> PathBuf {
        dir.join(&self.file_name)
    }

    /// Materialize the selection, keeping its order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptySelection`] if nothing is selected.
    pub fn records(&self, selection: &[&Launch], launchpads: &[Launchpad]) -> Result<Vec<ExportRecord>> {
        if selection.is_empty() {
            return Err(Error::EmptySelection);
        }
        Ok(selection
            .iter()
            .map(|launch| ExportRecord::project(launch, launchpads, &self.date_format))
            .collect())
    }

    /// Fetch and decode the patch image of each record, one after another.
    ///
    /// Returns the number of images loaded. Failures are logged and skipped.
    pub async fn load_images<S>(&self, source: &S, records: &mut [ExportRecord]) -> usize
    where
        S: ImageSource + ?Sized,
    {
        let mut loaded = 0;
        for record in records.iter_mut() {
            let Some(url) = record.image_url.as_deref() else {
                continue;
            };
            match source.image_bytes(url).await.and_then(|bytes| decode_patch(&bytes)) {
                Ok(raster) => {
                    debug!(url, width = raster.width(), height = raster.height(), "Patch image loaded");
                    record.image = Some(raster);
                    loaded += 1;
                }
                Err(e) => warn!("Error loading image for {}: {e}", record.name),
            }
        }
        loaded
    }

    /// Lay out and render `records` to PDF bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Pdf`] if rendering fails.
    pub fn render(&self, records: &[ExportRecord]) -> Result<Vec<u8>> {
        let doc = layout::layout(&self.title, records);
        pdf::render(&self.title, &doc, records)
    }

    /// Export `selection` to `<dir>/<file name>`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptySelection`] for an empty selection, or an I/O or
    /// PDF error if the document cannot be produced. Image failures are not
    /// errors.
    pub async fn export<S>(
        &self,
        source: &S,
        selection: &ExportSelection,
        dir: &Path,
    ) -> Result<ExportReport>
    where
        S: ImageSource + ?Sized,
    {
        let launches: Vec<&Launch> = selection.launches.iter().collect();
        let mut records = self.records(&launches, &selection.launchpads)?;
        let images = self.load_images(source, &mut records).await;

        let pages = layout::layout(&self.title, &records).pages.len();
        let bytes = self.render(&records)?;

        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|source| Error::DirectoryCreate {
                path: dir.to_path_buf(),
                source,
            })?;
        let path = self.output_path(dir);
        tokio::fs::write(&path, bytes).await?;

        info!(
            path = %path.display(),
            records = records.len(),
            images,
            pages,
            "Exported launch report"
        );
        Ok(ExportReport {
            path,
            records: records.len(),
            images,
            pages,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use image::{DynamicImage, ImageOutputFormat};

    use super::*;
    use crate::fetch::testing::{sample_launches, sample_pads, FakeSource};
    use crate::logging::init_test_logging;

    const FMT: &str = "%-d/%-m/%Y";

    fn exporter() -> Exporter {
        Exporter::new(&ExportConfig::default(), FMT)
    }

    fn png_bytes() -> Vec<u8> {
        let mut buf = Vec::new();
        DynamicImage::ImageRgb8(RgbImage::new(4, 4))
            .write_to(&mut Cursor::new(&mut buf), ImageOutputFormat::Png)
            .unwrap();
        buf
    }

    fn test_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("launchboard_test_{}_{name}", std::process::id()))
    }

    #[test]
    fn test_empty_selection_is_rejected() {
        let err = exporter().records(&[], &sample_pads()).unwrap_err();
        assert!(matches!(err, Error::EmptySelection));
    }

    #[test]
    fn test_records_keep_selection_order() {
        let launches = sample_launches();
        let selection = vec![&launches[2], &launches[0]];
        let records = exporter().records(&selection, &sample_pads()).unwrap();

        assert_eq!(records[0].name, "Crew-9");
        assert_eq!(records[0].status, "Unavailable");
        assert_eq!(records[1].name, "Falcon 9");
        assert_eq!(records[1].location, "Cape Canaveral");
        assert_eq!(records[1].date, "1/1/2020");
    }

    #[test]
    fn test_decode_patch_rejects_garbage() {
        assert!(matches!(decode_patch(b"not an image"), Err(Error::Image(_))));
        assert_eq!(decode_patch(&png_bytes()).unwrap().dimensions(), (4, 4));
    }

    #[test]
    fn test_decode_patch_composites_transparency_on_white() {
        let mut patch = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 0]));
        patch.put_pixel(1, 0, Rgba([200, 10, 30, 255]));
        patch.put_pixel(0, 1, Rgba([0, 0, 0, 128]));
        let mut buf = Vec::new();
        DynamicImage::ImageRgba8(patch)
            .write_to(&mut Cursor::new(&mut buf), ImageOutputFormat::Png)
            .unwrap();

        let flat = decode_patch(&buf).unwrap();
        assert_eq!(*flat.get_pixel(0, 0), Rgb([255, 255, 255]));
        assert_eq!(*flat.get_pixel(1, 0), Rgb([200, 10, 30]));
        assert_eq!(*flat.get_pixel(0, 1), Rgb([127, 127, 127]));
    }

    #[tokio::test]
    async fn test_load_images_skips_failures() {
        init_test_logging();
        let launches = sample_launches();
        let pads = sample_pads();
        let exporter = exporter();

        let mut source = FakeSource::default();
        source
            .images
            .insert("https://images.example/falcon9.png".to_string(), png_bytes());
        let mut records = exporter.records(&[&launches[0], &launches[1]], &pads).unwrap();
        assert_eq!(exporter.load_images(&source, &mut records).await, 1);
        assert!(records[0].image.is_some());
        assert!(records[1].image.is_none());

        let mut records = exporter.records(&[&launches[0]], &pads).unwrap();
        assert_eq!(exporter.load_images(&FakeSource::default(), &mut records).await, 0);
        assert!(records[0].image.is_none());
    }

    #[tokio::test]
    async fn test_export_of_empty_snapshot_is_rejected() {
        let selection = ExportSelection {
            launches: Vec::new(),
            launchpads: sample_pads().into(),
        };
        let err = exporter()
            .export(&FakeSource::default(), &selection, &test_dir("never_written"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::EmptySelection));
        assert!(!test_dir("never_written").exists());
    }

    #[tokio::test]
    async fn test_export_writes_document() {
        init_test_logging();
        let selection = ExportSelection {
            launches: sample_launches(),
            launchpads: sample_pads().into(),
        };
        let dir = test_dir("export").join("nested");
        let _ = std::fs::remove_dir_all(&dir);

        let report = exporter()
            .export(&FakeSource::default(), &selection, &dir)
            .await
            .unwrap();

        assert_eq!(report.path, dir.join("launches.pdf"));
        assert_eq!(report.records, 3);
        assert_eq!(report.images, 0);
        assert_eq!(report.pages, 1);
        let written = std::fs::read(&report.path).unwrap();
        assert!(written.starts_with(b"%PDF"));

        let _ = std::fs::remove_dir_all(test_dir("export"));
    }
}
