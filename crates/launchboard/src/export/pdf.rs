//! PDF rendering of a laid-out report.

use image::DynamicImage;
use printpdf::{BuiltinFont, Image, ImageTransform, Mm, PdfDocument};

use super::layout::{DocumentLayout, PAGE_HEIGHT_MM, PAGE_WIDTH_MM};
use super::ExportRecord;
use crate::error::{Error, Result};

const LAYER_NAME: &str = "Layer 1";
const IMAGE_DPI: f32 = 300.0;
const MM_PER_INCH: f32 = 25.4;

/// Render `doc` to PDF bytes. Image slots are filled from `records`.
///
/// # Errors
///
/// Returns [`Error::Pdf`] if the document cannot be built or serialized.
pub fn render(title: &str, doc: &DocumentLayout, records: &[ExportRecord]) -> Result<Vec<u8>> {
    let (pdf, first_page, first_layer) =
        PdfDocument::new(title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), LAYER_NAME);
    let font = pdf
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| Error::pdf(e.to_string()))?;

    for (index, page) in doc.pages.iter().enumerate() {
        let (page_index, layer_index) = if index == 0 {
            (first_page, first_layer)
        } else {
            pdf.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), LAYER_NAME)
        };
        let layer = pdf.get_page(page_index).get_layer(layer_index);

        for item in &page.texts {
            layer.use_text(
                item.text.as_str(),
                item.size,
                Mm(item.x),
                Mm(PAGE_HEIGHT_MM - item.y),
                &font,
            );
        }

        for slot in &page.images {
            let Some(raster) = records.get(slot.record).and_then(|r| r.image.as_ref()) else {
                continue;
            };
            if raster.width() == 0 || raster.height() == 0 {
                continue;
            }

            #[allow(clippy::cast_precision_loss)]
            let (natural_w, natural_h) = (
                raster.width() as f32 / IMAGE_DPI * MM_PER_INCH,
                raster.height() as f32 / IMAGE_DPI * MM_PER_INCH,
            );
            let image = Image::from_dynamic_image(&DynamicImage::ImageRgb8(raster.clone()));
            image.add_to_layer(
                layer.clone(),
                ImageTransform {
                    translate_x: Some(Mm(slot.x)),
                    translate_y: Some(Mm(PAGE_HEIGHT_MM - slot.y - slot.height)),
                    scale_x: Some(slot.width / natural_w),
                    scale_y: Some(slot.height / natural_h),
                    dpi: Some(IMAGE_DPI),
                    ..ImageTransform::default()
                },
            );
        }
    }

    pdf.save_to_bytes().map_err(|e| Error::pdf(e.to_string()))
}
