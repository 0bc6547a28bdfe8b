// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page rasterisation seam. The pixel strategies need PDF pages as pixels;
// rendering is delegated to an implementation of `PageRasterizer`.

use bleedwerk_core::error::{BleedError, Result};
use image::RgbImage;
use image::imageops::{self, FilterType};

/// Largest per-axis difference, in pixels, put down to renderer rounding.
const ROUNDING_SLACK_PX: u32 = 2;

/// Renders one page of a PDF to RGB pixels.
///
/// Implementations must be shareable across the page worker threads.
pub trait PageRasterizer: Send + Sync {
    /// Render page `page_index` (0-based) of `pdf` to exactly
    /// `width_px` x `height_px` pixels, in unrotated page space.
    ///
    /// The pixels must cover the page's MediaBox. A renderer that clips to
    /// the CropBox instead must fail on pages where the two differ in shape
    /// rather than stretch the crop over the media box.
    fn render_page(
        &self,
        pdf: &[u8],
        page_index: usize,
        width_px: u32,
        height_px: u32,
    ) -> Result<RgbImage>;
}

/// The rasteriser compiled into this build, if any.
pub fn default_rasterizer() -> Option<Box<dyn PageRasterizer>> {
    #[cfg(feature = "pdfium")]
    {
        Some(Box::new(pdfium::PdfiumRasterizer))
    }
    #[cfg(not(feature = "pdfium"))]
    {
        None
    }
}

/// Turn a render of the page as displayed (with `/Rotate` of `rotation`
/// degrees applied) back into unrotated page space at `width_px` x
/// `height_px`.
///
/// Off-by-a-pixel renders are resampled to the exact size. Anything further
/// off means the renderer drew a different region, such as a CropBox that is
/// not the MediaBox, and is an error.
pub fn to_page_space(
    rendered: RgbImage,
    rotation: i64,
    width_px: u32,
    height_px: u32,
) -> Result<RgbImage> {
    let upright = match rotation.rem_euclid(360) {
        90 => imageops::rotate270(&rendered),
        180 => imageops::rotate180(&rendered),
        270 => imageops::rotate90(&rendered),
        _ => rendered,
    };

    let (width, height) = upright.dimensions();
    if (width, height) == (width_px, height_px) {
        return Ok(upright);
    }
    if width.abs_diff(width_px) > ROUNDING_SLACK_PX
        || height.abs_diff(height_px) > ROUNDING_SLACK_PX
    {
        return Err(BleedError::Rasterization(format!(
            "rendered {}x{}px where {}x{}px was expected; \
             the page's CropBox probably differs from its MediaBox",
            width, height, width_px, height_px
        )));
    }
    Ok(imageops::resize(&upright, width_px, height_px, FilterType::Triangle))
}

#[cfg(feature = "pdfium")]
pub mod pdfium {
    //! `pdfium-render` backed rasteriser. Binds to the system pdfium library
    //! on every call, so the type itself carries no state.
    //!
    //! pdfium draws the page as displayed: `/Rotate` applied and clipped to
    //! the CropBox. Renders are turned back into page space with
    //! [`to_page_space`](super::to_page_space).

    use bleedwerk_core::error::{BleedError, Result};
    use image::RgbImage;
    use pdfium_render::prelude::*;
    use tracing::{debug, instrument};

    use super::{PageRasterizer, to_page_space};

    #[derive(Debug, Clone, Copy, Default)]
    pub struct PdfiumRasterizer;

    impl PageRasterizer for PdfiumRasterizer {
        #[instrument(skip(self, pdf), fields(pdf_len = pdf.len()))]
        fn render_page(
            &self,
            pdf: &[u8],
            page_index: usize,
            width_px: u32,
            height_px: u32,
        ) -> Result<RgbImage> {
            let bindings = Pdfium::bind_to_system_library().map_err(|e| {
                BleedError::Rasterization(format!("cannot bind to pdfium: {:?}", e))
            })?;
            let pdfium = Pdfium::new(bindings);

            let document = pdfium.load_pdf_from_byte_slice(pdf, None).map_err(|e| {
                BleedError::Rasterization(format!("pdfium cannot open PDF: {:?}", e))
            })?;

            let page = document.pages().get(page_index as u16).map_err(|e| {
                BleedError::Rasterization(format!("page {}: {:?}", page_index + 1, e))
            })?;

            let rotation = match page.rotation() {
                Ok(PdfPageRenderRotation::Degrees90) => 90,
                Ok(PdfPageRenderRotation::Degrees180) => 180,
                Ok(PdfPageRenderRotation::Degrees270) => 270,
                _ => 0,
            };
            // Quarter turns display the page on its side.
            let (display_width, display_height) = if rotation % 180 == 90 {
                (height_px, width_px)
            } else {
                (width_px, height_px)
            };

            let render_config = PdfRenderConfig::new()
                .set_target_width(display_width as i32)
                .set_maximum_height(display_height as i32);

            let bitmap = page.render_with_config(&render_config).map_err(|e| {
                BleedError::Rasterization(format!("page {}: {:?}", page_index + 1, e))
            })?;
            let rendered = bitmap.as_image().to_rgb8();

            debug!(
                page = page_index + 1,
                rotation,
                width = rendered.width(),
                height = rendered.height(),
                "Page rendered"
            );

            to_page_space(rendered, rotation, width_px, height_px).map_err(|err| match err {
                BleedError::Rasterization(reason) => {
                    BleedError::Rasterization(format!("page {}: {}", page_index + 1, reason))
                }
                other => other,
            })
        }
    }
}
