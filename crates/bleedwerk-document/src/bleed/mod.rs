// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bleed generation — one page in, one page with bleed out, dispatched on the
// configured strategy.

pub mod extrapolate;
pub mod hybrid;
pub mod stretch;

use bleedwerk_core::error::Result;
use bleedwerk_core::{BleedConfig, POINTS_PER_INCH, PageSize, Rect, Strategy, points_to_pixels};
use image::RgbImage;
use tracing::{debug, instrument};

use crate::document::{BledContent, BledPage, Page};
use crate::plan::plan;
use crate::raster::PageRasterizer;

/// Everything a generator may need besides the page itself.
///
/// Shared read-only by the page workers, so it holds the source PDF as bytes
/// rather than as a parsed document.
#[derive(Clone, Copy)]
pub struct BleedContext<'a> {
    pub config: &'a BleedConfig,
    pub pdf_bytes: Option<&'a [u8]>,
    pub rasterizer: Option<&'a dyn PageRasterizer>,
}

impl<'a> BleedContext<'a> {
    pub fn new(config: &'a BleedConfig) -> Self {
        Self {
            config,
            pdf_bytes: None,
            rasterizer: None,
        }
    }

    pub fn with_pdf(mut self, pdf_bytes: &'a [u8]) -> Self {
        self.pdf_bytes = Some(pdf_bytes);
        self
    }

    pub fn with_rasterizer(mut self, rasterizer: &'a dyn PageRasterizer) -> Self {
        self.rasterizer = Some(rasterizer);
        self
    }
}

/// Add bleed to one page.
#[instrument(skip(page, ctx), fields(page = page.index, strategy = ?ctx.config.strategy))]
pub fn bleed_page(page: &Page, ctx: &BleedContext<'_>) -> Result<BledPage> {
    let plan = plan(page.size, ctx.config.bleed_pt)?;

    let bled = match ctx.config.strategy {
        Strategy::Stretch => stretch::generate(page, &plan, ctx.config.resample_filter)?,
        Strategy::PixelExtrapolate => extrapolate::generate_page(page, &plan, ctx)?,
        Strategy::PixelExtrapolateHybrid => {
            let (pixels, dpi) = extrapolate::page_pixels(page, ctx)?;
            let bleed_px = points_to_pixels(plan.bleed, dpi);
            let background = extrapolate::extrapolate(&pixels, bleed_px)?;
            hybrid::compose(background, dpi, page, &plan)?
        }
    };

    debug!(
        width = bled.size.width,
        height = bled.size.height,
        "Page bled"
    );
    Ok(bled)
}

/// Wrap an enlarged pixel buffer as an output page.
///
/// `bleed_px` is the border added around an `original_px` sized source; the
/// page size and trim line are derived from pixels at `dpi` so they agree
/// with the buffer exactly.
pub(crate) fn raster_page(
    page: &Page,
    image: RgbImage,
    dpi: f32,
    bleed_px: u32,
    original_px: (u32, u32),
) -> BledPage {
    let to_points = |px: u32| px as f32 * POINTS_PER_INCH / dpi;
    let size = PageSize::from_pixels(image.width(), image.height(), dpi);
    let trim = Rect::new(
        to_points(bleed_px),
        to_points(bleed_px),
        to_points(original_px.0),
        to_points(original_px.1),
    );

    BledPage {
        index: page.index,
        size,
        trim,
        rotation: page.rotation,
        content: BledContent::Raster { image, dpi },
    }
}
