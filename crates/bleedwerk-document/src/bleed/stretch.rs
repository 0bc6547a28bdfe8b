// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stretch strategy — scale the whole page up to the bled size, distorting
// the aspect ratio.

use bleedwerk_core::error::Result;
use bleedwerk_core::{Rect, ResampleFilter, points_to_pixels};
use tracing::debug;

use crate::bleed::raster_page;
use crate::document::{BledContent, BledPage, Page, PageContent};
use crate::image::processor::resize_exact;
use crate::plan::{BleedPlan, plan_pixels};

/// Strategy A for one page.
///
/// PDF pages stay vector: the exporter draws the source page into the full
/// new media box with independent x/y scale factors. Raster pages are
/// resampled to the enlarged pixel size with `filter`.
pub fn generate(page: &Page, plan: &BleedPlan, filter: ResampleFilter) -> Result<BledPage> {
    match &page.content {
        PageContent::Vector { page_number } => {
            let (sx, sy) = plan.scale();
            debug!(page_number, sx, sy, "Stretching vector page");
            Ok(BledPage {
                index: page.index,
                size: plan.new_size,
                trim: plan.placement,
                rotation: page.rotation,
                content: BledContent::Vector {
                    page_number: *page_number,
                    target: Rect::from_size(plan.new_size),
                },
            })
        }
        PageContent::Raster { image, dpi } => {
            let bleed_px = points_to_pixels(plan.bleed, *dpi);
            let pixels = plan_pixels(image.width(), image.height(), bleed_px)?;
            let stretched = resize_exact(image, pixels.new_width, pixels.new_height, filter);
            debug!(
                new_width = pixels.new_width,
                new_height = pixels.new_height,
                "Stretched raster page"
            );
            Ok(raster_page(page, stretched, *dpi, bleed_px, image.dimensions()))
        }
    }
}
