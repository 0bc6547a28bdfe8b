// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Hybrid compositing — the smeared raster supplies the bleed, the original
// page is laid back over the trim area at its native quality.

use bleedwerk_core::error::{BleedError, Result};
use bleedwerk_core::points_to_pixels;
use image::{RgbImage, imageops};
use tracing::debug;

use crate::bleed::raster_page;
use crate::document::{BledContent, BledPage, Page, PageContent};
use crate::plan::BleedPlan;

/// Lay `original` over an extrapolated `background` rendered at `dpi`.
///
/// A raster original is copied pixel-for-pixel into the background at the
/// bleed offset. A PDF original stays vector and is drawn by the exporter at
/// 1:1 scale into the plan's placement rectangle.
pub fn compose(
    background: RgbImage,
    dpi: f32,
    original: &Page,
    plan: &BleedPlan,
) -> Result<BledPage> {
    match &original.content {
        PageContent::Vector { page_number } => {
            debug!(page_number, "Hybrid page with vector overlay");
            Ok(BledPage {
                index: original.index,
                size: plan.new_size,
                trim: plan.placement,
                rotation: original.rotation,
                content: BledContent::Hybrid {
                    background,
                    dpi,
                    page_number: *page_number,
                    overlay: plan.placement,
                },
            })
        }
        PageContent::Raster { image, dpi: source_dpi } => {
            let bleed_px = points_to_pixels(plan.bleed, *source_dpi);
            let composed = overlay_pixels(background, image, (bleed_px, bleed_px))?;
            Ok(raster_page(original, composed, dpi, bleed_px, image.dimensions()))
        }
    }
}

/// Copy `original` into `background` with its top-left at `offset`.
pub fn overlay_pixels(
    mut background: RgbImage,
    original: &RgbImage,
    offset: (u32, u32),
) -> Result<RgbImage> {
    let fits_x = offset
        .0
        .checked_add(original.width())
        .is_some_and(|right| right <= background.width());
    let fits_y = offset
        .1
        .checked_add(original.height())
        .is_some_and(|bottom| bottom <= background.height());
    if !(fits_x && fits_y) {
        return Err(BleedError::InvalidGeometry(format!(
            "{}x{} overlay at {:?} does not fit a {}x{} background",
            original.width(),
            original.height(),
            offset,
            background.width(),
            background.height()
        )));
    }

    imageops::replace(
        &mut background,
        original,
        i64::from(offset.0),
        i64::from(offset.1),
    );
    Ok(background)
}
