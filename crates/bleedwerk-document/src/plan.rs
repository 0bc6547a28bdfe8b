// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bleed planning — new page dimensions and placement of the original content,
// in points and in pixels. Pure functions, no side effects.

use bleedwerk_core::error::{BleedError, Result};
use bleedwerk_core::{PageSize, Rect};

/// Geometry of one page after adding bleed, in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BleedPlan {
    pub original: PageSize,
    pub bleed: f32,
    /// `original + 2 * bleed` on each axis.
    pub new_size: PageSize,
    /// Rectangle of size `original` inset by `bleed` on every side.
    pub placement: Rect,
}

impl BleedPlan {
    /// Independent x/y factors mapping the original page onto the new one.
    pub fn scale(&self) -> (f32, f32) {
        (
            self.new_size.width / self.original.width,
            self.new_size.height / self.original.height,
        )
    }
}

/// Plan a page of `size` with `bleed` points on every edge.
///
/// `bleed` must be finite, non-negative, and strictly less than half the
/// smaller page dimension. Zero is a valid no-op.
pub fn plan(size: PageSize, bleed: f32) -> Result<BleedPlan> {
    let finite = size.width.is_finite() && size.height.is_finite();
    if !finite || size.width <= 0.0 || size.height <= 0.0 {
        return Err(BleedError::InvalidGeometry(format!(
            "page must have positive area, got {}x{}pt",
            size.width, size.height
        )));
    }
    if !bleed.is_finite() || bleed < 0.0 {
        return Err(BleedError::InvalidGeometry(format!(
            "bleed must be a non-negative length, got {bleed}pt"
        )));
    }
    if bleed >= size.min_side() / 2.0 {
        return Err(BleedError::InvalidGeometry(format!(
            "bleed {bleed}pt must be less than half of the {}x{}pt page's smaller side",
            size.width, size.height
        )));
    }

    Ok(BleedPlan {
        original: size,
        bleed,
        new_size: PageSize::new(size.width + 2.0 * bleed, size.height + 2.0 * bleed),
        placement: Rect::new(bleed, bleed, size.width, size.height),
    })
}

/// Pixel counterpart of [`BleedPlan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelPlan {
    pub width: u32,
    pub height: u32,
    pub bleed_px: u32,
    pub new_width: u32,
    pub new_height: u32,
}

/// Plan a `width` x `height` pixel buffer with `bleed_px` on every edge.
///
/// Unlike [`plan`], any bleed is accepted here: a 1x1 buffer with a 5px bleed
/// is a legal 11x11 smear.
pub fn plan_pixels(width: u32, height: u32, bleed_px: u32) -> Result<PixelPlan> {
    if width == 0 || height == 0 {
        return Err(BleedError::InvalidGeometry(format!(
            "pixel buffer must be non-empty, got {width}x{height}"
        )));
    }
    let grow = |dim: u32| {
        bleed_px
            .checked_mul(2)
            .and_then(|twice| dim.checked_add(twice))
            .ok_or_else(|| {
                BleedError::InvalidGeometry(format!(
                    "{width}x{height} buffer with {bleed_px}px bleed overflows"
                ))
            })
    };

    Ok(PixelPlan {
        width,
        height,
        bleed_px,
        new_width: grow(width)?,
        new_height: grow(height)?,
    })
}
