// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types: input kinds, page geometry, and length units.

use serde::{Deserialize, Serialize};

/// PostScript points per inch. All page geometry is expressed in points.
pub const POINTS_PER_INCH: f32 = 72.0;

/// 1/16" bleed, common for digital print shops.
pub const SIXTEENTH_INCH_PT: f32 = 4.5;

/// 1/8" bleed, the usual offset-print standard.
pub const EIGHTH_INCH_PT: f32 = 9.0;

/// Supported input artifact kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InputKind {
    /// Page-description document (PDF).
    Pdf,
    /// Raster image (PNG, JPEG, TIFF).
    Image,
}

impl InputKind {
    /// Infer the input kind from a file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "png" | "jpg" | "jpeg" | "tif" | "tiff" => Some(Self::Image),
            _ => None,
        }
    }
}

/// Length units accepted for the bleed distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    #[default]
    Pt,
    In,
    Mm,
}

impl LengthUnit {
    /// Convert `value` in this unit to points.
    pub fn to_points(self, value: f32) -> f32 {
        match self {
            Self::Pt => value,
            Self::In => value * POINTS_PER_INCH,
            Self::Mm => value * POINTS_PER_INCH / 25.4,
        }
    }
}

/// Page dimensions in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

impl PageSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Physical size of a `width_px` x `height_px` raster at `dpi`.
    pub fn from_pixels(width_px: u32, height_px: u32, dpi: f32) -> Self {
        Self {
            width: width_px as f32 * POINTS_PER_INCH / dpi,
            height: height_px as f32 * POINTS_PER_INCH / dpi,
        }
    }

    /// Pixel dimensions of this page rendered at `dpi`, rounded to the
    /// nearest pixel and never below one.
    pub fn to_pixels(&self, dpi: f32) -> (u32, u32) {
        (
            points_to_pixels(self.width, dpi).max(1),
            points_to_pixels(self.height, dpi).max(1),
        )
    }

    pub fn min_side(&self) -> f32 {
        self.width.min(self.height)
    }
}

/// Axis-aligned rectangle in points, origin at the lower-left (PDF user space).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle covering a whole page of `size`.
    pub fn from_size(size: PageSize) -> Self {
        Self::new(0.0, 0.0, size.width, size.height)
    }

    pub fn size(&self) -> PageSize {
        PageSize::new(self.width, self.height)
    }

    /// `[llx lly urx ury]` as used by PDF box entries.
    pub fn to_pdf_box(&self) -> [f32; 4] {
        [self.x, self.y, self.x + self.width, self.y + self.height]
    }
}

/// Convert a length in points to whole pixels at `dpi`:
/// `round(points / 72 * dpi)`.
pub fn points_to_pixels(points: f32, dpi: f32) -> u32 {
    (points / POINTS_PER_INCH * dpi).round().max(0.0) as u32
}
