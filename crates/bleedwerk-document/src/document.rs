// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page and document model shared by the loader, the generators, and the exporter.

use bleedwerk_core::{PageSize, Rect};
use image::RgbImage;

use crate::pdf::reader::PdfReader;

/// What a loaded page is made of.
#[derive(Debug, Clone)]
pub enum PageContent {
    /// A page of the loaded PDF, by 1-based page number.
    Vector { page_number: u32 },
    /// A decoded raster image at a known resolution.
    Raster { image: RgbImage, dpi: f32 },
}

/// A single input page. Never mutated once loaded.
#[derive(Debug, Clone)]
pub struct Page {
    /// 0-based position in the document.
    pub index: usize,
    /// Trim size in points.
    pub size: PageSize,
    /// `/Rotate` of the source page, normalised to 0..360.
    pub rotation: i64,
    pub content: PageContent,
}

/// Ordered pages plus, for PDF input, the parsed source document.
pub struct Document {
    pages: Vec<Page>,
    pdf: Option<PdfReader>,
}

impl Document {
    pub(crate) fn new(pages: Vec<Page>, pdf: Option<PdfReader>) -> Self {
        Self { pages, pdf }
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// The source PDF, if this document was loaded from one.
    pub fn pdf(&self) -> Option<&PdfReader> {
        self.pdf.as_ref()
    }
}

/// Content of an output page.
#[derive(Debug, Clone)]
pub enum BledContent {
    /// Source PDF page drawn into `target`, scaled independently on each axis.
    Vector { page_number: u32, target: Rect },
    /// Pixels covering the whole page at `dpi`.
    Raster { image: RgbImage, dpi: f32 },
    /// Raster background across the page, then the source page drawn
    /// undistorted into `overlay`.
    Hybrid {
        background: RgbImage,
        dpi: f32,
        page_number: u32,
        overlay: Rect,
    },
}

/// A generated page with bleed, ready for export.
#[derive(Debug, Clone)]
pub struct BledPage {
    /// 0-based index of the input page this was produced from.
    pub index: usize,
    /// Media box size in points (trim size plus bleed on every side).
    pub size: PageSize,
    /// Where the original trim line sits inside the new page.
    pub trim: Rect,
    pub rotation: i64,
    pub content: BledContent,
}
