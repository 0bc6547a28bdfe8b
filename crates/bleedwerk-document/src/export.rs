// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Exporter — validate bled pages and pick the PDF back end for them.

use bleedwerk_core::error::{BleedError, Result};
use image::RgbImage;
use tracing::{info, instrument};

use crate::document::{BledContent, BledPage};
use crate::pdf::PdfReader;
use crate::pdf::writer::{PdfWriter, RasterPage};

/// Serialises a run of bled pages into one PDF.
#[derive(Default)]
pub struct Exporter {
    writer: PdfWriter,
}

impl Exporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.writer.set_title(title);
        self
    }

    /// Export `pages` in order.
    ///
    /// Documents made only of rasters go through the image-sequence encoder;
    /// anything with vector content is assembled against `source`.
    #[instrument(skip_all, fields(pages = pages.len()))]
    pub fn export(&self, pages: &[BledPage], source: Option<&PdfReader>) -> Result<Vec<u8>> {
        if pages.is_empty() {
            return Err(BleedError::EncodingError(
                "cannot export a document with no pages".into(),
            ));
        }
        for page in pages {
            validate(page)?;
        }

        let rasters: Option<Vec<RasterPage<'_>>> = pages
            .iter()
            .map(|page| match &page.content {
                BledContent::Raster { image, dpi } => Some(RasterPage {
                    image,
                    dpi: *dpi,
                    trim: page.trim,
                    rotation: page.rotation,
                }),
                _ => None,
            })
            .collect();

        match rasters {
            Some(rasters) => {
                info!("All pages raster, encoding image sequence");
                self.writer.encode_rasters(&rasters)
            }
            None => self.writer.assemble(pages, source),
        }
    }
}

fn validate(page: &BledPage) -> Result<()> {
    let malformed = |what: String| {
        Err(BleedError::EncodingError(format!(
            "page {}: {}",
            page.index + 1,
            what
        )))
    };

    if !(page.size.width > 0.0 && page.size.height > 0.0) {
        return malformed(format!(
            "page size {}x{}pt is not positive",
            page.size.width, page.size.height
        ));
    }

    let buffer = match &page.content {
        BledContent::Vector { .. } => return Ok(()),
        BledContent::Raster { image, dpi } => (image, *dpi),
        BledContent::Hybrid {
            background, dpi, ..
        } => (background, *dpi),
    };
    match buffer {
        (image, _) if image.width() == 0 || image.height() == 0 => {
            malformed("pixel buffer is empty".into())
        }
        (image, _) if !has_full_rgb_samples(image) => malformed(format!(
            "pixel buffer holds {} bytes, {}x{} RGB needs {}",
            image.as_raw().len(),
            image.width(),
            image.height(),
            image.width() as usize * image.height() as usize * 3
        )),
        (_, dpi) if !(dpi.is_finite() && dpi > 0.0) => {
            malformed(format!("resolution {dpi} is not positive"))
        }
        _ => Ok(()),
    }
}

fn has_full_rgb_samples(image: &RgbImage) -> bool {
    image.as_raw().len() == image.width() as usize * image.height() as usize * 3
}
