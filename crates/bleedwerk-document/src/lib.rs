// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// bleedwerk-document — Bleed synthesis for print-ready PDFs.
//
// Loads PDF or raster input, extends every page by a bleed margin (stretching
// the page, or smearing its edge pixels outward with an optional vector
// overlay), and writes the result as a PDF with TrimBox/BleedBox set.

pub mod bleed;
pub mod convert;
pub mod document;
pub mod export;
pub mod image;
pub mod load;
pub mod pdf;
pub mod plan;
pub mod raster;

// Re-export the primary entry points so callers can use `bleedwerk_document::Converter` etc.
pub use bleed::{BleedContext, bleed_page};
pub use convert::{Converter, convert};
pub use document::{BledContent, BledPage, Document, Page, PageContent};
pub use export::Exporter;
pub use crate::image::ImageProcessor;
pub use load::Loader;
pub use pdf::reader::PdfReader;
pub use pdf::writer::PdfWriter;
pub use plan::{BleedPlan, PixelPlan, plan, plan_pixels};
pub use raster::{PageRasterizer, default_rasterizer};

#[cfg(feature = "pdfium")]
pub use raster::pdfium::PdfiumRasterizer;
