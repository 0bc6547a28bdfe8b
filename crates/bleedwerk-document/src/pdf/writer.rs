// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF writer — serialise bled pages.
//
// Two back ends:
// - `printpdf` 0.8 for documents made only of rasters: each page is one
//   image placed at its native DPI (`PdfPage` + `Op::UseXobject`).
// - `lopdf` for anything carrying vector content: source pages are copied as
//   Form XObjects and drawn with a `cm` matrix, rasters become DeviceRGB image
//   XObjects, and each page gets TrimBox/BleedBox entries.

use bleedwerk_core::error::{BleedError, Result};
use bleedwerk_core::{PageSize, Rect};
use image::RgbImage;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};
use printpdf::{
    Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Pt, RawImage, RawImageData,
    RawImageFormat, XObjectTransform,
};
use tracing::{debug, info, instrument, warn};

use crate::document::{BledContent, BledPage};
use crate::pdf::form::{FormBuilder, placement_matrix};
use crate::pdf::reader::PdfReader;

const MM_PER_INCH: f32 = 25.4;

/// A raster page for [`PdfWriter::encode_rasters`].
#[derive(Debug, Clone, Copy)]
pub struct RasterPage<'a> {
    pub image: &'a RgbImage,
    pub dpi: f32,
    /// Trim line inside the page, written as `/TrimBox`.
    pub trim: Rect,
    pub rotation: i64,
}

/// Serialises bled pages into PDF bytes.
pub struct PdfWriter {
    /// Title metadata embedded in the PDF /Info dictionary.
    title: String,
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfWriter {
    pub fn new() -> Self {
        Self {
            title: "Bleedwerk Document".into(),
        }
    }

    /// Set a title for the PDF metadata.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    // -- Raster sequence to PDF -------------------------------------------------

    /// Encode a sequence of rasters as a PDF, one page per image.
    ///
    /// Each page is exactly the image's physical size at its DPI, so
    /// `width_pt = width_px * 72 / dpi`. printpdf sets every box to the
    /// media box, so the trim and bleed boxes are stamped afterwards.
    #[instrument(skip_all, fields(pages = rasters.len()))]
    pub fn encode_rasters(&self, rasters: &[RasterPage<'_>]) -> Result<Vec<u8>> {
        info!(title = %self.title, "Creating raster PDF");

        let mut doc = PdfDocument::new(&self.title);
        let mut pages: Vec<PdfPage> = Vec::with_capacity(rasters.len());

        for raster in rasters {
            let (width, height) = raster.image.dimensions();
            let raw = RawImage {
                pixels: RawImageData::U8(raster.image.as_raw().clone()),
                width: width as usize,
                height: height as usize,
                data_format: RawImageFormat::RGB8,
                tag: Vec::new(),
            };
            let xobject_id = doc.add_image(&raw);

            // At its own DPI the image covers the page with no extra scaling.
            let ops = vec![Op::UseXobject {
                id: xobject_id,
                transform: XObjectTransform {
                    translate_x: Some(Pt(0.0)),
                    translate_y: Some(Pt(0.0)),
                    scale_x: None,
                    scale_y: None,
                    dpi: Some(raster.dpi),
                    rotate: None,
                },
            }];

            let page_w = Mm(width as f32 * MM_PER_INCH / raster.dpi);
            let page_h = Mm(height as f32 * MM_PER_INCH / raster.dpi);
            pages.push(PdfPage::new(page_w, page_h, ops));
        }

        doc.with_pages(pages);

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let output = doc.save(&PdfSaveOptions::default(), &mut warnings);
        if !warnings.is_empty() {
            debug!(warnings = warnings.len(), "printpdf reported warnings");
        }
        if output.is_empty() {
            return Err(BleedError::EncodingError(
                "printpdf produced an empty document".into(),
            ));
        }

        let output = stamp_page_boxes(&output, rasters)?;
        debug!(output_bytes = output.len(), "Raster PDF complete");
        Ok(output)
    }

    // -- Mixed vector/raster pages to PDF --------------------------------------

    /// Assemble bled pages into a new PDF with lopdf.
    ///
    /// `source` must be given whenever a page carries vector content.
    #[instrument(skip_all, fields(pages = pages.len()))]
    pub fn assemble(&self, pages: &[BledPage], source: Option<&PdfReader>) -> Result<Vec<u8>> {
        info!(title = %self.title, "Assembling PDF");

        let mut target = Document::with_version("1.5");
        let pages_id = target.new_object_id();
        let mut forms = source.map(FormBuilder::new);
        let mut kids: Vec<Object> = Vec::with_capacity(pages.len());

        for page in pages {
            let mut xobjects = Dictionary::new();
            let mut operations: Vec<Operation> = Vec::new();

            match &page.content {
                BledContent::Vector {
                    page_number,
                    target: rect,
                } => {
                    let form = require_forms(&mut forms, page.index)?
                        .page_form(&mut target, *page_number)?;
                    xobjects.set("Pg", form.id);
                    push_draw(&mut operations, "Pg", placement_matrix(form.bbox, *rect));
                }
                BledContent::Raster { image, .. } => {
                    let image_id = add_image_xobject(&mut target, image)?;
                    xobjects.set("Bg", image_id);
                    push_draw(&mut operations, "Bg", full_page_matrix(page.size));
                }
                BledContent::Hybrid {
                    background,
                    page_number,
                    overlay,
                    ..
                } => {
                    // Background first, overlay second.
                    let image_id = add_image_xobject(&mut target, background)?;
                    xobjects.set("Bg", image_id);
                    push_draw(&mut operations, "Bg", full_page_matrix(page.size));

                    let form = require_forms(&mut forms, page.index)?
                        .page_form(&mut target, *page_number)?;
                    xobjects.set("Pg", form.id);
                    push_draw(&mut operations, "Pg", placement_matrix(form.bbox, *overlay));
                }
            }

            let content = Content { operations }.encode().map_err(|err| {
                BleedError::EncodingError(format!(
                    "failed to encode content of page {}: {}",
                    page.index + 1,
                    err
                ))
            })?;
            let mut content_stream = Stream::new(Dictionary::new(), content);
            content_stream.compress().map_err(|err| {
                BleedError::EncodingError(format!("failed to compress page content: {}", err))
            })?;
            let content_id = target.add_object(content_stream);

            let media_box = Rect::from_size(page.size);
            let mut page_dict = dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => pdf_box(media_box),
                "BleedBox" => pdf_box(media_box),
                "TrimBox" => pdf_box(page.trim),
                "Resources" => dictionary! { "XObject" => xobjects },
                "Contents" => content_id,
            };
            if page.rotation != 0 {
                page_dict.set("Rotate", page.rotation);
            }
            kids.push(Object::Reference(target.add_object(page_dict)));
        }

        let count = kids.len() as i64;
        target.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = target.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        target.trailer.set("Root", catalog_id);
        let info_id = target.add_object(dictionary! {
            "Title" => Object::string_literal(self.title.as_str()),
            "Producer" => Object::string_literal("Bleedwerk"),
        });
        target.trailer.set("Info", info_id);

        let mut output = Vec::new();
        target.save_to(&mut output).map_err(|err| {
            BleedError::EncodingError(format!("failed to serialise PDF: {}", err))
        })?;

        debug!(output_bytes = output.len(), "PDF assembly complete");
        Ok(output)
    }
}

// -- Helpers ------------------------------------------------------------------

/// Set `/TrimBox`, `/BleedBox` (= `/MediaBox`) and `/Rotate` on each page of
/// a printpdf document, pairing pages with `rasters` in order.
fn stamp_page_boxes(pdf: &[u8], rasters: &[RasterPage<'_>]) -> Result<Vec<u8>> {
    let mut doc = Document::load_mem(pdf).map_err(|err| {
        BleedError::EncodingError(format!("cannot reopen raster PDF: {}", err))
    })?;

    let pages = doc.get_pages();
    if pages.len() != rasters.len() {
        return Err(BleedError::EncodingError(format!(
            "raster PDF has {} pages, expected {}",
            pages.len(),
            rasters.len()
        )));
    }

    for (page_id, raster) in pages.into_values().zip(rasters) {
        let page = doc.get_dictionary_mut(page_id).map_err(|err| {
            BleedError::EncodingError(format!("raster PDF page {:?}: {}", page_id, err))
        })?;
        let media_box = page.get(b"MediaBox").ok().cloned().unwrap_or_else(|| {
            let (width, height) = raster.image.dimensions();
            pdf_box(Rect::from_size(PageSize::from_pixels(width, height, raster.dpi)))
        });
        page.set("BleedBox", media_box);
        page.set("TrimBox", pdf_box(raster.trim));
        if raster.rotation != 0 {
            page.set("Rotate", raster.rotation);
        }
    }

    let mut output = Vec::new();
    doc.save_to(&mut output).map_err(|err| {
        BleedError::EncodingError(format!("failed to serialise raster PDF: {}", err))
    })?;
    Ok(output)
}

fn require_forms<'f, 'a>(
    forms: &'f mut Option<FormBuilder<'a>>,
    index: usize,
) -> Result<&'f mut FormBuilder<'a>> {
    forms.as_mut().ok_or_else(|| {
        warn!(page = index, "vector page without a source PDF");
        BleedError::EncodingError(format!(
            "page {} draws source PDF content but no source document was given",
            index + 1
        ))
    })
}

/// `q <matrix> cm /<name> Do Q`
fn push_draw(operations: &mut Vec<Operation>, name: &str, matrix: [f32; 6]) {
    operations.push(Operation::new("q", vec![]));
    operations.push(Operation::new(
        "cm",
        matrix.into_iter().map(Object::Real).collect(),
    ));
    operations.push(Operation::new("Do", vec![Object::Name(name.as_bytes().to_vec())]));
    operations.push(Operation::new("Q", vec![]));
}

/// Image XObjects live in a unit square; scale it to the whole page.
fn full_page_matrix(size: PageSize) -> [f32; 6] {
    [size.width, 0.0, 0.0, size.height, 0.0, 0.0]
}

fn pdf_box(rect: Rect) -> Object {
    Object::Array(rect.to_pdf_box().into_iter().map(Object::Real).collect())
}

/// Embed an RGB8 buffer as a Flate-compressed DeviceRGB image XObject.
fn add_image_xobject(target: &mut Document, image: &RgbImage) -> Result<ObjectId> {
    let (width, height) = image.dimensions();
    let dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => width as i64,
        "Height" => height as i64,
        "ColorSpace" => "DeviceRGB",
        "BitsPerComponent" => 8i64,
    };
    let mut stream = Stream::new(dict, image.as_raw().clone());
    stream.compress().map_err(|err| {
        BleedError::EncodingError(format!("failed to compress {width}x{height} image: {err}"))
    })?;
    Ok(target.add_object(stream))
}
