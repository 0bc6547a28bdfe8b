// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader — open a source PDF from memory and inspect its pages (effective
// MediaBox, rotation, resources, content) using the `lopdf` crate.

use bleedwerk_core::Rect;
use bleedwerk_core::error::{BleedError, Result};
use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::{debug, instrument, warn};

/// US Letter, used when a page tree carries no MediaBox at all.
const FALLBACK_MEDIA_BOX: Rect = Rect {
    x: 0.0,
    y: 0.0,
    width: 612.0,
    height: 792.0,
};

/// Geometry of one source page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageInfo {
    /// 1-based page number.
    pub page_number: u32,
    /// Effective MediaBox in default user space.
    pub media_box: Rect,
    /// `/Rotate`, normalised to 0..360.
    pub rotation: i64,
}

/// A parsed source PDF together with the bytes it was parsed from.
///
/// The bytes are kept for rasterisers, which load the document themselves.
pub struct PdfReader {
    /// The underlying lopdf document.
    document: Document,
    bytes: Vec<u8>,
}

impl PdfReader {
    // -- Construction ---------------------------------------------------------

    /// Parse a PDF already in memory.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let document = Document::load_mem(data).map_err(|err| {
            BleedError::UnsupportedFormat(format!("failed to load PDF from memory: {}", err))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded from bytes");

        Ok(Self {
            document,
            bytes: data.to_vec(),
        })
    }

    // -- Inspection -----------------------------------------------------------

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// The original file bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Geometry of every page, in page order.
    pub fn pages(&self) -> Result<Vec<PageInfo>> {
        // lopdf pages are keyed by 1-indexed page number, already sorted.
        self.document
            .get_pages()
            .into_iter()
            .map(|(page_number, page_id)| {
                Ok(PageInfo {
                    page_number,
                    media_box: self.media_box(page_id)?,
                    rotation: self.rotation(page_id),
                })
            })
            .collect()
    }

    /// Object id of a 1-based page number.
    pub fn page_id(&self, page_number: u32) -> Result<ObjectId> {
        let pages = self.document.get_pages();
        pages.get(&page_number).copied().ok_or_else(|| {
            BleedError::Pdf(format!(
                "page {} not found (document has {} pages)",
                page_number,
                pages.len()
            ))
        })
    }

    /// Effective MediaBox of a page, following `/Parent` inheritance.
    pub fn media_box(&self, page_id: ObjectId) -> Result<Rect> {
        let media_box = self
            .inherited(page_id, b"MediaBox")
            .map(|value| self.resolve(value));
        let Some(Object::Array(values)) = media_box else {
            warn!(?page_id, "page has no MediaBox, assuming US Letter");
            return Ok(FALLBACK_MEDIA_BOX);
        };
        let numbers: Vec<f32> = values
            .iter()
            .filter_map(|value| as_number(self.resolve(value)))
            .collect();
        let [x0, y0, x1, y1] = numbers[..] else {
            return Err(BleedError::Pdf(format!(
                "page {:?} has a malformed MediaBox ({} numbers)",
                page_id,
                numbers.len()
            )));
        };
        // Boxes may be given with any two opposite corners.
        Ok(Rect::new(
            x0.min(x1),
            y0.min(y1),
            (x1 - x0).abs(),
            (y1 - y0).abs(),
        ))
    }

    /// `/Rotate` of a page (inheritable), normalised to 0..360.
    pub fn rotation(&self, page_id: ObjectId) -> i64 {
        self.inherited(page_id, b"Rotate")
            .and_then(|value| self.resolve(value).as_i64().ok())
            .unwrap_or(0)
            .rem_euclid(360)
    }

    /// Effective `/Resources` of a page, following `/Parent` inheritance.
    pub fn resources(&self, page_id: ObjectId) -> Option<Dictionary> {
        match self.inherited(page_id, b"Resources").map(|value| self.resolve(value)) {
            Some(Object::Dictionary(dict)) => Some(dict.clone()),
            _ => None,
        }
    }

    /// Decoded content of all the page's content streams, concatenated.
    pub fn page_content(&self, page_id: ObjectId) -> Result<Vec<u8>> {
        self.document.get_page_content(page_id).map_err(|err| {
            BleedError::Pdf(format!("cannot read content of page {:?}: {}", page_id, err))
        })
    }

    // -- Helpers --------------------------------------------------------------

    /// Look up `key` on a page or the nearest ancestor that defines it.
    fn inherited(&self, page_id: ObjectId, key: &[u8]) -> Option<&Object> {
        let mut current = self.document.get_dictionary(page_id).ok()?;
        // Bounded walk: malformed files can contain /Parent cycles.
        for _ in 0..64 {
            if let Ok(value) = current.get(key) {
                return Some(value);
            }
            let parent_id = current.get(b"Parent").ok()?.as_reference().ok()?;
            current = self.document.get_dictionary(parent_id).ok()?;
        }
        None
    }

    /// Follow a single indirect reference, if any.
    fn resolve<'a>(&'a self, object: &'a Object) -> &'a Object {
        match object {
            Object::Reference(id) => self.document.get_object(*id).unwrap_or(object),
            other => other,
        }
    }
}

fn as_number(object: &Object) -> Option<f32> {
    match object {
        Object::Integer(value) => Some(*value as f32),
        Object::Real(value) => Some(*value),
        _ => None,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{Stream, dictionary};

    /// Build an in-memory PDF with one page per `(width, height)` entry. Each
    /// page fills a rectangle so its content stream is non-empty.
    pub(crate) fn sample_pdf(sizes: &[(f32, f32)]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let mut kids = Vec::new();

        for (index, &(width, height)) in sizes.iter().enumerate() {
            let gray = (index as f32 + 1.0) / (sizes.len() as f32 + 1.0);
            let content = Content {
                operations: vec![
                    Operation::new("g", vec![Object::Real(gray)]),
                    Operation::new(
                        "re",
                        vec![
                            Object::Integer(0),
                            Object::Integer(0),
                            Object::Real(width),
                            Object::Real(height),
                        ],
                    ),
                    Operation::new("f", vec![]),
                ],
            };
            let content_id = doc.add_object(Stream::new(
                dictionary! {},
                content.encode().unwrap(),
            ));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Real(width),
                    Object::Real(height),
                ],
                "Contents" => content_id,
                "Resources" => dictionary! {},
            });
            kids.push(Object::Reference(page_id));
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut output = Vec::new();
        doc.save_to(&mut output).unwrap();
        output
    }

    #[test]
    fn pages_report_media_boxes_in_order() {
        let reader =
            PdfReader::from_bytes(&sample_pdf(&[(612.0, 792.0), (300.0, 200.0)])).unwrap();
        let pages = reader.pages().unwrap();

        assert_eq!(reader.page_count(), 2);
        assert_eq!(pages[0].page_number, 1);
        assert_eq!(pages[0].media_box, Rect::new(0.0, 0.0, 612.0, 792.0));
        assert_eq!(pages[1].media_box, Rect::new(0.0, 0.0, 300.0, 200.0));
        assert_eq!(pages[1].rotation, 0);
    }

    #[test]
    fn garbage_is_unsupported() {
        let err = PdfReader::from_bytes(b"definitely not a pdf").err().unwrap();
        assert!(matches!(err, BleedError::UnsupportedFormat(_)));
    }

    #[test]
    fn page_content_is_readable() {
        let reader = PdfReader::from_bytes(&sample_pdf(&[(100.0, 100.0)])).unwrap();
        let page_id = reader.page_id(1).unwrap();
        let content = reader.page_content(page_id).unwrap();
        assert!(String::from_utf8_lossy(&content).contains("re"));
        assert!(reader.page_id(2).is_err());
    }
}
