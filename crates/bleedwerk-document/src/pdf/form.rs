// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page-to-Form conversion — copy a source page's content stream and resources
// into a target document as a Form XObject, so it can be drawn into any
// rectangle of another page with a single `cm` + `Do`.

use std::collections::HashMap;

use bleedwerk_core::Rect;
use bleedwerk_core::error::{BleedError, Result};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use tracing::{debug, warn};

use crate::pdf::reader::PdfReader;

/// Copies objects from one source PDF into a target document.
///
/// Each source object is copied at most once; later references reuse the
/// copy, so fonts and images shared between pages stay shared in the output.
pub struct FormBuilder<'a> {
    source: &'a PdfReader,
    /// Source object id -> target object id.
    copied: HashMap<ObjectId, ObjectId>,
    /// 1-based page number -> Form XObject id in the target.
    forms: HashMap<u32, ObjectId>,
}

/// A page copied into the target as a Form XObject.
#[derive(Debug, Clone, Copy)]
pub struct PageForm {
    pub id: ObjectId,
    /// The Form's `/BBox`, equal to the source page's MediaBox.
    pub bbox: Rect,
}

impl<'a> FormBuilder<'a> {
    pub fn new(source: &'a PdfReader) -> Self {
        Self {
            source,
            copied: HashMap::new(),
            forms: HashMap::new(),
        }
    }

    /// Form XObject for `page_number`, creating it on first use.
    pub fn page_form(&mut self, target: &mut Document, page_number: u32) -> Result<PageForm> {
        let page_id = self.source.page_id(page_number)?;
        let bbox = self.source.media_box(page_id)?;

        if let Some(&id) = self.forms.get(&page_number) {
            return Ok(PageForm { id, bbox });
        }

        let content = self.source.page_content(page_id)?;
        let mut form_dict = Dictionary::new();
        form_dict.set("Type", "XObject");
        form_dict.set("Subtype", "Form");
        form_dict.set("FormType", 1i64);
        form_dict.set(
            "BBox",
            Object::Array(bbox.to_pdf_box().into_iter().map(Object::Real).collect()),
        );
        if let Some(resources) = self.source.resources(page_id) {
            let cloned = self.copy_object(target, &Object::Dictionary(resources));
            form_dict.set("Resources", cloned);
        }

        let mut stream = Stream::new(form_dict, content);
        stream.compress().map_err(|err| {
            BleedError::EncodingError(format!(
                "failed to compress content of page {}: {}",
                page_number, err
            ))
        })?;
        let id = target.add_object(Object::Stream(stream));
        self.forms.insert(page_number, id);

        debug!(
            page_number,
            ?id,
            copied_objects = self.copied.len(),
            "Page wrapped as Form XObject"
        );
        Ok(PageForm { id, bbox })
    }

    /// Deep-copy a lopdf Object, recursively resolving references (except
    /// /Parent, which would drag the whole source page tree along).
    fn copy_object(&mut self, target: &mut Document, object: &Object) -> Object {
        match object {
            Object::Dictionary(dict) => Object::Dictionary(self.copy_dictionary(target, dict)),
            Object::Array(arr) => Object::Array(
                arr.iter()
                    .map(|item| self.copy_object(target, item))
                    .collect(),
            ),
            Object::Reference(ref_id) => {
                if let Some(&copied) = self.copied.get(ref_id) {
                    return Object::Reference(copied);
                }
                let source: &'a PdfReader = self.source;
                match source.document().get_object(*ref_id) {
                    Ok(referenced) => {
                        // Reserve the id first so reference cycles terminate.
                        let new_id = target.new_object_id();
                        self.copied.insert(*ref_id, new_id);
                        let cloned = self.copy_object(target, referenced);
                        target.objects.insert(new_id, cloned);
                        Object::Reference(new_id)
                    }
                    Err(err) => {
                        warn!(?ref_id, %err, "Cannot resolve reference, using Null");
                        Object::Null
                    }
                }
            }
            Object::Stream(stream) => {
                // Content stays encoded; the copied dictionary keeps its /Filter.
                let dict = self.copy_dictionary(target, &stream.dict);
                Object::Stream(Stream::new(dict, stream.content.clone()).with_compression(false))
            }
            // Boolean, Integer, Real, String, Name, Null
            other => other.clone(),
        }
    }

    fn copy_dictionary(&mut self, target: &mut Document, dict: &Dictionary) -> Dictionary {
        let mut new_dict = Dictionary::new();
        for (key, value) in dict.iter() {
            if key == b"Parent" {
                continue;
            }
            let cloned_value = self.copy_object(target, value);
            new_dict.set(key.clone(), cloned_value);
        }
        new_dict
    }
}

/// `cm` operands mapping `bbox` onto `target`, scaling each axis independently.
pub fn placement_matrix(bbox: Rect, target: Rect) -> [f32; 6] {
    let scale_x = target.width / bbox.width;
    let scale_y = target.height / bbox.height;
    [
        scale_x,
        0.0,
        0.0,
        scale_y,
        target.x - scale_x * bbox.x,
        target.y - scale_y * bbox.y,
    ]
}
