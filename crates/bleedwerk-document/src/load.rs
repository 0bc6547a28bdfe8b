// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Loader — turn input bytes of a declared kind into an ordered page list.

use bleedwerk_core::error::{BleedError, Result};
use bleedwerk_core::{InputKind, PageSize};
use tracing::{debug, info, instrument};

use crate::document::{Document, Page, PageContent};
use crate::image::ImageProcessor;
use crate::pdf::PdfReader;

/// Decodes PDFs and raster images into [`Document`]s.
#[derive(Debug, Clone, Copy)]
pub struct Loader {
    /// Resolution assumed for raster inputs when giving them a physical size.
    image_dpi: u32,
}

impl Default for Loader {
    fn default() -> Self {
        Self::new(300)
    }
}

impl Loader {
    pub fn new(image_dpi: u32) -> Self {
        Self { image_dpi }
    }

    /// Load `bytes` as `kind`. The declared kind is trusted; bytes that do
    /// not decode as that kind are rejected.
    #[instrument(skip(self, bytes), fields(bytes_len = bytes.len()))]
    pub fn load(&self, bytes: &[u8], kind: InputKind) -> Result<Document> {
        let document = match kind {
            InputKind::Pdf => self.load_pdf(bytes)?,
            InputKind::Image => self.load_image(bytes)?,
        };
        info!(pages = document.page_count(), ?kind, "Input loaded");
        Ok(document)
    }

    fn load_pdf(&self, bytes: &[u8]) -> Result<Document> {
        let reader = PdfReader::from_bytes(bytes)?;
        let infos = reader.pages()?;
        if infos.is_empty() {
            return Err(BleedError::UnsupportedFormat(
                "PDF contains no pages".into(),
            ));
        }

        let pages = infos
            .into_iter()
            .enumerate()
            .map(|(index, info)| {
                debug!(
                    page = info.page_number,
                    width = info.media_box.width,
                    height = info.media_box.height,
                    rotation = info.rotation,
                    "PDF page"
                );
                Page {
                    index,
                    size: info.media_box.size(),
                    rotation: info.rotation,
                    content: PageContent::Vector {
                        page_number: info.page_number,
                    },
                }
            })
            .collect();

        Ok(Document::new(pages, Some(reader)))
    }

    fn load_image(&self, bytes: &[u8]) -> Result<Document> {
        if self.image_dpi == 0 {
            return Err(BleedError::InvalidConfig(
                "image DPI must be positive".into(),
            ));
        }

        let image = ImageProcessor::from_bytes(bytes)?.into_rgb8();
        let dpi = self.image_dpi as f32;
        let size = PageSize::from_pixels(image.width(), image.height(), dpi);

        let page = Page {
            index: 0,
            size,
            rotation: 0,
            content: PageContent::Raster { image, dpi },
        };
        Ok(Document::new(vec![page], None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::reader::tests::sample_pdf;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([1, 2, 3])));
        let mut buffer = Vec::new();
        image.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png).unwrap();
        buffer
    }

    #[test]
    fn pdf_pages_keep_count_order_and_size() {
        let bytes = sample_pdf(&[(612.0, 792.0), (200.0, 100.0), (300.0, 300.0)]);
        let document = Loader::default().load(&bytes, InputKind::Pdf).unwrap();

        assert_eq!(document.page_count(), 3);
        assert!(document.pdf().is_some());
        let sizes: Vec<PageSize> = document.pages().iter().map(|page| page.size).collect();
        assert_eq!(
            sizes,
            vec![
                PageSize::new(612.0, 792.0),
                PageSize::new(200.0, 100.0),
                PageSize::new(300.0, 300.0),
            ]
        );
        assert!(matches!(
            document.pages()[2].content,
            PageContent::Vector { page_number: 3 }
        ));
    }

    #[test]
    fn image_size_comes_from_image_dpi() {
        let document = Loader::new(150).load(&png(300, 150), InputKind::Image).unwrap();

        assert_eq!(document.page_count(), 1);
        assert!(document.pdf().is_none());
        let page = &document.pages()[0];
        assert_eq!(page.size, PageSize::new(144.0, 72.0));
        match &page.content {
            PageContent::Raster { image, dpi } => {
                assert_eq!(image.dimensions(), (300, 150));
                assert_eq!(*dpi, 150.0);
            }
            other => panic!("expected raster, got {other:?}"),
        }
    }

    #[test]
    fn declared_kind_is_trusted() {
        let err = Loader::default()
            .load(&png(4, 4), InputKind::Pdf)
            .err()
            .unwrap();
        assert!(matches!(err, BleedError::UnsupportedFormat(_)));

        let err = Loader::default()
            .load(&sample_pdf(&[(100.0, 100.0)]), InputKind::Image)
            .err()
            .unwrap();
        assert!(matches!(err, BleedError::UnsupportedFormat(_)));
    }

    #[test]
    fn pdf_without_pages_is_unsupported() {
        let err = Loader::default()
            .load(&sample_pdf(&[]), InputKind::Pdf)
            .err()
            .unwrap();
        assert!(matches!(err, BleedError::UnsupportedFormat(_)));
    }
}
