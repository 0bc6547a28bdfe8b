// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Conversion pipeline: load → bleed every page → export.
//
// Pages are independent, so with `parallel` set they are processed on the
// rayon pool. `collect` into a `Result<Vec<_>>` keeps page order and stops at
// the first failing page, which aborts the whole conversion.

use bleedwerk_core::error::Result;
use bleedwerk_core::{BleedConfig, InputKind};
use rayon::prelude::*;
use tracing::{info, instrument};

use crate::bleed::{BleedContext, bleed_page};
use crate::document::{BledPage, Document, Page};
use crate::export::Exporter;
use crate::load::Loader;
use crate::raster::{PageRasterizer, default_rasterizer};

/// Runs conversions with one configuration and rasteriser.
pub struct Converter {
    config: BleedConfig,
    rasterizer: Option<Box<dyn PageRasterizer>>,
}

impl Converter {
    // -- Construction ---------------------------------------------------------

    /// A converter using the rasteriser compiled into this build, if any.
    pub fn new(config: BleedConfig) -> Self {
        Self {
            config,
            rasterizer: default_rasterizer(),
        }
    }

    pub fn with_rasterizer(mut self, rasterizer: Box<dyn PageRasterizer>) -> Self {
        self.rasterizer = Some(rasterizer);
        self
    }

    /// Drop any rasteriser; pixel strategies then only work on image input.
    pub fn without_rasterizer(mut self) -> Self {
        self.rasterizer = None;
        self
    }

    pub fn config(&self) -> &BleedConfig {
        &self.config
    }

    // -- Pipeline -------------------------------------------------------------

    /// Add bleed to every page of `document`, in page order.
    ///
    /// A failing page is reported as `PartialPageFailure` carrying its index
    /// and trim size.
    #[instrument(skip_all, fields(pages = document.page_count(), parallel = self.config.parallel))]
    pub fn bleed_document(&self, document: &Document) -> Result<Vec<BledPage>> {
        let ctx = BleedContext {
            config: &self.config,
            pdf_bytes: document.pdf().map(|pdf| pdf.bytes()),
            rasterizer: self.rasterizer.as_deref(),
        };
        let bleed_one = |page: &Page| {
            bleed_page(page, &ctx)
                .map_err(|err| err.on_page(page.index, page.size.width, page.size.height))
        };

        if self.config.parallel {
            document.pages().par_iter().map(bleed_one).collect()
        } else {
            document.pages().iter().map(bleed_one).collect()
        }
    }

    /// Convert one input file's bytes into PDF bytes with bleed.
    #[instrument(
        skip(self, bytes),
        fields(bytes_len = bytes.len(), strategy = ?self.config.strategy)
    )]
    pub fn convert(&self, bytes: &[u8], kind: InputKind) -> Result<Vec<u8>> {
        self.config.validate()?;

        let document = Loader::new(self.config.image_dpi).load(bytes, kind)?;
        let pages = self.bleed_document(&document)?;
        let output = Exporter::new()
            .with_title("Bleedwerk Document")
            .export(&pages, document.pdf())?;

        info!(
            pages = pages.len(),
            bleed_pt = self.config.bleed_pt,
            output_bytes = output.len(),
            "Conversion complete"
        );
        Ok(output)
    }
}

/// Convert `bytes` of `kind` with `config`, using the default rasteriser.
pub fn convert(bytes: &[u8], kind: InputKind, config: &BleedConfig) -> Result<Vec<u8>> {
    Converter::new(config.clone()).convert(bytes, kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::PdfReader;
    use crate::pdf::reader::tests::sample_pdf;
    use crate::raster::tests::FlatRasterizer;
    use crate::document::BledContent;
    use bleedwerk_core::{BleedError, PageSize, Rect, Strategy};
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    fn media_boxes(bytes: &[u8]) -> Vec<Rect> {
        PdfReader::from_bytes(bytes)
            .unwrap()
            .pages()
            .unwrap()
            .into_iter()
            .map(|page| page.media_box)
            .collect()
    }

    fn page_box(bytes: &[u8], key: &[u8]) -> Vec<f32> {
        let reader = PdfReader::from_bytes(bytes).unwrap();
        let page = reader
            .document()
            .get_dictionary(reader.page_id(1).unwrap())
            .unwrap();
        page.get(key)
            .unwrap()
            .as_array()
            .unwrap()
            .iter()
            .map(|value| value.as_float().unwrap())
            .collect()
    }

    fn png(width: u32, height: u32) -> Vec<u8> {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([0, 90, 180])));
        let mut buffer = Vec::new();
        image.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png).unwrap();
        buffer
    }

    fn config(strategy: Strategy, bleed_pt: f32) -> BleedConfig {
        BleedConfig {
            strategy,
            bleed_pt,
            rasterization_dpi: 72,
            image_dpi: 72,
            ..BleedConfig::default()
        }
    }

    #[test]
    fn letter_page_stretched_by_an_eighth_inch() {
        let bytes = sample_pdf(&[(612.0, 792.0)]);
        let output = Converter::new(config(Strategy::Stretch, 9.0))
            .without_rasterizer()
            .convert(&bytes, InputKind::Pdf)
            .unwrap();

        assert_eq!(media_boxes(&output), vec![Rect::new(0.0, 0.0, 630.0, 810.0)]);
    }

    #[test]
    fn page_order_and_count_are_preserved() {
        let bytes = sample_pdf(&[(200.0, 100.0), (300.0, 400.0), (150.0, 150.0)]);
        for parallel in [true, false] {
            let config = BleedConfig {
                parallel,
                ..config(Strategy::Stretch, 4.5)
            };
            let output = convert(&bytes, InputKind::Pdf, &config).unwrap();
            assert_eq!(
                media_boxes(&output),
                vec![
                    Rect::new(0.0, 0.0, 209.0, 109.0),
                    Rect::new(0.0, 0.0, 309.0, 409.0),
                    Rect::new(0.0, 0.0, 159.0, 159.0),
                ],
                "parallel = {parallel}"
            );
        }
    }

    #[test]
    fn pixel_strategies_keep_page_order() {
        let sizes = [(200.0, 100.0), (300.0, 400.0), (150.0, 150.0)];
        let bytes = sample_pdf(&sizes);
        let document = Loader::new(72).load(&bytes, InputKind::Pdf).unwrap();

        for strategy in [Strategy::PixelExtrapolate, Strategy::PixelExtrapolateHybrid] {
            for parallel in [true, false] {
                let config = BleedConfig {
                    parallel,
                    ..config(strategy, 9.0)
                };
                let bled = Converter::new(config)
                    .with_rasterizer(Box::new(FlatRasterizer))
                    .bleed_document(&document)
                    .unwrap();

                assert_eq!(bled.len(), sizes.len());
                for (index, (page, (width, height))) in bled.iter().zip(sizes).enumerate() {
                    let context = format!("{strategy:?}, parallel = {parallel}, page {index}");
                    assert_eq!(page.index, index, "{context}");
                    assert_eq!(
                        page.size,
                        PageSize::new(width + 18.0, height + 18.0),
                        "{context}"
                    );

                    // FlatRasterizer shades each page by its index.
                    let shade = index as u8 * 40;
                    let pixels = match &page.content {
                        BledContent::Raster { image, .. } => image,
                        BledContent::Hybrid {
                            background,
                            page_number,
                            overlay,
                            ..
                        } => {
                            assert_eq!(*page_number as usize, index + 1, "{context}");
                            assert_eq!(*overlay, Rect::new(9.0, 9.0, width, height), "{context}");
                            background
                        }
                        other => panic!("{context}: unexpected {other:?}"),
                    };
                    assert_eq!(
                        pixels.dimensions(),
                        ((width + 18.0) as u32, (height + 18.0) as u32),
                        "{context}"
                    );
                    assert_eq!(*pixels.get_pixel(0, 0), Rgb([shade, 128, 255 - shade]));
                    assert_eq!(
                        *pixels.get_pixel(pixels.width() / 2, pixels.height() / 2),
                        Rgb([shade, 128, 255 - shade]),
                        "{context}"
                    );
                }
            }
        }
    }

    #[test]
    fn image_output_marks_the_trim_line_for_every_strategy() {
        // 100pt square plus 9pt a side: trim sits at 9..109 on a 118pt page.
        for strategy in [
            Strategy::Stretch,
            Strategy::PixelExtrapolate,
            Strategy::PixelExtrapolateHybrid,
        ] {
            let output = convert(&png(100, 100), InputKind::Image, &config(strategy, 9.0)).unwrap();

            let trim = page_box(&output, b"TrimBox");
            let expected = [9.0, 9.0, 109.0, 109.0];
            assert_eq!(trim.len(), 4, "{strategy:?}");
            for (actual, expected) in trim.iter().zip(expected) {
                assert!((actual - expected).abs() < 0.01, "{strategy:?}: {trim:?}");
            }
            let bleed = page_box(&output, b"BleedBox");
            assert!((bleed[2] - 118.0).abs() < 0.01, "{strategy:?}: {bleed:?}");
            assert!((bleed[3] - 118.0).abs() < 0.01, "{strategy:?}: {bleed:?}");
        }
    }

    #[test]
    fn zero_bleed_keeps_page_size() {
        let bytes = sample_pdf(&[(612.0, 792.0)]);
        let output = convert(&bytes, InputKind::Pdf, &config(Strategy::Stretch, 0.0)).unwrap();
        assert_eq!(media_boxes(&output), vec![Rect::new(0.0, 0.0, 612.0, 792.0)]);
    }

    #[test]
    fn image_input_is_extrapolated_to_a_raster_pdf() {
        // 100x100px at 72dpi is 100pt square; 9pt of bleed adds 9px a side.
        let config = config(Strategy::PixelExtrapolate, 9.0);
        let output = convert(&png(100, 100), InputKind::Image, &config).unwrap();

        let boxes = media_boxes(&output);
        assert_eq!(boxes.len(), 1);
        assert!((boxes[0].width - 118.0).abs() < 0.1);
        assert!((boxes[0].height - 118.0).abs() < 0.1);
    }

    #[test]
    fn hybrid_pdf_page_renders_background_and_keeps_vector_overlay() {
        let bytes = sample_pdf(&[(144.0, 72.0)]);
        let output = Converter::new(config(Strategy::PixelExtrapolateHybrid, 9.0))
            .with_rasterizer(Box::new(FlatRasterizer))
            .convert(&bytes, InputKind::Pdf)
            .unwrap();

        let reader = PdfReader::from_bytes(&output).unwrap();
        assert_eq!(
            reader.pages().unwrap()[0].media_box,
            Rect::new(0.0, 0.0, 162.0, 90.0)
        );
        let page_id = reader.page_id(1).unwrap();
        let resources = reader.resources(page_id).unwrap();
        let xobjects = resources.get(b"XObject").unwrap().as_dict().unwrap();
        assert!(xobjects.has(b"Bg"));
        assert!(xobjects.has(b"Pg"));
    }

    #[test]
    fn pixel_strategy_without_rasterizer_names_the_failing_page() {
        let bytes = sample_pdf(&[(612.0, 792.0)]);
        let err = Converter::new(config(Strategy::PixelExtrapolate, 9.0))
            .without_rasterizer()
            .convert(&bytes, InputKind::Pdf)
            .unwrap_err();

        match err {
            BleedError::PartialPageFailure {
                page,
                width,
                height,
                source,
            } => {
                assert_eq!(page, 0);
                assert_eq!((width, height), (612.0, 792.0));
                assert!(matches!(*source, BleedError::RasterizerUnavailable));
            }
            other => panic!("expected page failure, got {other:?}"),
        }
    }

    #[test]
    fn oversized_bleed_fails_on_the_small_page() {
        let bytes = sample_pdf(&[(612.0, 792.0), (20.0, 20.0)]);
        let err = convert(&bytes, InputKind::Pdf, &config(Strategy::Stretch, 12.0)).unwrap_err();

        assert!(matches!(
            err,
            BleedError::PartialPageFailure { page: 1, .. }
        ));
    }

    #[test]
    fn negative_bleed_is_rejected_before_loading() {
        let err = convert(b"not even a pdf", InputKind::Pdf, &config(Strategy::Stretch, -1.0))
            .unwrap_err();
        assert!(matches!(err, BleedError::InvalidGeometry(_)));
    }
}
