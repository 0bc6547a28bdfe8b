// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pixel extrapolation ("edge smear") — paste the source unchanged in the
// centre of a larger canvas and fill the border from the outermost pixels.

use std::borrow::Cow;

use bleedwerk_core::error::{BleedError, Result};
use bleedwerk_core::points_to_pixels;
use image::imageops;
use image::{RgbImage, SubImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect as PixelRect;
use tracing::{debug, instrument};

use crate::bleed::{BleedContext, raster_page};
use crate::document::{BledPage, Page, PageContent};
use crate::plan::{BleedPlan, plan_pixels};

/// One side of a pixel buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Top,
    Bottom,
    Left,
    Right,
}

impl Edge {
    pub const ALL: [Edge; 4] = [Edge::Top, Edge::Bottom, Edge::Left, Edge::Right];

    /// The 1-pixel strip along this side: row 0, row h-1, column 0 or
    /// column w-1. Borrowed, nothing is copied until it is written out.
    pub fn sample(self, source: &RgbImage) -> SubImage<&RgbImage> {
        let (w, h) = source.dimensions();
        match self {
            Edge::Top => imageops::crop_imm(source, 0, 0, w, 1),
            Edge::Bottom => imageops::crop_imm(source, 0, h.saturating_sub(1), w, 1),
            Edge::Left => imageops::crop_imm(source, 0, 0, 1, h),
            Edge::Right => imageops::crop_imm(source, w.saturating_sub(1), 0, 1, h),
        }
    }
}

/// Smear `source` outward by `bleed_px` on every side.
///
/// The result is `(w + 2b) x (h + 2b)`. The centre at `(b, b)` is
/// bit-identical to `source`; each border band repeats the adjoining edge
/// strip, and each `b x b` corner block is the matching corner pixel.
/// `bleed_px == 0` returns a copy.
#[instrument(skip(source), fields(width = source.width(), height = source.height()))]
pub fn extrapolate(source: &RgbImage, bleed_px: u32) -> Result<RgbImage> {
    let plan = plan_pixels(source.width(), source.height(), bleed_px)?;
    if bleed_px == 0 {
        return Ok(source.clone());
    }

    let (w, h, b) = (plan.width, plan.height, plan.bleed_px);
    let mut dest = RgbImage::new(plan.new_width, plan.new_height);

    imageops::replace(&mut dest, source, i64::from(b), i64::from(b));

    // Nearest-neighbour stretch of a 1-pixel strip to depth b is plain
    // repetition of that strip, b times, away from the centre.
    for edge in Edge::ALL {
        let strip = edge.sample(source).to_image();
        for step in 0..b {
            let (x, y) = match edge {
                Edge::Top => (b, step),
                Edge::Bottom => (b, b + h + step),
                Edge::Left => (step, b),
                Edge::Right => (b + w + step, b),
            };
            imageops::replace(&mut dest, &strip, i64::from(x), i64::from(y));
        }
    }

    let corners = [
        ((0, 0), (0, 0)),
        ((w - 1, 0), (b + w, 0)),
        ((0, h - 1), (0, b + h)),
        ((w - 1, h - 1), (b + w, b + h)),
    ];
    for ((sx, sy), (dx, dy)) in corners {
        draw_filled_rect_mut(
            &mut dest,
            PixelRect::at(dx as i32, dy as i32).of_size(b, b),
            *source.get_pixel(sx, sy),
        );
    }

    debug!(
        new_width = dest.width(),
        new_height = dest.height(),
        bleed_px = b,
        "Edge smear complete"
    );
    Ok(dest)
}

/// Pixels of `page` and the resolution they are at.
///
/// Raster pages are borrowed as loaded; PDF pages are rendered at the
/// configured rasterisation DPI.
pub(crate) fn page_pixels<'p>(
    page: &'p Page,
    ctx: &BleedContext<'_>,
) -> Result<(Cow<'p, RgbImage>, f32)> {
    match &page.content {
        PageContent::Raster { image, dpi } => Ok((Cow::Borrowed(image), *dpi)),
        PageContent::Vector { page_number } => {
            let rasterizer = ctx.rasterizer.ok_or(BleedError::RasterizerUnavailable)?;
            let pdf = ctx.pdf_bytes.ok_or_else(|| {
                BleedError::Pdf(format!("page {page_number} has no source PDF to render"))
            })?;

            let dpi = ctx.config.rasterization_dpi as f32;
            let (width_px, height_px) = page.size.to_pixels(dpi);
            let image =
                rasterizer.render_page(pdf, (*page_number - 1) as usize, width_px, height_px)?;
            if image.dimensions() != (width_px, height_px) {
                return Err(BleedError::Rasterization(format!(
                    "asked for {}x{}px, rasteriser returned {}x{}px",
                    width_px,
                    height_px,
                    image.width(),
                    image.height()
                )));
            }
            Ok((Cow::Owned(image), dpi))
        }
    }
}

/// Strategy B for one page: rasterise if needed, then smear.
pub fn generate_page(page: &Page, plan: &BleedPlan, ctx: &BleedContext<'_>) -> Result<BledPage> {
    let (pixels, dpi) = page_pixels(page, ctx)?;
    let bleed_px = points_to_pixels(plan.bleed, dpi);
    let smeared = extrapolate(&pixels, bleed_px)?;
    Ok(raster_page(page, smeared, dpi, bleed_px, pixels.dimensions()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgb};

    const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
    const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

    /// Every pixel distinct, so misplaced copies show up.
    fn gradient(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 7 % 256) as u8, (y * 13 % 256) as u8, ((x + y) % 256) as u8])
        })
    }

    fn centre(dest: &RgbImage, b: u32, w: u32, h: u32) -> RgbImage {
        imageops::crop_imm(dest, b, b, w, h).to_image()
    }

    #[test]
    fn centre_is_bit_identical_for_any_bleed() {
        let source = gradient(23, 17);
        for b in [0, 1, 2, 5, 30] {
            let dest = extrapolate(&source, b).unwrap();
            assert_eq!(dest.dimensions(), (23 + 2 * b, 17 + 2 * b));
            assert_eq!(centre(&dest, b, 23, 17), source, "bleed {b}");
        }
    }

    #[test]
    fn zero_bleed_is_a_no_op() {
        let source = gradient(8, 5);
        assert_eq!(extrapolate(&source, 0).unwrap(), source);
    }

    #[test]
    fn corner_blocks_are_uniform_corner_pixels() {
        let (w, h, b) = (12, 9, 4);
        let source = gradient(w, h);
        let dest = extrapolate(&source, b).unwrap();

        let blocks = [
            ((0, 0), (0, 0)),
            ((w - 1, 0), (b + w, 0)),
            ((0, h - 1), (0, b + h)),
            ((w - 1, h - 1), (b + w, b + h)),
        ];
        for ((sx, sy), (dx, dy)) in blocks {
            let expected = *source.get_pixel(sx, sy);
            for y in dy..dy + b {
                for x in dx..dx + b {
                    assert_eq!(*dest.get_pixel(x, y), expected, "block at ({dx},{dy})");
                }
            }
        }
    }

    #[test]
    fn top_and_bottom_bands_repeat_edge_rows() {
        let (w, h, b) = (10, 6, 3);
        let source = gradient(w, h);
        let dest = extrapolate(&source, b).unwrap();

        for x in 0..w {
            for step in 0..b {
                assert_eq!(dest.get_pixel(b + x, step), source.get_pixel(x, 0));
                assert_eq!(dest.get_pixel(b + x, b + h + step), source.get_pixel(x, h - 1));
            }
        }
    }

    #[test]
    fn left_and_right_bands_repeat_edge_columns() {
        let (w, h, b) = (6, 10, 4);
        let source = gradient(w, h);
        let dest = extrapolate(&source, b).unwrap();

        for y in 0..h {
            for step in 0..b {
                assert_eq!(dest.get_pixel(step, b + y), source.get_pixel(0, y));
                assert_eq!(dest.get_pixel(b + w + step, b + y), source.get_pixel(w - 1, y));
            }
        }
    }

    #[test]
    fn white_corner_pixel_fills_top_left_block() {
        let mut source = RgbImage::from_pixel(100, 100, BLACK);
        source.put_pixel(0, 0, WHITE);

        let dest = extrapolate(&source, 10).unwrap();

        assert_eq!(dest.dimensions(), (120, 120));
        for y in 0..10 {
            for x in 0..10 {
                assert_eq!(*dest.get_pixel(x, y), WHITE);
            }
        }
        assert_eq!(centre(&dest, 10, 100, 100), source);
        // The white pixel sits on the top row and left column, so it also
        // starts both adjoining bands.
        assert_eq!(*dest.get_pixel(10, 0), WHITE);
        assert_eq!(*dest.get_pixel(0, 10), WHITE);
        assert_eq!(*dest.get_pixel(11, 0), BLACK);
        assert_eq!(*dest.get_pixel(119, 119), BLACK);
    }

    #[test]
    fn single_pixel_collapses_to_uniform_square() {
        let colour = Rgb([12, 200, 77]);
        let source = RgbImage::from_pixel(1, 1, colour);

        let dest = extrapolate(&source, 5).unwrap();

        assert_eq!(dest.dimensions(), (11, 11));
        assert!(dest.pixels().all(|pixel| *pixel == colour));
    }

    #[test]
    fn single_row_source_has_no_gaps() {
        let source = gradient(5, 1);
        let dest = extrapolate(&source, 2).unwrap();

        assert_eq!(dest.dimensions(), (9, 5));
        // Every row of the output column above/below the strip is the strip.
        for y in 0..5 {
            for x in 0..5 {
                assert_eq!(dest.get_pixel(2 + x, y), source.get_pixel(x, 0));
            }
        }
    }

    #[test]
    fn empty_source_is_invalid_geometry() {
        let source = RgbImage::new(0, 4);
        assert!(matches!(
            extrapolate(&source, 3),
            Err(BleedError::InvalidGeometry(_))
        ));
    }

    #[test]
    fn edge_samples_are_one_pixel_strips() {
        let source = gradient(7, 4);
        assert_eq!(Edge::Top.sample(&source).dimensions(), (7, 1));
        assert_eq!(Edge::Right.sample(&source).dimensions(), (1, 4));
        assert_eq!(
            Edge::Bottom.sample(&source).get_pixel(3, 0),
            *source.get_pixel(3, 3)
        );
    }
}
