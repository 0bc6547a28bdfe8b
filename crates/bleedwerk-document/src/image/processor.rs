// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor — decode raster inputs, normalise them to RGB8, and
// resample them for the stretch strategy. Operates on in-memory images using
// the `image` crate.

use bleedwerk_core::ResampleFilter;
use bleedwerk_core::error::{BleedError, Result};
use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbImage};
use tracing::{debug, instrument};

/// Decoded raster input.
///
/// ```ignore
/// let rgb = ImageProcessor::from_bytes(&png_bytes)?.into_rgb8();
/// ```
pub struct ImageProcessor {
    /// The decoded image in its native colour type.
    image: DynamicImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Create a processor from raw encoded bytes (PNG, JPEG, TIFF).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let img = image::load_from_memory(data).map_err(|err| {
            BleedError::UnsupportedFormat(format!("failed to decode image: {}", err))
        })?;
        debug!(
            width = img.width(),
            height = img.height(),
            color = ?img.color(),
            "Image decoded from bytes"
        );
        Ok(Self { image: img })
    }

    // -- Output ---------------------------------------------------------------

    /// Consume the processor and return 8-bit RGB pixels.
    ///
    /// Alpha is dropped, grey is expanded, and 16-bit/float samples are
    /// narrowed; CMYK JPEGs are already RGB after decoding.
    pub fn into_rgb8(self) -> RgbImage {
        match self.image {
            DynamicImage::ImageRgb8(rgb) => rgb,
            other => {
                debug!(from = ?other.color(), "Normalising image to RGB8");
                other.to_rgb8()
            }
        }
    }
}

/// Map the configured filter onto the `image` crate's filter.
pub fn filter_type(filter: ResampleFilter) -> FilterType {
    match filter {
        ResampleFilter::Nearest => FilterType::Nearest,
        ResampleFilter::Triangle => FilterType::Triangle,
        ResampleFilter::CatmullRom => FilterType::CatmullRom,
        ResampleFilter::Lanczos3 => FilterType::Lanczos3,
    }
}

/// Resize to exactly `width` x `height`, ignoring aspect ratio.
pub fn resize_exact(image: &RgbImage, width: u32, height: u32, filter: ResampleFilter) -> RgbImage {
    if image.dimensions() == (width, height) {
        return image.clone();
    }
    imageops::resize(image, width, height, filter_type(filter))
}
