// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Conversion configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{BleedError, Result};
use crate::types::EIGHTH_INCH_PT;

/// Bleed synthesis strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Non-uniformly scale the whole page onto the enlarged page.
    #[default]
    Stretch,
    /// Rasterise, keep the centre pixel-exact, smear edge pixels outward.
    PixelExtrapolate,
    /// Smeared raster background with the original page drawn on top.
    PixelExtrapolateHybrid,
}

/// Resampling filter used when stretching raster pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResampleFilter {
    Nearest,
    Triangle,
    CatmullRom,
    #[default]
    Lanczos3,
}

/// Settings for a single conversion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BleedConfig {
    /// Bleed added to each of the four edges, in points.
    pub bleed_pt: f32,
    /// Which synthesis strategy to run.
    pub strategy: Strategy,
    /// Resolution PDF pages are rendered at for the pixel strategies.
    pub rasterization_dpi: u32,
    /// Resolution assumed for bare raster inputs when sizing their page.
    pub image_dpi: u32,
    /// Filter for raster stretching.
    pub resample_filter: ResampleFilter,
    /// Process pages on the rayon thread pool.
    pub parallel: bool,
}

impl Default for BleedConfig {
    fn default() -> Self {
        Self {
            bleed_pt: EIGHTH_INCH_PT,
            strategy: Strategy::Stretch,
            rasterization_dpi: 300,
            image_dpi: 300,
            resample_filter: ResampleFilter::Lanczos3,
            parallel: true,
        }
    }
}

impl BleedConfig {
    /// Load a configuration from a JSON file. Missing fields take defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read(path.as_ref())?;
        let config: Self = serde_json::from_slice(&data)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the values that do not depend on page geometry.
    pub fn validate(&self) -> Result<()> {
        if !self.bleed_pt.is_finite() || self.bleed_pt < 0.0 {
            return Err(BleedError::InvalidGeometry(format!(
                "bleed must be a non-negative length, got {}pt",
                self.bleed_pt
            )));
        }
        if self.rasterization_dpi == 0 {
            return Err(BleedError::InvalidConfig(
                "rasterization_dpi must be at least 1".into(),
            ));
        }
        if self.image_dpi == 0 {
            return Err(BleedError::InvalidConfig("image_dpi must be at least 1".into()));
        }
        Ok(())
    }
}
