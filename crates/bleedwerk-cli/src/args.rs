// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line arguments and their mapping onto `BleedConfig`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use bleedwerk_core::{BleedConfig, LengthUnit, ResampleFilter, Strategy};

const AFTER_HELP: &str = r#"EXAMPLES:
  # 1/8in stretch bleed, written to BLEED_flyer.pdf
  bleedwerk flyer.pdf

  # Edge smear on a photo scanned at 600dpi
  bleedwerk --strategy pixel-extrapolate --image-dpi 600 photo.png

  # 3mm bleed, smeared background under the untouched vector page
  bleedwerk --bleed 3 --unit mm --strategy pixel-extrapolate-hybrid book.pdf -o book-print.pdf

CONFIG FILE:
  --config takes a JSON BleedConfig; flags given on the command line win.
  { "bleed_pt": 9.0, "strategy": "pixel-extrapolate", "rasterization_dpi": 300 }

ENVIRONMENT VARIABLES:
  RUST_LOG    tracing filter, e.g. bleedwerk_document=debug
"#;

/// Add print bleed to PDFs and raster images.
#[derive(Parser, Debug)]
#[command(
    name = "bleedwerk",
    version,
    about = "Add print bleed to PDFs and raster images",
    arg_required_else_help = true,
    after_long_help = AFTER_HELP
)]
pub struct Cli {
    /// Input file (.pdf, .png, .jpg, .jpeg, .tif, .tiff).
    pub input: PathBuf,

    /// Output PDF. Defaults to BLEED_<name>.pdf beside the input.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Bleed added to every edge, in --unit.
    #[arg(short, long, env = "BLEEDWERK_BLEED")]
    pub bleed: Option<f32>,

    /// Unit of --bleed.
    #[arg(long, value_enum, default_value = "pt")]
    pub unit: UnitArg,

    /// How the bleed area is filled.
    #[arg(short, long, value_enum, env = "BLEEDWERK_STRATEGY")]
    pub strategy: Option<StrategyArg>,

    /// Resolution PDF pages are rendered at for the pixel strategies.
    #[arg(long, env = "BLEEDWERK_DPI", value_parser = clap::value_parser!(u32).range(1..))]
    pub dpi: Option<u32>,

    /// Resolution assumed for image input when sizing its page.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub image_dpi: Option<u32>,

    /// Resampling filter for stretching raster pages.
    #[arg(long, value_enum)]
    pub filter: Option<FilterArg>,

    /// JSON configuration file, loaded before the flags above.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Process pages one at a time instead of in parallel.
    #[arg(long)]
    pub sequential: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "BLEEDWERK_VERBOSE")]
    pub verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnitArg {
    Pt,
    In,
    Mm,
}

impl From<UnitArg> for LengthUnit {
    fn from(v: UnitArg) -> Self {
        match v {
            UnitArg::Pt => LengthUnit::Pt,
            UnitArg::In => LengthUnit::In,
            UnitArg::Mm => LengthUnit::Mm,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrategyArg {
    Stretch,
    PixelExtrapolate,
    PixelExtrapolateHybrid,
}

impl From<StrategyArg> for Strategy {
    fn from(v: StrategyArg) -> Self {
        match v {
            StrategyArg::Stretch => Strategy::Stretch,
            StrategyArg::PixelExtrapolate => Strategy::PixelExtrapolate,
            StrategyArg::PixelExtrapolateHybrid => Strategy::PixelExtrapolateHybrid,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterArg {
    Nearest,
    Triangle,
    CatmullRom,
    Lanczos3,
}

impl From<FilterArg> for ResampleFilter {
    fn from(v: FilterArg) -> Self {
        match v {
            FilterArg::Nearest => ResampleFilter::Nearest,
            FilterArg::Triangle => ResampleFilter::Triangle,
            FilterArg::CatmullRom => ResampleFilter::CatmullRom,
            FilterArg::Lanczos3 => ResampleFilter::Lanczos3,
        }
    }
}

impl Cli {
    /// Config file (or defaults) with command-line overrides applied.
    pub fn bleed_config(&self) -> Result<BleedConfig> {
        let mut config = match &self.config {
            Some(path) => BleedConfig::from_json_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => BleedConfig::default(),
        };

        if let Some(bleed) = self.bleed {
            config.bleed_pt = LengthUnit::from(self.unit).to_points(bleed);
        }
        if let Some(strategy) = self.strategy {
            config.strategy = strategy.into();
        }
        if let Some(dpi) = self.dpi {
            config.rasterization_dpi = dpi;
        }
        if let Some(dpi) = self.image_dpi {
            config.image_dpi = dpi;
        }
        if let Some(filter) = self.filter {
            config.resample_filter = filter.into();
        }
        if self.sequential {
            config.parallel = false;
        }

        config.validate()?;
        Ok(config)
    }

    /// Where the result is written.
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| default_output(&self.input))
    }
}

/// `BLEED_<stem>.pdf` in the input's directory.
pub fn default_output(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".into());
    input.with_file_name(format!("BLEED_{stem}.pdf"))
}
