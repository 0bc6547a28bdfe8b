// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bleedwerk — print bleed generation for PDFs and raster images.
//
// Entry point. Initialises logging, reads the input file, runs the
// conversion, and writes the bled PDF beside it.

mod args;

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use bleedwerk_core::human_errors::humanize_error;
use bleedwerk_core::{BleedError, InputKind};
use bleedwerk_document::Converter;

use args::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    tracing::info!("Bleedwerk starting");

    match run(&cli) {
        Ok(output) => {
            if !cli.quiet {
                eprintln!("Wrote {}", output.display());
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

/// Convert `cli.input` and return the path written.
fn run(cli: &Cli) -> Result<PathBuf> {
    let kind = input_kind(cli)?;
    let config = cli.bleed_config()?;

    let bytes = std::fs::read(&cli.input)
        .with_context(|| format!("Failed to read {}", cli.input.display()))?;

    let output = Converter::new(config).convert(&bytes, kind)?;

    let path = cli.output_path();
    std::fs::write(&path, &output)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    tracing::info!(
        input = %cli.input.display(),
        output = %path.display(),
        bytes = output.len(),
        "Bled PDF written"
    );
    Ok(path)
}

fn input_kind(cli: &Cli) -> Result<InputKind> {
    cli.input
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(InputKind::from_extension)
        .ok_or_else(|| {
            anyhow!(
                "Cannot tell what kind of file {} is; \
                 expected .pdf, .png, .jpg, .jpeg, .tif or .tiff",
                cli.input.display()
            )
        })
}

/// Print a failure for a person, not a log parser.
fn report(err: &anyhow::Error) {
    match err.downcast_ref::<BleedError>() {
        Some(bleed) => {
            let human = humanize_error(bleed);
            eprintln!("error: {}", human.message);
            eprintln!("hint:  {}", human.suggestion);
            tracing::debug!(error = %err, severity = ?human.severity, "Conversion failed");
        }
        None => eprintln!("error: {err:#}"),
    }
}
