// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for front ends.
//
// Every technical error is mapped to plain English with a clear suggestion.
// Severity drives how a front end presents it.

use crate::error::BleedError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The user can fix it by changing a setting or the input file.
    ActionRequired,
    /// The input or environment cannot be processed as is.
    Permanent,
    /// A bug or unexpected failure inside the converter.
    Internal,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary.
    pub message: String,
    /// What the user should try.
    pub suggestion: String,
    pub severity: Severity,
}

/// Convert a `BleedError` into a `HumanError`.
pub fn humanize_error(err: &BleedError) -> HumanError {
    match err {
        BleedError::UnsupportedFormat(detail) => HumanError {
            message: "This file can't be read.".into(),
            suggestion: format!("Use a PDF, PNG, JPEG, or TIFF file. ({detail})"),
            severity: Severity::Permanent,
        },

        BleedError::InvalidGeometry(detail) => HumanError {
            message: "The bleed doesn't fit this page.".into(),
            suggestion: format!(
                "Pick a smaller bleed; it must be less than half the page's shorter side. \
                 ({detail})"
            ),
            severity: Severity::ActionRequired,
        },

        BleedError::InvalidConfig(detail) => HumanError {
            message: "A setting is out of range.".into(),
            suggestion: detail.clone(),
            severity: Severity::ActionRequired,
        },

        BleedError::PartialPageFailure { page, source, .. } => {
            let inner = humanize_error(source);
            HumanError {
                message: format!("Page {} couldn't be processed. {}", page + 1, inner.message),
                suggestion: inner.suggestion,
                severity: inner.severity,
            }
        }

        BleedError::RasterizerUnavailable => HumanError {
            message: "PDF pages can't be rendered to pixels here.".into(),
            suggestion: "Use the stretch strategy, or build with the `pdfium` feature \
                         and install the pdfium library."
                .into(),
            severity: Severity::ActionRequired,
        },

        BleedError::Rasterization(detail) => HumanError {
            message: "A page couldn't be rendered.".into(),
            suggestion: format!("Try a lower DPI or the stretch strategy. ({detail})"),
            severity: Severity::Permanent,
        },

        BleedError::Pdf(detail) => HumanError {
            message: "The PDF has a structure we couldn't handle.".into(),
            suggestion: format!("Try re-exporting the PDF from its source application. ({detail})"),
            severity: Severity::Permanent,
        },

        BleedError::EncodingError(detail) => HumanError {
            message: "The output PDF couldn't be written.".into(),
            suggestion: format!("This is likely a bug; please report it. ({detail})"),
            severity: Severity::Internal,
        },

        BleedError::Io(io_err) => HumanError {
            message: "A file couldn't be read or written.".into(),
            suggestion: format!("Check the path and permissions. ({io_err})"),
            severity: Severity::ActionRequired,
        },

        BleedError::Serialization(json_err) => HumanError {
            message: "The configuration file is not valid JSON.".into(),
            suggestion: format!("Fix the config file or remove it. ({json_err})"),
            severity: Severity::ActionRequired,
        },
    }
}
