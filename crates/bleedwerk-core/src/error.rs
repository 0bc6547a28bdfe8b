// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Bleedwerk.

use thiserror::Error;

/// Top-level error type for all Bleedwerk operations.
#[derive(Debug, Error)]
pub enum BleedError {
    // -- Input errors --
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // -- Per-page processing --
    /// One page of a document failed. The whole conversion is aborted.
    #[error("page {page} ({width:.2}x{height:.2}pt) failed: {source}")]
    PartialPageFailure {
        /// 0-based page index.
        page: usize,
        width: f32,
        height: f32,
        #[source]
        source: Box<BleedError>,
    },

    #[error("no page rasterizer configured; pixel strategies on PDF pages need one")]
    RasterizerUnavailable,

    #[error("page rasterisation failed: {0}")]
    Rasterization(String),

    // -- Codec errors --
    #[error("PDF operation failed: {0}")]
    Pdf(String),

    #[error("encoding failed: {0}")]
    EncodingError(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl BleedError {
    /// Wrap an error raised while processing page `page` with its dimensions.
    pub fn on_page(self, page: usize, width: f32, height: f32) -> Self {
        match self {
            // Already attributed to a page; keep the innermost context.
            already @ BleedError::PartialPageFailure { .. } => already,
            other => BleedError::PartialPageFailure {
                page,
                width,
                height,
                source: Box::new(other),
            },
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, BleedError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn on_page_wraps_with_context() {
        let err = BleedError::InvalidGeometry("zero width".into()).on_page(3, 612.0, 792.0);
        let message = err.to_string();
        assert!(message.contains("page 3"), "{message}");
        assert!(message.contains("612.00x792.00"), "{message}");
        assert!(message.contains("zero width"), "{message}");
    }

    #[test]
    fn on_page_does_not_double_wrap() {
        let err = BleedError::RasterizerUnavailable
            .on_page(1, 10.0, 10.0)
            .on_page(7, 20.0, 20.0);
        match err {
            BleedError::PartialPageFailure { page, .. } => assert_eq!(page, 1),
            other => panic!("unexpected error: {other}"),
        }
    }
}
