//! Spectra Render - Software Raster Backend
//!
//! This crate rasterizes the core's drawing commands, including:
//! - A [`spectra_core::Surface`] implementation on a `tiny_skia::Pixmap`
//! - Canvas-style save/restore of alpha, transform and glow
//! - PNG export of finished frames

#![warn(missing_docs)]

use thiserror::Error;

pub mod pixmap;

pub use pixmap::PixmapSurface;

/// Rendering errors
#[derive(Error, Debug)]
pub enum RenderError {
    /// A surface must be at least 1x1
    #[error("Invalid surface size {width}x{height}")]
    ZeroSize {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
    },

    /// PNG encoding or writing failed
    #[error("PNG export failed: {0}")]
    Png(String),
}

/// Result type for rendering operations
pub type Result<T> = std::result::Result<T, RenderError>;
