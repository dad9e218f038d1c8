//! # sixpress
//!
//! A pure Rust SIXEL encoder for quantized, indexed-color rasters.
//!
//! The heart of the crate is the band encoder: the image is cut into
//! horizontal strips of 6 rows, each strip emits one color plane per palette
//! color it uses, and each plane packs 6 vertical pixels per column into a
//! single printable character. Optional run-length compression shrinks the
//! stream without changing what the terminal renders.
//!
//! ## Quick Start
//!
//! ### Encoding an image to SIXEL
//!
//! ```ignore
//! use sixpress::{sixel_encode, EncodeOptions};
//!
//! // RGBA image data (4 bytes per pixel)
//! let rgba = vec![255u8, 0, 0, 255, 0, 255, 0, 255]; // 2 red and green pixels
//! let sixel = sixel_encode(&rgba, 2, 1, &EncodeOptions::default())?;
//! print!("{}", sixel);
//! ```
//!
//! ### Encoding an already-quantized raster
//!
//! ```ignore
//! use sixpress::{encode_indexed, EncodeOptions, IndexedRaster, PaletteEntry};
//!
//! let palette = vec![PaletteEntry::new(0, 255, 255, 255)];
//! let raster = IndexedRaster::new(1, 6, vec![0; 6])?;
//! let sixel = encode_indexed(&raster, &palette, &EncodeOptions::default())?;
//! print!("{}", sixel);
//! ```

use thiserror::Error;

pub mod encoder;
pub mod preprocess;
pub mod raster;

pub use encoder::{encode_indexed, sixel_encode, sixel_encode_default, EncodeOptions};
pub use preprocess::{fit_within, quantize_rgba};
pub use raster::{validate_palette, IndexedRaster, PaletteEntry};

/// Errors that can occur during SIXEL encoding.
#[derive(Debug, Error)]
pub enum SixelError {
    /// Raster width or height is zero
    #[error("empty raster: {width}x{height}")]
    EmptyRaster { width: usize, height: usize },

    /// Buffer size doesn't match expected size for dimensions
    #[error("buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    /// Palette shape violates the SIXEL color-register model
    #[error("invalid palette: {0}")]
    PaletteOverflow(String),

    /// A pixel references a palette entry that doesn't exist
    #[error("pixel ({x},{y}) references palette index {index}, palette has {palette_len} entries")]
    PixelIndexOutOfRange {
        x: usize,
        y: usize,
        index: u8,
        palette_len: usize,
    },

    /// Color quantization failed
    #[error("quantization error: {0}")]
    Quantization(String),
}

/// Result type for SIXEL operations.
pub type Result<T> = core::result::Result<T, SixelError>;

/// SIXEL terminals expose at most 256 color registers.
pub(crate) const SIXEL_PALETTE_MAX: usize = 256;
