//! Indexed-color raster and palette types consumed by the encoder.
//!
//! The encoder never touches RGBA data directly: its input contract is an
//! [`IndexedRaster`] whose pixels reference a small, contiguous palette.
//! [`crate::preprocess`] produces this pair from raw RGBA; callers with their
//! own quantizer can construct it by hand.

use crate::{Result, SixelError, SIXEL_PALETTE_MAX};

/// One color register: a palette slot plus its 8-bit RGB value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PaletteEntry {
    /// Register number. Entries must be contiguous starting at 0.
    pub index: u16,
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl PaletteEntry {
    pub fn new(index: u16, r: u8, g: u8, b: u8) -> Self {
        Self { index, r, g, b }
    }
}

/// A quantized raster: every pixel is an index into a palette.
///
/// The raster is read-only to the encoder and stays owned by the caller for
/// the whole encode.
#[derive(Clone, Debug)]
pub struct IndexedRaster {
    width: usize,
    height: usize,
    indices: Vec<u8>,
}

impl IndexedRaster {
    /// Wraps row-major palette indices; `indices.len()` must be
    /// `width * height`.
    pub fn new(width: usize, height: usize, indices: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(SixelError::EmptyRaster { width, height });
        }
        let expected = width * height;
        if indices.len() != expected {
            return Err(SixelError::BufferSizeMismatch {
                expected,
                actual: indices.len(),
            });
        }
        Ok(Self {
            width,
            height,
            indices,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Palette index of the pixel at `(x, y)`.
    #[inline]
    pub fn pixel_index(&self, x: usize, y: usize) -> u8 {
        self.indices[y * self.width + x]
    }

    /// Checks that every pixel resolves to a palette entry.
    ///
    /// Runs before encoding starts so a quantizer contract violation never
    /// yields a partial stream.
    pub(crate) fn check_indices(&self, palette_len: usize) -> Result<()> {
        if palette_len >= SIXEL_PALETTE_MAX {
            return Ok(()); // u8 indices cannot reach 256
        }
        for (i, &index) in self.indices.iter().enumerate() {
            if index as usize >= palette_len {
                return Err(SixelError::PixelIndexOutOfRange {
                    x: i % self.width,
                    y: i / self.width,
                    index,
                    palette_len,
                });
            }
        }
        Ok(())
    }
}

/// Checks a palette against the SIXEL register model: 1-256 entries, entry
/// `k` carrying register number `k` (contiguous, no duplicates).
pub fn validate_palette(palette: &[PaletteEntry]) -> Result<()> {
    if palette.is_empty() {
        return Err(SixelError::PaletteOverflow("no entries".into()));
    }
    if palette.len() > SIXEL_PALETTE_MAX {
        return Err(SixelError::PaletteOverflow(format!(
            "{} entries, at most {} registers available",
            palette.len(),
            SIXEL_PALETTE_MAX
        )));
    }
    for (slot, entry) in palette.iter().enumerate() {
        if entry.index as usize != slot {
            return Err(SixelError::PaletteOverflow(format!(
                "entry at slot {slot} carries register {}",
                entry.index
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_raster() {
        assert!(matches!(
            IndexedRaster::new(0, 4, vec![]),
            Err(SixelError::EmptyRaster { width: 0, height: 4 })
        ));
        assert!(matches!(
            IndexedRaster::new(4, 0, vec![]),
            Err(SixelError::EmptyRaster { width: 4, height: 0 })
        ));
    }

    #[test]
    fn test_rejects_wrong_buffer_size() {
        assert!(matches!(
            IndexedRaster::new(3, 2, vec![0; 5]),
            Err(SixelError::BufferSizeMismatch {
                expected: 6,
                actual: 5
            })
        ));
    }

    #[test]
    fn test_pixel_index_is_row_major() {
        let raster = IndexedRaster::new(2, 2, vec![0, 1, 2, 3]).unwrap();
        assert_eq!(raster.pixel_index(0, 0), 0);
        assert_eq!(raster.pixel_index(1, 0), 1);
        assert_eq!(raster.pixel_index(0, 1), 2);
        assert_eq!(raster.pixel_index(1, 1), 3);
    }

    #[test]
    fn test_check_indices_reports_offending_pixel() {
        let raster = IndexedRaster::new(2, 2, vec![0, 1, 5, 0]).unwrap();
        match raster.check_indices(2) {
            Err(SixelError::PixelIndexOutOfRange {
                x,
                y,
                index,
                palette_len,
            }) => {
                assert_eq!((x, y), (0, 1));
                assert_eq!(index, 5);
                assert_eq!(palette_len, 2);
            }
            other => panic!("expected PixelIndexOutOfRange, got {other:?}"),
        }
    }

    #[test]
    fn test_full_palette_needs_no_index_scan() {
        let raster = IndexedRaster::new(1, 1, vec![255]).unwrap();
        assert!(raster.check_indices(256).is_ok());
    }

    #[test]
    fn test_validate_palette_shapes() {
        let good: Vec<PaletteEntry> = (0..4).map(|i| PaletteEntry::new(i, 0, 0, 0)).collect();
        assert!(validate_palette(&good).is_ok());

        assert!(validate_palette(&[]).is_err());

        let oversized: Vec<PaletteEntry> =
            (0..257).map(|i| PaletteEntry::new(i, 0, 0, 0)).collect();
        assert!(validate_palette(&oversized).is_err());

        let gap = vec![PaletteEntry::new(0, 0, 0, 0), PaletteEntry::new(2, 0, 0, 0)];
        assert!(validate_palette(&gap).is_err());

        let dup = vec![PaletteEntry::new(0, 0, 0, 0), PaletteEntry::new(0, 1, 1, 1)];
        assert!(validate_palette(&dup).is_err());
    }
}
