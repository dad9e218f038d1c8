//! Image preprocessor: turns raw RGBA into the indexed raster and palette
//! the band encoder consumes.
//!
//! Quantization runs through quantette's Wu pipeline with Floyd-Steinberg
//! dithering. Decoding image files and resampling pixels are left to the
//! caller; [`fit_within`] computes the bounded dimensions for them.

use quantette::{
    deps::palette::Srgb, dither::FloydSteinberg, ImageRef, PaletteSize, Pipeline, QuantizeMethod,
};

use crate::raster::{IndexedRaster, PaletteEntry};
use crate::{Result, SixelError};

/// Quantize raw RGBA data down to at most `color_count` colors.
///
/// `color_count` is clamped to [2, 256]. Alpha is ignored; flatten the image
/// first if transparency matters. A flat single-color image may quantize to
/// fewer colors than requested.
pub fn quantize_rgba(
    rgba: &[u8],
    width: usize,
    height: usize,
    color_count: u16,
) -> Result<(Vec<PaletteEntry>, IndexedRaster)> {
    // Convert RGBA to Srgb<u8> for quantization (quantette uses palette crate types)
    let rgb_pixels: Vec<Srgb<u8>> = rgba
        .chunks_exact(4)
        .map(|c| Srgb::new(c[0], c[1], c[2]))
        .collect();

    let max_colors = color_count.clamp(2, 256) as u8;
    let palette_size = PaletteSize::try_from(max_colors).unwrap_or(PaletteSize::MAX);

    let image = ImageRef::new(width as u32, height as u32, &rgb_pixels)
        .map_err(|e| SixelError::Quantization(e.to_string()))?;

    // Wu's method gives consistent quality; dithering hides the banding
    let indexed = Pipeline::new()
        .palette_size(palette_size)
        .quantize_method(QuantizeMethod::Wu)
        .ditherer(FloydSteinberg::new())
        .input_image(image)
        .output_srgb8_indexed_image();

    let palette: Vec<PaletteEntry> = indexed
        .palette()
        .iter()
        .enumerate()
        .map(|(i, c)| PaletteEntry::new(i as u16, c.red, c.green, c.blue))
        .collect();

    let raster = IndexedRaster::new(width, height, indexed.indices().to_vec())?;
    Ok((palette, raster))
}

/// Aspect-preserving fit of `width x height` into `max_width x max_height`.
///
/// Dimensions already inside the bounds come back unchanged; this never
/// upscales and never returns a zero dimension.
pub fn fit_within(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width <= max_width && height <= max_height {
        return (width, height);
    }
    let scale = f64::min(
        max_width as f64 / width as f64,
        max_height as f64 / height as f64,
    );
    let w = ((width as f64 * scale).round() as u32).clamp(1, max_width);
    let h = ((height as f64 * scale).round() as u32).clamp(1, max_height);
    (w, h)
}
