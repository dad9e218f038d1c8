//! SIXEL band encoder.
//!
//! The raster is cut into bands of 6 rows. Within a band, every palette
//! color that appears gets one plane: a `#<register>` selector followed by
//! one data character per column, where the character's low 6 bits are the
//! column's pixels belonging to that color (`63 + bits`, `'?'..'~'`). A `$`
//! rewinds to the band start so the next plane overprints the same rows; the
//! band's last plane advances to the next band with `-` instead. The final
//! plane of the whole stream carries neither, since nothing follows it.

use crate::preprocess;
use crate::raster::{validate_palette, IndexedRaster, PaletteEntry};
use crate::{Result, SixelError};

/// Data characters are `63 + bits`; 63 (`'?'`) is the blank character.
const SIXEL_CHAR_OFFSET: u8 = 63;

/// Rows per band; one data character covers this many vertical pixels.
const BAND_HEIGHT: usize = 6;

/// Options for the SIXEL encoder.
#[derive(Clone, Debug)]
pub struct EncodeOptions {
    /// Maximum number of colors in the palette (2-256).
    /// Fewer colors = smaller SIXEL output but less accurate colors.
    pub color_count: u16,

    /// Compress runs of 4 or more identical data characters into
    /// `!<len><ch>`. Off by default; the terminal renders the same image
    /// either way.
    pub run_length_encoding: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            color_count: 256,
            run_length_encoding: false,
        }
    }
}

/// Encode RGBA image data into a SIXEL string.
///
/// Quantizes the image down to `opts.color_count` colors, then encodes the
/// resulting indexed raster with [`encode_indexed`]. Alpha is ignored;
/// flatten the image first if transparency matters.
///
/// # Arguments
/// * `rgba` - Raw RGBA pixel data (4 bytes per pixel: R, G, B, A)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `opts` - Encoding options
///
/// # Example
/// ```ignore
/// use sixpress::{sixel_encode, EncodeOptions};
///
/// let rgba = vec![255u8, 0, 0, 255, 0, 255, 0, 255]; // 2 pixels: red, green
/// let sixel = sixel_encode(&rgba, 2, 1, &EncodeOptions::default())?;
/// println!("{}", sixel);
/// ```
#[must_use = "this returns the encoded SIXEL string"]
pub fn sixel_encode(
    rgba: &[u8],
    width: usize,
    height: usize,
    opts: &EncodeOptions,
) -> Result<String> {
    if width == 0 || height == 0 {
        return Err(SixelError::EmptyRaster { width, height });
    }
    let expected = width * height * 4;
    if rgba.len() != expected {
        return Err(SixelError::BufferSizeMismatch {
            expected,
            actual: rgba.len(),
        });
    }

    let (palette, raster) = preprocess::quantize_rgba(rgba, width, height, opts.color_count)?;
    encode_indexed(&raster, &palette, opts)
}

/// Encode RGBA with default options.
#[inline]
#[must_use = "this returns the encoded SIXEL string"]
pub fn sixel_encode_default(rgba: &[u8], width: usize, height: usize) -> Result<String> {
    sixel_encode(rgba, width, height, &EncodeOptions::default())
}

/// Encode an already-quantized raster into a SIXEL string.
///
/// This is the core of the crate; [`sixel_encode`] is a convenience wrapper
/// that quantizes first. Palette and raster are validated up front, so a
/// contract violation never produces partial output.
#[must_use = "this returns the encoded SIXEL string"]
pub fn encode_indexed(
    raster: &IndexedRaster,
    palette: &[PaletteEntry],
    opts: &EncodeOptions,
) -> Result<String> {
    validate_palette(palette)?;
    raster.check_indices(palette.len())?;

    let mut out = String::new();

    // DCS introducer with default aspect/background parameters: ESC P q
    out.push_str("\x1bPq");

    // Define every color register up front, in register order
    for entry in palette {
        out.push('#');
        push_decimal(&mut out, entry.index as usize);
        out.push(';');
        push_color(&mut out, entry);
    }

    let bands = raster.height().div_ceil(BAND_HEIGHT);
    let mut planes = BandPlanes::new(palette.len(), raster.width());

    for band in 0..bands {
        planes.fill(raster, band * BAND_HEIGHT);

        let used: Vec<usize> = (0..palette.len()).filter(|&i| planes.has_pixel(i)).collect();
        if used.is_empty() {
            // A blank strip still advances, or the next band would overprint it
            out.push('-');
            continue;
        }

        for (k, &index) in used.iter().enumerate() {
            out.push('#');
            push_decimal(&mut out, index);
            compress_row(&mut out, planes.row(index), opts.run_length_encoding);
            out.push(if k + 1 == used.len() { '-' } else { '$' });
        }
    }

    // No line follows the last plane, so it carries no cursor control
    if out.ends_with(['-', '$']) {
        out.pop();
    }

    // String terminator: ESC \
    out.push_str("\x1b\\");

    Ok(out)
}

/// Per-band scratch: one row of data characters per palette index, plus a
/// flag marking which colors appear in the band.
///
/// Buffers are allocated once for the whole encode, sized to the palette,
/// and reset between bands. `'?'` carries zero bits, so untouched columns
/// need no write.
struct BandPlanes {
    rows: Vec<Vec<u8>>,
    has_pixel: Vec<bool>,
}

impl BandPlanes {
    fn new(palette_len: usize, width: usize) -> Self {
        Self {
            rows: vec![vec![b'?'; width]; palette_len],
            has_pixel: vec![false; palette_len],
        }
    }

    #[inline]
    fn has_pixel(&self, index: usize) -> bool {
        self.has_pixel[index]
    }

    #[inline]
    fn row(&self, index: usize) -> &[u8] {
        &self.rows[index]
    }

    /// Scans the 6 raster rows starting at `y0` and rebuilds every plane.
    ///
    /// Rows past the raster height contribute no bits: the final band of an
    /// image whose height is not a multiple of 6 is padded with blanks, not
    /// with color 0.
    fn fill(&mut self, raster: &IndexedRaster, y0: usize) {
        for (row, dirty) in self.rows.iter_mut().zip(self.has_pixel.iter_mut()) {
            if *dirty {
                row.fill(b'?');
                *dirty = false;
            }
        }

        let y_end = usize::min(y0 + BAND_HEIGHT, raster.height());
        for x in 0..raster.width() {
            // At most 6 distinct colors can touch one column of a band
            let mut touched = [(0usize, 0u8); BAND_HEIGHT];
            let mut n = 0;
            for (bit, y) in (y0..y_end).enumerate() {
                let index = raster.pixel_index(x, y) as usize;
                match touched[..n].iter_mut().find(|(i, _)| *i == index) {
                    Some((_, bits)) => *bits |= 1 << bit,
                    None => {
                        touched[n] = (index, 1 << bit);
                        n += 1;
                    }
                }
            }
            for &(index, bits) in &touched[..n] {
                self.rows[index][x] = SIXEL_CHAR_OFFSET + (bits & 0x3F);
                self.has_pixel[index] = true;
            }
        }
    }
}

/// Append one plane's data characters, optionally run-length encoded.
///
/// Runs of 1-3 are cheaper written out literally; runs of 4 or more become
/// `!<len><ch>`. With `enabled == false` the row is copied verbatim.
fn compress_row(out: &mut String, row: &[u8], enabled: bool) {
    if !enabled {
        out.extend(row.iter().map(|&ch| ch as char));
        return;
    }

    let mut x = 0;
    while x < row.len() {
        let ch = row[x];
        let mut run = 1;
        while x + run < row.len() && row[x + run] == ch {
            run += 1;
        }
        if run >= 4 {
            out.push('!');
            push_decimal(out, run);
            out.push(ch as char);
        } else {
            for _ in 0..run {
                out.push(ch as char);
            }
        }
        x += run;
    }
}

/// Append one color definition, `2;R;G;B`, channels scaled to 0-100.
fn push_color(out: &mut String, entry: &PaletteEntry) {
    out.push('2');
    for c in [entry.r, entry.g, entry.b] {
        out.push(';');
        push_decimal(out, color_component(c) as usize);
    }
}

/// Maps one 8-bit channel onto the SIXEL 0-100 percentage scale, rounding to
/// nearest. No 8-bit input lands exactly on a half step, so nearest is
/// unambiguous.
#[inline]
fn color_component(c: u8) -> u8 {
    ((c as u32 * 200 + 255) / 510) as u8
}

/// Fast number to string without the formatting machinery.
#[inline]
fn push_decimal(out: &mut String, mut n: usize) {
    if n == 0 {
        out.push('0');
        return;
    }

    let mut buf = [0u8; 20];
    let mut i = buf.len();

    while n > 0 {
        i -= 1;
        buf[i] = b'0' + (n % 10) as u8;
        n /= 10;
    }

    for &digit in &buf[i..] {
        out.push(digit as char);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_component_scale() {
        assert_eq!(color_component(0), 0);
        assert_eq!(color_component(255), 100);
        assert_eq!(color_component(1), 0); // 0.392 rounds down
        assert_eq!(color_component(2), 1); // 0.784 rounds up
        assert_eq!(color_component(127), 50); // 49.8
        assert_eq!(color_component(128), 50); // 50.196
        assert_eq!(color_component(129), 51); // 50.588
    }

    #[test]
    fn test_data_character_range() {
        assert_eq!(SIXEL_CHAR_OFFSET, b'?');
        assert_eq!(SIXEL_CHAR_OFFSET + 0x3F, b'~');
    }

    #[test]
    fn test_compress_row_runs() {
        let mut out = String::new();
        compress_row(&mut out, b"????AAAA????", true);
        assert_eq!(out, "!4?!4A!4?");

        let mut out = String::new();
        compress_row(&mut out, b"AAA??", true);
        assert_eq!(out, "AAA??"); // short runs stay literal

        let mut out = String::new();
        compress_row(&mut out, b"????AAAA????", false);
        assert_eq!(out, "????AAAA????");
    }

    #[test]
    fn test_push_decimal() {
        let mut out = String::new();
        push_decimal(&mut out, 0);
        push_decimal(&mut out, 7);
        push_decimal(&mut out, 40);
        push_decimal(&mut out, 65535);
        assert_eq!(out, "074065535");
    }

    #[test]
    fn test_encode_simple() {
        let rgba = vec![255u8, 0, 0, 255]; // 1x1 red pixel
        let result = sixel_encode(&rgba, 1, 1, &EncodeOptions::default());
        assert!(result.is_ok());
        let sixel = result.unwrap();
        assert!(sixel.starts_with("\x1bPq"));
        assert!(sixel.ends_with("\x1b\\"));
    }

    #[test]
    fn test_invalid_dimensions() {
        let rgba = vec![0u8; 16];

        assert!(sixel_encode(&rgba, 0, 4, &EncodeOptions::default()).is_err());
        assert!(sixel_encode(&rgba, 4, 0, &EncodeOptions::default()).is_err());
        assert!(sixel_encode(&rgba, 10, 10, &EncodeOptions::default()).is_err());
    }
}
