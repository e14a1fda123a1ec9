//! Byte-level header readers for container metadata the decoder does not
//! expose: JFIF density, PNG `pHYs`/IHDR, BMP pixels-per-metre and the PCX
//! header.
//!
//! Every reader is best-effort. Short or malformed headers simply yield no
//! metadata; the decoder is the authority on whether a file is valid.

use super::types::{ColorMode, MetaValue, Metadata, DPI_KEY};

const JPEG_SOI: [u8; 2] = [0xFF, 0xD8];
const JPEG_APP0: u8 = 0xE0;
const JPEG_SOS: u8 = 0xDA;
const JPEG_EOI: u8 = 0xD9;
const JFIF_ID: &[u8; 5] = b"JFIF\0";

const PNG_SIGNATURE: &[u8; 8] = b"\x89PNG\r\n\x1a\n";
const PNG_COLOR_INDEXED: u8 = 3;
const PNG_UNIT_METRE: u8 = 1;

const BMP_MAGIC: &[u8; 2] = b"BM";
const BMP_INFO_HEADER_MIN: u32 = 40;

const PCX_MANUFACTURER: u8 = 0x0A;
const PCX_HEADER_LEN: usize = 128;

const INCH_PER_METRE: f64 = 0.0254;
const CM_PER_INCH: f64 = 2.54;

/// Metadata recovered from a container header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeaderInfo {
    pub metadata: Metadata,
    /// Pixel mode implied by the header when the decoder's own color type
    /// hides it (palette expansion, bilevel widening).
    pub mode_hint: Option<ColorMode>,
}

/// Round to two decimal places.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[inline]
fn be_u16(data: &[u8], at: usize) -> Option<u16> {
    data.get(at..at + 2).map(|b| u16::from_be_bytes([b[0], b[1]]))
}

#[inline]
fn be_u32(data: &[u8], at: usize) -> Option<u32> {
    data.get(at..at + 4)
        .map(|b| u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
}

#[inline]
fn le_u16(data: &[u8], at: usize) -> Option<u16> {
    data.get(at..at + 2).map(|b| u16::from_le_bytes([b[0], b[1]]))
}

#[inline]
fn le_u32(data: &[u8], at: usize) -> Option<u32> {
    data.get(at..at + 4)
        .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

#[inline]
fn le_i32(data: &[u8], at: usize) -> Option<i32> {
    data.get(at..at + 4)
        .map(|b| i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

/// Density declared by a JFIF APP0 segment.
///
/// Returns `None` when there is no JFIF segment or its unit is the bare
/// aspect ratio (unit 0), leaving room for an EXIF fallback.
pub fn jfif_dpi(data: &[u8]) -> Option<(f64, f64)> {
    if data.len() < 4 || data[0..2] != JPEG_SOI {
        return None;
    }

    let mut pos = 2;
    while pos + 4 <= data.len() {
        if data[pos] != 0xFF {
            return None;
        }
        let marker = data[pos + 1];
        // Fill bytes
        if marker == 0xFF {
            pos += 1;
            continue;
        }
        if marker == JPEG_SOS || marker == JPEG_EOI {
            return None;
        }

        let length = be_u16(data, pos + 2)? as usize;
        if length < 2 {
            return None;
        }
        let body = data.get(pos + 4..pos + 2 + length)?;

        if marker == JPEG_APP0 && body.len() >= 12 && &body[0..5] == JFIF_ID {
            let unit = body[7];
            let x = f64::from(u16::from_be_bytes([body[8], body[9]]));
            let y = f64::from(u16::from_be_bytes([body[10], body[11]]));
            return match unit {
                1 => Some((x, y)),
                2 => Some((round2(x * CM_PER_INCH), round2(y * CM_PER_INCH))),
                _ => None,
            };
        }

        pos += 2 + length;
    }
    None
}

/// PNG header facts: physical pixel density and palette indexing.
pub fn png_header(data: &[u8]) -> HeaderInfo {
    let mut info = HeaderInfo::default();
    if data.len() < PNG_SIGNATURE.len() || &data[..8] != PNG_SIGNATURE {
        return info;
    }

    let mut pos = 8;
    while let (Some(length), Some(kind)) = (be_u32(data, pos), data.get(pos + 4..pos + 8)) {
        let length = length as usize;
        let Some(body) = data.get(pos + 8..pos + 8 + length) else {
            break;
        };

        match kind {
            b"IHDR" if body.len() >= 13 => {
                let bit_depth = body[8];
                let color_type = body[9];
                if color_type == PNG_COLOR_INDEXED {
                    info.mode_hint = Some(ColorMode::Palette);
                } else if color_type == 0 && bit_depth == 1 {
                    info.mode_hint = Some(ColorMode::Bilevel);
                }
            }
            b"pHYs" if body.len() >= 9 => {
                let x = be_u32(body, 0).unwrap_or(0);
                let y = be_u32(body, 4).unwrap_or(0);
                if body[8] == PNG_UNIT_METRE {
                    info.metadata.insert(
                        DPI_KEY,
                        MetaValue::pair(
                            round2(f64::from(x) * INCH_PER_METRE),
                            round2(f64::from(y) * INCH_PER_METRE),
                        ),
                    );
                }
            }
            b"IDAT" | b"IEND" => break,
            _ => {}
        }

        // length + type + body + crc
        pos += 12 + length;
    }
    info
}

/// BMP header facts: pixels-per-metre density and low bit-depth modes.
pub fn bmp_header(data: &[u8]) -> HeaderInfo {
    let mut info = HeaderInfo::default();
    if data.len() < 18 || &data[0..2] != BMP_MAGIC {
        return info;
    }

    let dib_size = le_u32(data, 14).unwrap_or(0);
    if dib_size < BMP_INFO_HEADER_MIN {
        return info;
    }

    if let Some(bit_count) = le_u16(data, 28) {
        info.mode_hint = match bit_count {
            1 => Some(ColorMode::Bilevel),
            4 | 8 => Some(ColorMode::Palette),
            _ => None,
        };
    }

    if let (Some(x_ppm), Some(y_ppm)) = (le_i32(data, 38), le_i32(data, 42)) {
        info.metadata.insert(
            DPI_KEY,
            MetaValue::pair(
                round2(f64::from(x_ppm) * INCH_PER_METRE),
                round2(f64::from(y_ppm) * INCH_PER_METRE),
            ),
        );
    }
    info
}

/// Check for a plausible PCX header: manufacturer byte, known version, and
/// RLE flag of 0 or 1.
pub fn looks_like_pcx(data: &[u8]) -> bool {
    data.len() >= PCX_HEADER_LEN
        && data[0] == PCX_MANUFACTURER
        && matches!(data[1], 0 | 2 | 3 | 4 | 5)
        && data[2] <= 1
}

/// Pixel dimensions from the PCX image window (`xmin, ymin, xmax, ymax`,
/// inclusive). `None` for a short header or an inverted window.
pub fn pcx_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    if !looks_like_pcx(data) {
        return None;
    }
    let x_min = le_u16(data, 4)?;
    let y_min = le_u16(data, 6)?;
    let x_max = le_u16(data, 8)?;
    let y_max = le_u16(data, 10)?;
    if x_max < x_min || y_max < y_min {
        return None;
    }
    Some((
        u32::from(x_max - x_min) + 1,
        u32::from(y_max - y_min) + 1,
    ))
}

/// PCX header facts: declared DPI and the plane layout's pixel mode.
pub fn pcx_header(data: &[u8]) -> HeaderInfo {
    let mut info = HeaderInfo::default();
    if data.len() < PCX_HEADER_LEN || data[0] != PCX_MANUFACTURER {
        return info;
    }

    let bits_per_pixel = data[3];
    let planes = data[65];
    info.mode_hint = match (bits_per_pixel, planes) {
        (1, 1) => Some(ColorMode::Bilevel),
        (8, 3) => Some(ColorMode::Rgb),
        (8, 1) | (1, 2..=4) | (2, 1) | (4, 1) => Some(ColorMode::Palette),
        _ => None,
    };

    if let (Some(h_dpi), Some(v_dpi)) = (le_u16(data, 12), le_u16(data, 14)) {
        info.metadata.insert(
            DPI_KEY,
            MetaValue::List(vec![
                MetaValue::Int(i64::from(h_dpi)),
                MetaValue::Int(i64::from(v_dpi)),
            ]),
        );
    }
    info
}
