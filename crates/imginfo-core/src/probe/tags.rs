//! TIFF/EXIF tag extraction: resolution, compression method and photometric
//! interpretation.

use std::io::{BufRead, Cursor, Seek};

use exif::{Exif, Field, In, Reader, Tag, Value};

use super::headers::HeaderInfo;
use super::types::{ColorMode, MetaValue, COMPRESSION_KEY, DPI_KEY};

// ResolutionUnit values
const UNIT_NONE: u32 = 1;
const UNIT_CENTIMETRE: u32 = 3;

// PhotometricInterpretation values
const PHOTOMETRIC_PALETTE: u32 = 3;
const PHOTOMETRIC_CIELAB: u32 = 8;

// Compression value assumed when the tag is absent
const COMPRESSION_NONE: u32 = 1;

const CM_PER_INCH: f64 = 2.54;

/// Decoder-native name for a TIFF `Compression` tag value.
pub fn tiff_compression_name(code: u32) -> Option<&'static str> {
    let name = match code {
        1 => "raw",
        2 => "tiff_ccitt",
        3 => "group3",
        4 => "group4",
        5 => "tiff_lzw",
        6 => "tiff_jpeg",
        7 => "jpeg",
        8 => "tiff_adobe_deflate",
        32771 => "tiff_raw_16",
        32773 => "packbits",
        32809 => "tiff_thunderscan",
        32946 => "tiff_deflate",
        34676 => "tiff_sgilog",
        34677 => "tiff_sgilog24",
        34925 => "lzma",
        50000 => "zstd",
        50001 => "webp",
        _ => return None,
    };
    Some(name)
}

fn read_exif<R: BufRead + Seek>(reader: &mut R) -> Option<Exif> {
    Reader::new().read_from_container(reader).ok()
}

fn primary(exif: &Exif, tag: Tag) -> Option<&Field> {
    exif.get_field(tag, In::PRIMARY)
}

fn rational(field: &Field) -> Option<f64> {
    match field.value {
        Value::Rational(ref values) => values.first().map(|r| r.to_f64()),
        _ => field.value.get_uint(0).map(f64::from),
    }
}

/// `(x, y)` resolution in dots per inch, honoring `ResolutionUnit`.
///
/// A unit of "none" means the values are only an aspect ratio, so no DPI is
/// reported. A missing unit defaults to inches.
fn resolution_dpi(exif: &Exif) -> Option<(f64, f64)> {
    let x = primary(exif, Tag::XResolution).and_then(rational)?;
    let y = primary(exif, Tag::YResolution)
        .and_then(rational)
        .unwrap_or(x);

    match primary(exif, Tag::ResolutionUnit).and_then(|f| f.value.get_uint(0)) {
        Some(UNIT_NONE) => None,
        Some(UNIT_CENTIMETRE) => Some((x * CM_PER_INCH, y * CM_PER_INCH)),
        _ => Some((x, y)),
    }
}

/// DPI stored in a JPEG's EXIF block.
pub fn exif_dpi(data: &[u8]) -> Option<(f64, f64)> {
    read_exif(&mut Cursor::new(data)).as_ref().and_then(resolution_dpi)
}

/// TIFF header facts read from the primary IFD.
pub fn tiff_header(data: &[u8]) -> HeaderInfo {
    tiff_header_from_reader(&mut Cursor::new(data))
}

/// [`tiff_header`] over a seekable stream, for files not held in memory.
pub fn tiff_header_from_reader<R: BufRead + Seek>(reader: &mut R) -> HeaderInfo {
    let mut info = HeaderInfo::default();
    let Some(exif) = read_exif(reader) else {
        return info;
    };

    if let Some((x, y)) = resolution_dpi(&exif) {
        info.metadata.insert(DPI_KEY, MetaValue::pair(x, y));
    }

    let code = primary(&exif, Tag::Compression)
        .and_then(|f| f.value.get_uint(0))
        .unwrap_or(COMPRESSION_NONE);
    let compression = match tiff_compression_name(code) {
        Some(name) => MetaValue::Text(name.to_string()),
        None => MetaValue::Int(i64::from(code)),
    };
    info.metadata.insert(COMPRESSION_KEY, compression);

    info.mode_hint = match primary(&exif, Tag::PhotometricInterpretation)
        .and_then(|f| f.value.get_uint(0))
    {
        Some(PHOTOMETRIC_PALETTE) => Some(ColorMode::Palette),
        Some(PHOTOMETRIC_CIELAB) => Some(ColorMode::Lab),
        _ => None,
    };

    info
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a little-endian TIFF header with one IFD of SHORT/RATIONAL
    /// entries. Rationals are stored after the IFD.
    fn tiff(shorts: &[(u16, u16)], rationals: &[(u16, u32, u32)]) -> Vec<u8> {
        let count = shorts.len() + rationals.len();
        let ifd_len = 2 + count * 12 + 4;
        let mut data = b"II\x2A\x00".to_vec();
        data.extend_from_slice(&8u32.to_le_bytes());

        let mut entries: Vec<(u16, Vec<u8>)> = Vec::new();
        for &(tag, value) in shorts {
            let mut e = Vec::new();
            e.extend_from_slice(&tag.to_le_bytes());
            e.extend_from_slice(&3u16.to_le_bytes());
            e.extend_from_slice(&1u32.to_le_bytes());
            e.extend_from_slice(&value.to_le_bytes());
            e.extend_from_slice(&[0, 0]);
            entries.push((tag, e));
        }
        let mut extra = Vec::new();
        for &(tag, num, den) in rationals {
            let offset = (8 + ifd_len + extra.len()) as u32;
            let mut e = Vec::new();
            e.extend_from_slice(&tag.to_le_bytes());
            e.extend_from_slice(&5u16.to_le_bytes());
            e.extend_from_slice(&1u32.to_le_bytes());
            e.extend_from_slice(&offset.to_le_bytes());
            entries.push((tag, e));
            extra.extend_from_slice(&num.to_le_bytes());
            extra.extend_from_slice(&den.to_le_bytes());
        }
        // IFD entries must be sorted by tag
        entries.sort_by_key(|(tag, _)| *tag);

        data.extend_from_slice(&(count as u16).to_le_bytes());
        for (_, e) in entries {
            data.extend(e);
        }
        data.extend_from_slice(&0u32.to_le_bytes());
        data.extend(extra);
        data
    }

    #[test]
    fn test_compression_names() {
        assert_eq!(tiff_compression_name(1), Some("raw"));
        assert_eq!(tiff_compression_name(5), Some("tiff_lzw"));
        assert_eq!(tiff_compression_name(32773), Some("packbits"));
        assert_eq!(tiff_compression_name(8), Some("tiff_adobe_deflate"));
        assert_eq!(tiff_compression_name(9999), None);
    }

    #[test]
    fn test_tiff_header_compression_and_dpi() {
        let data = tiff(
            &[(0x0103, 5), (0x0106, 2), (0x0128, 2)],
            &[(0x011A, 300, 1), (0x011B, 300, 1)],
        );
        let info = tiff_header(&data);
        assert_eq!(
            info.metadata.get(COMPRESSION_KEY),
            Some(&MetaValue::Text("tiff_lzw".into()))
        );
        assert_eq!(info.metadata.get(DPI_KEY), Some(&MetaValue::pair(300.0, 300.0)));
        assert_eq!(info.mode_hint, None);
    }

    #[test]
    fn test_tiff_header_centimetres() {
        let data = tiff(&[(0x0128, 3)], &[(0x011A, 100, 1), (0x011B, 50, 1)]);
        let info = tiff_header(&data);
        assert_eq!(info.metadata.get(DPI_KEY), Some(&MetaValue::pair(254.0, 127.0)));
    }

    #[test]
    fn test_tiff_header_aspect_only_resolution() {
        let data = tiff(&[(0x0128, 1)], &[(0x011A, 1, 1), (0x011B, 1, 1)]);
        assert!(tiff_header(&data).metadata.get(DPI_KEY).is_none());
    }

    #[test]
    fn test_tiff_header_defaults_to_raw_compression() {
        let data = tiff(&[(0x0106, 3)], &[]);
        let info = tiff_header(&data);
        assert_eq!(
            info.metadata.get(COMPRESSION_KEY),
            Some(&MetaValue::Text("raw".into()))
        );
        assert_eq!(info.mode_hint, Some(ColorMode::Palette));
    }

    #[test]
    fn test_tiff_header_unknown_compression_code() {
        let data = tiff(&[(0x0103, 9999)], &[]);
        assert_eq!(
            tiff_header(&data).metadata.get(COMPRESSION_KEY),
            Some(&MetaValue::Int(9999))
        );
    }

    #[test]
    fn test_not_a_tiff() {
        assert_eq!(tiff_header(b"plain text"), HeaderInfo::default());
        assert_eq!(exif_dpi(b"plain text"), None);
    }
}
