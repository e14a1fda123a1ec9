//! Core types for container probing.

use std::collections::BTreeMap;
use std::fmt;

use image::{ExtendedColorType, ImageError, ImageFormat};
use thiserror::Error;

/// Metadata key holding the `(x, y)` resolution in dots per inch.
pub const DPI_KEY: &str = "dpi";

/// Metadata key holding the container-specific compression method name.
pub const COMPRESSION_KEY: &str = "compression";

/// Error types for probing an image file.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The file could not be read from disk.
    #[error("I/O error: {0}")]
    Io(String),

    /// The file content does not match any known container signature.
    #[error("Cannot identify image file")]
    UnrecognizedFormat,

    /// The container is recognized but this variant cannot be decoded.
    #[error("Unsupported image variant: {0}")]
    Unsupported(String),

    /// The image header is corrupted or truncated.
    #[error("Corrupted or incomplete image file: {0}")]
    CorruptedFile(String),
}

impl From<std::io::Error> for ProbeError {
    fn from(err: std::io::Error) -> Self {
        ProbeError::Io(err.to_string())
    }
}

impl From<ImageError> for ProbeError {
    fn from(err: ImageError) -> Self {
        match err {
            ImageError::IoError(e) => ProbeError::Io(e.to_string()),
            ImageError::Unsupported(e) => ProbeError::Unsupported(e.to_string()),
            other => ProbeError::CorruptedFile(other.to_string()),
        }
    }
}

/// Container format of an image file.
///
/// One variant per format the inventory knows how to describe, plus a
/// catch-all carrying the decoder's tag for anything else.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ContainerFormat {
    Jpeg,
    Png,
    Gif,
    Tiff,
    Bmp,
    Pcx,
    /// Any other decoder-recognized container.
    Other(String),
}

impl ContainerFormat {
    /// Map the decoder's format tag onto a container.
    pub fn from_image_format(format: ImageFormat) -> Self {
        match format {
            ImageFormat::Jpeg => ContainerFormat::Jpeg,
            ImageFormat::Png => ContainerFormat::Png,
            ImageFormat::Gif => ContainerFormat::Gif,
            ImageFormat::Tiff => ContainerFormat::Tiff,
            ImageFormat::Bmp => ContainerFormat::Bmp,
            other => match other.extensions_str().first() {
                Some(ext) => ContainerFormat::Other(ext.to_ascii_uppercase()),
                None => ContainerFormat::Other("Unknown".to_string()),
            },
        }
    }

    /// The user-facing container tag (e.g. `"JPEG"`).
    pub fn tag(&self) -> &str {
        match self {
            ContainerFormat::Jpeg => "JPEG",
            ContainerFormat::Png => "PNG",
            ContainerFormat::Gif => "GIF",
            ContainerFormat::Tiff => "TIFF",
            ContainerFormat::Bmp => "BMP",
            ContainerFormat::Pcx => "PCX",
            ContainerFormat::Other(tag) => tag,
        }
    }
}

impl fmt::Display for ContainerFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// How each pixel's value is represented.
///
/// Tags follow the conventional single-token mode names (`"1"`, `"L"`,
/// `"P"`, `"RGB"`, ...). Modes outside the known set keep their raw tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColorMode {
    /// 1-bit black and white.
    Bilevel,
    /// 8-bit grayscale.
    Gray,
    /// 8-bit palette-indexed color.
    Palette,
    /// 24-bit RGB.
    Rgb,
    /// 32-bit RGB with alpha.
    Rgba,
    /// 32-bit CMYK.
    Cmyk,
    /// 24-bit YCbCr.
    YCbCr,
    /// 24-bit CIE L*a*b*.
    Lab,
    /// 24-bit HSV.
    Hsv,
    /// 32-bit signed integer samples.
    Int32,
    /// 32-bit floating point samples.
    Float32,
    /// A mode with no fixed bit depth mapping.
    Other(String),
}

impl ColorMode {
    /// Parse a mode tag. Unknown tags become [`ColorMode::Other`].
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "1" => ColorMode::Bilevel,
            "L" => ColorMode::Gray,
            "P" => ColorMode::Palette,
            "RGB" => ColorMode::Rgb,
            "RGBA" => ColorMode::Rgba,
            "CMYK" => ColorMode::Cmyk,
            "YCbCr" => ColorMode::YCbCr,
            "LAB" => ColorMode::Lab,
            "HSV" => ColorMode::Hsv,
            "I" => ColorMode::Int32,
            "F" => ColorMode::Float32,
            other => ColorMode::Other(other.to_string()),
        }
    }

    /// Map the decoder's pre-conversion color type onto a mode.
    ///
    /// Sample width does not change the mode: 16-bit and float RGB are
    /// still `RGB`. Gray with alpha is `LA` and 16-bit gray is `I;16`, both
    /// outside the fixed depth table.
    pub fn from_color_type(color: ExtendedColorType) -> Self {
        use ExtendedColorType as C;
        match color {
            C::L1 => ColorMode::Bilevel,
            // Sub-byte grayscale is widened to 8 bits on load.
            C::L2 | C::L4 | C::L8 => ColorMode::Gray,
            C::L16 => ColorMode::Other("I;16".to_string()),
            C::La1 | C::La2 | C::La4 | C::La8 | C::La16 => ColorMode::Other("LA".to_string()),
            C::A8 => ColorMode::Other("A".to_string()),
            C::Rgb1 | C::Rgb2 | C::Rgb4 | C::Rgb8 | C::Rgb16 | C::Rgb32F | C::Bgr8 => {
                ColorMode::Rgb
            }
            C::Rgba1 | C::Rgba2 | C::Rgba4 | C::Rgba8 | C::Rgba16 | C::Rgba32F | C::Bgra8 => {
                ColorMode::Rgba
            }
            C::Cmyk8 => ColorMode::Cmyk,
            C::Unknown(bits) => ColorMode::Other(format!("Unknown{}", bits)),
            other => ColorMode::Other(format!("{:?}", other)),
        }
    }

    /// The mode tag.
    pub fn tag(&self) -> &str {
        match self {
            ColorMode::Bilevel => "1",
            ColorMode::Gray => "L",
            ColorMode::Palette => "P",
            ColorMode::Rgb => "RGB",
            ColorMode::Rgba => "RGBA",
            ColorMode::Cmyk => "CMYK",
            ColorMode::YCbCr => "YCbCr",
            ColorMode::Lab => "LAB",
            ColorMode::Hsv => "HSV",
            ColorMode::Int32 => "I",
            ColorMode::Float32 => "F",
            ColorMode::Other(tag) => tag,
        }
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A free-form metadata value reported for a container.
#[derive(Debug, Clone, PartialEq)]
pub enum MetaValue {
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<MetaValue>),
}

impl MetaValue {
    /// Build a two-component numeric pair.
    pub fn pair(x: f64, y: f64) -> Self {
        MetaValue::List(vec![MetaValue::Float(x), MetaValue::Float(y)])
    }

    /// Numeric view of a scalar value. Text and lists are not numbers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetaValue::Int(v) => Some(*v as f64),
            MetaValue::Float(v) => Some(*v),
            MetaValue::Text(_) | MetaValue::List(_) => None,
        }
    }
}

impl fmt::Display for MetaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetaValue::Int(v) => write!(f, "{}", v),
            MetaValue::Float(v) => write!(f, "{}", v),
            MetaValue::Text(s) => f.write_str(s),
            MetaValue::List(items) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str(")")
            }
        }
    }
}

/// Per-file key/value metadata reported by the container.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    entries: BTreeMap<String, MetaValue>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: MetaValue) {
        self.entries.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&MetaValue> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetaValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// A successfully probed image: header facts plus, for JPEG only, the source
/// bytes needed for the re-encode measurement.
#[derive(Debug, Clone)]
pub struct ProbedImage {
    /// Container format sniffed from the file content.
    pub format: ContainerFormat,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel encoding mode before any decoder-side conversion.
    pub color_mode: ColorMode,
    /// Container metadata (`dpi`, `compression`, ...).
    pub metadata: Metadata,
    /// On-disk size in bytes, read from the filesystem.
    pub file_size: u64,
    /// The raw file content, retained only when pixels will be decoded.
    pub source: Option<Vec<u8>>,
}
