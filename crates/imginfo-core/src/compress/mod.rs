//! Compression estimation for imginfo.
//!
//! Each container gets its own strategy:
//! - PNG and BMP report a fixed `0%` label
//! - GIF reports its only method, `LZW`
//! - TIFF maps the container's compression tag to a readable method name
//! - JPEG is measured: the pixels are re-encoded into an uncompressed bitmap
//!   and the on-disk size is compared against it
//! - anything else reports whatever compression tag the container carries
//!
//! JPEG's ratio cannot be read from its header (it depends on quantization
//! and the entropy-coded content), which is why it is the one measured case.

mod reencode;

use std::fmt;

use crate::probe::{ContainerFormat, MetaValue, Metadata, ProbedImage, COMPRESSION_KEY};

pub use reencode::{needs_rgb_normalization, reference_bitmap_size, EncodeError};

/// A compression estimate for one file.
#[derive(Debug, Clone, PartialEq)]
pub enum Compression {
    /// Share of the uncompressed size saved on disk, in percent.
    Saved(f64),
    /// A constant label for formats reported without measurement.
    Fixed(&'static str),
    /// A named compression method.
    Method(String),
    /// The reference size was zero, so no ratio exists.
    NotApplicable,
    /// No compression information available.
    Unknown,
    /// The measurement itself failed.
    Failed(String),
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Compression::Saved(percent) => write!(f, "{:.1}%", percent),
            Compression::Fixed(label) => f.write_str(label),
            Compression::Method(name) => f.write_str(name),
            Compression::NotApplicable => f.write_str("N/A"),
            Compression::Unknown => f.write_str("Unknown"),
            Compression::Failed(err) => write!(f, "Error: {}", err),
        }
    }
}

/// First character upper case, the rest lower case.
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Readable name for a TIFF compression method tag.
///
/// Matching is case-insensitive; unknown tags pass through capitalized.
pub fn tiff_method_label(tag: &str) -> String {
    let label = match tag.to_lowercase().as_str() {
        "jpeg" => "JPEG",
        "deflate" => "DEFLATE",
        "packbits" => "PackBits",
        "lzw" => "LZW",
        "none" => "None",
        "raw" => "RAW",
        "tiff_lzw" => "TIFF LZW",
        _ => return capitalize(tag),
    };
    label.to_string()
}

/// Percentage saved relative to the uncompressed reference size.
pub fn saved_ratio(uncompressed_size: u64, actual_size: u64) -> Compression {
    if uncompressed_size == 0 {
        return Compression::NotApplicable;
    }
    let uncompressed = uncompressed_size as f64;
    Compression::Saved((uncompressed - actual_size as f64) / uncompressed * 100.0)
}

fn compression_tag(metadata: &Metadata) -> Option<String> {
    metadata.get(COMPRESSION_KEY).map(MetaValue::to_string)
}

/// Measure a JPEG by re-encoding its pixels as an uncompressed bitmap.
///
/// Failures are folded into [`Compression::Failed`] so they only affect this
/// one field of the record.
pub fn measure_reencoded(image: &ProbedImage) -> Compression {
    let measured = image
        .decode_pixels()
        .map_err(|e| EncodeError::DecodeFailed(e.to_string()))
        .and_then(|pixels| reference_bitmap_size(&pixels));

    match measured {
        Ok(uncompressed_size) => saved_ratio(uncompressed_size, image.file_size),
        Err(err) => {
            tracing::warn!("Re-encode measurement failed: {}", err);
            Compression::Failed(err.to_string())
        }
    }
}

/// Estimate the compression of a probed image.
pub fn estimate(image: &ProbedImage) -> Compression {
    match &image.format {
        ContainerFormat::Png | ContainerFormat::Bmp => Compression::Fixed("0%"),
        ContainerFormat::Gif => Compression::Fixed("LZW"),
        ContainerFormat::Tiff => {
            let tag = compression_tag(&image.metadata).unwrap_or_else(|| "None".to_string());
            Compression::Method(tiff_method_label(&tag))
        }
        ContainerFormat::Jpeg => measure_reencoded(image),
        ContainerFormat::Pcx | ContainerFormat::Other(_) => {
            match compression_tag(&image.metadata) {
                Some(tag) if tag != "None" => Compression::Method(capitalize(&tag)),
                _ => Compression::Unknown,
            }
        }
    }
}
