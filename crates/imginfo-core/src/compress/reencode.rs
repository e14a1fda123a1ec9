//! Uncompressed reference encoding for re-encode-and-compare measurement.
//!
//! The reference container is BMP: it stores pixels without compression, so
//! its byte length is what the image would cost on disk uncompressed.

use std::io::Cursor;

use image::{ColorType, DynamicImage, ImageFormat};
use thiserror::Error;

/// Errors that can occur while producing the reference encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel data could not be decoded from the source file.
    #[error("decode failed: {0}")]
    DecodeFailed(String),

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// Bitmap encoding failed
    #[error("BMP encoding failed: {0}")]
    EncodingFailed(String),
}

/// Check whether a color type must be flattened to 8-bit RGB before it can be
/// written to the reference bitmap.
///
/// Alpha is dropped (the measured lossy formats carry none) and anything that
/// is not plain 8-bit gray or RGB is widened or narrowed to RGB.
#[inline]
pub fn needs_rgb_normalization(color: ColorType) -> bool {
    color.has_alpha() || !matches!(color, ColorType::L8 | ColorType::Rgb8)
}

/// Byte length of `image` encoded as an uncompressed bitmap.
///
/// The encoded bytes live in a buffer scoped to this call and are released
/// before it returns, whether encoding succeeds or not.
///
/// # Errors
///
/// Returns `EncodeError::InvalidDimensions` for empty images and
/// `EncodeError::EncodingFailed` if the encoder rejects the pixel data.
pub fn reference_bitmap_size(image: &DynamicImage) -> Result<u64, EncodeError> {
    let (width, height) = (image.width(), image.height());
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    let normalized;
    let image = if needs_rgb_normalization(image.color()) {
        normalized = DynamicImage::ImageRgb8(image.to_rgb8());
        &normalized
    } else {
        image
    };

    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, ImageFormat::Bmp)
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

    Ok(buffer.get_ref().len() as u64)
}
