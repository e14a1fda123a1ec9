//! Container probing for imginfo.
//!
//! This module provides functionality for:
//! - Sniffing the container format from file content
//! - Reading pixel dimensions and color mode from the header (no pixel decode)
//! - Collecting container metadata (resolution, compression method)
//!
//! # Architecture
//!
//! The `image` crate is the decoder of record for the formats it supports:
//! it decides whether a file is readable and reports dimensions and the
//! original color type. PCX, which it does not decode, is described from its
//! 128-byte header alone. Metadata the decoder does not surface is read by
//! small byte-level header readers (`headers`) and the TIFF/EXIF tag reader
//! (`tags`).
//!
//! Files are streamed. Only a bounded prefix is read for header metadata,
//! except JPEG, whose full content is kept for the compression measurement.
//!
//! # Examples
//!
//! ```ignore
//! use imginfo_core::probe::probe_file;
//!
//! let probed = probe_file("photo.jpg".as_ref())?;
//! println!("{} {}x{}", probed.format, probed.width, probed.height);
//! ```

mod headers;
mod tags;
mod types;

use std::fs::File;
use std::io::{BufRead, BufReader, Cursor, Read, Seek};
use std::path::Path;

use image::{DynamicImage, ImageDecoder, ImageFormat, ImageReader};

pub use headers::{
    bmp_header, jfif_dpi, looks_like_pcx, pcx_dimensions, pcx_header, png_header, HeaderInfo,
};
pub use tags::{exif_dpi, tiff_compression_name, tiff_header, tiff_header_from_reader};
pub use types::{
    ColorMode, ContainerFormat, MetaValue, Metadata, ProbeError, ProbedImage, COMPRESSION_KEY,
    DPI_KEY,
};

/// Bytes read from the start of a file for sniffing and header metadata.
pub const HEADER_PREFIX_LEN: u64 = 128 * 1024;

/// What the leading bytes of a file identify it as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sniffed {
    Decoder(ImageFormat),
    Pcx,
}

fn sniff(prefix: &[u8]) -> Result<Sniffed, ProbeError> {
    match image::guess_format(prefix) {
        Ok(format) => Ok(Sniffed::Decoder(format)),
        Err(_) if looks_like_pcx(prefix) => Ok(Sniffed::Pcx),
        Err(_) => Err(ProbeError::UnrecognizedFormat),
    }
}

/// On-disk size of a file in bytes.
pub fn file_byte_size(path: &Path) -> Result<u64, ProbeError> {
    Ok(std::fs::metadata(path)?.len())
}

/// Probe an image file: format, dimensions, color mode and metadata.
///
/// Only the header is decoded, straight from a buffered file reader. JPEG
/// content is read in full and kept on the result so the compression
/// measurement can decode pixels without touching the filesystem again.
///
/// # Errors
///
/// - `ProbeError::Io` - the file cannot be read
/// - `ProbeError::UnrecognizedFormat` - the content matches no known container
/// - `ProbeError::Unsupported` - the container variant cannot be decoded
/// - `ProbeError::CorruptedFile` - the header is corrupted or truncated
pub fn probe_file(path: &Path) -> Result<ProbedImage, ProbeError> {
    let file_size = file_byte_size(path)?;
    let mut reader = BufReader::new(File::open(path)?);

    let mut prefix = Vec::new();
    reader
        .by_ref()
        .take(HEADER_PREFIX_LEN)
        .read_to_end(&mut prefix)?;
    let sniffed = sniff(&prefix)?;
    reader.rewind()?;

    match sniffed {
        Sniffed::Pcx => probe_pcx(&prefix, file_size),
        Sniffed::Decoder(ImageFormat::Jpeg) => {
            let mut source = Vec::new();
            reader.read_to_end(&mut source)?;
            probe_bytes(source, file_size)
        }
        Sniffed::Decoder(image_format) => {
            let format = ContainerFormat::from_image_format(image_format);
            let (width, height, decoded_mode) = decoder_facts(&mut reader, image_format)?;
            let header = match format {
                ContainerFormat::Tiff => {
                    reader.rewind()?;
                    tiff_header_from_reader(&mut reader)
                }
                _ => read_header(&format, &prefix),
            };
            Ok(assemble(format, width, height, decoded_mode, header, file_size, None))
        }
    }
}

/// Probe already-read file content.
pub fn probe_bytes(source: Vec<u8>, file_size: u64) -> Result<ProbedImage, ProbeError> {
    let image_format = match sniff(&source)? {
        Sniffed::Pcx => return probe_pcx(&source, file_size),
        Sniffed::Decoder(image_format) => image_format,
    };
    let format = ContainerFormat::from_image_format(image_format);
    let (width, height, decoded_mode) =
        decoder_facts(Cursor::new(source.as_slice()), image_format)?;

    let header = read_header(&format, &source);
    let retained = matches!(format, ContainerFormat::Jpeg).then_some(source);
    Ok(assemble(format, width, height, decoded_mode, header, file_size, retained))
}

/// Dimensions and original color type from the decoder, header only.
fn decoder_facts<R: BufRead + Seek>(
    reader: R,
    format: ImageFormat,
) -> Result<(u32, u32, ColorMode), ProbeError> {
    let decoder = ImageReader::with_format(reader, format).into_decoder()?;
    let (width, height) = decoder.dimensions();
    Ok((
        width,
        height,
        ColorMode::from_color_type(decoder.original_color_type()),
    ))
}

/// Describe a PCX file from its fixed header.
fn probe_pcx(header: &[u8], file_size: u64) -> Result<ProbedImage, ProbeError> {
    let (width, height) = pcx_dimensions(header)
        .ok_or_else(|| ProbeError::CorruptedFile("PCX image window is empty".to_string()))?;
    let info = pcx_header(header);
    let mode = info.mode_hint.clone().ok_or_else(|| {
        ProbeError::Unsupported("PCX bit depth and plane layout".to_string())
    })?;
    Ok(assemble(
        ContainerFormat::Pcx,
        width,
        height,
        mode,
        info,
        file_size,
        None,
    ))
}

fn assemble(
    format: ContainerFormat,
    width: u32,
    height: u32,
    decoded_mode: ColorMode,
    header: HeaderInfo,
    file_size: u64,
    source: Option<Vec<u8>>,
) -> ProbedImage {
    let color_mode = header.mode_hint.unwrap_or(decoded_mode);
    tracing::debug!(
        "Probed {} {}x{} mode {} ({} bytes)",
        format,
        width,
        height,
        color_mode,
        file_size
    );

    ProbedImage {
        format,
        width,
        height,
        color_mode,
        metadata: header.metadata,
        file_size,
        source,
    }
}

/// Container-specific metadata for an already-identified format.
fn read_header(format: &ContainerFormat, data: &[u8]) -> HeaderInfo {
    match format {
        ContainerFormat::Jpeg => {
            let mut info = HeaderInfo::default();
            if let Some((x, y)) = jfif_dpi(data).or_else(|| exif_dpi(data)) {
                info.metadata.insert(DPI_KEY, MetaValue::pair(x, y));
            }
            info
        }
        ContainerFormat::Png => png_header(data),
        ContainerFormat::Gif => HeaderInfo {
            mode_hint: Some(ColorMode::Palette),
            ..HeaderInfo::default()
        },
        ContainerFormat::Tiff => tiff_header(data),
        ContainerFormat::Bmp => bmp_header(data),
        ContainerFormat::Pcx => pcx_header(data),
        ContainerFormat::Other(_) => HeaderInfo::default(),
    }
}

impl ProbedImage {
    /// Decode the full pixel data from the retained source bytes.
    ///
    /// # Errors
    ///
    /// `ProbeError::Unsupported` if the source was not retained at probe time.
    pub fn decode_pixels(&self) -> Result<DynamicImage, ProbeError> {
        let source = self.source.as_deref().ok_or_else(|| {
            ProbeError::Unsupported(format!("{} pixel data was not retained", self.format))
        })?;
        let reader = ImageReader::new(Cursor::new(source)).with_guessed_format()?;
        Ok(reader.decode()?)
    }
}
