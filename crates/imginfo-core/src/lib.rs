//! imginfo Core - Image inventory library
//!
//! This crate scans directories for raster images and extracts per-file
//! technical metadata: container format, pixel dimensions, color depth,
//! print resolution, compression, and on-disk size.

pub mod compress;
pub mod config;
pub mod depth;
pub mod pipeline;
pub mod probe;
pub mod record;
pub mod resolution;
pub mod scan;

pub use compress::{estimate, Compression};
pub use config::{ScanConfig, DEFAULT_MAX_FILES};
pub use depth::{color_depth, ColorDepth};
pub use pipeline::{extract_record, CancelToken, ExtractionPipeline, PipelineOutcome, RecordBatch};
pub use probe::{probe_file, ColorMode, ContainerFormat, ProbeError, ProbedImage};
pub use record::{ImageDetails, ImageRecord, Outcome, RecordRow, Summary, ERROR_SENTINEL};
pub use resolution::{resolution, Resolution, DEFAULT_DPI};
pub use scan::{is_recognized_image, scan_directory, Inventory, ScanError};
