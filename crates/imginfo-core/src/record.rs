//! Per-file inventory records.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::compress::Compression;
use crate::depth::ColorDepth;
use crate::probe::{ColorMode, ContainerFormat};
use crate::resolution::Resolution;

/// Placeholder shown in every derived field of a failed record.
pub const ERROR_SENTINEL: &str = "Error";

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Everything extracted from a successfully probed file.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageDetails {
    pub format: ContainerFormat,
    pub width: u32,
    pub height: u32,
    pub color_mode: ColorMode,
    pub color_depth: ColorDepth,
    pub resolution: Resolution,
    pub compression: Compression,
    /// On-disk size in bytes.
    pub file_size: u64,
}

impl ImageDetails {
    /// On-disk size in mebibytes.
    pub fn file_size_mb(&self) -> f64 {
        self.file_size as f64 / BYTES_PER_MB
    }
}

/// The result of extracting one file.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Extracted(ImageDetails),
    Failed { error: String },
}

/// One inventory row: a file's identity and its extraction outcome.
///
/// A record is either fully extracted or fully failed; there is no partial
/// state besides a failed compression measurement, which is carried inside
/// [`Compression::Failed`].
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRecord {
    pub filename: String,
    pub path: PathBuf,
    pub outcome: Outcome,
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string()
}

impl ImageRecord {
    pub fn extracted(path: &Path, details: ImageDetails) -> Self {
        Self {
            filename: file_name_of(path),
            path: path.to_path_buf(),
            outcome: Outcome::Extracted(details),
        }
    }

    pub fn failed(path: &Path, error: impl Into<String>) -> Self {
        Self {
            filename: file_name_of(path),
            path: path.to_path_buf(),
            outcome: Outcome::Failed {
                error: error.into(),
            },
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self.outcome, Outcome::Extracted(_))
    }

    pub fn details(&self) -> Option<&ImageDetails> {
        match &self.outcome {
            Outcome::Extracted(details) => Some(details),
            Outcome::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Extracted(_) => None,
            Outcome::Failed { error } => Some(error),
        }
    }

    /// Container tag, or the error sentinel.
    pub fn format_label(&self) -> &str {
        self.details()
            .map_or(ERROR_SENTINEL, |details| details.format.tag())
    }

    /// Width in pixels; zero for failed records.
    pub fn width(&self) -> u32 {
        self.details().map_or(0, |details| details.width)
    }

    /// Height in pixels; zero for failed records.
    pub fn height(&self) -> u32 {
        self.details().map_or(0, |details| details.height)
    }

    /// Flatten into the presentation row.
    pub fn to_row(&self) -> RecordRow {
        let path = self.path.to_string_lossy().to_string();
        match &self.outcome {
            Outcome::Extracted(details) => RecordRow {
                filename: self.filename.clone(),
                path,
                format: details.format.to_string(),
                width: Some(details.width),
                height: Some(details.height),
                dimensions: format!("{} × {}", details.width, details.height),
                dpi: details.resolution.to_string(),
                color_depth: details.color_depth.to_string(),
                compression: details.compression.to_string(),
                file_size_mb: format!("{:.2}", details.file_size_mb()),
                error: None,
            },
            Outcome::Failed { error } => RecordRow {
                filename: self.filename.clone(),
                path,
                format: ERROR_SENTINEL.to_string(),
                width: None,
                height: None,
                dimensions: ERROR_SENTINEL.to_string(),
                dpi: ERROR_SENTINEL.to_string(),
                color_depth: ERROR_SENTINEL.to_string(),
                compression: ERROR_SENTINEL.to_string(),
                file_size_mb: ERROR_SENTINEL.to_string(),
                error: Some(error.clone()),
            },
        }
    }
}

/// Flat, string-valued view of a record for tables and exports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordRow {
    pub filename: String,
    pub path: String,
    pub format: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub dimensions: String,
    pub dpi: String,
    pub color_depth: String,
    pub compression: String,
    pub file_size_mb: String,
    pub error: Option<String>,
}

/// Batch totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub successful: usize,
    pub errors: usize,
}

impl Summary {
    pub fn from_records(records: &[ImageRecord]) -> Self {
        let successful = records.iter().filter(|r| r.is_ok()).count();
        Self {
            total: records.len(),
            successful,
            errors: records.len() - successful,
        }
    }
}
