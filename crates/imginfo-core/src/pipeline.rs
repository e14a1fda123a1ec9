//! Per-file extraction over an inventory of paths.
//!
//! The pipeline is strictly sequential. Every input path yields exactly one
//! record, in input order, and a file that fails to decode only affects its
//! own record. Cancellation is checked between files.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::compress;
use crate::depth::color_depth;
use crate::probe::{probe_file, ProbedImage};
use crate::record::{ImageDetails, ImageRecord, Summary};
use crate::resolution::resolution;

/// Shared flag used to stop a running pipeline between files.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Ordered accumulator of records, one push per processed file.
#[derive(Debug, Default)]
pub struct RecordBatch {
    records: Vec<ImageRecord>,
}

impl RecordBatch {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, record: ImageRecord) {
        self.records.push(record);
    }

    pub fn last(&self) -> Option<&ImageRecord> {
        self.records.last()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn finish(self) -> Vec<ImageRecord> {
        self.records
    }
}

/// Records produced by one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutcome {
    pub records: Vec<ImageRecord>,
    /// True if the run stopped early; `records` holds what was finished.
    pub cancelled: bool,
}

impl PipelineOutcome {
    pub fn summary(&self) -> Summary {
        Summary::from_records(&self.records)
    }
}

fn details_of(image: &ProbedImage) -> ImageDetails {
    ImageDetails {
        format: image.format.clone(),
        width: image.width,
        height: image.height,
        color_mode: image.color_mode.clone(),
        color_depth: color_depth(&image.color_mode),
        resolution: resolution(&image.metadata),
        compression: compress::estimate(image),
        file_size: image.file_size,
    }
}

/// Probe one file and build its record. Never fails; decode errors become a
/// failed record.
pub fn extract_record(path: &Path) -> ImageRecord {
    match probe_file(path) {
        Ok(image) => {
            let details = details_of(&image);
            tracing::debug!(
                "{}: {} {}x{} {} bits, {} dpi, compression {}",
                path.display(),
                details.format,
                details.width,
                details.height,
                details.color_depth,
                details.resolution,
                details.compression
            );
            ImageRecord::extracted(path, details)
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {}", path.display(), err);
            ImageRecord::failed(path, err.to_string())
        }
    }
}

/// Sequential extraction driver.
#[derive(Debug, Clone, Default)]
pub struct ExtractionPipeline {
    cancel: CancelToken,
}

impl ExtractionPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cancel_token(cancel: CancelToken) -> Self {
        Self { cancel }
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Extract every path in order.
    pub fn run(&self, paths: &[PathBuf]) -> PipelineOutcome {
        self.run_with_progress(paths, |_, _, _| {})
    }

    /// Extract every path in order, calling `on_record(done, total, record)`
    /// after each file.
    pub fn run_with_progress<F>(&self, paths: &[PathBuf], mut on_record: F) -> PipelineOutcome
    where
        F: FnMut(usize, usize, &ImageRecord),
    {
        let total = paths.len();
        let mut batch = RecordBatch::with_capacity(total);
        let mut cancelled = false;

        for path in paths {
            if self.cancel.is_cancelled() {
                cancelled = true;
                break;
            }
            batch.push(extract_record(path));
            if let Some(record) = batch.last() {
                on_record(batch.len(), total, record);
            }
        }

        let records = batch.finish();
        let summary = Summary::from_records(&records);
        if cancelled {
            tracing::warn!("Extraction cancelled after {} of {} file(s)", records.len(), total);
        }
        tracing::info!(
            "Processed {} file(s): {} ok, {} failed",
            summary.total,
            summary.successful,
            summary.errors
        );

        PipelineOutcome { records, cancelled }
    }
}
