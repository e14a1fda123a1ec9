//! Presentation of inventory records: filtering, table, CSV and JSON.

use std::io::Write;

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;

use imginfo_core::{ImageRecord, RecordRow, Summary};

/// How records are written out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Csv,
    Json,
}

const HEADERS: [&str; 8] = [
    "File",
    "Size (px)",
    "DPI",
    "Color depth",
    "Compression",
    "Format",
    "File size (MB)",
    "Status",
];

/// Keep records whose filename contains `filter`, ignoring case.
pub fn filter_records<'a>(records: &'a [ImageRecord], filter: Option<&str>) -> Vec<&'a ImageRecord> {
    let needle = filter.map(str::to_lowercase).filter(|f| !f.is_empty());
    records
        .iter()
        .filter(|record| match &needle {
            Some(needle) => record.filename.to_lowercase().contains(needle.as_str()),
            None => true,
        })
        .collect()
}

fn table_cells(record: &ImageRecord) -> [String; 8] {
    let row = record.to_row();
    let status = if record.is_ok() { "OK" } else { "Error" };
    [
        row.filename,
        row.dimensions,
        row.dpi,
        row.color_depth,
        row.compression,
        row.format,
        row.file_size_mb,
        status.to_string(),
    ]
}

fn pad_line<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    cells
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

/// Render records as an aligned plain-text table.
pub fn render_table(records: &[&ImageRecord]) -> String {
    let rows: Vec<[String; 8]> = records.iter().map(|r| table_cells(r)).collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    out.push_str(&pad_line(HEADERS.iter().copied(), &widths));
    out.push('\n');
    let rule_width = widths.iter().sum::<usize>() + 2 * (widths.len() - 1);
    out.push_str(&"-".repeat(rule_width));
    out.push('\n');
    for row in &rows {
        out.push_str(&pad_line(row.iter().map(String::as_str), &widths));
        out.push('\n');
    }
    out
}

/// One-line batch totals.
pub fn render_summary(summary: &Summary) -> String {
    format!(
        "Total files: {}  Successful: {}  Errors: {}",
        summary.total, summary.successful, summary.errors
    )
}

/// Write records as CSV with a header row.
pub fn write_csv<W: Write>(records: &[&ImageRecord], writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for record in records {
        csv.serialize(record.to_row())
            .with_context(|| format!("Failed to write CSV row for {}", record.filename))?;
    }
    csv.flush().context("Failed to flush CSV output")?;
    Ok(())
}

#[derive(Serialize)]
struct JsonReport<'a> {
    summary: &'a Summary,
    truncated: bool,
    cancelled: bool,
    records: Vec<RecordRow>,
}

/// Write the summary and records as a pretty-printed JSON document.
pub fn write_json<W: Write>(
    records: &[&ImageRecord],
    summary: &Summary,
    truncated: bool,
    cancelled: bool,
    mut writer: W,
) -> Result<()> {
    let report = JsonReport {
        summary,
        truncated,
        cancelled,
        records: records.iter().map(|r| r.to_row()).collect(),
    };
    serde_json::to_writer_pretty(&mut writer, &report).context("Failed to write JSON output")?;
    writeln!(writer)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use imginfo_core::{
        ColorDepth, ColorMode, Compression, ContainerFormat, ImageDetails, Resolution,
    };
    use std::path::Path;

    fn ok_record(name: &str) -> ImageRecord {
        ImageRecord::extracted(
            Path::new(name),
            ImageDetails {
                format: ContainerFormat::Jpeg,
                width: 640,
                height: 480,
                color_mode: ColorMode::Rgb,
                color_depth: ColorDepth::Bits(24),
                resolution: Resolution::new(300.0, 300.0),
                compression: Compression::Saved(91.25),
                file_size: 2 * 1024 * 1024,
            },
        )
    }

    fn records() -> Vec<ImageRecord> {
        vec![
            ok_record("Holiday.JPG"),
            ImageRecord::failed(Path::new("broken.png"), "Cannot identify image file"),
            ok_record("scan_holiday_02.jpg"),
        ]
    }

    #[test]
    fn test_filter_is_case_insensitive() {
        let records = records();
        let names: Vec<&str> = filter_records(&records, Some("HOLIDAY"))
            .iter()
            .map(|r| r.filename.as_str())
            .collect();
        assert_eq!(names, vec!["Holiday.JPG", "scan_holiday_02.jpg"]);
    }

    #[test]
    fn test_empty_filter_keeps_everything() {
        let records = records();
        assert_eq!(filter_records(&records, None).len(), 3);
        assert_eq!(filter_records(&records, Some("")).len(), 3);
        assert!(filter_records(&records, Some("nomatch")).is_empty());
    }

    #[test]
    fn test_table_layout() {
        let records = records();
        let table = render_table(&filter_records(&records, None));
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("File"));
        assert!(lines[0].ends_with("Status"));
        assert!(lines[1].chars().all(|c| c == '-'));

        assert!(lines[2].contains("640 × 480"));
        assert!(lines[2].contains("300 × 300"));
        assert!(lines[2].contains("91.2%") || lines[2].contains("91.3%"));
        assert!(lines[2].contains("2.00"));
        assert!(lines[2].ends_with("OK"));

        assert!(lines[3].starts_with("broken.png"));
        assert!(lines[3].ends_with("Error"));
    }

    #[test]
    fn test_summary_line() {
        let summary = Summary::from_records(&records());
        assert_eq!(render_summary(&summary), "Total files: 3  Successful: 2  Errors: 1");
    }

    #[test]
    fn test_csv_output() {
        let records = records();
        let mut buffer = Vec::new();
        write_csv(&filter_records(&records, None), &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("filename,path,format,width,height"));
        assert!(lines[2].starts_with("broken.png,"));
        assert!(lines[2].ends_with("Cannot identify image file"));
    }

    #[test]
    fn test_json_output() {
        let records = records();
        let summary = Summary::from_records(&records);
        let mut buffer = Vec::new();
        write_json(&filter_records(&records, None), &summary, true, false, &mut buffer).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(value["summary"]["total"], 3);
        assert_eq!(value["summary"]["errors"], 1);
        assert_eq!(value["truncated"], true);
        assert_eq!(value["records"][0]["width"], 640);
        assert_eq!(value["records"][1]["format"], "Error");
        assert!(value["records"][1]["width"].is_null());
        assert_eq!(value["records"][1]["error"], "Cannot identify image file");
    }
}
