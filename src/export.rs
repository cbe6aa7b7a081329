//! Export functionality for vector probe data
//!
//! Writes a parsed [`SpecRecord`] next to its source file (or into a chosen
//! output directory) as CSV tables and/or a single JSON document.

use crate::types::SpecRecord;
use crate::Result;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Export options for controlling output formats
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    pub csv: bool,
    pub json: bool,
    pub output_dir: Option<String>,
}

/// Files written by an export call
#[derive(Debug, Clone, Default)]
pub struct ExportReport {
    pub csv_path: Option<PathBuf>,
    pub metadata_path: Option<PathBuf>,
    pub json_path: Option<PathBuf>,
}

impl ExportReport {
    pub fn written(&self) -> Vec<&PathBuf> {
        [&self.csv_path, &self.metadata_path, &self.json_path]
            .into_iter()
            .flatten()
            .collect()
    }
}

/// Output directory and file stem for `input_path`.
///
/// The directory defaults to the input's parent, the stem to the input's
/// file name without extension.
pub fn compute_export_paths(input_path: &Path, options: &ExportOptions) -> (PathBuf, String) {
    let output_dir = match &options.output_dir {
        Some(dir) => PathBuf::from(dir),
        None => match input_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        },
    };
    let stem = input_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    (output_dir, stem)
}

/// Write `<stem>.csv` (data table) and `<stem>.metadata.csv` (header keys)
#[cfg(feature = "csv")]
pub fn export_spec_to_csv(
    record: &SpecRecord,
    input_path: &Path,
    export_options: &ExportOptions,
) -> Result<ExportReport> {
    let (output_dir, stem) = compute_export_paths(input_path, export_options);
    std::fs::create_dir_all(&output_dir)?;

    let csv_path = output_dir.join(format!("{stem}.csv"));
    let mut writer = csv::Writer::from_path(&csv_path)?;
    let header: Vec<String> = (0..record.columns.len())
        .filter_map(|i| record.column_label(i))
        .collect();
    writer.write_record(&header)?;
    for row in record.data.rows() {
        writer.write_record(row.iter().map(|v| v.to_string()))?;
    }
    writer.flush()?;

    let metadata_path = output_dir.join(format!("{stem}.metadata.csv"));
    let mut writer = csv::Writer::from_path(&metadata_path)?;
    writer.write_record(["Key", "Value"])?;
    for (key, value) in &record.raw_metadata {
        writer.write_record([key, value])?;
    }
    writer.flush()?;

    log::info!("Exported vector probe data to: {}", csv_path.display());

    Ok(ExportReport {
        csv_path: Some(csv_path),
        metadata_path: Some(metadata_path),
        json_path: None,
    })
}

#[derive(Serialize)]
struct SpecDocument<'a> {
    names: &'a [String],
    column_units: &'a [String],
    units: &'a BTreeMap<String, String>,
    metadata: BTreeMap<&'static str, String>,
    raw_metadata: &'a BTreeMap<String, String>,
    data: Vec<Vec<f64>>,
}

/// Write `<stem>.json` holding columns, units, metadata and the data rows
pub fn export_spec_to_json(
    record: &SpecRecord,
    input_path: &Path,
    export_options: &ExportOptions,
) -> Result<PathBuf> {
    let (output_dir, stem) = compute_export_paths(input_path, export_options);
    std::fs::create_dir_all(&output_dir)?;

    let document = SpecDocument {
        names: &record.columns.names,
        column_units: &record.columns.column_units,
        units: &record.columns.units,
        metadata: record.metadata.to_map(),
        raw_metadata: &record.raw_metadata,
        data: record.data.rows().into_iter().map(|row| row.to_vec()).collect(),
    };

    let json_path = output_dir.join(format!("{stem}.json"));
    let writer = BufWriter::new(File::create(&json_path)?);
    serde_json::to_writer_pretty(writer, &document)?;

    log::info!("Exported vector probe data to: {}", json_path.display());
    Ok(json_path)
}

/// Run every export enabled in `export_options`
pub fn export_spec(
    record: &SpecRecord,
    input_path: &Path,
    export_options: &ExportOptions,
) -> Result<ExportReport> {
    let mut report = ExportReport::default();

    #[cfg(feature = "csv")]
    if export_options.csv {
        report = export_spec_to_csv(record, input_path, export_options)?;
    }
    #[cfg(not(feature = "csv"))]
    if export_options.csv {
        log::warn!("CSV export requested but the `csv` feature is disabled");
    }

    if export_options.json {
        report.json_path = Some(export_spec_to_json(record, input_path, export_options)?);
    }

    Ok(report)
}
