//! Vector probe (`.vpdata`) file parsing
//!
//! GXSM writes point spectroscopy as plain text: a block of `# key :: value`
//! header lines, then a data table introduced by a `#C Data Table` line.
//! The row after the marker names the columns (`"ADC0-I (nA)"` style tokens
//! or bare names) and whitespace-separated numeric rows follow until the
//! `#C END.` line.

use crate::types::{SpecColumns, SpecMetadata, SpecRecord};
use crate::{GxsmError, Result};
use chrono::NaiveDateTime;
use ndarray::Array2;
use regex::Regex;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;

pub const COMMENT_PREFIX: &str = "#";
pub const DATA_COMMENT_PREFIX: &str = "#C";
pub const DATA_TABLE_TITLE: &str = "Data Table";
pub const END_MARKER: &str = "#C END";
pub const METADATA_DELIMITER: &str = "::";

const HEADER_KEY_OFFSET: &str = "GXSM-Main-Offset";
const HEADER_KEY_DATE: &str = "Date";
const HEADER_KEY_FILENAME: &str = "FileName";
const DATE_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

fn offset_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"X0=\s*([^\s,]+)\s+([^\s,]+),?\s+Y0=\s*([^\s,]+)").expect("valid regex")
    })
}

fn date_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"date=(.+)").expect("valid regex"))
}

fn name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"name=(.+)").expect("valid regex"))
}

fn header_token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#""([^"]*)"|(\S+)"#).expect("valid regex"))
}

fn unit_suffix_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(.*?)\s*\(([^()]*)\)$").expect("valid regex"))
}

/// Collect every `key :: value` pair of the header.
///
/// Scanning stops at the first `#C` line, where the data table section
/// begins. A key that appears twice keeps its last value.
pub fn extract_raw_metadata<S: AsRef<str>>(lines: &[S]) -> BTreeMap<String, String> {
    let mut metadata = BTreeMap::new();

    for line in lines {
        let line = line.as_ref().trim();
        if line.starts_with(DATA_COMMENT_PREFIX) {
            break;
        }
        let Some(content) = line.strip_prefix(COMMENT_PREFIX) else {
            continue;
        };
        if let Some((key, value)) = content.split_once(METADATA_DELIMITER) {
            let key = key.trim();
            if key.is_empty() {
                continue;
            }
            if let Some(previous) = metadata.insert(key.to_string(), value.trim().to_string()) {
                log::debug!("Header key '{key}' repeated, dropping earlier value '{previous}'");
            }
        }
    }

    metadata
}

/// Pick the probe position, acquisition date and source path out of the raw header
pub fn parse_useful_metadata(raw: &BTreeMap<String, String>) -> SpecMetadata {
    let mut metadata = SpecMetadata::default();

    if let Some(offset) = raw.get(HEADER_KEY_OFFSET) {
        if let Some(caps) = offset_regex().captures(offset) {
            metadata.probe_pos_x = Some(caps[1].to_string());
            metadata.probe_pos_units = Some(caps[2].to_string());
            metadata.probe_pos_y = Some(caps[3].to_string());
        } else {
            log::warn!("Unrecognised probe offset '{offset}'");
        }
    }

    if let Some(date) = raw.get(HEADER_KEY_DATE) {
        if let Some(caps) = date_regex().captures(date) {
            let text = caps[1].trim().to_string();
            metadata.acquired_at = NaiveDateTime::parse_from_str(&text, DATE_FORMAT).ok();
            metadata.date = Some(text);
        }
    }

    if let Some(name) = raw.get(HEADER_KEY_FILENAME) {
        if let Some(caps) = name_regex().captures(name) {
            metadata.filename = Some(caps[1].trim().to_string());
        }
    }

    metadata
}

/// Split a header row into column names and units
fn parse_header_row(row: &str) -> SpecColumns {
    let mut columns = SpecColumns::default();

    for caps in header_token_regex().captures_iter(row) {
        let token = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str().trim())
            .unwrap_or_default();

        let (name, unit) = match unit_suffix_regex().captures(token) {
            Some(parts) => (parts[1].to_string(), parts[2].trim().to_string()),
            None => (token.to_string(), String::new()),
        };

        columns.units.insert(name.clone(), unit.clone());
        columns.names.push(name);
        columns.column_units.push(unit);
    }

    columns
}

fn strip_comment(line: &str) -> &str {
    let line = line.trim();
    line.strip_prefix(DATA_COMMENT_PREFIX)
        .or_else(|| line.strip_prefix(COMMENT_PREFIX))
        .unwrap_or(line)
}

/// Parse the data table into its column layout and a rows x columns matrix.
///
/// The header row is the line after the `#C ... Data Table` marker, or the first
/// non-comment line when the marker is missing. Errors name the 1-based line
/// number within `lines`.
pub fn extract_data<S: AsRef<str>>(lines: &[S]) -> Result<(SpecColumns, Array2<f64>)> {
    let marker = lines.iter().position(|line| {
        let line = line.as_ref().trim();
        line.starts_with(DATA_COMMENT_PREFIX) && line.contains(DATA_TABLE_TITLE)
    });

    let header_index = match marker {
        Some(index) => index + 1,
        None => lines
            .iter()
            .position(|line| {
                let line = line.as_ref().trim();
                !line.is_empty() && !line.starts_with(COMMENT_PREFIX)
            })
            .ok_or_else(|| GxsmError::DataFormat("no data table header found".to_string()))?,
    };

    let header = lines.get(header_index).ok_or_else(|| {
        GxsmError::DataFormat(format!(
            "line {}: data table marker is not followed by a header row",
            header_index
        ))
    })?;

    let columns = parse_header_row(strip_comment(header.as_ref()));
    if columns.is_empty() {
        return Err(GxsmError::DataFormat(format!(
            "line {}: empty data table header",
            header_index + 1
        )));
    }

    let width = columns.len();
    let mut values = Vec::new();
    let mut row_count = 0;

    for (index, line) in lines.iter().enumerate().skip(header_index + 1) {
        let line_number = index + 1;
        let line = line.as_ref().trim();
        if line.starts_with(END_MARKER) {
            break;
        }
        if line.is_empty() || line.starts_with(COMMENT_PREFIX) {
            continue;
        }

        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() != width {
            return Err(GxsmError::DataFormat(format!(
                "line {line_number}: expected {width} values, found {}",
                tokens.len()
            )));
        }
        for token in tokens {
            let value = token.parse::<f64>().map_err(|_| {
                GxsmError::DataFormat(format!("line {line_number}: '{token}' is not a number"))
            })?;
            values.push(value);
        }
        row_count += 1;
    }

    let data = Array2::from_shape_vec((row_count, width), values)
        .map_err(|e| GxsmError::DataFormat(format!("data table shape: {e}")))?;

    Ok((columns, data))
}

/// Parse the full text of a vector probe file
pub fn parse_spec_str(text: &str) -> Result<SpecRecord> {
    let lines: Vec<&str> = text.lines().collect();
    let raw_metadata = extract_raw_metadata(&lines);
    let metadata = parse_useful_metadata(&raw_metadata);
    let (columns, data) = extract_data(&lines)?;

    log::debug!(
        "Parsed vector probe table: {} columns x {} rows, {} header keys",
        columns.len(),
        data.nrows(),
        raw_metadata.len()
    );

    Ok(SpecRecord {
        columns,
        data,
        raw_metadata,
        metadata,
    })
}

/// Read and parse a vector probe file.
///
/// Bytes that are not valid UTF-8 (older files write `Å` in Latin-1) are
/// replaced rather than rejected.
pub fn open_spec(path: &Path) -> Result<SpecRecord> {
    let bytes = std::fs::read(path)?;
    let text = String::from_utf8_lossy(&bytes);
    parse_spec_str(&text)
}
