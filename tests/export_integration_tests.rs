//! Integration tests for export functionality
//!
//! Tests the export layer across different scenarios:
//! - CSV export of the data table and header metadata
//! - JSON export with directory creation
//! - Output directory defaulting to input parent
//! - Nothing written when no format is requested

use gxsmread::export::*;
use gxsmread::parse_spec_str;
use std::fs;
use tempfile::TempDir;

const VPDATA: &str = "# Date :: date=Wed Feb 26 15:26:03 2025
# GXSM-Main-Offset :: X0=1.5 Ang  Y0=2 Ang, iX0=0 Pix iX0=0 Pix
# GXSM-DSP-Control-FB :: Bias=0.1 V, Current=0 nA
#C
#C Data Table :: data=
#C Index \"ADC0-I (nA)\" \"Zmon (Å)\"
0 -2.5 3849.5
1 -2.25 3848.5
#C END.
";

#[cfg(feature = "csv")]
#[test]
fn test_export_csv_writes_table_and_metadata() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let input = temp_dir.path().join("test000-VP005-VP.vpdata");
    let record = parse_spec_str(VPDATA).unwrap();

    let options = ExportOptions {
        csv: true,
        ..Default::default()
    };
    let report = export_spec(&record, &input, &options).expect("CSV export should succeed");

    let csv_path = report.csv_path.expect("CSV path reported");
    assert_eq!(csv_path, temp_dir.path().join("test000-VP005-VP.csv"));
    assert!(report.json_path.is_none());

    let mut reader = csv::Reader::from_path(&csv_path).unwrap();
    let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
    assert_eq!(headers, vec!["Index", "ADC0-I (nA)", "Zmon (Å)"]);
    let rows: Vec<Vec<f64>> = reader
        .records()
        .map(|r| r.unwrap().iter().map(|v| v.parse().unwrap()).collect())
        .collect();
    assert_eq!(rows, vec![vec![0.0, -2.5, 3849.5], vec![1.0, -2.25, 3848.5]]);

    let metadata_path = report.metadata_path.expect("metadata path reported");
    assert_eq!(
        metadata_path,
        temp_dir.path().join("test000-VP005-VP.metadata.csv")
    );
    let mut reader = csv::Reader::from_path(&metadata_path).unwrap();
    let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
    assert_eq!(headers, vec!["Key", "Value"]);
    let pairs: Vec<(String, String)> = reader
        .records()
        .map(|r| {
            let r = r.unwrap();
            (r[0].to_string(), r[1].to_string())
        })
        .collect();
    assert_eq!(pairs.len(), 3);
    assert!(pairs.contains(&(
        "GXSM-DSP-Control-FB".to_string(),
        "Bias=0.1 V, Current=0 nA".to_string()
    )));
}

#[test]
fn test_export_json_creates_output_directory() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let nonexistent_dir = temp_dir.path().join("nonexistent").join("output");
    let input = temp_dir.path().join("probe.vpdata");
    let record = parse_spec_str(VPDATA).unwrap();

    let options = ExportOptions {
        csv: false,
        json: true,
        output_dir: Some(nonexistent_dir.to_str().unwrap().to_string()),
    };
    let report = export_spec(&record, &input, &options).expect("JSON export should succeed");

    assert!(nonexistent_dir.exists(), "Output directory should be created");
    let json_path = report.json_path.expect("JSON path reported");
    assert_eq!(json_path, nonexistent_dir.join("probe.json"));
    assert!(report.csv_path.is_none());

    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(value["names"], serde_json::json!(["Index", "ADC0-I", "Zmon"]));
    assert_eq!(value["units"]["Zmon"], "Å");
    assert_eq!(value["metadata"]["probe_pos_x"], "1.5");
    assert_eq!(value["metadata"]["probe_pos_units"], "Ang");
    assert_eq!(value["metadata"]["date"], "Wed Feb 26 15:26:03 2025");
    assert_eq!(value["data"][1][2], 3848.5);
    assert_eq!(value["raw_metadata"].as_object().unwrap().len(), 3);
}

#[test]
fn test_export_nothing_requested_writes_nothing() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let input = temp_dir.path().join("quiet.vpdata");
    let record = parse_spec_str(VPDATA).unwrap();

    let report = export_spec(&record, &input, &ExportOptions::default()).unwrap();

    assert!(report.written().is_empty());
    assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 0);
}

#[test]
fn test_export_json_to_unwritable_location_fails() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let blocker = temp_dir.path().join("blocker");
    fs::write(&blocker, "not a directory").unwrap();
    let record = parse_spec_str(VPDATA).unwrap();

    let options = ExportOptions {
        json: true,
        output_dir: Some(blocker.join("out").to_str().unwrap().to_string()),
        ..Default::default()
    };
    let result = export_spec(&record, &temp_dir.path().join("a.vpdata"), &options);
    assert!(result.is_err(), "Export below a regular file should fail");
}
