//! Integration tests for reading `.vpdata` vector probe files from disk

use gxsmread::{open_spec, GxsmError, KEY_DATE, KEY_PROBE_POS_UNITS};
use std::fs;
use tempfile::TempDir;

const VPDATA: &str = "# GXSM Vector Probe Data :: VPVersion=00.02 vdate=20070227
# Date                   :: date=Wed Feb 26 15:26:03 2025
#
# FileName               :: name=/data/2025-02-26/test000-VP005-VP.vpdata
# GXSM-Main-Offset       :: X0=12.5 Ang  Y0=-3 Ang, iX0=-999999 Pix iX0=-999999 Pix
# GXSM-DSP-Control-FB    :: Bias=0.1 V, Current=0 nA
# Probe Data Number      :: N=4
#C
#C Data Table             :: data=
#C Index\t\"ADC0-I (nA)\"\t\"Zmon (Å)\"\t\"Bias (V)\"
0\t-2.763450991873e+01\t3.849527449114e+03\t1.000000000000e-01
1\t-2.763145806783e+01\t3.848469886628e+03\t2.000000000000e-01
2\t-2.763450991873e+01\t3.847412324142e+03\t3.000000000000e-01
3\t-2.762840621693e+01\t3.846354761656e+03\t4.000000000000e-01
#C
#C END.
";

fn write_fixture(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("Failed to write fixture");
    path
}

#[test]
fn test_open_spec_reads_columns_and_rows() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = write_fixture(&temp_dir, "test000-VP005-VP.vpdata", VPDATA);

    let record = open_spec(&path).expect("vpdata file should parse");

    assert_eq!(record.names(), &["Index", "ADC0-I", "Zmon", "Bias"]);
    assert_eq!(record.units()["ADC0-I"], "nA");
    assert_eq!(record.units()["Zmon"], "Å");
    assert_eq!(record.row_count(), 4);

    let bias = record.column("Bias").expect("Bias column");
    assert!((bias[3] - 0.4).abs() < 1e-12);
    assert_eq!(record.column("Index").unwrap().to_vec(), vec![0.0, 1.0, 2.0, 3.0]);
    assert!(record.column("Missing").is_none());
}

#[test]
fn test_open_spec_reads_metadata() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = write_fixture(&temp_dir, "probe.vpdata", VPDATA);

    let record = open_spec(&path).unwrap();

    assert_eq!(record.raw_metadata.len(), 6);
    assert_eq!(record.raw_metadata["Probe Data Number"], "N=4");
    assert_eq!(record.metadata.probe_pos_x.as_deref(), Some("12.5"));
    assert_eq!(record.metadata.probe_pos_y.as_deref(), Some("-3"));

    let map = record.metadata.to_map();
    assert_eq!(map[KEY_PROBE_POS_UNITS], "Ang");
    assert_eq!(map[KEY_DATE], "Wed Feb 26 15:26:03 2025");
}

#[test]
fn test_open_spec_tolerates_latin1_bytes() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("latin1.vpdata");
    // 0xC5 is the Latin-1 Angstrom sign, invalid as UTF-8 on its own
    let mut bytes = b"#C Data Table :: data=\n#C Index \"Zmon (".to_vec();
    bytes.push(0xC5);
    bytes.extend_from_slice(b")\"\n0 1.0\n#C END.\n");
    fs::write(&path, bytes).unwrap();

    let record = open_spec(&path).expect("invalid bytes should not abort parsing");
    assert_eq!(record.names(), &["Index", "Zmon"]);
    assert_eq!(record.row_count(), 1);
}

#[test]
fn test_open_spec_missing_file_is_io_error() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let result = open_spec(&temp_dir.path().join("absent.vpdata"));
    assert!(matches!(result, Err(GxsmError::Io(_))));
}

#[test]
fn test_open_spec_malformed_row_reports_line() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let broken = VPDATA.replace("2\t-2.763450991873e+01", "2\tnan-ish");
    let path = write_fixture(&temp_dir, "broken.vpdata", &broken);

    match open_spec(&path) {
        Err(GxsmError::DataFormat(msg)) => {
            assert!(msg.contains("line 13"), "unexpected message: {msg}");
        }
        other => panic!("expected DataFormat error, got {other:?}"),
    }
}
