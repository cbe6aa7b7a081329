use chrono::NaiveDateTime;
use ndarray::{Array2, ArrayView1};
use serde::Serialize;
use std::collections::BTreeMap;

pub const KEY_PROBE_POS_X: &str = "probe_pos_x";
pub const KEY_PROBE_POS_Y: &str = "probe_pos_y";
pub const KEY_PROBE_POS_UNITS: &str = "probe_pos_units";
pub const KEY_DATE: &str = "date";
pub const KEY_FILENAME: &str = "filename";

/// Fields pulled out of the free-form vector probe header.
/// Absent keys in the header leave the matching field `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SpecMetadata {
    pub probe_pos_x: Option<String>,
    pub probe_pos_y: Option<String>,
    /// Unit token shared by both probe coordinates, e.g. `Ang`
    pub probe_pos_units: Option<String>,
    /// Acquisition timestamp as written by the instrument
    pub date: Option<String>,
    #[serde(skip)]
    pub acquired_at: Option<NaiveDateTime>,
    /// Path the instrument saved the file under
    pub filename: Option<String>,
}

impl SpecMetadata {
    /// Present fields keyed by their canonical names
    pub fn to_map(&self) -> BTreeMap<&'static str, String> {
        let mut map = BTreeMap::new();
        let fields = [
            (KEY_PROBE_POS_X, &self.probe_pos_x),
            (KEY_PROBE_POS_Y, &self.probe_pos_y),
            (KEY_PROBE_POS_UNITS, &self.probe_pos_units),
            (KEY_DATE, &self.date),
            (KEY_FILENAME, &self.filename),
        ];
        for (key, value) in fields {
            if let Some(value) = value {
                map.insert(key, value.clone());
            }
        }
        map
    }

    pub fn is_empty(&self) -> bool {
        self.to_map().is_empty()
    }
}

/// Column layout of a vector probe data table
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SpecColumns {
    /// Column names in file order; the same probe source may appear twice
    pub names: Vec<String>,
    /// Unit of each column, positionally aligned with `names` (empty if none)
    pub column_units: Vec<String>,
    /// Name -> unit; a repeated name keeps the unit of its last column
    pub units: BTreeMap<String, String>,
}

impl SpecColumns {
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// One parsed vector probe (`.vpdata`) file
#[derive(Debug, Clone, Serialize)]
pub struct SpecRecord {
    pub columns: SpecColumns,
    /// rows x columns
    #[serde(skip)]
    pub data: Array2<f64>,
    /// Every `key :: value` pair of the header
    pub raw_metadata: BTreeMap<String, String>,
    pub metadata: SpecMetadata,
}

impl SpecRecord {
    pub fn names(&self) -> &[String] {
        &self.columns.names
    }

    pub fn units(&self) -> &BTreeMap<String, String> {
        &self.columns.units
    }

    pub fn row_count(&self) -> usize {
        self.data.nrows()
    }

    /// First column called `name`
    pub fn column(&self, name: &str) -> Option<ArrayView1<'_, f64>> {
        let index = self.columns.names.iter().position(|n| n == name)?;
        Some(self.data.column(index))
    }

    /// Header label `name (unit)`, or just `name` for unitless columns
    pub fn column_label(&self, index: usize) -> Option<String> {
        let name = self.columns.names.get(index)?;
        match self.columns.column_units.get(index) {
            Some(unit) if !unit.is_empty() => Some(format!("{name} ({unit})")),
            _ => Some(name.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn sample_record() -> SpecRecord {
        let mut units = BTreeMap::new();
        units.insert("Index".to_string(), String::new());
        units.insert("Zmon".to_string(), "Å".to_string());
        SpecRecord {
            columns: SpecColumns {
                names: vec!["Index".to_string(), "Zmon".to_string()],
                column_units: vec![String::new(), "Å".to_string()],
                units,
            },
            data: array![[0.0, 3850.3], [1.0, 3849.4]],
            raw_metadata: BTreeMap::new(),
            metadata: SpecMetadata::default(),
        }
    }

    #[test]
    fn test_column_lookup() {
        let record = sample_record();
        let zmon = record.column("Zmon").unwrap();
        assert_eq!(zmon.len(), 2);
        assert!((zmon[1] - 3849.4).abs() < 1e-9);
        assert!(record.column("ZS").is_none());
    }

    #[test]
    fn test_column_label() {
        let record = sample_record();
        assert_eq!(record.column_label(0).as_deref(), Some("Index"));
        assert_eq!(record.column_label(1).as_deref(), Some("Zmon (Å)"));
        assert!(record.column_label(2).is_none());
    }

    #[test]
    fn test_metadata_map_omits_missing_fields() {
        let metadata = SpecMetadata {
            date: Some("Wed Feb 26 15:26:03 2025".to_string()),
            ..Default::default()
        };
        let map = metadata.to_map();
        assert_eq!(map.len(), 1);
        assert_eq!(map[KEY_DATE], "Wed Feb 26 15:26:03 2025");
        assert!(SpecMetadata::default().is_empty());
    }
}
