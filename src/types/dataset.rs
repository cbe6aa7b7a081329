//! In-memory labeled dataset
//!
//! A minimal stand-in for what a NetCDF reader hands over: named data
//! variables and coordinates (each with dimension names, values and
//! attributes) plus top-level attributes. Readers only need to populate a
//! [`Dataset`]; the preprocessing code talks to it through [`DatasetAccess`]
//! so that a missing variable is an `Option`, not an error path.

use crate::{GxsmError, Result};
use ndarray::{ArrayD, IxDyn};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// A top-level or per-variable attribute value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AttrValue {
    Float(f64),
    Int(i64),
    Text(String),
    List(Vec<f64>),
}

impl AttrValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Float(v) => write!(f, "{v}"),
            AttrValue::Int(v) => write!(f, "{v}"),
            AttrValue::Text(s) => write!(f, "{s}"),
            AttrValue::List(values) => {
                let parts: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        AttrValue::Float(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Int(value)
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Text(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Text(value)
    }
}

/// Variable payload: numbers of any rank, or a character array
#[derive(Debug, Clone, PartialEq)]
pub enum VariableData {
    Numeric(ArrayD<f64>),
    Text(Vec<u8>),
}

/// A named, dimensioned array with its own attributes
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub dims: Vec<String>,
    pub data: VariableData,
    pub attrs: BTreeMap<String, AttrValue>,
}

impl Variable {
    /// Numeric variable; the dimension names must match the array rank
    pub fn new(dims: &[&str], values: ArrayD<f64>) -> Result<Self> {
        if dims.len() != values.ndim() {
            return Err(GxsmError::DataFormat(format!(
                "{} dimension name(s) given for a {}-D array",
                dims.len(),
                values.ndim()
            )));
        }
        Ok(Self {
            dims: dims.iter().map(|d| d.to_string()).collect(),
            data: VariableData::Numeric(values),
            attrs: BTreeMap::new(),
        })
    }

    /// Numeric variable built from a flat vector in row-major order
    pub fn from_shape_vec(dims: &[&str], shape: &[usize], values: Vec<f64>) -> Result<Self> {
        let array = ArrayD::from_shape_vec(IxDyn(shape), values)
            .map_err(|e| GxsmError::DataFormat(format!("bad variable shape {shape:?}: {e}")))?;
        Self::new(dims, array)
    }

    /// 0-D numeric variable
    pub fn scalar(value: f64) -> Self {
        Self {
            dims: Vec::new(),
            data: VariableData::Numeric(ArrayD::from_elem(IxDyn(&[]), value)),
            attrs: BTreeMap::new(),
        }
    }

    /// 1-D numeric variable along `dim`
    pub fn vector(dim: &str, values: Vec<f64>) -> Self {
        let len = values.len();
        Self {
            dims: vec![dim.to_string()],
            data: VariableData::Numeric(
                ArrayD::from_shape_vec(IxDyn(&[len]), values)
                    .unwrap_or_else(|_| ArrayD::zeros(IxDyn(&[0]))),
            ),
            attrs: BTreeMap::new(),
        }
    }

    /// Character variable, stored as raw bytes the way NetCDF char arrays are
    pub fn text(value: &str) -> Self {
        Self {
            dims: Vec::new(),
            data: VariableData::Text(value.as_bytes().to_vec()),
            attrs: BTreeMap::new(),
        }
    }

    pub fn with_attr(mut self, key: &str, value: impl Into<AttrValue>) -> Self {
        self.attrs.insert(key.to_string(), value.into());
        self
    }

    pub fn values(&self) -> Option<&ArrayD<f64>> {
        match &self.data {
            VariableData::Numeric(values) => Some(values),
            VariableData::Text(_) => None,
        }
    }

    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    /// Number of stored elements (bytes for text)
    pub fn len(&self) -> usize {
        match &self.data {
            VariableData::Numeric(values) => values.len(),
            VariableData::Text(bytes) => bytes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The single value of a one-element numeric variable
    pub fn scalar_value(&self) -> Option<f64> {
        match &self.data {
            VariableData::Numeric(values) if values.len() == 1 => values.iter().next().copied(),
            _ => None,
        }
    }

    /// Collapse the variable into an attribute value: text is decoded, a
    /// single element becomes a scalar, anything longer becomes a list.
    pub fn to_attr_value(&self) -> AttrValue {
        match &self.data {
            VariableData::Text(bytes) => {
                let text = String::from_utf8_lossy(bytes);
                AttrValue::Text(text.trim_end_matches('\0').to_string())
            }
            VariableData::Numeric(values) => match values.len() {
                1 => AttrValue::Float(values.iter().copied().next().unwrap_or_default()),
                _ => AttrValue::List(values.iter().copied().collect()),
            },
        }
    }
}

/// Read-only access to variables and attributes by name
pub trait DatasetAccess {
    /// Data variable or coordinate named `name`
    fn variable(&self, name: &str) -> Option<&Variable>;
    /// Top-level attribute named `name`
    fn attribute(&self, name: &str) -> Option<&AttrValue>;
}

/// Data variables, coordinates and top-level attributes of one opened file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub data_vars: BTreeMap<String, Variable>,
    pub coords: BTreeMap<String, Variable>,
    pub attrs: BTreeMap<String, AttrValue>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_var(&mut self, name: &str, variable: Variable) {
        self.data_vars.insert(name.to_string(), variable);
    }

    pub fn insert_coord(&mut self, name: &str, variable: Variable) {
        self.coords.insert(name.to_string(), variable);
    }

    pub fn insert_attr(&mut self, name: &str, value: impl Into<AttrValue>) {
        self.attrs.insert(name.to_string(), value.into());
    }

    pub fn remove_var(&mut self, name: &str) -> Option<Variable> {
        self.data_vars.remove(name)
    }

    pub fn has_var(&self, name: &str) -> bool {
        self.data_vars.contains_key(name)
    }
}

impl DatasetAccess for Dataset {
    fn variable(&self, name: &str) -> Option<&Variable> {
        self.data_vars.get(name).or_else(|| self.coords.get(name))
    }

    fn attribute(&self, name: &str) -> Option<&AttrValue> {
        self.attrs.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variable_rank_must_match_dims() {
        let array = ArrayD::zeros(IxDyn(&[2, 3]));
        assert!(Variable::new(&["dimy", "dimx"], array.clone()).is_ok());
        assert!(matches!(
            Variable::new(&["dimx"], array),
            Err(GxsmError::DataFormat(_))
        ));
    }

    #[test]
    fn test_to_attr_value_conversions() {
        assert_eq!(Variable::scalar(2.5).to_attr_value(), AttrValue::Float(2.5));
        assert_eq!(
            Variable::vector("n", vec![4.0]).to_attr_value(),
            AttrValue::Float(4.0)
        );
        assert_eq!(
            Variable::vector("n", vec![1.0, 2.0]).to_attr_value(),
            AttrValue::List(vec![1.0, 2.0])
        );
        assert_eq!(
            Variable::text("Topo\0\0").to_attr_value(),
            AttrValue::Text("Topo".to_string())
        );
    }

    #[test]
    fn test_scalar_value_only_for_single_element() {
        assert_eq!(Variable::scalar(0.25).scalar_value(), Some(0.25));
        assert_eq!(Variable::vector("n", vec![1.0, 2.0]).scalar_value(), None);
        assert_eq!(Variable::text("1.0").scalar_value(), None);
    }

    #[test]
    fn test_dataset_access_searches_coords() {
        let mut ds = Dataset::new();
        ds.insert_var("rangex", Variable::scalar(100.0));
        ds.insert_coord("dimx", Variable::vector("dimx", vec![0.0, 1.0]));
        ds.insert_attr("Creator", "gxsm");

        assert!(ds.variable("rangex").is_some());
        assert!(ds.variable("dimx").is_some());
        assert!(ds.variable("dimz").is_none());
        assert_eq!(ds.attribute("Creator").and_then(|v| v.as_str()), Some("gxsm"));
        assert!(ds.attribute("missing").is_none());
    }

    #[test]
    fn test_attr_value_display() {
        assert_eq!(AttrValue::List(vec![1.0, 2.5]).to_string(), "[1, 2.5]");
        assert_eq!(AttrValue::Int(3).to_string(), "3");
    }
}
