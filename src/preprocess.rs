//! GXSM dataset preprocessing
//!
//! A GXSM NetCDF file stores one channel as a 4-D `FloatField`
//! `(time, value, dimy, dimx)` of raw counts next to its `dz` scale, and
//! writes most of the instrument state as extra data variables instead of
//! attributes. The stages here turn that into a single 2-D field per
//! channel with physical axes, and optionally fold the metadata variables
//! into top-level attributes:
//!
//! 1. [`clean_floatfield`] - `FloatField * dz`, reduced to `(dimy, dimx)`
//! 2. [`clean_kept_coords`] - lateral axes scaled with the topography factor
//! 3. [`convert_floatfield`] - channel conversion and renaming
//! 4. [`clean_up_metadata`] - metadata variables become attributes

use crate::conversion::{resolve_channel_config, TOPO_CONVERSION_FACTOR, TOPO_UNITS};
use crate::parser::parse_gxsm_filename;
use crate::types::{AttrValue, ChannelConfig, ChannelOverrideMap, Dataset, Variable, VariableData};
use crate::{GxsmError, Result};
use ndarray::Axis;
use std::collections::BTreeMap;

/// Raw counts of the recorded channel
pub const DATA_VAR: &str = "FloatField";
/// Per-sample scale paired with [`DATA_VAR`]
pub const DATA_DIFFERENTIAL: &str = "dz";
/// Intermediate 2-D product written by [`clean_floatfield`]
pub const SCALED_FIELD_VAR: &str = "ScaledField";

/// Data variables never folded into attributes
pub const KEPT_DATA_VARS: &[&str] = &[DATA_VAR, DATA_DIFFERENTIAL, SCALED_FIELD_VAR];
/// Coordinates that remain axes of the cleaned dataset
pub const KEPT_COORDS: &[&str] = &["dimx", "dimy"];

pub const UNITS_ATTR: &str = "units";

/// Options for turning one opened GXSM file into a cleaned dataset
#[derive(Debug, Clone)]
pub struct ReadOptions {
    /// Convert into physical units; otherwise data stays in raw counts
    pub use_physical_units: bool,
    /// Fall back to the conversion factor stored in the file itself
    pub allow_convert_from_metadata: bool,
    /// Fold metadata variables into attributes
    pub simplify_metadata: bool,
    /// Additional data variables to keep when simplifying
    pub extra_kept_vars: Vec<String>,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            use_physical_units: true,
            allow_convert_from_metadata: false,
            simplify_metadata: true,
            extra_kept_vars: Vec::new(),
        }
    }
}

/// Multiply `FloatField` by `dz` and keep the `(dimy, dimx)` plane of the
/// first record as [`SCALED_FIELD_VAR`].
pub fn clean_floatfield(mut dataset: Dataset) -> Result<Dataset> {
    let raw = dataset.data_vars.get(DATA_VAR).ok_or_else(|| {
        GxsmError::DataFormat(format!("no '{DATA_VAR}' variable, not a GXSM file"))
    })?;
    let differential = dataset.data_vars.get(DATA_DIFFERENTIAL).ok_or_else(|| {
        GxsmError::DataFormat(format!(
            "no '{DATA_DIFFERENTIAL}' variable, not a GXSM file"
        ))
    })?;

    let raw_values = raw
        .values()
        .ok_or_else(|| GxsmError::DataFormat(format!("'{DATA_VAR}' is not numeric")))?;
    let differential_values = differential.values().ok_or_else(|| {
        GxsmError::DataFormat(format!("'{DATA_DIFFERENTIAL}' is not numeric"))
    })?;

    let shape = raw_values.shape().to_vec();
    if shape.len() != 4 || raw.dims.len() != 4 {
        return Err(GxsmError::DataFormat(format!(
            "'{DATA_VAR}' should be 4-D (time, value, dimy, dimx), found shape {shape:?}"
        )));
    }
    if shape[0] == 0 || shape[1] == 0 {
        return Err(GxsmError::DataFormat(format!(
            "'{DATA_VAR}' holds no record, shape {shape:?}"
        )));
    }
    if shape[0] > 1 || shape[1] > 1 {
        log::debug!(
            "'{DATA_VAR}' has {}x{} records, keeping the first",
            shape[0],
            shape[1]
        );
    }

    let differential_view = differential_values
        .broadcast(raw_values.raw_dim())
        .ok_or_else(|| {
            GxsmError::DataFormat(format!(
                "'{DATA_DIFFERENTIAL}' shape {:?} does not match '{DATA_VAR}' shape {shape:?}",
                differential_values.shape()
            ))
        })?;

    let product = raw_values * &differential_view;
    let plane = product
        .index_axis(Axis(0), 0)
        .index_axis(Axis(0), 0)
        .to_owned();

    let field = Variable {
        dims: raw.dims[2..].to_vec(),
        data: VariableData::Numeric(plane),
        attrs: raw.attrs.clone(),
    };
    dataset.insert_var(SCALED_FIELD_VAR, field);

    Ok(dataset)
}

/// Scale the kept spatial coordinates into topography units.
///
/// The lateral axes always use the topography scale, whichever channel the
/// file holds.
pub fn clean_kept_coords(mut dataset: Dataset) -> Dataset {
    for name in KEPT_COORDS {
        match dataset.coords.get_mut(*name) {
            Some(coord) => {
                if let VariableData::Numeric(values) = &mut coord.data {
                    values.mapv_inplace(|v| v * TOPO_CONVERSION_FACTOR);
                }
                coord
                    .attrs
                    .insert(UNITS_ATTR.to_string(), AttrValue::from(TOPO_UNITS));
            }
            None => log::warn!("Coordinate '{name}' not found, left unscaled"),
        }
    }
    dataset
}

/// Apply the channel's conversion factor and store the field under its
/// output name; the raw variables are dropped.
pub fn convert_floatfield(mut dataset: Dataset, config: &ChannelConfig) -> Result<Dataset> {
    let mut field = dataset.remove_var(SCALED_FIELD_VAR).ok_or_else(|| {
        GxsmError::DataFormat(format!(
            "no '{SCALED_FIELD_VAR}' variable, the raw field was not reduced"
        ))
    })?;

    if let VariableData::Numeric(values) = &mut field.data {
        let factor = config.conversion_factor;
        values.mapv_inplace(|v| v * factor);
    }
    field
        .attrs
        .insert(UNITS_ATTR.to_string(), AttrValue::from(config.units.as_str()));

    dataset.remove_var(DATA_VAR);
    dataset.remove_var(DATA_DIFFERENTIAL);
    dataset.insert_var(&config.name, field);

    Ok(dataset)
}

fn insert_flattened(attrs: &mut BTreeMap<String, AttrValue>, name: String, variable: &Variable) {
    let value = variable.to_attr_value();
    if let Some(previous) = attrs.insert(name.clone(), value) {
        log::debug!("Attribute '{name}' ({previous}) replaced by variable of the same name");
    }
}

/// Move every data variable outside [`KEPT_DATA_VARS`] and `extra_kept_vars`,
/// and every coordinate outside [`KEPT_COORDS`], into top-level attributes.
pub fn clean_up_metadata<S: AsRef<str>>(mut dataset: Dataset, extra_kept_vars: &[S]) -> Dataset {
    let is_kept = |name: &str| {
        KEPT_DATA_VARS.contains(&name) || extra_kept_vars.iter().any(|k| k.as_ref() == name)
    };

    let folded_vars: Vec<String> = dataset
        .data_vars
        .keys()
        .filter(|name| !is_kept(name.as_str()))
        .cloned()
        .collect();
    for name in folded_vars {
        if let Some(variable) = dataset.data_vars.remove(&name) {
            insert_flattened(&mut dataset.attrs, name, &variable);
        }
    }

    let folded_coords: Vec<String> = dataset
        .coords
        .keys()
        .filter(|name| !KEPT_COORDS.contains(&name.as_str()))
        .cloned()
        .collect();
    for name in folded_coords {
        if let Some(coord) = dataset.coords.remove(&name) {
            insert_flattened(&mut dataset.attrs, name, &coord);
        }
    }

    dataset
}

/// Run all stages with an already resolved channel config
pub fn preprocess_with_config(
    dataset: Dataset,
    config: &ChannelConfig,
    options: &ReadOptions,
) -> Result<Dataset> {
    let dataset = clean_floatfield(dataset)?;
    let dataset = clean_kept_coords(dataset);
    let dataset = convert_floatfield(dataset, config)?;

    if !options.simplify_metadata {
        return Ok(dataset);
    }

    let mut kept = options.extra_kept_vars.clone();
    kept.push(config.name.clone());
    Ok(clean_up_metadata(dataset, &kept))
}

/// Clean one opened GXSM file.
///
/// `filename` supplies the channel and scan direction; the channel config is
/// resolved against the untouched dataset before any stage runs, since the
/// metadata fallback reads variables that flattening removes.
pub fn preprocess(
    dataset: Dataset,
    filename: &str,
    overrides: Option<&ChannelOverrideMap>,
    options: &ReadOptions,
) -> Result<Dataset> {
    let attribs = parse_gxsm_filename(filename)?;
    let config = resolve_channel_config(
        overrides,
        &dataset,
        &attribs,
        options.use_physical_units,
        options.allow_convert_from_metadata,
    )?;

    log::debug!(
        "Preprocessing {} (main file: {}) as '{}' [{}]",
        filename,
        attribs.is_main_file,
        config.name,
        config.units
    );

    preprocess_with_config(dataset, &config, options)
}
