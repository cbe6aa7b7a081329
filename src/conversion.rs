//! Channel-aware conversion of raw GXSM counter data
//!
//! GXSM stores each channel as raw DAC counts. Whether (and how) a channel is
//! scaled into physical units depends on the caller's override map, on
//! conversion factors embedded in the file itself and on the built-in
//! topography defaults. Every branch ends in one [`Resolution`] so each case
//! can be checked on its own.

use crate::types::{
    unique_channel_name, ChannelConfig, ChannelOverride, ChannelOverrideMap, DatasetAccess,
    FileAttribs,
};
use crate::{GxsmError, Result};

/// Units reported when data is kept as raw counts
pub const DEFAULT_UNITS: &str = "raw";
pub const DEFAULT_CONVERSION_FACTOR: f64 = 1.0;

/// The surface-height channel
pub const CHANNEL_TOPO: &str = "Topo";
pub const TOPO_UNITS: &str = "nm";
/// GXSM scales topography and the lateral axes in Angstrom
pub const TOPO_CONVERSION_FACTOR: f64 = 0.1;

/// Where a channel's embedded conversion factor lives in the file
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelMetadata {
    pub variable_name: &'static str,
    pub units: &'static str,
}

const TUNNEL_CURRENT_GAIN: ChannelMetadata = ChannelMetadata {
    variable_name: "sranger_mk2_hwi_XSM_Inst_nAmpere2V",
    units: "nA",
};

/// Channels whose conversion factor GXSM records alongside the data
pub static CHANNEL_METADATA_TABLE: &[(&str, ChannelMetadata)] = &[
    ("ADC0", TUNNEL_CURRENT_GAIN),
    ("ADC0mITunnel", TUNNEL_CURRENT_GAIN),
];

/// Look up a raw channel in [`CHANNEL_METADATA_TABLE`]
pub fn channel_metadata(channel: &str) -> Option<&'static ChannelMetadata> {
    CHANNEL_METADATA_TABLE
        .iter()
        .find(|(key, _)| *key == channel)
        .map(|(_, metadata)| metadata)
}

/// Outcome of deciding how one channel is converted
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Raw counts, factor 1.0
    Raw,
    /// Factor and units both given by the caller
    ExplicitPhysical { factor: f64, units: String },
    /// Factor read from a variable stored in the file
    MetadataPhysical {
        variable: &'static str,
        factor: f64,
        units: &'static str,
    },
    /// Built-in topography scaling
    BuiltinDefault { factor: f64, units: &'static str },
}

impl Resolution {
    pub fn factor(&self) -> f64 {
        match self {
            Resolution::Raw => DEFAULT_CONVERSION_FACTOR,
            Resolution::ExplicitPhysical { factor, .. }
            | Resolution::MetadataPhysical { factor, .. }
            | Resolution::BuiltinDefault { factor, .. } => *factor,
        }
    }

    pub fn units(&self) -> &str {
        match self {
            Resolution::Raw => DEFAULT_UNITS,
            Resolution::ExplicitPhysical { units, .. } => units.as_str(),
            Resolution::MetadataPhysical { units, .. } | Resolution::BuiltinDefault { units, .. } => {
                *units
            }
        }
    }
}

/// Decide the conversion of `channel`.
///
/// Raw mode ignores overrides and metadata entirely. In physical mode a
/// complete override wins; a half override (factor without units or the
/// reverse) is rejected. Without one, the file's embedded factor is used when
/// allowed, then the topography default, and anything else is an error.
pub fn resolve_conversion<D: DatasetAccess + ?Sized>(
    channel_override: Option<&ChannelOverride>,
    dataset: &D,
    channel: &str,
    use_physical_units: bool,
    allow_convert_from_metadata: bool,
) -> Result<Resolution> {
    if !use_physical_units {
        return Ok(Resolution::Raw);
    }

    let factor = channel_override.and_then(|o| o.conversion_factor);
    let units = channel_override.and_then(|o| o.units.as_deref());

    match (factor, units) {
        (Some(factor), Some(units)) => {
            return Ok(Resolution::ExplicitPhysical {
                factor,
                units: units.to_string(),
            })
        }
        (Some(_), None) => {
            return Err(GxsmError::MissingConfig(format!(
                "channel '{channel}' has a conversion_factor but no units"
            )))
        }
        (None, Some(_)) => {
            return Err(GxsmError::MissingConfig(format!(
                "channel '{channel}' has units but no conversion_factor"
            )))
        }
        (None, None) => {}
    }

    if allow_convert_from_metadata {
        if let Some(metadata) = channel_metadata(channel) {
            let variable = dataset.variable(metadata.variable_name).ok_or_else(|| {
                GxsmError::UnresolvedChannel(format!(
                    "channel '{channel}' expects variable '{}' in the file",
                    metadata.variable_name
                ))
            })?;
            let factor = variable.scalar_value().ok_or_else(|| {
                GxsmError::DataFormat(format!(
                    "variable '{}' does not hold a single number",
                    metadata.variable_name
                ))
            })?;
            return Ok(Resolution::MetadataPhysical {
                variable: metadata.variable_name,
                factor,
                units: metadata.units,
            });
        }
    }

    if channel == CHANNEL_TOPO {
        return Ok(Resolution::BuiltinDefault {
            factor: TOPO_CONVERSION_FACTOR,
            units: TOPO_UNITS,
        });
    }

    Err(GxsmError::MissingConfig(format!(
        "no conversion_factor and units for channel '{channel}'{}",
        if allow_convert_from_metadata {
            " and no metadata conversion is known for it"
        } else {
            " (metadata conversion disabled)"
        }
    )))
}

/// Output name before the scan direction suffix
pub fn resolve_name(channel_override: Option<&ChannelOverride>, channel: &str) -> String {
    if let Some(name) = channel_override.and_then(|o| o.name.as_ref()) {
        name.clone()
    } else if channel == CHANNEL_TOPO {
        CHANNEL_TOPO.to_string()
    } else {
        channel.to_string()
    }
}

/// Resolve name, units and factor for the channel of one file
pub fn resolve_channel_config<D: DatasetAccess + ?Sized>(
    overrides: Option<&ChannelOverrideMap>,
    dataset: &D,
    attribs: &FileAttribs,
    use_physical_units: bool,
    allow_convert_from_metadata: bool,
) -> Result<ChannelConfig> {
    let channel_override = overrides.and_then(|map| map.get(&attribs.channel));
    let resolution = resolve_conversion(
        channel_override,
        dataset,
        &attribs.channel,
        use_physical_units,
        allow_convert_from_metadata,
    )?;
    let name = unique_channel_name(
        &resolve_name(channel_override, &attribs.channel),
        &attribs.scan_direction,
    );

    log::debug!(
        "Channel '{}' -> '{}': {:?}",
        attribs.channel,
        name,
        resolution
    );

    Ok(ChannelConfig::new(
        name,
        resolution.factor(),
        resolution.units(),
    ))
}
