use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Resolved output description for one channel of one file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelConfig {
    /// Output variable name, always suffixed with the scan direction
    pub name: String,
    pub units: String,
    /// Raw-to-physical multiplier
    pub conversion_factor: f64,
}

impl ChannelConfig {
    pub fn new(name: impl Into<String>, conversion_factor: f64, units: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            units: units.into(),
            conversion_factor,
        }
    }
}

/// Caller-supplied partial settings for one raw channel
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelOverride {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub conversion_factor: Option<f64>,
    #[serde(default)]
    pub units: Option<String>,
}

/// Raw channel key -> override. In a channels config file:
///
/// ```toml
/// [ADC1]
/// name = "Bias"
/// conversion_factor = 10.0
/// units = "V"
/// ```
pub type ChannelOverrideMap = BTreeMap<String, ChannelOverride>;

/// Decode a channel override map from a TOML channels config
pub fn parse_channel_overrides_toml(text: &str) -> Result<ChannelOverrideMap> {
    let overrides: ChannelOverrideMap = toml::from_str(text)?;
    Ok(overrides)
}

/// Decode a channel override map from a JSON document
pub fn parse_channel_overrides(json: &str) -> Result<ChannelOverrideMap> {
    let overrides: ChannelOverrideMap = serde_json::from_str(json)?;
    Ok(overrides)
}

/// Read a channel override map from a file: `.toml` files are channels
/// configs, anything else is decoded as JSON.
pub fn load_channel_overrides(path: &Path) -> Result<ChannelOverrideMap> {
    let text = std::fs::read_to_string(path)?;
    let is_toml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    let overrides = if is_toml {
        parse_channel_overrides_toml(&text)?
    } else {
        parse_channel_overrides(&text)?
    };
    log::debug!(
        "Loaded {} channel override(s) from {}",
        overrides.len(),
        path.display()
    );
    Ok(overrides)
}
