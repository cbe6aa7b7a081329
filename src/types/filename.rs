use serde::Serialize;
use std::fmt;

/// Separator between the components of a GXSM filename
pub const FILENAME_ATTRIB_SEPARATOR: &str = "-";

/// Token marking the file of a recording set that carries the shared metadata
pub const MAIN_FILE_MARKER: &str = "M";

/// Sweep direction of one recorded pass.
///
/// GXSM writes `Xm` for the forward (left to right) sweep and `Xp` for the
/// backward one. Unknown tokens are kept verbatim so the output name stays
/// stable for whatever the instrument wrote.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum ScanDirection {
    Forward,
    Backward,
    Other(String),
}

impl ScanDirection {
    pub const FORWARD_TOKEN: &'static str = "Xm";
    pub const BACKWARD_TOKEN: &'static str = "Xp";

    pub fn from_token(token: &str) -> Self {
        match token {
            Self::FORWARD_TOKEN => ScanDirection::Forward,
            Self::BACKWARD_TOKEN => ScanDirection::Backward,
            other => ScanDirection::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ScanDirection::Forward => Self::FORWARD_TOKEN,
            ScanDirection::Backward => Self::BACKWARD_TOKEN,
            ScanDirection::Other(token) => token,
        }
    }
}

impl fmt::Display for ScanDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attributes decoded from a GXSM filename of the form
/// `<base>[-M]-<direction>-<channel>.<ext>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileAttribs {
    pub file_base: String,
    pub scan_direction: ScanDirection,
    /// Raw channel identifier, e.g. `Topo` or `ADC0mITunnel`
    pub channel: String,
    /// Only the `-M-` file of a multi-file recording carries the bulk of the metadata
    pub is_main_file: bool,
}

impl FileAttribs {
    /// Output name for this file's channel, unique per scan direction
    pub fn unique_channel_name(&self) -> String {
        unique_channel_name(&self.channel, &self.scan_direction)
    }
}

/// The same channel is recorded once per scan direction, so the direction is
/// appended to keep merged names apart.
pub fn unique_channel_name(channel: &str, scan_direction: &ScanDirection) -> String {
    format!(
        "{}{}{}",
        channel,
        FILENAME_ATTRIB_SEPARATOR,
        scan_direction.as_str()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_direction_tokens() {
        assert_eq!(ScanDirection::from_token("Xm"), ScanDirection::Forward);
        assert_eq!(ScanDirection::from_token("Xp"), ScanDirection::Backward);
        assert_eq!(
            ScanDirection::from_token("Ym"),
            ScanDirection::Other("Ym".to_string())
        );
        assert_eq!(ScanDirection::Other("Ym".to_string()).to_string(), "Ym");
    }

    #[test]
    fn test_unique_channel_name() {
        assert_eq!(
            unique_channel_name("Topo", &ScanDirection::Backward),
            "Topo-Xp"
        );
        assert_eq!(
            unique_channel_name("ADC0mITunnel", &ScanDirection::Forward),
            "ADC0mITunnel-Xm"
        );
    }

    #[test]
    fn test_unique_channel_name_differs_per_direction() {
        let forward = unique_channel_name("ADC1", &ScanDirection::Forward);
        let backward = unique_channel_name("ADC1", &ScanDirection::Backward);
        assert_ne!(forward, backward);
    }
}
