use std::fmt;

/// Error kinds raised while decoding GXSM files
#[derive(Debug)]
pub enum GxsmError {
    /// Filename does not follow `<base>[-M]-<direction>-<channel>.<ext>`
    FilenameFormat(String),
    /// Physical units requested but no complete source of factor and units exists
    MissingConfig(String),
    /// Metadata fallback requested but the channel's backing variable is absent
    UnresolvedChannel(String),
    /// Missing raw variables, or a spec-file row that fails to parse
    DataFormat(String),
    /// I/O errors
    Io(std::io::Error),
    /// Channel override document could not be decoded
    Json(serde_json::Error),
    /// Channels config file is not valid TOML for the override map
    Toml(toml::de::Error),
    /// Export format error
    Export(String),
}

impl fmt::Display for GxsmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GxsmError::FilenameFormat(msg) => write!(f, "Invalid filename: {}", msg),
            GxsmError::MissingConfig(msg) => write!(f, "Missing channel config: {}", msg),
            GxsmError::UnresolvedChannel(msg) => write!(f, "Unresolved channel: {}", msg),
            GxsmError::DataFormat(msg) => write!(f, "Data format error: {}", msg),
            GxsmError::Io(err) => write!(f, "I/O error: {}", err),
            GxsmError::Json(err) => write!(f, "JSON error: {}", err),
            GxsmError::Toml(err) => write!(f, "TOML error: {}", err),
            GxsmError::Export(msg) => write!(f, "Export error: {}", msg),
        }
    }
}

impl std::error::Error for GxsmError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GxsmError::Io(err) => Some(err),
            GxsmError::Json(err) => Some(err),
            GxsmError::Toml(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for GxsmError {
    fn from(err: std::io::Error) -> Self {
        GxsmError::Io(err)
    }
}

impl From<serde_json::Error> for GxsmError {
    fn from(err: serde_json::Error) -> Self {
        GxsmError::Json(err)
    }
}

impl From<toml::de::Error> for GxsmError {
    fn from(err: toml::de::Error) -> Self {
        GxsmError::Toml(err)
    }
}

#[cfg(feature = "csv")]
impl From<csv::Error> for GxsmError {
    fn from(err: csv::Error) -> Self {
        GxsmError::Export(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GxsmError>;
