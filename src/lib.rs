//! GXSM Reader Library
//!
//! A Rust library for decoding GXSM scanning-probe-microscope files: the
//! naming convention of scan files, per-channel unit conversion, cleaning of
//! the raw scan field, and parsing of `.vpdata` vector probe ("spec") files.
//!
//! # Features
//!
//! - **`csv`** (default): Enable CSV export of vector probe data
//! - **`cli`** (default): Build the command-line interface binary
//!
//! # Quick Start
//!
//! Decode a scan filename and resolve its channel:
//! ```rust
//! use gxsmread::{parse_gxsm_filename, resolve_channel_config, Dataset};
//!
//! let attribs = parse_gxsm_filename("pf_W_0055-M-Xp-Topo.nc").unwrap();
//! assert!(attribs.is_main_file);
//!
//! let config = resolve_channel_config(None, &Dataset::new(), &attribs, true, false).unwrap();
//! assert_eq!(config.name, "Topo-Xp");
//! assert_eq!(config.units, "nm");
//! ```
//!
//! Parse a vector probe file:
//! ```rust,no_run
//! use gxsmread::open_spec;
//! use std::path::Path;
//!
//! let record = open_spec(Path::new("scan007-VP003-VP.vpdata")).unwrap();
//! println!("{} columns, {} rows", record.names().len(), record.row_count());
//! ```
//!
//! # Public API
//!
//! ## Parsing Functions
//! - [`parse_gxsm_filename`] - Split a scan filename into its attributes
//! - [`open_spec`] / [`parse_spec_str`] - Parse a vector probe file
//! - [`extract_raw_metadata`], [`parse_useful_metadata`], [`extract_data`] - Spec parsing stages
//!
//! ## Channel Configuration
//! - [`resolve_channel_config`] - Name, units and factor of one file's channel
//! - [`resolve_conversion`] - Conversion outcome without the name
//! - [`load_channel_overrides`] - Read a TOML or JSON channels config
//!
//! ## Preprocessing
//! - [`preprocess`] - Resolve and clean one opened scan file
//! - [`clean_floatfield`], [`clean_kept_coords`], [`convert_floatfield`], [`clean_up_metadata`]
//!
//! ## Export Functions
//! - [`export_spec`] - Export vector probe data to CSV and/or JSON
//! - [`compute_export_paths`] - Helper for consistent path computation

pub mod conversion;
pub mod error;
pub mod export;
pub mod parser;
pub mod preprocess;
pub mod types;

// Re-export everything from modules for convenience
#[allow(ambiguous_glob_reexports)]
pub use conversion::*;
#[allow(ambiguous_glob_reexports)]
pub use error::*;
#[allow(ambiguous_glob_reexports)]
pub use export::*;
#[allow(ambiguous_glob_reexports)]
pub use parser::*;
#[allow(ambiguous_glob_reexports)]
pub use preprocess::*;
#[allow(ambiguous_glob_reexports)]
pub use types::*;
