use anyhow::{Context, Result};
use clap::{Arg, Command};
use glob::glob;
use gxsmread::{
    export_spec, load_channel_overrides, open_spec, parse_gxsm_filename, resolve_channel_config,
    ChannelOverrideMap, Dataset, ExportOptions, SpecRecord,
};
use std::path::{Path, PathBuf};

/// Kinds of input the binary knows how to handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputKind {
    Scan,
    VectorProbe,
}

fn input_kind(path: &Path) -> Option<InputKind> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "nc" => Some(InputKind::Scan),
        "vpdata" => Some(InputKind::VectorProbe),
        _ => None,
    }
}

/// Expand glob patterns; plain paths are passed through unchanged.
fn expand_input_paths(patterns: &[&String]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for pattern in patterns {
        if pattern.contains('*') || pattern.contains('?') {
            let matched = glob(pattern.as_str())
                .with_context(|| format!("Invalid glob pattern '{pattern}'"))?
                .collect::<std::result::Result<Vec<_>, _>>()
                .with_context(|| format!("Error expanding glob pattern '{pattern}'"))?;
            log::debug!("Glob pattern '{pattern}' matched {} files", matched.len());
            paths.extend(matched);
        } else {
            paths.push(PathBuf::from(pattern.as_str()));
        }
    }
    Ok(paths)
}

fn version_string() -> String {
    match option_env!("VERGEN_GIT_SHA") {
        Some(sha) => format!("{} ({})", env!("CARGO_PKG_VERSION"), sha),
        None => env!("CARGO_PKG_VERSION").to_string(),
    }
}

fn build_command() -> Command {
    Command::new("gxsmread")
        .version(version_string())
        .about("Decode GXSM scan filenames and channel units, and parse .vpdata vector probe files.")
        .arg(
            Arg::new("files")
                .help("GXSM files to read (.nc scan files, .vpdata vector probe files, supports globbing)")
                .required(false)
                .num_args(1..)
                .index(1),
        )
        .arg(
            Arg::new("debug")
                .long("debug")
                .help("Enable debug output and detailed parsing information")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("csv")
                .long("csv")
                .help("Export vector probe data to CSV (creates <name>.csv and <name>.metadata.csv)")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Export vector probe data and metadata to a JSON file")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("output-dir")
                .long("output-dir")
                .help("Directory for output files (default: same as input file)")
                .value_name("DIR"),
        )
        .arg(
            Arg::new("raw")
                .long("raw")
                .help("Report scan channels in raw units instead of physical units")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help("Channels config with per-channel name, conversion_factor and units overrides (.toml, or JSON for any other extension)")
                .value_name("FILE"),
        )
}

fn init_logging(debug: bool) {
    let level = if debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp(None)
        .init();
}

fn describe_scan(
    path: &Path,
    overrides: Option<&ChannelOverrideMap>,
    use_physical_units: bool,
) -> Result<()> {
    let attribs = parse_gxsm_filename(&path.to_string_lossy())?;
    // No file contents are read here, so the metadata fallback has nothing to look at.
    let config = resolve_channel_config(
        overrides,
        &Dataset::new(),
        &attribs,
        use_physical_units,
        false,
    )?;

    println!("  Base:      {}", attribs.file_base);
    println!("  Direction: {}", attribs.scan_direction);
    println!("  Channel:   {}", attribs.channel);
    println!("  Main file: {}", attribs.is_main_file);
    println!(
        "  Output:    {} [{}] x {}",
        config.name, config.units, config.conversion_factor
    );
    Ok(())
}

fn describe_spec(record: &SpecRecord) {
    println!(
        "  Columns:   {} ({} rows)",
        record.columns.len(),
        record.row_count()
    );
    for index in 0..record.columns.len() {
        if let Some(label) = record.column_label(index) {
            println!("    {label}");
        }
    }
    for (key, value) in record.metadata.to_map() {
        println!("  {key}: {value}");
    }
}

fn process_file(
    path: &Path,
    kind: InputKind,
    overrides: Option<&ChannelOverrideMap>,
    use_physical_units: bool,
    export_options: &ExportOptions,
) -> Result<()> {
    match kind {
        InputKind::Scan => describe_scan(path, overrides, use_physical_units),
        InputKind::VectorProbe => {
            let record = open_spec(path)?;
            describe_spec(&record);
            let report = export_spec(&record, path, export_options)?;
            for written in report.written() {
                println!("  Wrote:     {}", written.display());
            }
            Ok(())
        }
    }
}

fn main() -> Result<()> {
    let matches = build_command().get_matches();

    let debug = matches.get_flag("debug");
    init_logging(debug);

    let use_physical_units = !matches.get_flag("raw");
    let export_options = ExportOptions {
        csv: matches.get_flag("csv"),
        json: matches.get_flag("json"),
        output_dir: matches.get_one::<String>("output-dir").cloned(),
    };

    // Check if no files were provided and show help
    let file_patterns: Vec<&String> = match matches.get_many::<String>("files") {
        Some(files) => files.collect(),
        None => {
            build_command().print_help()?;
            println!();
            return Ok(());
        }
    };

    let overrides = match matches.get_one::<String>("config") {
        Some(config_path) => Some(
            load_channel_overrides(Path::new(config_path))
                .with_context(|| format!("Failed to load channel config '{config_path}'"))?,
        ),
        None => None,
    };

    log::debug!("Input patterns: {file_patterns:?}");

    let input_files = match expand_input_paths(&file_patterns) {
        Ok(files) => files,
        Err(e) => {
            eprintln!("Error expanding input paths: {e:#}");
            std::process::exit(1);
        }
    };

    let mut valid_paths = Vec::new();
    for path in input_files {
        if !path.exists() {
            log::warn!("File does not exist: {path:?}");
            continue;
        }
        match input_kind(&path) {
            Some(kind) => valid_paths.push((path, kind)),
            None => {
                let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("none");
                log::warn!("Skipping file with unsupported extension '{ext}': {path:?}");
            }
        }
    }

    log::debug!("Found {} valid files to process", valid_paths.len());

    if valid_paths.is_empty() {
        eprintln!("Error: No valid files found to process.");
        eprintln!("Supported extensions: .nc, .vpdata (case-insensitive)");
        eprintln!("Input patterns were: {file_patterns:?}");
        std::process::exit(1);
    }

    let mut processed_files = 0;
    for (index, (path, kind)) in valid_paths.iter().enumerate() {
        if index > 0 {
            println!();
        }

        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown");
        println!("Processing: {filename}");

        let result = process_file(
            path,
            *kind,
            overrides.as_ref(),
            use_physical_units,
            &export_options,
        )
        .with_context(|| format!("Error processing {filename}"));

        match result {
            Ok(()) => processed_files += 1,
            Err(e) => {
                eprintln!("{e:#}");
                eprintln!("Continuing with next file...");
            }
        }
    }

    if processed_files == 0 {
        eprintln!(
            "Error: No files were successfully processed out of {} files found.",
            valid_paths.len()
        );
        eprintln!("Use --debug flag for more detailed error information.");
        std::process::exit(1);
    }

    Ok(())
}
