use crate::types::{FileAttribs, ScanDirection, FILENAME_ATTRIB_SEPARATOR, MAIN_FILE_MARKER};
use crate::{GxsmError, Result};
use std::path::Path;

/// Decode a GXSM filename of the form `<base>[-M]-<direction>-<channel>.<ext>`.
///
/// Directory components and the extension are ignored. Three tokens give a
/// regular channel file; four tokens are only accepted when the second one is
/// the `M` marker, which flags the main file of the recording.
pub fn parse_gxsm_filename(filename: &str) -> Result<FileAttribs> {
    let stem = Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| GxsmError::FilenameFormat(format!("no file name in '{filename}'")))?;

    let tokens: Vec<&str> = stem.split(FILENAME_ATTRIB_SEPARATOR).collect();
    if tokens.iter().any(|t| t.is_empty()) {
        return Err(GxsmError::FilenameFormat(format!(
            "empty component in '{stem}'"
        )));
    }

    let (file_base, direction, channel, is_main_file) = match tokens.as_slice() {
        [base, direction, channel] => (*base, *direction, *channel, false),
        [base, marker, direction, channel] if *marker == MAIN_FILE_MARKER => {
            (*base, *direction, *channel, true)
        }
        [_, marker, _, _] => {
            return Err(GxsmError::FilenameFormat(format!(
                "expected main file marker '{MAIN_FILE_MARKER}' in '{stem}', found '{marker}'"
            )))
        }
        _ => {
            return Err(GxsmError::FilenameFormat(format!(
                "expected 3 or 4 '{FILENAME_ATTRIB_SEPARATOR}'-separated components in '{stem}', found {}",
                tokens.len()
            )))
        }
    };

    Ok(FileAttribs {
        file_base: file_base.to_string(),
        scan_direction: ScanDirection::from_token(direction),
        channel: channel.to_string(),
        is_main_file,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_main_file() {
        let attribs = parse_gxsm_filename("r19_AuNP_LN048-M-Xp-Topo.nc").unwrap();
        assert_eq!(attribs.file_base, "r19_AuNP_LN048");
        assert_eq!(attribs.channel, "Topo");
        assert_eq!(attribs.scan_direction, ScanDirection::Backward);
        assert!(attribs.is_main_file);
        assert_eq!(attribs.unique_channel_name(), "Topo-Xp");
    }

    #[test]
    fn test_non_main_file() {
        let attribs = parse_gxsm_filename("r19_AuNP_LN048-Xm-ADC0mITunnel.nc").unwrap();
        assert_eq!(attribs.file_base, "r19_AuNP_LN048");
        assert_eq!(attribs.channel, "ADC0mITunnel");
        assert_eq!(attribs.scan_direction, ScanDirection::Forward);
        assert!(!attribs.is_main_file);
        assert_eq!(attribs.unique_channel_name(), "ADC0mITunnel-Xm");
    }

    #[test]
    fn test_directory_is_stripped() {
        let attribs =
            parse_gxsm_filename("./data/multichannel_file/r19_AuNP_LN084-Xm-ADC0mITunnel.nc")
                .unwrap();
        assert_eq!(attribs.file_base, "r19_AuNP_LN084");
        assert_eq!(attribs.channel, "ADC0mITunnel");
    }

    #[test]
    fn test_wrong_token_counts() {
        for name in ["scan.nc", "scan-Xp.nc", "a-M-Xp-Topo-extra.nc", "a-b-c-d-e-f.nc"] {
            assert!(
                matches!(parse_gxsm_filename(name), Err(GxsmError::FilenameFormat(_))),
                "{name} should be rejected"
            );
        }
    }

    #[test]
    fn test_four_tokens_without_marker() {
        let result = parse_gxsm_filename("scan-Q-Xp-Topo.nc");
        assert!(matches!(result, Err(GxsmError::FilenameFormat(_))));
    }

    #[test]
    fn test_empty_component() {
        let result = parse_gxsm_filename("scan--Topo.nc");
        assert!(matches!(result, Err(GxsmError::FilenameFormat(_))));
    }

    #[test]
    fn test_unique_names_do_not_collide() {
        let files = [
            "chigwell009-M-Xp-Topo.nc",
            "chigwell009-Xm-Topo.nc",
            "chigwell009-Xp-ADC1.nc",
            "chigwell009-Xm-ADC1.nc",
        ];
        let mut names: Vec<String> = files
            .iter()
            .map(|f| parse_gxsm_filename(f).unwrap().unique_channel_name())
            .collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), files.len());
    }
}
