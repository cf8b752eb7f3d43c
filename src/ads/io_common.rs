use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use snafu::OptionExt;

use crate::ads::*;

pub fn simplify_file_name(path: &str) -> AdsResult<String> {
    let name = Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .context(MissingFileNameSnafu { path })?;
    Ok(name.to_string())
}

/// Resolves a path of the configuration file against the directory of that file.
pub fn resolve_path(root: Option<&Path>, path: &str) -> String {
    let p = Path::new(path);
    match root {
        Some(r) if p.is_relative() => r.join(p).display().to_string(),
        _ => path.to_string(),
    }
}

/// The name offered for the archive, e.g. `ADS_Multiplied_Output_03-09-2025.zip`.
pub fn archive_file_name(date: NaiveDate) -> String {
    format!("ADS_Multiplied_Output_{}.zip", date.format("%m-%d-%Y"))
}

/// Where to write the archive.
///
/// No path: the default name in the current directory. An existing directory, or a path
/// ending with a separator: the default name inside it. Anything else is used as is.
pub fn output_archive_path(out: Option<&str>, date: NaiveDate) -> PathBuf {
    match out {
        None => PathBuf::from(archive_file_name(date)),
        Some(o) if o.ends_with('/') || o.ends_with(std::path::MAIN_SEPARATOR) => {
            Path::new(o).join(archive_file_name(date))
        }
        Some(o) if Path::new(o).is_dir() => Path::new(o).join(archive_file_name(date)),
        Some(o) => PathBuf::from(o),
    }
}
