//! Version naming of the output files.
//!
//! An output file carries a `_V<n>` suffix at the end of its stem. Processing a file
//! that already has one bumps the number, processing a file without one starts at `V1`.

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

static VERSION_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"_V([0-9]+)$").expect("valid version pattern"));

/// The renamed file and the version tag it belongs to.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct VersionedName {
    /// The new file name, extension included.
    pub file_name: String,
    /// `V<n>`, also used as the directory of the file in the output archive.
    pub tag: String,
}

/// Computes the next version of a file name.
///
/// ```
/// use ads_factors::rename_file;
///
/// let v = rename_file("report.csv");
/// assert_eq!(v.file_name, "report_V1.csv");
/// assert_eq!(v.tag, "V1");
///
/// let v = rename_file("report_V3.csv");
/// assert_eq!(v.file_name, "report_V4.csv");
/// assert_eq!(v.tag, "V4");
/// ```
pub fn rename_file(file_name: &str) -> VersionedName {
    let (stem, ext) = split_extension(file_name);
    let (base, version) = match VERSION_SUFFIX.captures(stem) {
        Some(caps) => {
            let whole = caps.get(0).map(|m| m.start()).unwrap_or(stem.len());
            let digits = caps.get(1).map(|m| m.as_str()).unwrap_or("0");
            (&stem[..whole], increment_decimal(digits))
        }
        None => (stem, "1".to_string()),
    };
    let res = VersionedName {
        file_name: format!("{}_V{}{}", base, version, ext),
        tag: format!("V{}", version),
    };
    debug!("rename_file: {:?} -> {:?}", file_name, res);
    res
}

/// Splits a file name into its stem and its extension, the dot being kept with the extension.
///
/// Leading dots do not start an extension: `.env` has no extension.
fn split_extension(file_name: &str) -> (&str, &str) {
    let first_non_dot = file_name
        .find(|c: char| c != '.')
        .unwrap_or(file_name.len());
    match file_name.rfind('.') {
        Some(idx) if idx > first_non_dot => file_name.split_at(idx),
        _ => (file_name, ""),
    }
}

/// Adds one to a string of ASCII digits, without any size limit.
fn increment_decimal(digits: &str) -> String {
    let trimmed = digits.trim_start_matches('0');
    let mut bytes: Vec<u8> = trimmed.bytes().collect();
    let mut carry = true;
    for b in bytes.iter_mut().rev() {
        if !carry {
            break;
        }
        if *b == b'9' {
            *b = b'0';
        } else {
            *b += 1;
            carry = false;
        }
    }
    if carry {
        bytes.insert(0, b'1');
    }
    String::from_utf8(bytes).unwrap_or_else(|_| "1".to_string())
}
