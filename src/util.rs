//! Utility functions
use crate::error::{DeviceError, Result};
use log::trace;
use std::{
    collections::BTreeSet,
    fs,
    io::prelude::*,
    path::Path,
};

/// Technically Linux requires sysfs to be at `/sys`, calling it a system
/// configuration error otherwise.
///
/// Tests and chroots use [`crate::system::SystemRoot`] to point elsewhere.
pub const SYSFS_PATH: &str = "/sys";

/// Device file location. Same reasons as [`SYSFS_PATH`].
pub const DEV_PATH: &str = "/dev";

fn attribute_error(path: &Path, source: std::io::Error) -> DeviceError {
    DeviceError::Attribute {
        path: path.display().to_string(),
        source,
    }
}

/// Read the whole attribute file at `path`
pub fn read_attr(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| attribute_error(path, e))
}

/// Write `value` to the attribute file at `path`.
///
/// sysfs attributes are never created from userspace, so the file must
/// already exist.
pub fn write_attr(path: &Path, value: &str) -> Result<()> {
    trace!("Setting {} to {}", path.display(), value);
    let mut f = fs::OpenOptions::new()
        .write(true)
        .truncate(true)
        .open(path)
        .map_err(|e| attribute_error(path, e))?;
    f.write_all(value.as_bytes())
        .map_err(|e| attribute_error(path, e))
}

/// Parse a trimmed integer attribute
///
/// # Arguments
///
/// - `name`, attribute name, used for errors.
/// - `value`, raw file contents.
pub fn parse_int(name: &str, value: &str) -> Result<i32> {
    value
        .trim()
        .parse::<i32>()
        .map_err(|_| DeviceError::InvalidValue {
            attribute: name.into(),
            value: value.trim().into(),
        })
}

/// Parse a whitespace separated set, such as `none [timer] heartbeat`.
///
/// Returns the entries with brackets stripped, and the bracketed entry if
/// there was one.
pub fn parse_set(value: &str) -> (BTreeSet<String>, Option<String>) {
    let mut set = BTreeSet::new();
    let mut selected = None;
    for token in value.split_whitespace() {
        match token.strip_prefix('[').and_then(|t| t.strip_suffix(']')) {
            Some(inner) => {
                selected = Some(inner.to_owned());
                set.insert(inner.to_owned());
            }
            None => {
                set.insert(token.to_owned());
            }
        }
    }
    (set, selected)
}

/// Trailing decimal number of a device directory name, `sensor12` -> `12`.
pub fn trailing_index(name: &str) -> Option<u32> {
    let digits = name.len() - name.trim_end_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return None;
    }
    name[name.len() - digits..].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_with_selection() {
        let (set, selected) = parse_set("none [timer] heartbeat\n");
        assert_eq!(selected.as_deref(), Some("timer"));
        assert!(set.contains("timer"));
        assert!(set.contains("none"));
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn set_without_selection() {
        let (set, selected) = parse_set("run-forever run-timed stop");
        assert_eq!(selected, None);
        assert_eq!(set.len(), 3);
        let (set, _) = parse_set("");
        assert!(set.is_empty());
    }

    #[test]
    fn ints() {
        assert_eq!(parse_int("position", "-42\n").unwrap(), -42);
        assert!(matches!(
            parse_int("position", "abc"),
            Err(DeviceError::InvalidValue { .. })
        ));
    }

    #[test]
    fn index() {
        assert_eq!(trailing_index("sensor12"), Some(12));
        assert_eq!(trailing_index("motor0"), Some(0));
        assert_eq!(trailing_index("ev3:red:left"), None);
    }
}
