//! This module provides access to the devices of a running ev3dev system
use crate::util::{DEV_PATH, SYSFS_PATH};
use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};

pub mod class;
pub mod devices;
pub mod port;

/// A set of entries read from a whitespace separated attribute, such as a
/// sensors `modes`.
pub type ModeSet = BTreeSet<String>;

/// Where the kernel filesystems are mounted.
///
/// Every device constructor has a `new_in` variant taking one of these, the
/// plain `new` uses [`SystemRoot::default`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemRoot {
    sys: PathBuf,
    dev: PathBuf,
}

impl SystemRoot {
    /// Use `sys` in place of `/sys` and `dev` in place of `/dev`
    pub fn new<S: Into<PathBuf>, D: Into<PathBuf>>(sys: S, dev: D) -> Self {
        Self {
            sys: sys.into(),
            dev: dev.into(),
        }
    }

    /// Root of sysfs
    pub fn sys(&self) -> &Path {
        &self.sys
    }

    /// Root of the device files
    pub fn dev(&self) -> &Path {
        &self.dev
    }

    /// Directory for a device class
    ///
    /// # Example
    ///
    /// `lego-sensor` -> `/sys/class/lego-sensor`
    pub fn class_dir(&self, class: &str) -> PathBuf {
        self.sys.join("class").join(class)
    }
}

impl Default for SystemRoot {
    fn default() -> Self {
        Self::new(SYSFS_PATH, DEV_PATH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_paths() {
        let root = SystemRoot::default();
        assert_eq!(root.sys(), Path::new("/sys"));
        assert_eq!(root.dev(), Path::new("/dev"));
        assert_eq!(
            root.class_dir("tacho-motor"),
            Path::new("/sys/class/tacho-motor")
        );
    }
}
