//! Abstractions for handling the ev3dev device classes
//!
//! A "class" is a directory in `/sys/class` grouping devices of one kind,
//! such as `lego-sensor` or `tacho-motor`. Every device in it is a directory
//! of attribute files, one per property.
//!
//! The entries of a class directory are named by the kernel in the order
//! devices show up, `sensor0`, `sensor1` and so on, so the name says nothing
//! about *which* device it is. Devices are instead found by reading their
//! `port_name` and `driver_name` attributes.
//!
//! See the [ev3dev driver docs][1] for details
//!
//! [1]: https://www.ev3dev.org/docs/drivers/
use std::path::{Path, PathBuf};

use log::{debug, trace};

use self::imp::Sealed;
use super::ModeSet;
use crate::{
    error::{DeviceError, Result},
    util::{parse_int, parse_set, read_attr, trailing_index, write_attr},
};

pub mod led;
pub mod motor;
pub mod power_supply;
pub mod sensor;

mod imp {
    use super::*;

    pub trait Sealed {}

    impl Sealed for GenericDevice {}
    impl Sealed for sensor::Sensor {}
    impl Sealed for motor::Motor {}
    impl Sealed for motor::DcMotor {}
    impl Sealed for motor::ServoMotor {}
    impl Sealed for led::Led {}
    impl Sealed for power_supply::PowerSupply {}
    impl Sealed for crate::system::port::LegoPort {}
}

/// A device in one of the ev3dev classes
///
/// Exposes raw attribute access, which every typed device is built on.
/// Attribute names are relative to [`Device::path`] and may contain a `/`,
/// as in `hold_pid/Kp`.
pub trait Device: Sealed {
    /// Full path to the device
    ///
    /// # Example
    ///
    /// `/sys/class/lego-sensor/sensor0`
    fn path(&self) -> &Path;

    /// Whether the device is still there.
    ///
    /// Unplugging a device removes its directory, after which every
    /// attribute access fails.
    fn connected(&self) -> bool {
        self.path().is_dir()
    }

    /// Number the kernel gave this device.
    ///
    /// # Errors
    ///
    /// If the device name doesn't end in a number, as LEDs don't.
    ///
    /// # Example
    ///
    /// `sensor3` -> `3`
    fn device_index(&self) -> Result<u32> {
        let name = self
            .path()
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        trailing_index(name).ok_or_else(|| DeviceError::InvalidValue {
            attribute: "device name".into(),
            value: name.into(),
        })
    }

    /// Attribute contents with surrounding whitespace removed
    fn get_attr_string(&self, name: &str) -> Result<String> {
        Ok(read_attr(&self.path().join(name))?.trim().to_owned())
    }

    /// First line of the attribute, without the line terminator
    fn get_attr_line(&self, name: &str) -> Result<String> {
        let value = read_attr(&self.path().join(name))?;
        Ok(value.lines().next().unwrap_or_default().to_owned())
    }

    /// Attribute parsed as an integer
    fn get_attr_int(&self, name: &str) -> Result<i32> {
        parse_int(name, &read_attr(&self.path().join(name))?)
    }

    /// Write `value` to the attribute. The attribute must already exist.
    fn set_attr_string(&self, name: &str, value: &str) -> Result<()> {
        write_attr(&self.path().join(name), value)
    }

    /// Write `value` to the attribute. The attribute must already exist.
    fn set_attr_int(&self, name: &str, value: i32) -> Result<()> {
        write_attr(&self.path().join(name), &value.to_string())
    }

    /// Attribute parsed as a whitespace separated set.
    ///
    /// The selected entry, written as `[entry]`, is included without the
    /// brackets.
    fn get_attr_set(&self, name: &str) -> Result<ModeSet> {
        Ok(parse_set(&read_attr(&self.path().join(name))?).0)
    }

    /// Like [`Device::get_attr_set`], also returning the selected entry if
    /// there is one.
    fn get_attr_set_selected(&self, name: &str) -> Result<(ModeSet, Option<String>)> {
        Ok(parse_set(&read_attr(&self.path().join(name))?))
    }

    /// The selected entry of a set attribute
    ///
    /// # Example
    ///
    /// `none [timer] heartbeat` -> `timer`
    fn get_attr_from_set(&self, name: &str) -> Result<String> {
        self.get_attr_set_selected(name)?
            .1
            .ok_or_else(|| DeviceError::NoSelection(name.into()))
    }
}

/// A device in any class, before it has been given a type
#[derive(Debug, Clone)]
pub struct GenericDevice {
    path: PathBuf,
}

impl GenericDevice {
    /// Find the first device in `class_dir` whose name starts with `prefix`
    /// and whose attributes match.
    ///
    /// Each entry in `matches` is an attribute name and the values it may
    /// have. An empty list of values accepts anything, but the attribute must
    /// still be readable.
    ///
    /// Candidates are checked in name order.
    ///
    /// # Errors
    ///
    /// - [`DeviceError::NotFound`] if nothing matches, or the class doesn't
    ///   exist.
    /// - If reading the class directory does.
    pub fn connect(class_dir: &Path, prefix: &str, matches: &[(&str, &[&str])]) -> Result<Self> {
        let not_found = || DeviceError::NotFound {
            class: class_dir.display().to_string(),
            pattern: prefix.into(),
        };
        if !class_dir.is_dir() {
            return Err(not_found());
        }
        let mut candidates = Vec::new();
        for dir in class_dir.read_dir()? {
            let dir = dir?;
            let name = dir.file_name();
            match name.to_str() {
                Some(name) if name.starts_with(prefix) => candidates.push(dir.path()),
                _ => continue,
            }
        }
        candidates.sort_unstable();

        'candidates: for path in candidates {
            let dev = Self { path };
            for (attr, allowed) in matches {
                let value = match dev.get_attr_string(attr) {
                    Ok(v) => v,
                    Err(e) => {
                        trace!("Skipping {}: {}", dev.path.display(), e);
                        continue 'candidates;
                    }
                };
                if !allowed.is_empty() && !allowed.contains(&value.as_str()) {
                    trace!(
                        "Skipping {}: {} is `{}`, wanted one of {:?}",
                        dev.path.display(),
                        attr,
                        value,
                        allowed
                    );
                    continue 'candidates;
                }
            }
            debug!("Connected to {}", dev.path.display());
            return Ok(dev);
        }
        Err(not_found())
    }

    /// Use the device at `path` directly, without any matching.
    ///
    /// # Errors
    ///
    /// If `path` isn't a directory
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.is_dir() {
            Ok(Self { path: path.into() })
        } else {
            Err(DeviceError::NotFound {
                class: path
                    .parent()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default(),
                pattern: path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            })
        }
    }

    pub(crate) fn into_path(self) -> PathBuf {
        self.path
    }
}

impl Device for GenericDevice {
    fn path(&self) -> &Path {
        &self.path
    }
}
