//! Abstraction for handling devices in the `power_supply` class
//!
//! # Implementation
//!
//! This is the standard Linux power supply class. Currents and voltages are
//! in microamps and microvolts.
//!
//! See the [kernel docs][1] for details
//!
//! [1]: https://www.kernel.org/doc/Documentation/ABI/testing/sysfs-class-power
use std::path::{Path, PathBuf};

use super::{Device, GenericDevice};
use crate::{error::Result, system::SystemRoot};

/// A battery or other power supply
#[derive(Debug, Clone)]
pub struct PowerSupply {
    path: PathBuf,
}

impl PowerSupply {
    /// The EV3 battery
    pub const BATTERY: &'static str = "legoev3-battery";

    /// Find the power supply named `name`
    pub fn new(name: &str) -> Result<Self> {
        Self::new_in(&SystemRoot::default(), name)
    }

    pub fn new_in(root: &SystemRoot, name: &str) -> Result<Self> {
        let dev = GenericDevice::new(root.class_dir("power_supply").join(name))?;
        Ok(Self {
            path: dev.into_path(),
        })
    }

    /// The EV3 battery
    pub fn battery() -> Result<Self> {
        Self::new(Self::BATTERY)
    }

    /// Current drawn, in µA
    pub fn measured_current(&self) -> Result<i32> {
        self.get_attr_int("current_now")
    }

    /// Voltage, in µV
    pub fn measured_voltage(&self) -> Result<i32> {
        self.get_attr_int("voltage_now")
    }

    /// Design maximum voltage, in µV
    pub fn max_voltage(&self) -> Result<i32> {
        self.get_attr_int("voltage_max_design")
    }

    /// Design minimum voltage, in µV
    pub fn min_voltage(&self) -> Result<i32> {
        self.get_attr_int("voltage_min_design")
    }

    /// Battery chemistry, such as `Li-ion`
    pub fn technology(&self) -> Result<String> {
        self.get_attr_string("technology")
    }

    /// Supply type, such as `Battery`
    pub fn type_(&self) -> Result<String> {
        self.get_attr_string("type")
    }

    /// Current drawn, in amps
    pub fn measured_amps(&self) -> Result<f32> {
        Ok(self.measured_current()? as f32 / 1_000_000.0)
    }

    /// Voltage, in volts
    pub fn measured_volts(&self) -> Result<f32> {
        Ok(self.measured_voltage()? as f32 / 1_000_000.0)
    }
}

impl Device for PowerSupply {
    fn path(&self) -> &Path {
        &self.path
    }
}
