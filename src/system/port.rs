//! EV3 ports, and the `lego-port` class
//!
//! A "port" is where something is plugged in. The `lego-port` class exposes
//! the ports themselves, which is mostly useful for telling a port what is
//! connected when it can't detect that on its own.
//!
//! See the [ev3dev docs][1] for details
//!
//! [1]: https://www.ev3dev.org/docs/drivers/lego-port-class/
use std::path::{Path, PathBuf};

use super::{
    class::{Device, GenericDevice},
    ModeSet,
    SystemRoot,
};
use crate::error::Result;

/// A sensor port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputPort {
    /// Match a sensor on any port
    Auto,
    In1,
    In2,
    In3,
    In4,
}

impl InputPort {
    /// Kernel `port_name`, or [`None`] for [`InputPort::Auto`]
    pub fn name(self) -> Option<&'static str> {
        match self {
            Self::Auto => None,
            Self::In1 => Some("in1"),
            Self::In2 => Some("in2"),
            Self::In3 => Some("in3"),
            Self::In4 => Some("in4"),
        }
    }
}

/// A motor port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputPort {
    /// Match a motor on any port
    Auto,
    OutA,
    OutB,
    OutC,
    OutD,
}

impl OutputPort {
    /// Kernel `port_name`, or [`None`] for [`OutputPort::Auto`]
    pub fn name(self) -> Option<&'static str> {
        match self {
            Self::Auto => None,
            Self::OutA => Some("outA"),
            Self::OutB => Some("outB"),
            Self::OutC => Some("outC"),
            Self::OutD => Some("outD"),
        }
    }
}

/// Either kind of port, for [`LegoPort`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Port {
    Input(InputPort),
    Output(OutputPort),
}

impl Port {
    pub fn name(self) -> Option<&'static str> {
        match self {
            Self::Input(p) => p.name(),
            Self::Output(p) => p.name(),
        }
    }
}

impl From<InputPort> for Port {
    fn from(p: InputPort) -> Self {
        Self::Input(p)
    }
}

impl From<OutputPort> for Port {
    fn from(p: OutputPort) -> Self {
        Self::Output(p)
    }
}

/// A physical input or output port
#[derive(Debug, Clone)]
pub struct LegoPort {
    path: PathBuf,
}

impl LegoPort {
    /// Find the port named by `port`
    pub fn new<P: Into<Port>>(port: P) -> Result<Self> {
        Self::new_in(&SystemRoot::default(), port)
    }

    pub fn new_in<P: Into<Port>>(root: &SystemRoot, port: P) -> Result<Self> {
        let ports: Vec<&str> = port.into().name().into_iter().collect();
        let dev = GenericDevice::connect(
            &root.class_dir("lego-port"),
            "port",
            &[("port_name", ports.as_slice())],
        )?;
        Ok(Self {
            path: dev.into_path(),
        })
    }

    /// Name of the driver that loaded this port
    pub fn driver_name(&self) -> Result<String> {
        self.get_attr_string("driver_name")
    }

    /// Modes supported by this port
    pub fn modes(&self) -> Result<ModeSet> {
        self.get_attr_set("modes")
    }

    /// Currently selected mode
    pub fn mode(&self) -> Result<String> {
        self.get_attr_string("mode")
    }

    /// Select one of [`LegoPort::modes`].
    ///
    /// Changing the mode removes any device currently loaded on the port.
    pub fn set_mode(&self, mode: &str) -> Result<&Self> {
        self.set_attr_string("mode", mode)?;
        Ok(self)
    }

    /// Name of the port, such as `in1`
    pub fn port_name(&self) -> Result<String> {
        self.get_attr_string("port_name")
    }

    /// Load the device driver named `driver` on this port.
    ///
    /// Only works in modes that don't detect devices automatically.
    pub fn set_device(&self, driver: &str) -> Result<&Self> {
        self.set_attr_string("set_device", driver)?;
        Ok(self)
    }

    /// Port status.
    ///
    /// Usually the same as [`LegoPort::mode`], in `auto` modes this may
    /// instead describe what was detected.
    pub fn status(&self) -> Result<String> {
        self.get_attr_string("status")
    }
}

impl Device for LegoPort {
    fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{read, FakeRoot};
    use anyhow::Result;

    #[test]
    fn port_names() {
        assert_eq!(InputPort::In3.name(), Some("in3"));
        assert_eq!(OutputPort::OutD.name(), Some("outD"));
        assert_eq!(Port::from(InputPort::Auto).name(), None);
    }

    #[test]
    fn lego_port() -> Result<()> {
        let fake = FakeRoot::new();
        fake.device("lego-port", "port0", &[("port_name", "in1")]);
        let dir = fake.device(
            "lego-port",
            "port5",
            &[
                ("port_name", "outB"),
                ("driver_name", "legoev3-output-port"),
                ("modes", "auto ev3-tacho-motor dc-motor"),
                ("mode", "auto"),
                ("status", "ev3-tacho-motor"),
                ("set_device", ""),
            ],
        );

        let port = LegoPort::new_in(fake.root(), OutputPort::OutB)?;
        assert_eq!(port.path(), dir);
        assert_eq!(port.device_index()?, 5);
        assert_eq!(port.driver_name()?, "legoev3-output-port");
        assert!(port.modes()?.contains("dc-motor"));
        assert_eq!(port.status()?, "ev3-tacho-motor");

        port.set_mode("dc-motor")?.set_device("rcx-motor")?;
        assert_eq!(read(&dir.join("mode")), "dc-motor");
        assert_eq!(read(&dir.join("set_device")), "rcx-motor");
        Ok(())
    }
}
