//! Abstraction for handling devices in the `lego-sensor` class
//!
//! # Implementation
//!
//! Every sensor, whatever it measures, has the same set of attributes. What
//! `value0` to `value7` mean depends on the driver and the current mode.
//!
//! See the [ev3dev docs][1] for details
//!
//! [1]: https://www.ev3dev.org/docs/drivers/lego-sensor-class/
use std::{
    ops::Deref,
    path::{Path, PathBuf},
};

use super::{Device, GenericDevice};
use crate::{
    error::{DeviceError, Result},
    system::{port::InputPort, ModeSet, SystemRoot},
};

/// Sensor driver names, as found in `driver_name`
pub mod driver {
    pub const EV3_TOUCH: &str = "lego-ev3-touch";
    pub const EV3_COLOR: &str = "lego-ev3-color";
    pub const EV3_ULTRASONIC: &str = "lego-ev3-us";
    pub const EV3_GYRO: &str = "lego-ev3-gyro";
    pub const EV3_INFRARED: &str = "lego-ev3-ir";

    pub const NXT_TOUCH: &str = "lego-nxt-touch";
    pub const NXT_LIGHT: &str = "lego-nxt-light";
    pub const NXT_SOUND: &str = "lego-nxt-sound";
    pub const NXT_ULTRASONIC: &str = "lego-nxt-us";
    pub const NXT_I2C_SENSOR: &str = "nxt-i2c-sensor";
    pub const NXT_ANALOG: &str = "nxt-analog";
}

/// A generic sensor
#[derive(Debug, Clone)]
pub struct Sensor {
    path: PathBuf,
}

impl Sensor {
    /// Find a sensor of any type on `port`
    pub fn new(port: InputPort) -> Result<Self> {
        Self::new_in(&SystemRoot::default(), port)
    }

    pub fn new_in(root: &SystemRoot, port: InputPort) -> Result<Self> {
        Self::with_drivers(root, port, &[])
    }

    /// Find a sensor on `port` loaded by one of `drivers`.
    ///
    /// An empty `drivers` accepts any driver.
    pub fn with_drivers(root: &SystemRoot, port: InputPort, drivers: &[&str]) -> Result<Self> {
        Self::connect(root, port, drivers, &[])
    }

    fn connect(
        root: &SystemRoot,
        port: InputPort,
        drivers: &[&str],
        extra: &[(&str, &[&str])],
    ) -> Result<Self> {
        let ports: Vec<&str> = port.name().into_iter().collect();
        let mut matches = vec![("port_name", ports.as_slice()), ("driver_name", drivers)];
        matches.extend_from_slice(extra);
        let dev = GenericDevice::connect(&root.class_dir("lego-sensor"), "sensor", &matches)?;
        Ok(Self {
            path: dev.into_path(),
        })
    }

    /// Value `index` of the current mode.
    ///
    /// Scaled by `10^decimals`, see [`Sensor::float_value`].
    ///
    /// # Errors
    ///
    /// [`DeviceError::ValueIndex`] if the current mode has fewer than
    /// `index + 1` values.
    pub fn value(&self, index: u32) -> Result<i32> {
        let available = self.num_values()?;
        if i64::from(index) >= i64::from(available) {
            return Err(DeviceError::ValueIndex { index, available });
        }
        self.get_attr_int(&format!("value{}", index))
    }

    /// Value `index`, with the decimal point applied.
    pub fn float_value(&self, index: u32) -> Result<f32> {
        let value = self.value(index)?;
        let decimals = self.decimals()?;
        Ok(value as f32 / 10f32.powi(decimals))
    }

    /// Human readable sensor type, falling back to the driver name for
    /// unknown drivers
    pub fn type_name(&self) -> Result<String> {
        let driver = self.driver_name()?;
        let name = match driver.as_str() {
            driver::EV3_TOUCH => "EV3 touch",
            driver::EV3_COLOR => "EV3 color",
            driver::EV3_ULTRASONIC => "EV3 ultrasonic",
            driver::EV3_GYRO => "EV3 gyro",
            driver::EV3_INFRARED => "EV3 infrared",
            driver::NXT_TOUCH => "NXT touch",
            driver::NXT_LIGHT => "NXT light",
            driver::NXT_SOUND => "NXT sound",
            driver::NXT_ULTRASONIC => "NXT ultrasonic",
            driver::NXT_I2C_SENSOR => "I2C sensor",
            driver::NXT_ANALOG => "NXT analog",
            _ => return Ok(driver),
        };
        Ok(name.into())
    }

    /// Send a command, one of [`Sensor::commands`]
    pub fn set_command(&self, command: &str) -> Result<&Self> {
        self.set_attr_string("command", command)?;
        Ok(self)
    }

    /// Commands this sensor supports. Most support none.
    pub fn commands(&self) -> Result<ModeSet> {
        self.get_attr_set("commands")
    }

    /// Number of decimal places in the values of the current mode
    pub fn decimals(&self) -> Result<i32> {
        self.get_attr_int("decimals")
    }

    pub fn driver_name(&self) -> Result<String> {
        self.get_attr_string("driver_name")
    }

    /// Current mode
    pub fn mode(&self) -> Result<String> {
        self.get_attr_string("mode")
    }

    /// Select one of [`Sensor::modes`]
    pub fn set_mode(&self, mode: &str) -> Result<&Self> {
        self.set_attr_string("mode", mode)?;
        Ok(self)
    }

    pub fn modes(&self) -> Result<ModeSet> {
        self.get_attr_set("modes")
    }

    /// How many `value<N>` attributes are valid in the current mode
    pub fn num_values(&self) -> Result<i32> {
        self.get_attr_int("num_values")
    }

    /// Port the sensor is connected to, such as `in1`
    pub fn port_name(&self) -> Result<String> {
        self.get_attr_string("port_name")
    }

    /// Units of the values in the current mode, such as `pct` or `cm`.
    ///
    /// May be empty.
    pub fn units(&self) -> Result<String> {
        self.get_attr_string("units")
    }
}

impl Device for Sensor {
    fn path(&self) -> &Path {
        &self.path
    }
}

/// Defines a sensor type restricted to a set of drivers.
///
/// They all deref to [`Sensor`].
macro_rules! sensor_type {
    ($(#[$doc:meta])* $name:ident, [$($driver:expr),+ $(,)?]) => {
        $(#[$doc])*
        #[derive(Debug, Clone)]
        pub struct $name(Sensor);

        impl $name {
            /// Driver names this type accepts
            pub const DRIVERS: &'static [&'static str] = &[$($driver),+];

            pub fn new(port: InputPort) -> Result<Self> {
                Self::new_in(&SystemRoot::default(), port)
            }

            pub fn new_in(root: &SystemRoot, port: InputPort) -> Result<Self> {
                Sensor::with_drivers(root, port, Self::DRIVERS).map(Self)
            }

            /// The underlying generic sensor
            pub fn into_inner(self) -> Sensor {
                self.0
            }
        }

        impl Deref for $name {
            type Target = Sensor;

            fn deref(&self) -> &Sensor {
                &self.0
            }
        }
    };
}

sensor_type!(
    /// EV3 or NXT touch sensor. `value0` is 1 while pressed.
    TouchSensor,
    [driver::EV3_TOUCH, driver::NXT_TOUCH]
);

sensor_type!(
    /// EV3 color sensor
    ColorSensor,
    [driver::EV3_COLOR]
);

impl ColorSensor {
    /// Reflected light intensity, in percent
    pub const MODE_COL_REFLECT: &'static str = "COL-REFLECT";
    /// Ambient light intensity, in percent
    pub const MODE_COL_AMBIENT: &'static str = "COL-AMBIENT";
    /// Detected color, 0 to 7
    pub const MODE_COL_COLOR: &'static str = "COL-COLOR";
    /// Raw reflected light
    pub const MODE_REF_RAW: &'static str = "REF-RAW";
    /// Raw red, green and blue
    pub const MODE_RGB_RAW: &'static str = "RGB-RAW";
}

sensor_type!(
    /// EV3 or NXT ultrasonic sensor
    UltrasonicSensor,
    [driver::EV3_ULTRASONIC, driver::NXT_ULTRASONIC]
);

impl UltrasonicSensor {
    /// Continuous distance, in cm
    pub const MODE_US_DIST_CM: &'static str = "US-DIST-CM";
    /// Continuous distance, in inches
    pub const MODE_US_DIST_IN: &'static str = "US-DIST-IN";
    /// Detect other ultrasonic sensors
    pub const MODE_US_LISTEN: &'static str = "US-LISTEN";
    /// Single distance measurement, in cm
    pub const MODE_US_SI_CM: &'static str = "US-SI-CM";
    /// Single distance measurement, in inches
    pub const MODE_US_SI_IN: &'static str = "US-SI-IN";
}

sensor_type!(
    /// EV3 gyro sensor
    GyroSensor,
    [driver::EV3_GYRO]
);

impl GyroSensor {
    /// Angle, in degrees
    pub const MODE_GYRO_ANG: &'static str = "GYRO-ANG";
    /// Rotational speed, in degrees per second
    pub const MODE_GYRO_RATE: &'static str = "GYRO-RATE";
    /// Raw, unfiltered
    pub const MODE_GYRO_FAS: &'static str = "GYRO-FAS";
    /// Angle and rotational speed
    pub const MODE_GYRO_G_A: &'static str = "GYRO-G&A";
    /// Calibration
    pub const MODE_GYRO_CAL: &'static str = "GYRO-CAL";
}

sensor_type!(
    /// EV3 infrared sensor
    InfraredSensor,
    [driver::EV3_INFRARED]
);

impl InfraredSensor {
    /// Proximity, in percent
    pub const MODE_IR_PROX: &'static str = "IR-PROX";
    /// Beacon heading and distance, per channel
    pub const MODE_IR_SEEK: &'static str = "IR-SEEK";
    /// Remote control buttons, per channel. See [`crate::remote`].
    pub const MODE_IR_REMOTE: &'static str = "IR-REMOTE";
    /// Remote control buttons, alternate encoding
    pub const MODE_IR_REM_A: &'static str = "IR-REM-A";
    /// Calibration
    pub const MODE_IR_CAL: &'static str = "IR-CAL";
}

sensor_type!(
    /// NXT sound sensor
    SoundSensor,
    [driver::NXT_SOUND]
);

impl SoundSensor {
    /// Sound pressure level, flat weighting
    pub const MODE_DB: &'static str = "DB";
    /// Sound pressure level, A weighting
    pub const MODE_DBA: &'static str = "DBA";
}

sensor_type!(
    /// NXT light sensor
    LightSensor,
    [driver::NXT_LIGHT]
);

impl LightSensor {
    /// Reflected light, with the LED on
    pub const MODE_REFLECT: &'static str = "REFLECT";
    /// Ambient light, with the LED off
    pub const MODE_AMBIENT: &'static str = "AMBIENT";
}

/// A sensor on the NXT I2C bus
#[derive(Debug, Clone)]
pub struct I2cSensor(Sensor);

impl I2cSensor {
    pub fn new(port: InputPort) -> Result<Self> {
        Self::new_in(&SystemRoot::default(), port)
    }

    pub fn new_in(root: &SystemRoot, port: InputPort) -> Result<Self> {
        Sensor::with_drivers(root, port, &[driver::NXT_I2C_SENSOR]).map(Self)
    }

    /// Find the sensor at I2C `address` on `port`.
    ///
    /// Several I2C sensors can share a port.
    pub fn with_address(root: &SystemRoot, port: InputPort, address: &str) -> Result<Self> {
        Sensor::connect(
            root,
            port,
            &[driver::NXT_I2C_SENSOR],
            &[("address", &[address])],
        )
        .map(Self)
    }

    /// Firmware version reported by the sensor
    pub fn fw_version(&self) -> Result<String> {
        self.get_attr_string("fw_version")
    }

    /// How often the sensor is polled, in milliseconds. 0 disables polling.
    pub fn poll_ms(&self) -> Result<i32> {
        self.get_attr_int("poll_ms")
    }

    pub fn set_poll_ms(&self, ms: i32) -> Result<&Self> {
        self.set_attr_int("poll_ms", ms)?;
        Ok(self)
    }

    pub fn into_inner(self) -> Sensor {
        self.0
    }
}

impl Deref for I2cSensor {
    type Target = Sensor;

    fn deref(&self) -> &Sensor {
        &self.0
    }
}
