//! Abstraction for handling devices in the `tacho-motor`, `dc-motor` and
//! `servo-motor` classes
//!
//! # Implementation
//!
//! A motor does nothing until it's sent a command. Setpoints, the attributes
//! ending in `_sp`, are only read by the driver when a command starts, except
//! for `duty_cycle_sp` in `run-direct`.
//!
//! See the [ev3dev docs][1] for details
//!
//! [1]: https://www.ev3dev.org/docs/drivers/tacho-motor-class/
use std::path::{Path, PathBuf};

use super::{Device, GenericDevice};
use crate::{
    error::{DeviceError, Result},
    system::{port::OutputPort, ModeSet, SystemRoot},
};

/// Tacho motor driver names, as found in `driver_name`
pub mod driver {
    pub const EV3_LARGE: &str = "lego-ev3-l-motor";
    pub const EV3_MEDIUM: &str = "lego-ev3-m-motor";
}

fn invalid(attribute: &str, value: String) -> DeviceError {
    DeviceError::InvalidValue {
        attribute: attribute.into(),
        value,
    }
}

/// Direction of rotation, or of the encoder count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    /// A positive duty cycle turns clockwise
    Normal,

    /// A positive duty cycle turns counter-clockwise
    Inversed,
}

impl Polarity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Inversed => "inversed",
        }
    }

    fn parse(attribute: &str, value: String) -> Result<Self> {
        match value.as_str() {
            "normal" => Ok(Self::Normal),
            "inversed" => Ok(Self::Inversed),
            _ => Err(invalid(attribute, value)),
        }
    }
}

/// What a motor does when stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopCommand {
    /// Remove power and let the motor spin down
    Coast,

    /// Remove power and short the motor, stopping faster
    Brake,

    /// Actively hold the current position. Tacho motors only.
    Hold,
}

impl StopCommand {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Coast => "coast",
            Self::Brake => "brake",
            Self::Hold => "hold",
        }
    }

    fn parse(attribute: &str, value: String) -> Result<Self> {
        match value.as_str() {
            "coast" => Ok(Self::Coast),
            "brake" => Ok(Self::Brake),
            "hold" => Ok(Self::Hold),
            _ => Err(invalid(attribute, value)),
        }
    }
}

/// Whether a tacho motor regulates its speed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeedRegulation {
    /// Power is varied to hold `speed_sp`
    On,

    /// `duty_cycle_sp` is used as is
    Off,
}

impl SpeedRegulation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::On => "on",
            Self::Off => "off",
        }
    }

    fn parse(attribute: &str, value: String) -> Result<Self> {
        match value.as_str() {
            "on" => Ok(Self::On),
            "off" => Ok(Self::Off),
            _ => Err(invalid(attribute, value)),
        }
    }
}

/// A motor with a rotary encoder, such as the EV3 large and medium motors
#[derive(Debug, Clone)]
pub struct Motor {
    path: PathBuf,
}

// Construction
impl Motor {
    pub const COMMAND_RUN_FOREVER: &'static str = "run-forever";
    pub const COMMAND_RUN_TO_ABS_POS: &'static str = "run-to-abs-pos";
    pub const COMMAND_RUN_TO_REL_POS: &'static str = "run-to-rel-pos";
    pub const COMMAND_RUN_TIMED: &'static str = "run-timed";
    pub const COMMAND_RUN_DIRECT: &'static str = "run-direct";
    pub const COMMAND_STOP: &'static str = "stop";
    pub const COMMAND_RESET: &'static str = "reset";

    /// Find a tacho motor of any type on `port`
    pub fn new(port: OutputPort) -> Result<Self> {
        Self::new_in(&SystemRoot::default(), port)
    }

    pub fn new_in(root: &SystemRoot, port: OutputPort) -> Result<Self> {
        Self::with_driver(root, port, None)
    }

    /// Find a tacho motor on `port`, optionally requiring `driver`
    pub fn with_driver(root: &SystemRoot, port: OutputPort, driver: Option<&str>) -> Result<Self> {
        let ports: Vec<&str> = port.name().into_iter().collect();
        let drivers: Vec<&str> = driver.into_iter().collect();
        let dev = GenericDevice::connect(
            &root.class_dir("tacho-motor"),
            "motor",
            &[
                ("port_name", ports.as_slice()),
                ("driver_name", drivers.as_slice()),
            ],
        )?;
        Ok(Self {
            path: dev.into_path(),
        })
    }
}

// Commands
impl Motor {
    /// Send `command`, one of [`Motor::commands`]
    pub fn set_command(&self, command: &str) -> Result<&Self> {
        self.set_attr_string("command", command)?;
        Ok(self)
    }

    /// Run until told otherwise
    pub fn run_forever(&self) -> Result<()> {
        self.set_command(Self::COMMAND_RUN_FOREVER).map(|_| ())
    }

    /// Run to [`Motor::position_sp`], then stop using
    /// [`Motor::stop_command`]
    pub fn run_to_abs_pos(&self) -> Result<()> {
        self.set_command(Self::COMMAND_RUN_TO_ABS_POS).map(|_| ())
    }

    /// Run to [`Motor::position`] + [`Motor::position_sp`], then stop using
    /// [`Motor::stop_command`]
    pub fn run_to_rel_pos(&self) -> Result<()> {
        self.set_command(Self::COMMAND_RUN_TO_REL_POS).map(|_| ())
    }

    /// Run for [`Motor::time_sp`], then stop using [`Motor::stop_command`]
    pub fn run_timed(&self) -> Result<()> {
        self.set_command(Self::COMMAND_RUN_TIMED).map(|_| ())
    }

    /// Run at [`Motor::duty_cycle_sp`].
    ///
    /// Unlike every other command, changes to the setpoint take effect
    /// immediately.
    pub fn run_direct(&self) -> Result<()> {
        self.set_command(Self::COMMAND_RUN_DIRECT).map(|_| ())
    }

    /// Stop using [`Motor::stop_command`]
    pub fn stop(&self) -> Result<()> {
        self.set_command(Self::COMMAND_STOP).map(|_| ())
    }

    /// Reset every attribute to its default, stopping the motor
    pub fn reset(&self) -> Result<()> {
        self.set_command(Self::COMMAND_RESET).map(|_| ())
    }

    pub fn commands(&self) -> Result<ModeSet> {
        self.get_attr_set("commands")
    }
}

// Attributes
impl Motor {
    /// Encoder counts in one rotation.
    ///
    /// For linear actuators this is counts per centimeter instead.
    pub fn count_per_rot(&self) -> Result<i32> {
        self.get_attr_int("count_per_rot")
    }

    pub fn driver_name(&self) -> Result<String> {
        self.get_attr_string("driver_name")
    }

    /// Current duty cycle, -100 to 100 percent
    pub fn duty_cycle(&self) -> Result<i32> {
        self.get_attr_int("duty_cycle")
    }

    pub fn duty_cycle_sp(&self) -> Result<i32> {
        self.get_attr_int("duty_cycle_sp")
    }

    /// Duty cycle setpoint, -100 to 100 percent. Negative runs in reverse.
    pub fn set_duty_cycle_sp(&self, value: i32) -> Result<&Self> {
        self.set_attr_int("duty_cycle_sp", value)?;
        Ok(self)
    }

    pub fn encoder_polarity(&self) -> Result<Polarity> {
        Polarity::parse("encoder_polarity", self.get_attr_string("encoder_polarity")?)
    }

    /// Polarity of the encoder signal.
    ///
    /// The driver sets this correctly for supported motors.
    pub fn set_encoder_polarity(&self, value: Polarity) -> Result<&Self> {
        self.set_attr_string("encoder_polarity", value.as_str())?;
        Ok(self)
    }

    pub fn polarity(&self) -> Result<Polarity> {
        Polarity::parse("polarity", self.get_attr_string("polarity")?)
    }

    pub fn set_polarity(&self, value: Polarity) -> Result<&Self> {
        self.set_attr_string("polarity", value.as_str())?;
        Ok(self)
    }

    /// Port the motor is connected to, such as `outA`
    pub fn port_name(&self) -> Result<String> {
        self.get_attr_string("port_name")
    }

    /// Current position in encoder counts. Clockwise is positive.
    pub fn position(&self) -> Result<i32> {
        self.get_attr_int("position")
    }

    pub fn set_position(&self, value: i32) -> Result<&Self> {
        self.set_attr_int("position", value)?;
        Ok(self)
    }

    /// Proportional constant of the position hold PID
    pub fn position_p(&self) -> Result<i32> {
        self.get_attr_int("hold_pid/Kp")
    }

    pub fn set_position_p(&self, value: i32) -> Result<&Self> {
        self.set_attr_int("hold_pid/Kp", value)?;
        Ok(self)
    }

    /// Integral constant of the position hold PID
    pub fn position_i(&self) -> Result<i32> {
        self.get_attr_int("hold_pid/Ki")
    }

    pub fn set_position_i(&self, value: i32) -> Result<&Self> {
        self.set_attr_int("hold_pid/Ki", value)?;
        Ok(self)
    }

    /// Derivative constant of the position hold PID
    pub fn position_d(&self) -> Result<i32> {
        self.get_attr_int("hold_pid/Kd")
    }

    pub fn set_position_d(&self, value: i32) -> Result<&Self> {
        self.set_attr_int("hold_pid/Kd", value)?;
        Ok(self)
    }

    pub fn position_sp(&self) -> Result<i32> {
        self.get_attr_int("position_sp")
    }

    /// Target position, in encoder counts, for
    /// [`Motor::run_to_abs_pos`] and [`Motor::run_to_rel_pos`]
    pub fn set_position_sp(&self, value: i32) -> Result<&Self> {
        self.set_attr_int("position_sp", value)?;
        Ok(self)
    }

    /// Current speed in encoder counts per second
    pub fn speed(&self) -> Result<i32> {
        self.get_attr_int("speed")
    }

    pub fn speed_sp(&self) -> Result<i32> {
        self.get_attr_int("speed_sp")
    }

    /// Target speed in encoder counts per second, used with speed
    /// regulation on
    pub fn set_speed_sp(&self, value: i32) -> Result<&Self> {
        self.set_attr_int("speed_sp", value)?;
        Ok(self)
    }

    pub fn ramp_up_sp(&self) -> Result<i32> {
        self.get_attr_int("ramp_up_sp")
    }

    /// Milliseconds to ramp from 0 to 100% duty cycle when starting
    pub fn set_ramp_up_sp(&self, value: i32) -> Result<&Self> {
        self.set_attr_int("ramp_up_sp", value)?;
        Ok(self)
    }

    pub fn ramp_down_sp(&self) -> Result<i32> {
        self.get_attr_int("ramp_down_sp")
    }

    /// Milliseconds to ramp from 100% to 0 duty cycle when stopping
    pub fn set_ramp_down_sp(&self, value: i32) -> Result<&Self> {
        self.set_attr_int("ramp_down_sp", value)?;
        Ok(self)
    }

    pub fn speed_regulation_enabled(&self) -> Result<SpeedRegulation> {
        SpeedRegulation::parse("speed_regulation", self.get_attr_string("speed_regulation")?)
    }

    pub fn set_speed_regulation_enabled(&self, value: SpeedRegulation) -> Result<&Self> {
        self.set_attr_string("speed_regulation", value.as_str())?;
        Ok(self)
    }

    /// Proportional constant of the speed regulation PID
    pub fn speed_regulation_p(&self) -> Result<i32> {
        self.get_attr_int("speed_pid/Kp")
    }

    pub fn set_speed_regulation_p(&self, value: i32) -> Result<&Self> {
        self.set_attr_int("speed_pid/Kp", value)?;
        Ok(self)
    }

    /// Integral constant of the speed regulation PID
    pub fn speed_regulation_i(&self) -> Result<i32> {
        self.get_attr_int("speed_pid/Ki")
    }

    pub fn set_speed_regulation_i(&self, value: i32) -> Result<&Self> {
        self.set_attr_int("speed_pid/Ki", value)?;
        Ok(self)
    }

    /// Derivative constant of the speed regulation PID
    pub fn speed_regulation_d(&self) -> Result<i32> {
        self.get_attr_int("speed_pid/Kd")
    }

    pub fn set_speed_regulation_d(&self, value: i32) -> Result<&Self> {
        self.set_attr_int("speed_pid/Kd", value)?;
        Ok(self)
    }

    /// State flags, any of `running`, `ramping`, `holding` and `stalled`
    pub fn state(&self) -> Result<ModeSet> {
        self.get_attr_set("state")
    }

    pub fn stop_command(&self) -> Result<StopCommand> {
        StopCommand::parse("stop_command", self.get_attr_string("stop_command")?)
    }

    /// Behavior on [`Motor::stop`], and when a run command completes
    pub fn set_stop_command(&self, value: StopCommand) -> Result<&Self> {
        self.set_attr_string("stop_command", value.as_str())?;
        Ok(self)
    }

    pub fn stop_commands(&self) -> Result<ModeSet> {
        self.get_attr_set("stop_commands")
    }

    pub fn time_sp(&self) -> Result<i32> {
        self.get_attr_int("time_sp")
    }

    /// Milliseconds to run for with [`Motor::run_timed`]
    pub fn set_time_sp(&self, value: i32) -> Result<&Self> {
        self.set_attr_int("time_sp", value)?;
        Ok(self)
    }
}

impl Device for Motor {
    fn path(&self) -> &Path {
        &self.path
    }
}

/// EV3 large servo motor
#[derive(Debug, Clone)]
pub struct LargeMotor(Motor);

impl LargeMotor {
    pub fn new(port: OutputPort) -> Result<Self> {
        Self::new_in(&SystemRoot::default(), port)
    }

    pub fn new_in(root: &SystemRoot, port: OutputPort) -> Result<Self> {
        Motor::with_driver(root, port, Some(driver::EV3_LARGE)).map(Self)
    }
}

impl std::ops::Deref for LargeMotor {
    type Target = Motor;

    fn deref(&self) -> &Motor {
        &self.0
    }
}

/// EV3 medium servo motor
#[derive(Debug, Clone)]
pub struct MediumMotor(Motor);

impl MediumMotor {
    pub fn new(port: OutputPort) -> Result<Self> {
        Self::new_in(&SystemRoot::default(), port)
    }

    pub fn new_in(root: &SystemRoot, port: OutputPort) -> Result<Self> {
        Motor::with_driver(root, port, Some(driver::EV3_MEDIUM)).map(Self)
    }
}

impl std::ops::Deref for MediumMotor {
    type Target = Motor;

    fn deref(&self) -> &Motor {
        &self.0
    }
}

/// A plain DC motor, without position feedback
#[derive(Debug, Clone)]
pub struct DcMotor {
    path: PathBuf,
}

impl DcMotor {
    pub const COMMAND_RUN_FOREVER: &'static str = "run-forever";
    pub const COMMAND_RUN_TIMED: &'static str = "run-timed";
    pub const COMMAND_STOP: &'static str = "stop";

    pub fn new(port: OutputPort) -> Result<Self> {
        Self::new_in(&SystemRoot::default(), port)
    }

    pub fn new_in(root: &SystemRoot, port: OutputPort) -> Result<Self> {
        let ports: Vec<&str> = port.name().into_iter().collect();
        let dev = GenericDevice::connect(
            &root.class_dir("dc-motor"),
            "motor",
            &[("port_name", ports.as_slice())],
        )?;
        Ok(Self {
            path: dev.into_path(),
        })
    }

    pub fn set_command(&self, command: &str) -> Result<&Self> {
        self.set_attr_string("command", command)?;
        Ok(self)
    }

    pub fn run_forever(&self) -> Result<()> {
        self.set_command(Self::COMMAND_RUN_FOREVER).map(|_| ())
    }

    /// Run for the time set in `time_sp`
    pub fn run_timed(&self) -> Result<()> {
        self.set_command(Self::COMMAND_RUN_TIMED).map(|_| ())
    }

    pub fn stop(&self) -> Result<()> {
        self.set_command(Self::COMMAND_STOP).map(|_| ())
    }

    pub fn commands(&self) -> Result<ModeSet> {
        self.get_attr_set("commands")
    }

    pub fn driver_name(&self) -> Result<String> {
        self.get_attr_string("driver_name")
    }

    pub fn duty_cycle(&self) -> Result<i32> {
        self.get_attr_int("duty_cycle")
    }

    pub fn duty_cycle_sp(&self) -> Result<i32> {
        self.get_attr_int("duty_cycle_sp")
    }

    /// Duty cycle setpoint, -100 to 100 percent
    pub fn set_duty_cycle_sp(&self, value: i32) -> Result<&Self> {
        self.set_attr_int("duty_cycle_sp", value)?;
        Ok(self)
    }

    pub fn polarity(&self) -> Result<Polarity> {
        Polarity::parse("polarity", self.get_attr_string("polarity")?)
    }

    pub fn set_polarity(&self, value: Polarity) -> Result<&Self> {
        self.set_attr_string("polarity", value.as_str())?;
        Ok(self)
    }

    pub fn port_name(&self) -> Result<String> {
        self.get_attr_string("port_name")
    }

    pub fn ramp_down_sp(&self) -> Result<i32> {
        self.get_attr_int("ramp_down_sp")
    }

    pub fn set_ramp_down_sp(&self, value: i32) -> Result<&Self> {
        self.set_attr_int("ramp_down_sp", value)?;
        Ok(self)
    }

    pub fn ramp_up_sp(&self) -> Result<i32> {
        self.get_attr_int("ramp_up_sp")
    }

    pub fn set_ramp_up_sp(&self, value: i32) -> Result<&Self> {
        self.set_attr_int("ramp_up_sp", value)?;
        Ok(self)
    }

    pub fn state(&self) -> Result<ModeSet> {
        self.get_attr_set("state")
    }

    pub fn stop_command(&self) -> Result<StopCommand> {
        StopCommand::parse("stop_command", self.get_attr_string("stop_command")?)
    }

    /// [`StopCommand::Hold`] is not supported
    pub fn set_stop_command(&self, value: StopCommand) -> Result<&Self> {
        self.set_attr_string("stop_command", value.as_str())?;
        Ok(self)
    }

    pub fn stop_commands(&self) -> Result<ModeSet> {
        self.get_attr_set("stop_commands")
    }
}

impl Device for DcMotor {
    fn path(&self) -> &Path {
        &self.path
    }
}

/// A hobby servo, positioned by pulse width
#[derive(Debug, Clone)]
pub struct ServoMotor {
    path: PathBuf,
}

impl ServoMotor {
    pub const COMMAND_RUN: &'static str = "run";
    pub const COMMAND_FLOAT: &'static str = "float";

    pub fn new(port: OutputPort) -> Result<Self> {
        Self::new_in(&SystemRoot::default(), port)
    }

    pub fn new_in(root: &SystemRoot, port: OutputPort) -> Result<Self> {
        let ports: Vec<&str> = port.name().into_iter().collect();
        let dev = GenericDevice::connect(
            &root.class_dir("servo-motor"),
            "motor",
            &[("port_name", ports.as_slice())],
        )?;
        Ok(Self {
            path: dev.into_path(),
        })
    }

    pub fn set_command(&self, command: &str) -> Result<&Self> {
        self.set_attr_string("command", command)?;
        Ok(self)
    }

    /// Drive the servo to [`ServoMotor::position_sp`]
    pub fn run(&self) -> Result<()> {
        self.set_command(Self::COMMAND_RUN).map(|_| ())
    }

    /// Remove power, letting the servo move freely
    pub fn float(&self) -> Result<()> {
        self.set_command(Self::COMMAND_FLOAT).map(|_| ())
    }

    pub fn driver_name(&self) -> Result<String> {
        self.get_attr_string("driver_name")
    }

    /// Pulse width, in milliseconds, for position 100
    pub fn max_pulse_sp(&self) -> Result<i32> {
        self.get_attr_int("max_pulse_sp")
    }

    pub fn set_max_pulse_sp(&self, value: i32) -> Result<&Self> {
        self.set_attr_int("max_pulse_sp", value)?;
        Ok(self)
    }

    /// Pulse width, in milliseconds, for position 0
    pub fn mid_pulse_sp(&self) -> Result<i32> {
        self.get_attr_int("mid_pulse_sp")
    }

    pub fn set_mid_pulse_sp(&self, value: i32) -> Result<&Self> {
        self.set_attr_int("mid_pulse_sp", value)?;
        Ok(self)
    }

    /// Pulse width, in milliseconds, for position -100
    pub fn min_pulse_sp(&self) -> Result<i32> {
        self.get_attr_int("min_pulse_sp")
    }

    pub fn set_min_pulse_sp(&self, value: i32) -> Result<&Self> {
        self.set_attr_int("min_pulse_sp", value)?;
        Ok(self)
    }

    pub fn polarity(&self) -> Result<Polarity> {
        Polarity::parse("polarity", self.get_attr_string("polarity")?)
    }

    pub fn set_polarity(&self, value: Polarity) -> Result<&Self> {
        self.set_attr_string("polarity", value.as_str())?;
        Ok(self)
    }

    pub fn port_name(&self) -> Result<String> {
        self.get_attr_string("port_name")
    }

    pub fn position_sp(&self) -> Result<i32> {
        self.get_attr_int("position_sp")
    }

    /// Target position, -100 to 100
    pub fn set_position_sp(&self, value: i32) -> Result<&Self> {
        self.set_attr_int("position_sp", value)?;
        Ok(self)
    }

    pub fn rate_sp(&self) -> Result<i32> {
        self.get_attr_int("rate_sp")
    }

    /// Milliseconds to travel from -100 to 100. 0 is as fast as possible.
    pub fn set_rate_sp(&self, value: i32) -> Result<&Self> {
        self.set_attr_int("rate_sp", value)?;
        Ok(self)
    }

    pub fn state(&self) -> Result<ModeSet> {
        self.get_attr_set("state")
    }
}

impl Device for ServoMotor {
    fn path(&self) -> &Path {
        &self.path
    }
}
