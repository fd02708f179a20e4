//! The EV3 infrared remote control
//!
//! The remote has no driver of its own. Button presses are read from an
//! [`InfraredSensor`] in `IR-REMOTE` mode, which reports one value per
//! channel, and the remote's slider picks the channel.
//!
//! # Example
//!
//! ```rust,no_run
//! # use ev3sys::remote::*;
//! # fn main() -> ev3sys::error::Result<()> {
//! let mut remote = RemoteControl::new(1)?;
//! remote.on_red_up(|pressed| println!("red up: {}", pressed));
//! loop {
//!     remote.process()?;
//! }
//! # }
//! ```
use bitflags::bitflags;
use log::trace;

use crate::{
    error::{DeviceError, Result},
    system::{class::sensor::InfraredSensor, port::InputPort, SystemRoot},
};

bitflags! {
    /// Buttons held on the remote
    ///
    /// The remote reports at most two buttons at once.
    pub struct RemoteButtons: u8 {
        const RED_UP = 1 << 0;
        const RED_DOWN = 1 << 1;
        const BLUE_UP = 1 << 2;
        const BLUE_DOWN = 1 << 3;
        const BEACON = 1 << 4;
    }
}

impl RemoteButtons {
    /// Decode an `IR-REMOTE` value.
    ///
    /// Unknown values decode to no buttons.
    pub fn from_value(value: i32) -> Self {
        match value {
            1 => Self::RED_UP,
            2 => Self::RED_DOWN,
            3 => Self::BLUE_UP,
            4 => Self::BLUE_DOWN,
            5 => Self::RED_UP | Self::BLUE_UP,
            6 => Self::RED_UP | Self::BLUE_DOWN,
            7 => Self::RED_DOWN | Self::BLUE_UP,
            8 => Self::RED_DOWN | Self::BLUE_DOWN,
            9 => Self::BEACON,
            10 => Self::RED_UP | Self::RED_DOWN,
            11 => Self::BLUE_UP | Self::BLUE_DOWN,
            _ => Self::empty(),
        }
    }
}

type ButtonHandler = Box<dyn FnMut(bool)>;

/// Calls handlers as remote buttons are pressed and released
pub struct RemoteControl {
    sensor: InfraredSensor,
    channel: u32,
    value: i32,
    state: RemoteButtons,
    red_up: Option<ButtonHandler>,
    red_down: Option<ButtonHandler>,
    blue_up: Option<ButtonHandler>,
    blue_down: Option<ButtonHandler>,
    beacon: Option<ButtonHandler>,
    state_change: Option<Box<dyn FnMut(RemoteButtons)>>,
}

impl std::fmt::Debug for RemoteControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteControl")
            .field("sensor", &self.sensor)
            .field("channel", &self.channel)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl RemoteControl {
    /// Use the first infrared sensor found, listening on `channel`, 1 to 4.
    pub fn new(channel: u32) -> Result<Self> {
        Self::new_in(&SystemRoot::default(), channel)
    }

    pub fn new_in(root: &SystemRoot, channel: u32) -> Result<Self> {
        Self::with_sensor(InfraredSensor::new_in(root, InputPort::Auto)?, channel)
    }

    /// Listen on `channel` of `sensor`, switching it to `IR-REMOTE` mode
    ///
    /// # Errors
    ///
    /// - [`DeviceError::Channel`] if `channel` isn't 1 to 4
    /// - If the mode can't be set
    pub fn with_sensor(sensor: InfraredSensor, channel: u32) -> Result<Self> {
        if !(1..=4).contains(&channel) {
            return Err(DeviceError::Channel(channel));
        }
        sensor.set_mode(InfraredSensor::MODE_IR_REMOTE)?;
        Ok(Self {
            sensor,
            channel: channel - 1,
            value: 0,
            state: RemoteButtons::empty(),
            red_up: None,
            red_down: None,
            blue_up: None,
            blue_down: None,
            beacon: None,
            state_change: None,
        })
    }

    /// Channel, 1 to 4
    pub fn channel(&self) -> u32 {
        self.channel + 1
    }

    /// Buttons held as of the last [`RemoteControl::process`]
    pub fn state(&self) -> RemoteButtons {
        self.state
    }

    pub fn sensor(&self) -> &InfraredSensor {
        &self.sensor
    }

    /// Whether the sensor is still plugged in
    pub fn connected(&self) -> bool {
        use crate::system::class::Device;
        self.sensor.connected()
    }

    pub fn on_red_up(&mut self, f: impl FnMut(bool) + 'static) {
        self.red_up = Some(Box::new(f));
    }

    pub fn on_red_down(&mut self, f: impl FnMut(bool) + 'static) {
        self.red_down = Some(Box::new(f));
    }

    pub fn on_blue_up(&mut self, f: impl FnMut(bool) + 'static) {
        self.blue_up = Some(Box::new(f));
    }

    pub fn on_blue_down(&mut self, f: impl FnMut(bool) + 'static) {
        self.blue_down = Some(Box::new(f));
    }

    pub fn on_beacon(&mut self, f: impl FnMut(bool) + 'static) {
        self.beacon = Some(Box::new(f));
    }

    /// Called with every new set of held buttons, after the per-button
    /// handlers
    pub fn on_state_change(&mut self, f: impl FnMut(RemoteButtons) + 'static) {
        self.state_change = Some(Box::new(f));
    }

    /// Read the sensor once, calling handlers for anything that changed.
    ///
    /// Returns whether anything changed.
    pub fn process(&mut self) -> Result<bool> {
        let value = self.sensor.value(self.channel)?;
        if value == self.value {
            return Ok(false);
        }
        trace!("Remote channel {} value {}", self.channel(), value);
        self.value = value;
        self.dispatch(RemoteButtons::from_value(value));
        Ok(true)
    }

    fn dispatch(&mut self, state: RemoteButtons) {
        let changed = self.state ^ state;
        let handlers = [
            (RemoteButtons::RED_UP, &mut self.red_up),
            (RemoteButtons::RED_DOWN, &mut self.red_down),
            (RemoteButtons::BLUE_UP, &mut self.blue_up),
            (RemoteButtons::BLUE_DOWN, &mut self.blue_down),
            (RemoteButtons::BEACON, &mut self.beacon),
        ];
        for (button, handler) in handlers {
            if !changed.contains(button) {
                continue;
            }
            if let Some(f) = handler {
                f(state.contains(button));
            }
        }
        if changed.is_empty() {
            return;
        }
        self.state = state;
        if let Some(f) = &mut self.state_change {
            f(state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{system::class::sensor::driver, testing::FakeRoot};
    use anyhow::Result;
    use std::{cell::RefCell, fs, path::PathBuf, rc::Rc};

    fn ir(fake: &FakeRoot) -> PathBuf {
        fake.device(
            "lego-sensor",
            "sensor0",
            &[
                ("port_name", "in4"),
                ("driver_name", driver::EV3_INFRARED),
                ("mode", "IR-PROX"),
                ("num_values", "4"),
                ("value0", "0"),
                ("value1", "0"),
                ("value2", "0"),
                ("value3", "0"),
            ],
        )
    }

    #[test]
    fn decode() {
        assert_eq!(RemoteButtons::from_value(0), RemoteButtons::empty());
        assert_eq!(
            RemoteButtons::from_value(7),
            RemoteButtons::RED_DOWN | RemoteButtons::BLUE_UP
        );
        assert_eq!(RemoteButtons::from_value(9), RemoteButtons::BEACON);
        assert_eq!(
            RemoteButtons::from_value(11),
            RemoteButtons::BLUE_UP | RemoteButtons::BLUE_DOWN
        );
        assert_eq!(RemoteButtons::from_value(42), RemoteButtons::empty());
    }

    #[test]
    fn channels() -> Result<()> {
        let fake = FakeRoot::new();
        ir(&fake);
        assert!(matches!(
            RemoteControl::new_in(fake.root(), 0),
            Err(DeviceError::Channel(0))
        ));
        assert!(matches!(
            RemoteControl::new_in(fake.root(), 5),
            Err(DeviceError::Channel(5))
        ));
        let remote = RemoteControl::new_in(fake.root(), 4)?;
        assert_eq!(remote.channel(), 4);
        assert!(remote.connected());
        Ok(())
    }

    #[test]
    fn handlers() -> Result<()> {
        let fake = FakeRoot::new();
        let dir = ir(&fake);
        let mut remote = RemoteControl::new_in(fake.root(), 2)?;
        assert_eq!(crate::testing::read(&dir.join("mode")), "IR-REMOTE");

        let events = Rc::new(RefCell::new(Vec::new()));
        let e = events.clone();
        remote.on_red_up(move |p| e.borrow_mut().push(("red_up", p)));
        let e = events.clone();
        remote.on_blue_up(move |p| e.borrow_mut().push(("blue_up", p)));
        let states = Rc::new(RefCell::new(Vec::new()));
        let s = states.clone();
        remote.on_state_change(move |b| s.borrow_mut().push(b));

        assert!(!remote.process()?);

        // Channel 2 is value1
        fs::write(dir.join("value1"), "1\n")?;
        assert!(remote.process()?);
        assert!(!remote.process()?);
        assert_eq!(remote.state(), RemoteButtons::RED_UP);

        fs::write(dir.join("value1"), "5\n")?;
        assert!(remote.process()?);

        fs::write(dir.join("value1"), "0\n")?;
        assert!(remote.process()?);

        assert_eq!(
            *events.borrow(),
            vec![
                ("red_up", true),
                ("blue_up", true),
                ("red_up", false),
                ("blue_up", false)
            ]
        );
        assert_eq!(
            *states.borrow(),
            vec![
                RemoteButtons::RED_UP,
                RemoteButtons::RED_UP | RemoteButtons::BLUE_UP,
                RemoteButtons::empty()
            ]
        );
        Ok(())
    }

    #[test]
    fn other_channels_ignored() -> Result<()> {
        let fake = FakeRoot::new();
        let dir = ir(&fake);
        let mut remote = RemoteControl::new_in(fake.root(), 1)?;
        fs::write(dir.join("value3"), "9\n")?;
        assert!(!remote.process()?);
        assert_eq!(remote.state(), RemoteButtons::empty());
        Ok(())
    }
}
