//! Abstraction for handling devices in the `leds` class
//!
//! # Implementation
//!
//! This is the standard Linux LED class, not something ev3dev specific. The
//! EV3 has two bi-color LEDs, each exposed as a red and a green LED.
//!
//! The `delay_on` and `delay_off` attributes only exist while the `timer`
//! trigger is active, and the kernel takes a moment to create them.
//!
//! See the [kernel docs][1] for details
//!
//! [1]: https://www.kernel.org/doc/Documentation/ABI/testing/sysfs-class-led
use std::{
    path::{Path, PathBuf},
    thread,
    time::Duration,
};

use super::{Device, GenericDevice};
use crate::{
    error::Result,
    system::{ModeSet, SystemRoot},
};

/// How long the kernel gets to create the `timer` trigger attributes
const TIMER_SETTLE: Duration = Duration::from_millis(5);

/// An LED
#[derive(Debug, Clone)]
pub struct Led {
    path: PathBuf,
}

impl Led {
    pub const RED_LEFT: &'static str = "ev3:red:left";
    pub const RED_RIGHT: &'static str = "ev3:red:right";
    pub const GREEN_LEFT: &'static str = "ev3:green:left";
    pub const GREEN_RIGHT: &'static str = "ev3:green:right";

    /// Find the LED named `name`
    pub fn new(name: &str) -> Result<Self> {
        Self::new_in(&SystemRoot::default(), name)
    }

    pub fn new_in(root: &SystemRoot, name: &str) -> Result<Self> {
        let dev = GenericDevice::new(root.class_dir("leds").join(name))?;
        Ok(Self {
            path: dev.into_path(),
        })
    }

    pub fn max_brightness(&self) -> Result<i32> {
        self.get_attr_int("max_brightness")
    }

    pub fn brightness(&self) -> Result<i32> {
        self.get_attr_int("brightness")
    }

    /// Set the brightness, 0 to [`Led::max_brightness`]
    pub fn set_brightness(&self, value: i32) -> Result<&Self> {
        self.set_attr_int("brightness", value)?;
        Ok(self)
    }

    /// Active trigger
    pub fn trigger(&self) -> Result<String> {
        self.get_attr_from_set("trigger")
    }

    /// Let `trigger`, one of [`Led::triggers`], control the LED
    pub fn set_trigger(&self, trigger: &str) -> Result<&Self> {
        self.set_attr_string("trigger", trigger)?;
        Ok(self)
    }

    /// Available triggers
    pub fn triggers(&self) -> Result<ModeSet> {
        self.get_attr_set("trigger")
    }

    /// Full brightness
    pub fn on(&self) -> Result<()> {
        self.set_brightness(self.max_brightness()?).map(|_| ())
    }

    pub fn off(&self) -> Result<()> {
        self.set_brightness(0).map(|_| ())
    }

    /// Blink, `interval_ms` on then `interval_ms` off.
    ///
    /// An interval of 0 keeps the kernel default.
    pub fn flash(&self, interval_ms: u32) -> Result<()> {
        self.set_trigger("timer")?;
        if interval_ms != 0 {
            thread::sleep(TIMER_SETTLE);
            self.set_on_delay(interval_ms)?;
            self.set_off_delay(interval_ms)?;
        }
        Ok(())
    }

    /// Milliseconds on, while flashing
    pub fn set_on_delay(&self, ms: u32) -> Result<()> {
        self.set_attr_string("delay_on", &ms.to_string())
    }

    /// Milliseconds off, while flashing
    pub fn set_off_delay(&self, ms: u32) -> Result<()> {
        self.set_attr_string("delay_off", &ms.to_string())
    }
}

impl Device for Led {
    fn path(&self) -> &Path {
        &self.path
    }
}

/// The four EV3 LEDs
#[derive(Debug, Clone)]
pub struct Leds {
    pub red_left: Led,
    pub red_right: Led,
    pub green_left: Led,
    pub green_right: Led,
}

impl Leds {
    pub fn new() -> Result<Self> {
        Self::new_in(&SystemRoot::default())
    }

    pub fn new_in(root: &SystemRoot) -> Result<Self> {
        Ok(Self {
            red_left: Led::new_in(root, Led::RED_LEFT)?,
            red_right: Led::new_in(root, Led::RED_RIGHT)?,
            green_left: Led::new_in(root, Led::GREEN_LEFT)?,
            green_right: Led::new_in(root, Led::GREEN_RIGHT)?,
        })
    }

    pub fn red_on(&self) -> Result<()> {
        self.red_left.on()?;
        self.red_right.on()
    }

    pub fn red_off(&self) -> Result<()> {
        self.red_left.off()?;
        self.red_right.off()
    }

    pub fn green_on(&self) -> Result<()> {
        self.green_left.on()?;
        self.green_right.on()
    }

    pub fn green_off(&self) -> Result<()> {
        self.green_left.off()?;
        self.green_right.off()
    }

    /// Both colors on, which shows as amber
    pub fn all_on(&self) -> Result<()> {
        self.red_on()?;
        self.green_on()
    }

    pub fn all_off(&self) -> Result<()> {
        self.red_off()?;
        self.green_off()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{read, FakeRoot};
    use anyhow::Result;

    fn leds(fake: &FakeRoot) -> Vec<PathBuf> {
        [Led::RED_LEFT, Led::RED_RIGHT, Led::GREEN_LEFT, Led::GREEN_RIGHT]
            .iter()
            .map(|name| {
                fake.device(
                    "leds",
                    name,
                    &[
                        ("max_brightness", "255"),
                        ("brightness", "0"),
                        ("trigger", "[none] timer heartbeat default-on"),
                    ],
                )
            })
            .collect()
    }

    #[test]
    fn on_off() -> Result<()> {
        let fake = FakeRoot::new();
        let dirs = leds(&fake);
        let all = Leds::new_in(fake.root())?;

        all.red_on()?;
        assert_eq!(read(&dirs[0].join("brightness")), "255");
        assert_eq!(read(&dirs[1].join("brightness")), "255");
        assert_eq!(read(&dirs[2].join("brightness")), "0");

        all.all_on()?;
        assert_eq!(all.green_right.brightness()?, 255);
        all.all_off()?;
        for dir in &dirs {
            assert_eq!(read(&dir.join("brightness")), "0");
        }
        Ok(())
    }

    #[test]
    fn triggers() -> Result<()> {
        let fake = FakeRoot::new();
        let dirs = leds(&fake);
        let led = Led::new_in(fake.root(), Led::GREEN_LEFT)?;

        assert_eq!(led.trigger()?, "none");
        assert!(led.triggers()?.contains("heartbeat"));
        led.set_trigger("heartbeat")?;
        assert_eq!(read(&dirs[2].join("trigger")), "heartbeat");
        Ok(())
    }

    #[test]
    fn flash() -> Result<()> {
        let fake = FakeRoot::new();
        leds(&fake);
        let dir = fake.device("leds", Led::RED_RIGHT, &[("delay_on", "500"), ("delay_off", "500")]);
        let led = Led::new_in(fake.root(), Led::RED_RIGHT)?;

        led.flash(100)?;
        assert_eq!(read(&dir.join("trigger")), "timer");
        assert_eq!(read(&dir.join("delay_on")), "100");
        assert_eq!(read(&dir.join("delay_off")), "100");

        led.flash(0)?;
        assert_eq!(read(&dir.join("delay_on")), "100");
        Ok(())
    }

    #[test]
    fn missing() {
        let fake = FakeRoot::new();
        assert!(Led::new_in(fake.root(), Led::RED_LEFT).is_err());
        assert!(Leds::new_in(fake.root()).is_err());
    }
}
