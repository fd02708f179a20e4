//! High level bindings to the LEGO Mindstorms EV3 devices exposed by the
//! ev3dev Linux kernel
//!
//! # Implementation details
//!
//! ev3dev exposes sensors, motors, LEDs and the battery through device
//! classes in `/sys/class`, so this library requires them to exist.
//!
//! Every device is found by scanning its class directory for an entry whose
//! attributes match what was asked for, usually a port and a driver name.
//! After that every getter and setter is a single, synchronous read or write
//! of one attribute file. Nothing is cached.
//!
//! The buttons, display and sound live outside of the device classes and use
//! `/dev` and a few external programs instead.
//!
//! # Example
//!
//! ```rust,no_run
//! # use ev3sys::system::{class::{motor::LargeMotor, sensor::TouchSensor}, port::*};
//! # fn main() -> ev3sys::error::Result<()> {
//! let touch = TouchSensor::new(InputPort::Auto)?;
//! let motor = LargeMotor::new(OutputPort::OutA)?;
//!
//! motor.set_duty_cycle_sp(50)?.run_direct()?;
//! while touch.value(0)? == 0 {}
//! motor.stop()?;
//! # Ok(())
//! # }
//! ```
#![doc(html_root_url = "https://docs.rs/ev3sys/0.1.0")]

pub mod error;
pub mod remote;
pub mod system;

#[cfg(test)]
mod testing;
mod util;
