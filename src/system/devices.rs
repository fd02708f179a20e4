//! EV3 hardware that isn't exposed through a device class
//!
//! These use device files in `/dev`, and for sound, external programs.

pub mod button;
pub mod lcd;
pub mod sound;
