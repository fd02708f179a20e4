//! Error handling stuff
use displaydoc::Display;
use std::io;
use thiserror::Error;

/// Error type for everything in [`crate::system`]
#[derive(Debug, Display, Error)]
pub enum DeviceError {
    /// IO Failed: {0}
    Io(#[from] io::Error),

    /// Couldn't access attribute `{path}`: {source}
    Attribute { path: String, source: io::Error },

    /// No device matching `{pattern}*` in `{class}`
    NotFound { class: String, pattern: String },

    /// Attribute `{attribute}` had an invalid value `{value}`
    InvalidValue { attribute: String, value: String },

    /// Attribute `{0}` has no selected entry
    NoSelection(String),

    /// Value index {index} is out of range, the sensor only has {available}
    ValueIndex { index: u32, available: i32 },

    /// Remote control channel {0} is not in 1..=4
    Channel(u32),

    /// Command `{command}` failed: {reason}
    Command { command: String, reason: String },
}

pub type Result<T, E = DeviceError> = std::result::Result<T, E>;
