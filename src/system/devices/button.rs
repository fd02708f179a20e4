//! The EV3 brick buttons
//!
//! # Implementation
//!
//! The buttons are keys on the `gpio-keys` input device. Their state is read
//! with the `EVIOCGKEY` ioctl, which fills a bitmap with one bit per key code
//! that is currently held down.
//!
//! See the [kernel docs][1] for details
//!
//! [1]: https://www.kernel.org/doc/html/latest/input/input.html
use std::{
    fs::File,
    os::unix::io::AsRawFd,
    path::{Path, PathBuf},
};

use crate::{error::Result, system::SystemRoot};

mod _impl {
    use nix::*;

    ioctl_read_buf! {
        /// The `EVIOCGKEY` ioctl, defined in
        /// <linux/input.h>
        key_state, b'E', 0x18, u8
    }
}

/// Highest key code, `KEY_MAX` in <linux/input-event-codes.h>
const KEY_MAX: usize = 0x2ff;

/// Bytes needed for one bit per key code
const KEY_BYTES: usize = (KEY_MAX + 7) / 8 + 1;

/// Input device of the EV3 buttons, relative to the dev root
const EV3_KEYS: &str = "input/by-path/platform-gpio-keys.0-event";

/// Whether `code` is set in a key bitmap
fn key_set(bits: &[u8], code: u16) -> bool {
    let code = usize::from(code);
    bits.get(code / 8)
        .map_or(false, |byte| byte & (1 << (code % 8)) != 0)
}

/// A button, identified by its key code
#[derive(Debug, Clone)]
pub struct Button {
    device: PathBuf,
    code: u16,
}

impl Button {
    /// `KEY_BACKSPACE`
    pub const BACK: u16 = 14;
    /// `KEY_LEFT`
    pub const LEFT: u16 = 105;
    /// `KEY_RIGHT`
    pub const RIGHT: u16 = 106;
    /// `KEY_UP`
    pub const UP: u16 = 103;
    /// `KEY_DOWN`
    pub const DOWN: u16 = 108;
    /// `KEY_ENTER`
    pub const ENTER: u16 = 28;

    /// The EV3 button with key `code`
    pub fn new(code: u16) -> Self {
        Self::new_in(&SystemRoot::default(), code)
    }

    pub fn new_in(root: &SystemRoot, code: u16) -> Self {
        Self::with_device(root.dev().join(EV3_KEYS), code)
    }

    /// Key `code` on an arbitrary input device
    pub fn with_device<P: Into<PathBuf>>(device: P, code: u16) -> Self {
        Self {
            device: device.into(),
            code,
        }
    }

    pub fn back() -> Self {
        Self::new(Self::BACK)
    }

    pub fn left() -> Self {
        Self::new(Self::LEFT)
    }

    pub fn right() -> Self {
        Self::new(Self::RIGHT)
    }

    pub fn up() -> Self {
        Self::new(Self::UP)
    }

    pub fn down() -> Self {
        Self::new(Self::DOWN)
    }

    pub fn enter() -> Self {
        Self::new(Self::ENTER)
    }

    /// Input device this button is read from
    pub fn device(&self) -> &Path {
        &self.device
    }

    pub fn code(&self) -> u16 {
        self.code
    }

    /// Whether the button is currently held down
    ///
    /// # Errors
    ///
    /// - If the input device can't be opened
    /// - If it isn't an input device
    pub fn pressed(&self) -> Result<bool> {
        let f = File::open(&self.device)?;
        let mut bits = [0u8; KEY_BYTES];
        // Safety: `bits` is valid for writes of its whole length, which is
        // what the ioctl is told.
        unsafe { _impl::key_state(f.as_raw_fd(), &mut bits) }
            .map_err(std::io::Error::from)?;
        Ok(key_set(&bits, self.code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeRoot;

    #[test]
    fn bitmap() {
        let mut bits = [0u8; KEY_BYTES];
        bits[usize::from(Button::ENTER) / 8] |= 1 << (Button::ENTER % 8);
        assert!(key_set(&bits, Button::ENTER));
        assert!(!key_set(&bits, Button::BACK));
        assert!(!key_set(&bits, Button::UP));
        assert!(!key_set(&bits, u16::MAX));
    }

    #[test]
    fn device_paths() {
        let root = SystemRoot::default();
        let b = Button::new_in(&root, Button::LEFT);
        assert_eq!(
            b.device(),
            Path::new("/dev/input/by-path/platform-gpio-keys.0-event")
        );
        assert_eq!(b.code(), 105);
    }

    #[test]
    fn not_an_input_device() {
        let fake = FakeRoot::new();
        fake.dev_file(EV3_KEYS, b"");
        assert!(Button::new_in(fake.root(), Button::UP).pressed().is_err());

        let missing = FakeRoot::new();
        assert!(Button::new_in(missing.root(), Button::UP).pressed().is_err());
    }
}
