//! The EV3 display
//!
//! # Implementation
//!
//! The display is a Linux framebuffer, `fb0`. Its geometry is read from the
//! `graphics` class in sysfs, and pixels are written to the device file.
//!
//! Pixels are drawn into an in-memory copy of the framebuffer, and only show
//! up after [`Lcd::update`].
//!
//! See the [kernel docs][1] for details
//!
//! [1]: https://www.kernel.org/doc/Documentation/ABI/testing/sysfs-class-graphics
use std::{
    fs,
    io::prelude::*,
    path::{Path, PathBuf},
};

use crate::{
    error::{DeviceError, Result},
    system::SystemRoot,
    util::{parse_int, read_attr},
};

/// Framebuffer name, both in the `graphics` class and `/dev`
const FB: &str = "fb0";

fn invalid(attribute: &str, value: &str) -> DeviceError {
    DeviceError::InvalidValue {
        attribute: attribute.into(),
        value: value.trim().into(),
    }
}

fn read_u32(path: &Path, name: &str) -> Result<u32> {
    let value = parse_int(name, &read_attr(&path.join(name))?)?;
    u32::try_from(value).map_err(|_| invalid(name, &value.to_string()))
}

/// Parse the `virtual_size` attribute, formatted as `xres,yres`
fn parse_size(value: &str) -> Result<(u32, u32)> {
    let (x, y) = value
        .trim()
        .split_once(',')
        .ok_or_else(|| invalid("virtual_size", value))?;
    let x = x.parse().map_err(|_| invalid("virtual_size", value))?;
    let y = y.parse().map_err(|_| invalid("virtual_size", value))?;
    Ok((x, y))
}

/// The display
#[derive(Debug)]
pub struct Lcd {
    device: PathBuf,
    xres: u32,
    yres: u32,
    bpp: u32,
    line_length: u32,
    buf: Vec<u8>,
}

impl Lcd {
    pub fn new() -> Result<Self> {
        Self::new_in(&SystemRoot::default())
    }

    /// Read the framebuffer geometry.
    ///
    /// # Errors
    ///
    /// - If the framebuffer doesn't exist in sysfs
    /// - If its attributes don't parse
    pub fn new_in(root: &SystemRoot) -> Result<Self> {
        let class = root.class_dir("graphics").join(FB);
        let (xres, yres) = parse_size(&read_attr(&class.join("virtual_size"))?)?;
        let bpp = read_u32(&class, "bits_per_pixel")?;
        let line_length = read_u32(&class, "stride")?;
        let size = line_length as usize * yres as usize;
        Ok(Self {
            device: root.dev().join(FB),
            xres,
            yres,
            bpp,
            line_length,
            buf: vec![0; size],
        })
    }

    /// Whether the framebuffer device file exists
    pub fn available(&self) -> bool {
        self.device.exists()
    }

    pub fn resolution_x(&self) -> u32 {
        self.xres
    }

    pub fn resolution_y(&self) -> u32 {
        self.yres
    }

    pub fn bits_per_pixel(&self) -> u32 {
        self.bpp
    }

    /// Bytes in the whole framebuffer
    pub fn frame_buffer_size(&self) -> usize {
        self.buf.len()
    }

    /// Bytes in one line, including any padding
    pub fn line_length(&self) -> u32 {
        self.line_length
    }

    /// The in-memory framebuffer, `line_length * resolution_y` bytes
    pub fn frame_buffer(&mut self) -> &mut [u8] {
        &mut self.buf
    }

    /// Set every byte of the framebuffer to `pixel`
    pub fn fill(&mut self, pixel: u8) {
        self.buf.fill(pixel);
    }

    /// Write the framebuffer to the display
    pub fn update(&self) -> Result<()> {
        let mut f = fs::OpenOptions::new().write(true).open(&self.device)?;
        f.write_all(&self.buf)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeRoot;
    use anyhow::Result;

    fn fb(fake: &FakeRoot) {
        fake.sys_file("class/graphics/fb0/virtual_size", "178,128");
        fake.sys_file("class/graphics/fb0/bits_per_pixel", "1");
        fake.sys_file("class/graphics/fb0/stride", "24");
    }

    #[test]
    fn geometry() -> Result<()> {
        let fake = FakeRoot::new();
        fb(&fake);
        let lcd = Lcd::new_in(fake.root())?;
        assert_eq!(lcd.resolution_x(), 178);
        assert_eq!(lcd.resolution_y(), 128);
        assert_eq!(lcd.bits_per_pixel(), 1);
        assert_eq!(lcd.line_length(), 24);
        assert_eq!(lcd.frame_buffer_size(), 24 * 128);
        assert!(!lcd.available());
        Ok(())
    }

    #[test]
    fn fill_and_update() -> Result<()> {
        let fake = FakeRoot::new();
        fb(&fake);
        let dev = fake.dev_file("fb0", b"");
        let mut lcd = Lcd::new_in(fake.root())?;
        assert!(lcd.available());

        lcd.fill(0xff);
        lcd.frame_buffer()[0] = 0x0f;
        lcd.update()?;

        let written = std::fs::read(dev)?;
        assert_eq!(written.len(), 24 * 128);
        assert_eq!(written[0], 0x0f);
        assert!(written[1..].iter().all(|&b| b == 0xff));
        Ok(())
    }

    #[test]
    fn bad_geometry() {
        assert!(parse_size("178x128").is_err());
        assert!(parse_size("178,").is_err());
        assert_eq!(parse_size("178,128\n").unwrap(), (178, 128));

        let fake = FakeRoot::new();
        assert!(Lcd::new_in(fake.root()).is_err());
    }
}
