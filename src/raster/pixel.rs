//! Channel layout and per-pixel colour operations.
//!
//! Pixels are 4 bytes in BGRA order with premultiplied alpha. Alpha is kept
//! opaque; only the colour channels are written by the operations here.

/// Bytes per pixel.
pub const BYTES_PER_PIXEL: usize = 4;
/// `1 << BYTES_PER_PIXEL_SHIFT == BYTES_PER_PIXEL`
pub const BYTES_PER_PIXEL_SHIFT: u32 = 2;

pub const BLUE_OFFSET: usize = 0;
pub const GREEN_OFFSET: usize = 1;
pub const RED_OFFSET: usize = 2;
pub const ALPHA_OFFSET: usize = 3;

/// Clamp a channel value to `[0, 255]`.
#[inline]
pub fn clamp(component: i32) -> u8 {
    component.clamp(0, 255) as u8
}

/// Channel byte to `[0, 1]`.
#[inline]
pub fn i2f(brightness: i32) -> f32 {
    brightness as f32 / 255.0
}

/// `[0, 1]` to a channel value. Truncates; callers clamp on write.
#[inline]
pub fn f2i(brightness: f32) -> i32 {
    (brightness * 255.0) as i32
}

/// Move `old` toward `new` by `alpha / 255`, rounding to nearest. Alpha 0
/// or less keeps `old`; 255 or more gives `new`.
#[inline]
pub fn blend(old: i32, new: i32, alpha: i32) -> i32 {
    if alpha <= 0 {
        return old;
    }
    if alpha >= 255 {
        return new;
    }
    let delta = (new - old) * alpha;
    old + (delta + if delta >= 0 { 127 } else { -127 }) / 255
}

/// Product of two channel values scaled back to `[0, 255]`.
#[inline]
pub fn multiply(a: i32, b: i32) -> i32 {
    (a * b + 127) / 255
}

/// Mutable view of one pixel.
pub struct PixelMut<'a> {
    bytes: &'a mut [u8],
}

impl<'a> PixelMut<'a> {
    /// Wrap the first [`BYTES_PER_PIXEL`] bytes of `bytes`.
    #[inline]
    pub fn new(bytes: &'a mut [u8]) -> Self {
        debug_assert!(bytes.len() >= BYTES_PER_PIXEL);
        Self { bytes: &mut bytes[..BYTES_PER_PIXEL] }
    }

    #[inline]
    pub fn red(&self) -> i32 {
        self.bytes[RED_OFFSET] as i32
    }

    #[inline]
    pub fn green(&self) -> i32 {
        self.bytes[GREEN_OFFSET] as i32
    }

    #[inline]
    pub fn blue(&self) -> i32 {
        self.bytes[BLUE_OFFSET] as i32
    }

    #[inline]
    pub fn alpha(&self) -> i32 {
        self.bytes[ALPHA_OFFSET] as i32
    }

    /// Packed `0xAARRGGBB` with alpha forced opaque.
    pub fn argb(&self) -> u32 {
        0xFF00_0000 | (self.red() as u32) << 16 | (self.green() as u32) << 8 | self.blue() as u32
    }

    #[inline]
    pub fn set_red(&mut self, red: i32) {
        self.bytes[RED_OFFSET] = clamp(red);
    }

    #[inline]
    pub fn set_green(&mut self, green: i32) {
        self.bytes[GREEN_OFFSET] = clamp(green);
    }

    #[inline]
    pub fn set_blue(&mut self, blue: i32) {
        self.bytes[BLUE_OFFSET] = clamp(blue);
    }

    #[inline]
    pub fn set_rgb(&mut self, red: i32, green: i32, blue: i32) {
        self.set_red(red);
        self.set_green(green);
        self.set_blue(blue);
    }

    #[inline]
    pub fn set_grayscale(&mut self, brightness: i32) {
        let value = clamp(brightness);
        self.bytes[RED_OFFSET] = value;
        self.bytes[GREEN_OFFSET] = value;
        self.bytes[BLUE_OFFSET] = value;
    }

    /// Saturating add per channel.
    #[inline]
    pub fn add_rgb(&mut self, red: i32, green: i32, blue: i32) {
        self.set_rgb(self.red() + red, self.green() + green, self.blue() + blue);
    }

    #[inline]
    pub fn add_grayscale(&mut self, brightness: i32) {
        self.add_rgb(brightness, brightness, brightness);
    }

    #[inline]
    pub fn multiply_rgb(&mut self, red: i32, green: i32, blue: i32) {
        self.set_rgb(
            multiply(self.red(), red),
            multiply(self.green(), green),
            multiply(self.blue(), blue),
        );
    }

    #[inline]
    pub fn multiply_grayscale(&mut self, brightness: i32) {
        self.multiply_rgb(brightness, brightness, brightness);
    }

    /// Alpha-blend a colour over this pixel. Alpha 0 or less leaves the
    /// pixel untouched; 255 or more overwrites it.
    #[inline]
    pub fn blend_rgb(&mut self, red: i32, green: i32, blue: i32, alpha: i32) {
        if alpha <= 0 {
            return;
        }
        if alpha >= 255 {
            self.set_rgb(red, green, blue);
            return;
        }
        self.set_rgb(
            blend(self.red(), red, alpha),
            blend(self.green(), green, alpha),
            blend(self.blue(), blue, alpha),
        );
    }
}
