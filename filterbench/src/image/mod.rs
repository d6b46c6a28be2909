#[cfg(test)]
mod tests;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::common::{Error, Result};

/// Bytes per pixel; every image is interleaved RGBA with 8-bit channels.
pub const CHANNELS: usize = 4;

/// Luma weights applied to channels 0, 1 and 2.
pub const LUMA_WEIGHTS: [f32; 3] = [0.299, 0.587, 0.114];

/// Rectangular RGBA8 pixel buffer.
///
/// Accessors work on normalized floats and clamp coordinates into the image
/// (border replication), so neighbourhood taps never read out of bounds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Image {
    width: u32,
    height: u32,
    bytes: Vec<u8>,
}

impl Image {
    /// Creates a zero-filled image.
    pub fn new_empty(width: u32, height: u32) -> Result<Image> {
        validate_dims(width, height)?;

        Ok(Image {
            width,
            height,
            bytes: vec![0; width as usize * height as usize * CHANNELS],
        })
    }

    pub fn new_with_data(width: u32, height: u32, bytes: Vec<u8>) -> Result<Image> {
        validate_dims(width, height)?;

        let expected = width as usize * height as usize * CHANNELS;
        if bytes.len() != expected {
            return Err(Error::config(format!(
                "bytes length {} does not match expected size {} for {}x{} RGBA",
                bytes.len(),
                expected,
                width,
                height
            )));
        }

        Ok(Image {
            width,
            height,
            bytes,
        })
    }

    /// Creates an image with random RGB values and opaque alpha.
    ///
    /// The same seed always produces the same pixels.
    pub fn new_random(width: u32, height: u32, seed: u64) -> Result<Image> {
        let mut image = Image::new_empty(width, height)?;
        let mut rng = StdRng::seed_from_u64(seed);

        rng.fill(image.bytes.as_mut_slice());
        for px in image.bytes.chunks_exact_mut(CHANNELS) {
            px[3] = u8::MAX;
        }

        Ok(image)
    }

    /// Creates an image with every pixel set to `rgba`.
    pub fn new_filled(width: u32, height: u32, rgba: [u8; 4]) -> Result<Image> {
        let mut image = Image::new_empty(width, height)?;
        for px in image.bytes.chunks_exact_mut(CHANNELS) {
            px.copy_from_slice(&rgba);
        }

        Ok(image)
    }

    /// Creates an image of the same dimensions, zero-filled.
    pub fn new_like(&self) -> Image {
        Image {
            width: self.width,
            height: self.height,
            bytes: vec![0; self.bytes.len()],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dims(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn size_in_bytes(&self) -> usize {
        self.bytes.len()
    }

    /// Number of bytes in one row.
    pub fn row_bytes(&self) -> usize {
        self.width as usize * CHANNELS
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    pub fn take_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Copies pixel data from `other`, which must have the same dimensions.
    pub fn copy_from(&mut self, other: &Image) -> Result<()> {
        if self.dims() != other.dims() {
            return Err(Error::config(format!("Cannot copy {} into {}", other, self)));
        }
        self.bytes.copy_from_slice(&other.bytes);
        Ok(())
    }

    /// Byte offset of the clamped pixel `(x, y)`.
    #[inline]
    fn offset(&self, x: i32, y: i32) -> usize {
        let x = x.clamp(0, self.width as i32 - 1) as usize;
        let y = y.clamp(0, self.height as i32 - 1) as usize;
        (y * self.width as usize + x) * CHANNELS
    }

    /// Returns channel `c` of pixel `(x, y)` normalized to `[0, 1]`.
    #[inline]
    pub fn get_pixel(&self, x: i32, y: i32, c: usize) -> f32 {
        self.bytes[self.offset(x, y) + c] as f32 / 255.0
    }

    /// Luma of pixel `(x, y)`.
    #[inline]
    pub fn get_pixel_grayscale(&self, x: i32, y: i32) -> f32 {
        let offset = self.offset(x, y);
        let px = &self.bytes[offset..offset + 3];
        px[0] as f32 / 255.0 * LUMA_WEIGHTS[0]
            + px[1] as f32 / 255.0 * LUMA_WEIGHTS[1]
            + px[2] as f32 / 255.0 * LUMA_WEIGHTS[2]
    }

    #[inline]
    pub fn set_pixel(&mut self, x: i32, y: i32, c: usize, value: f32) {
        let offset = self.offset(x, y);
        self.bytes[offset + c] = quantize(value);
    }

    /// Writes `value` into channels 0..3 and makes the pixel opaque.
    #[inline]
    pub fn set_pixel_grayscale(&mut self, x: i32, y: i32, value: f32) {
        let offset = self.offset(x, y);
        let v = quantize(value);
        self.bytes[offset..offset + CHANNELS].copy_from_slice(&[v, v, v, u8::MAX]);
    }
}

/// Clamps a normalized value into `[0, 1]` and rounds it to a byte.
///
/// Every backend quantizes with this rule so that outputs are comparable.
#[inline]
pub fn quantize(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0 + 0.5) as u8
}

fn validate_dims(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(Error::config(format!(
            "image dimensions must be non-zero, got {}x{}",
            width, height
        )));
    }
    if width > i32::MAX as u32 || height > i32::MAX as u32 {
        return Err(Error::config(format!(
            "image dimensions {}x{} are too large",
            width, height
        )));
    }

    Ok(())
}

impl std::fmt::Display for Image {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{} RGBA_U8", self.width, self.height)
    }
}
