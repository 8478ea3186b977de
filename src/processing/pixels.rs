//! # Pixel Stream Writer / Reader
//!
//! Serializes a byte buffer into a contiguous run of pixels and back.
//!
//! ## Traversal order
//!
//! Pixel index `i` maps to `(x = i % width, y = i / width)` (row-major).
//! Within each pixel the R, G and B channels are visited in that order; the
//! alpha channel is never touched. Each channel carries exactly `depth` bits
//! of the stream, and the byte buffer is consumed as a flat bitstream, most
//! significant bit first.
//!
//! ```text
//! depth = 1:  byte 0x48 = 0 1 0 0 1 0 0 0
//!                         R G B R G B R G      (pixels 0, 1, 2)
//! depth = 2:  byte 0x48 = 01 00 10 00
//!                         R  G  B  R           (pixels 0, 1)
//! ```
//!
//! The writer and reader are cursors: consecutive `write_bytes` /
//! `read_bytes` calls continue at the next channel, so fields inside a
//! block stay contiguous in the bitstream.

use image::RgbaImage;

use crate::error::{Result, StegoError};
use crate::processing::bits::{embed_bits, extract_bits, BitDepth};

/// Number of color channels per pixel that carry data (R, G, B).
pub const DATA_CHANNELS: usize = 3;

/// Total number of pixels in a carrier.
pub fn total_pixels(carrier: &RgbaImage) -> u64 {
    carrier.width() as u64 * carrier.height() as u64
}

fn coordinates(pixel: u64, width: u32) -> (u32, u32) {
    let width = width as u64;
    ((pixel % width) as u32, (pixel / width) as u32)
}

/// Bit shifts (MSB first) at which a byte is split into `depth`-bit groups.
fn shifts(depth: BitDepth) -> impl Iterator<Item = u8> {
    let step = depth.bits();
    (0..8 / step).rev().map(move |group| group * step)
}

/// Cursor that writes a bitstream into a carrier's low-order channel bits.
pub struct PixelWriter<'a> {
    carrier: &'a mut RgbaImage,
    depth: BitDepth,
    pixel: u64,
    channel: usize,
    total_pixels: u64,
}

impl<'a> PixelWriter<'a> {
    pub fn new(carrier: &'a mut RgbaImage, start_pixel: u64, depth: BitDepth) -> Self {
        let total_pixels = total_pixels(carrier);
        Self {
            carrier,
            depth,
            pixel: start_pixel,
            channel: 0,
            total_pixels,
        }
    }

    /// Write every byte of `bytes`, continuing where the previous call stopped.
    ///
    /// # Errors
    /// [`StegoError::CapacityExceeded`] if the carrier runs out of pixels.
    /// Channels written before the failure keep their new values.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        for &byte in bytes {
            for shift in shifts(self.depth) {
                self.put(byte >> shift)?;
            }
        }
        Ok(())
    }

    /// Index of the pixel the next channel write lands in.
    pub fn position(&self) -> u64 {
        self.pixel
    }

    fn put(&mut self, bits: u8) -> Result<()> {
        if self.pixel >= self.total_pixels {
            return Err(StegoError::CapacityExceeded(format!(
                "ran out of pixels at index {} of {}",
                self.pixel, self.total_pixels
            )));
        }

        let (x, y) = coordinates(self.pixel, self.carrier.width());
        let pixel = self.carrier.get_pixel_mut(x, y);
        pixel[self.channel] = embed_bits(pixel[self.channel], bits, self.depth);

        self.advance();
        Ok(())
    }

    fn advance(&mut self) {
        self.channel += 1;
        if self.channel == DATA_CHANNELS {
            self.channel = 0;
            self.pixel += 1;
        }
    }
}

/// Cursor that reads a bitstream back out of a carrier.
pub struct PixelReader<'a> {
    carrier: &'a RgbaImage,
    depth: BitDepth,
    pixel: u64,
    channel: usize,
    total_pixels: u64,
}

impl<'a> PixelReader<'a> {
    pub fn new(carrier: &'a RgbaImage, start_pixel: u64, depth: BitDepth) -> Self {
        Self {
            carrier,
            depth,
            pixel: start_pixel,
            channel: 0,
            total_pixels: total_pixels(carrier),
        }
    }

    /// Read `count` bytes, continuing where the previous call stopped.
    ///
    /// # Errors
    /// [`StegoError::InsufficientPixels`] if the carrier cannot supply `count`
    /// more bytes. The check runs before anything is read or allocated.
    pub fn read_bytes(&mut self, count: u64) -> Result<Vec<u8>> {
        let available = self.remaining_bits() / 8;
        if count > available {
            return Err(StegoError::InsufficientPixels(format!(
                "requested {} bytes but only {} remain from pixel {}",
                count, available, self.pixel
            )));
        }

        let mut output = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let mut byte = 0u8;
            for shift in shifts(self.depth) {
                byte |= self.take() << shift;
            }
            output.push(byte);
        }
        Ok(output)
    }

    /// Bits still readable from the current position.
    pub fn remaining_bits(&self) -> u64 {
        if self.pixel >= self.total_pixels {
            return 0;
        }
        let channels =
            (self.total_pixels - self.pixel) * DATA_CHANNELS as u64 - self.channel as u64;
        channels * self.depth.bits() as u64
    }

    fn take(&mut self) -> u8 {
        let (x, y) = coordinates(self.pixel, self.carrier.width());
        let bits = extract_bits(self.carrier.get_pixel(x, y)[self.channel], self.depth);

        self.channel += 1;
        if self.channel == DATA_CHANNELS {
            self.channel = 0;
            self.pixel += 1;
        }
        bits
    }
}

/// Write `bytes` into `carrier` starting at `start_pixel`.
pub fn write_bytes(
    carrier: &mut RgbaImage,
    start_pixel: u64,
    depth: BitDepth,
    bytes: &[u8],
) -> Result<()> {
    PixelWriter::new(carrier, start_pixel, depth).write_bytes(bytes)
}

/// Read `count` bytes from `carrier` starting at `start_pixel`.
pub fn read_bytes(
    carrier: &RgbaImage,
    start_pixel: u64,
    depth: BitDepth,
    count: u64,
) -> Result<Vec<u8>> {
    PixelReader::new(carrier, start_pixel, depth).read_bytes(count)
}
