//! # Capacity Calculator
//!
//! Converts between byte counts and pixel counts for a given bit depth.
//! Each pixel carries `3 * depth` bits (R, G, B).
//!
//! Intermediate arithmetic is done in `u128`, so any `u64` byte or pixel
//! count is handled without overflow; results that do not fit back into a
//! `u64` saturate.

use crate::processing::bits::BitDepth;
use crate::processing::pixels::DATA_CHANNELS;

fn bits_per_pixel(depth: BitDepth) -> u128 {
    DATA_CHANNELS as u128 * depth.bits() as u128
}

/// Pixels needed to store `byte_count` bytes: `ceil(bytes * 8 / (3 * depth))`.
pub fn pixels_needed(byte_count: u64, depth: BitDepth) -> u64 {
    let bits = byte_count as u128 * 8;
    let per_pixel = bits_per_pixel(depth);
    u64::try_from(bits.div_ceil(per_pixel)).unwrap_or(u64::MAX)
}

/// Bytes that fit in `pixels` pixels: `floor(pixels * 3 * depth / 8)`.
pub fn max_payload_bytes(pixels: u64, depth: BitDepth) -> u64 {
    let bits = pixels as u128 * bits_per_pixel(depth);
    u64::try_from(bits / 8).unwrap_or(u64::MAX)
}
