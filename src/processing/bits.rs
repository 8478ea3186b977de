//! # Bit Packer
//!
//! Reads and writes the low-order bits of a single 8-bit color channel.
//! A channel carries either one or two payload bits, selected by [`BitDepth`].
//! Everything above the low `depth` bits is left untouched:
//!
//! ```text
//! channel' = (channel & !mask) | (bits & mask)    where mask = (1 << depth) - 1
//! ```

use std::fmt;

use crate::error::StegoError;

/// Number of least-significant bits used per color channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BitDepth {
    One = 1,
    Two = 2,
}

impl BitDepth {
    /// Number of bits stored in each channel.
    pub fn bits(self) -> u8 {
        self as u8
    }

    /// Mask selecting the payload bits of a channel.
    pub fn mask(self) -> u8 {
        (1u8 << self.bits()) - 1
    }
}

impl TryFrom<u8> for BitDepth {
    type Error = StegoError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(BitDepth::One),
            2 => Ok(BitDepth::Two),
            other => Err(StegoError::InvalidBitDepth(other)),
        }
    }
}

impl From<BitDepth> for u8 {
    fn from(depth: BitDepth) -> Self {
        depth.bits()
    }
}

impl fmt::Display for BitDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits())
    }
}

/// Store the low `depth` bits of `bits` in `channel`.
pub fn embed_bits(channel: u8, bits: u8, depth: BitDepth) -> u8 {
    let mask = depth.mask();
    (channel & !mask) | (bits & mask)
}

/// Read the low `depth` bits of `channel`.
pub fn extract_bits(channel: u8, depth: BitDepth) -> u8 {
    channel & depth.mask()
}
