//! # Image Processing and Steganography
//!
//! Hides payloads in the least significant bits of an image's color channels.
//!
//! ## Modules
//!
//! - [`bits`]: per-channel bit packing and [`BitDepth`](bits::BitDepth)
//! - [`pixels`]: pixel stream writer/reader over an RGBA buffer
//! - [`capacity`]: byte <-> pixel arithmetic
//! - [`metadata`]: the embedded metadata record and its binary form
//! - [`frame`]: on-carrier layout (header, metadata block, payload block)
//! - [`cipher`]: password-based encryption of payload bytes
//! - [`steganography`]: end-to-end text/file encode and decode

pub mod bits;
pub mod capacity;
pub mod cipher;
pub mod frame;
pub mod metadata;
pub mod pixels;
pub mod steganography;

// Re-export main functions for convenience
pub use steganography::{
    decode, decode_from_bytes, decode_with_depth, encode, encode_file, encode_text,
    encode_to_png, inspect, payload_capacity, DecodedContent, Payload,
};
