//! # lsb-stego
//!
//! Hides text or file payloads, optionally password-encrypted, in the least
//! significant bits of an image's R, G and B channels, and recovers them
//! byte-for-byte.
//!
//! ```rust,ignore
//! use lsb_stego::{decode, encode_text};
//!
//! let cover = image::open("cover.png")?.to_rgba8();
//! let stego = encode_text(&cover, "Hello World", Some("pw"), 1)?;
//! let decoded = decode(&stego, Some("pw"))?;
//! assert_eq!(decoded.text.as_deref(), Some("Hello World"));
//! ```

pub mod common;
pub mod error;
pub mod processing;
pub mod service;

pub use error::StegoError;
pub use processing::bits::BitDepth;
pub use processing::cipher::CipherError;
pub use processing::metadata::StegoMetadata;
pub use processing::{
    decode, decode_from_bytes, decode_with_depth, encode, encode_file, encode_text,
    encode_to_png, inspect, payload_capacity, DecodedContent, Payload,
};
pub use service::ServiceCore;
