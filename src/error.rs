//! # Error Types
//!
//! [`StegoError`] covers every failure of the steganographic codec and the
//! encode/decode orchestration. Cipher failures keep their own
//! [`CipherError`] and are passed through unchanged via [`StegoError::Cipher`].
//!
//! Every variant is terminal: nothing in this crate retries a failed
//! operation, since format, capacity and crypto failures are deterministic.

use thiserror::Error;

use crate::processing::cipher::CipherError;

/// Errors that can occur while embedding or extracting a payload.
#[derive(Debug, Error)]
pub enum StegoError {
    /// Requested or stored bit depth is not 1 or 2.
    #[error("invalid bit depth {0}: must be 1 or 2")]
    InvalidBitDepth(u8),

    /// The metadata block does not fit in the carrier.
    #[error("metadata too large: {0}")]
    MetadataTooLarge(String),

    /// The payload block does not fit in the pixels left after the metadata.
    #[error("payload too large: {0}")]
    PayloadTooLarge(String),

    /// The pixel stream writer ran out of pixels before all bytes were written.
    #[error("carrier capacity exceeded: {0}")]
    CapacityExceeded(String),

    /// Magic tag or format version mismatch.
    #[error("invalid carrier format: {0}")]
    InvalidCarrierFormat(String),

    /// The declared metadata length is zero, negative or implausible.
    #[error("metadata not found: {0}")]
    MetadataNotFound(String),

    /// The metadata bytes could not be deserialized.
    #[error("metadata decoding failed: {0}")]
    MetadataDecodingFailed(String),

    /// The decoded payload length is negative or exceeds the carrier capacity.
    #[error("invalid payload length: {0}")]
    PayloadLengthInvalid(String),

    /// The pixel stream reader ran out of pixels.
    #[error("insufficient pixels: {0}")]
    InsufficientPixels(String),

    /// The supplied password does not match the key hash recorded in the carrier.
    #[error("invalid encryption key: {0}")]
    InvalidEncryptionKey(String),

    /// Failure reported by the cipher module.
    #[error(transparent)]
    Cipher(#[from] CipherError),

    /// A payload flagged as text is not valid UTF-8.
    #[error("embedded text is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    /// Image bytes could not be decoded or re-encoded.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// A dispatched worker task panicked or was cancelled.
    #[error("worker task failed: {0}")]
    Worker(String),
}

pub type Result<T> = std::result::Result<T, StegoError>;
