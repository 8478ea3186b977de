//! # Stego Metadata
//!
//! The self-describing record stored in front of the payload. It tells the
//! decoder which bit depth the payload uses, what kind of payload it is and
//! whether it is encrypted.
//!
//! ## Binary layout
//!
//! All integers are big-endian.
//!
//! ```text
//! [1 byte ] bit depth
//! [1 byte ] flags: bit0 = text, bit1 = file, bit2 = key hash, bit3 = file name
//! [2 bytes] key hash length   \  only when bit2 is set
//! [N bytes] key hash (UTF-8)  /
//! [2 bytes] file name length  \  only when bit3 is set
//! [N bytes] file name (UTF-8) /
//! ```

use serde::Serialize;

use crate::error::{Result, StegoError};
use crate::processing::bits::BitDepth;

const FLAG_TEXT: u8 = 0b0001;
const FLAG_FILE: u8 = 0b0010;
const FLAG_KEY_HASH: u8 = 0b0100;
const FLAG_FILE_NAME: u8 = 0b1000;
const KNOWN_FLAGS: u8 = FLAG_TEXT | FLAG_FILE | FLAG_KEY_HASH | FLAG_FILE_NAME;

/// Parameters needed to decode an embedded payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StegoMetadata {
    /// Payload bit depth as stored; checked with [`StegoMetadata::depth`].
    pub bit_depth: u8,
    pub has_text: bool,
    pub has_file: bool,
    /// Hex SHA-256 of the password, present when the payload is encrypted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_file_name: Option<String>,
}

impl StegoMetadata {
    /// Metadata for a text payload.
    pub fn text(depth: BitDepth, key_hash: Option<String>) -> Self {
        Self {
            bit_depth: depth.bits(),
            has_text: true,
            has_file: false,
            key_hash,
            original_file_name: None,
        }
    }

    /// Metadata for a file payload.
    pub fn file(depth: BitDepth, file_name: impl Into<String>, key_hash: Option<String>) -> Self {
        Self {
            bit_depth: depth.bits(),
            has_text: false,
            has_file: true,
            key_hash,
            original_file_name: Some(file_name.into()),
        }
    }

    /// The stored bit depth.
    ///
    /// # Errors
    /// [`StegoError::InvalidBitDepth`] if the stored value is not 1 or 2.
    pub fn depth(&self) -> Result<BitDepth> {
        BitDepth::try_from(self.bit_depth)
    }

    pub fn is_encrypted(&self) -> bool {
        self.key_hash.is_some()
    }

    /// Serialize to the compact binary form.
    ///
    /// # Errors
    /// [`StegoError::MetadataTooLarge`] if a string field exceeds 65535 bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut flags = 0u8;
        if self.has_text {
            flags |= FLAG_TEXT;
        }
        if self.has_file {
            flags |= FLAG_FILE;
        }
        if self.key_hash.is_some() {
            flags |= FLAG_KEY_HASH;
        }
        if self.original_file_name.is_some() {
            flags |= FLAG_FILE_NAME;
        }

        let mut bytes = vec![self.bit_depth, flags];
        if let Some(hash) = &self.key_hash {
            put_string(&mut bytes, "key hash", hash)?;
        }
        if let Some(name) = &self.original_file_name {
            put_string(&mut bytes, "file name", name)?;
        }
        Ok(bytes)
    }

    /// Parse the compact binary form. The input must be consumed exactly.
    ///
    /// # Errors
    /// [`StegoError::MetadataDecodingFailed`] on truncation, trailing bytes,
    /// unknown or conflicting flags, or invalid UTF-8.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut input = Input { bytes, offset: 0 };

        let bit_depth = input.u8()?;
        let flags = input.u8()?;
        if flags & !KNOWN_FLAGS != 0 {
            return Err(decoding(format!("unknown flag bits {:#04x}", flags)));
        }
        if flags & FLAG_TEXT != 0 && flags & FLAG_FILE != 0 {
            return Err(decoding("payload flagged as both text and file"));
        }

        let key_hash = if flags & FLAG_KEY_HASH != 0 {
            Some(input.string("key hash")?)
        } else {
            None
        };
        let original_file_name = if flags & FLAG_FILE_NAME != 0 {
            Some(input.string("file name")?)
        } else {
            None
        };

        if input.offset != bytes.len() {
            return Err(decoding(format!(
                "{} trailing bytes",
                bytes.len() - input.offset
            )));
        }

        Ok(Self {
            bit_depth,
            has_text: flags & FLAG_TEXT != 0,
            has_file: flags & FLAG_FILE != 0,
            key_hash,
            original_file_name,
        })
    }
}

fn put_string(out: &mut Vec<u8>, field: &str, value: &str) -> Result<()> {
    let len = u16::try_from(value.len()).map_err(|_| {
        StegoError::MetadataTooLarge(format!("{} is {} bytes (max 65535)", field, value.len()))
    })?;
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(value.as_bytes());
    Ok(())
}

fn decoding(detail: impl Into<String>) -> StegoError {
    StegoError::MetadataDecodingFailed(detail.into())
}

struct Input<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Input<'a> {
    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self
            .offset
            .checked_add(len)
            .filter(|&end| end <= self.bytes.len())
            .ok_or_else(|| decoding("metadata truncated"))?;
        let slice = &self.bytes[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn string(&mut self, field: &str) -> Result<String> {
        let len = self.take(2)?;
        let len = u16::from_be_bytes([len[0], len[1]]) as usize;
        let raw = self.take(len)?;
        String::from_utf8(raw.to_vec())
            .map_err(|_| decoding(format!("{} is not valid UTF-8", field)))
    }
}
