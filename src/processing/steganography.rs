//! # LSB Steganography
//!
//! End-to-end encode and decode of text or file payloads, optionally
//! password-protected. This is the only layer that knows about payload kinds
//! and encryption policy; the [`frame`](super::frame) codec and the
//! [`cipher`](super::cipher) module are payload-agnostic.
//!
//! ## Encoding Process
//! 1. Validate the requested bit depth
//! 2. If a password is given, encrypt the payload and record the password hash
//! 3. Build the [`StegoMetadata`] record (depth, payload kind, key hash, file name)
//! 4. Embed metadata + payload into a copy of the carrier
//!
//! ## Decoding Process
//! 1. Extract the metadata block (always at depth 1)
//! 2. If the payload is encrypted, check the supplied password against the
//!    recorded hash before any cipher work
//! 3. Extract the payload at the metadata's bit depth
//! 4. Decrypt if needed and split into text / file fields
//!
//! The caller's carrier is never mutated: encoding works on an owned copy and
//! returns it.

use image::RgbaImage;
use log::{debug, warn};
use serde::Serialize;

use crate::error::{Result, StegoError};
use crate::processing::bits::BitDepth;
use crate::processing::cipher;
use crate::processing::frame;
use crate::processing::metadata::StegoMetadata;

/// Content to hide in a carrier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// A UTF-8 text message.
    Text(String),
    /// A file, embedded together with its original name.
    File { name: String, bytes: Vec<u8> },
}

impl Payload {
    fn bytes(&self) -> &[u8] {
        match self {
            Payload::Text(text) => text.as_bytes(),
            Payload::File { bytes, .. } => bytes.as_slice(),
        }
    }

    fn metadata(&self, depth: BitDepth, key_hash: Option<String>) -> StegoMetadata {
        match self {
            Payload::Text(_) => StegoMetadata::text(depth, key_hash),
            Payload::File { name, .. } => StegoMetadata::file(depth, name.clone(), key_hash),
        }
    }
}

/// Content recovered from a stego carrier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DecodedContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip)]
    pub file: Option<Vec<u8>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

/// Embed `payload` into a copy of `carrier`.
///
/// # Arguments
/// - `carrier`: Cover image; left untouched
/// - `payload`: Text or file content to hide
/// - `password`: Optional password; when present the payload is encrypted
/// - `bit_depth`: Payload bits per color channel (1 or 2)
///
/// # Returns
/// - `Ok(RgbaImage)`: The stego image
///
/// # Errors
/// - [`StegoError::InvalidBitDepth`] for a depth other than 1 or 2
/// - [`StegoError::Cipher`] if encryption fails (e.g. empty password)
/// - [`StegoError::MetadataTooLarge`] / [`StegoError::PayloadTooLarge`] if the
///   carrier is too small
///
/// # Example
/// ```ignore
/// let stego = encode(&cover, &Payload::Text("Secret".into()), Some("pw"), 1)?;
/// ```
pub fn encode(
    carrier: &RgbaImage,
    payload: &Payload,
    password: Option<&str>,
    bit_depth: u8,
) -> Result<RgbaImage> {
    let depth = BitDepth::try_from(bit_depth)?;

    let (bytes, key_hash) = match password {
        Some(password) => {
            let encrypted = cipher::encrypt(payload.bytes(), password)?;
            (encrypted, Some(cipher::hash_key(password)))
        }
        None => (payload.bytes().to_vec(), None),
    };

    let metadata = payload.metadata(depth, key_hash);
    debug!(
        "Encoding {} bytes (encrypted: {}) at depth {} into {}x{} carrier",
        bytes.len(),
        metadata.is_encrypted(),
        depth,
        carrier.width(),
        carrier.height()
    );

    frame::encode(carrier.clone(), &bytes, &metadata)
}

/// Embed a text message. See [`encode`].
pub fn encode_text(
    carrier: &RgbaImage,
    message: &str,
    password: Option<&str>,
    bit_depth: u8,
) -> Result<RgbaImage> {
    encode(carrier, &Payload::Text(message.to_string()), password, bit_depth)
}

/// Embed a file under its original name. See [`encode`].
pub fn encode_file(
    carrier: &RgbaImage,
    file_name: &str,
    file_bytes: &[u8],
    password: Option<&str>,
    bit_depth: u8,
) -> Result<RgbaImage> {
    let payload = Payload::File {
        name: file_name.to_string(),
        bytes: file_bytes.to_vec(),
    };
    encode(carrier, &payload, password, bit_depth)
}

/// Recover the payload of a stego carrier, using the embedded bit depth.
///
/// # Errors
/// - [`StegoError::InvalidEncryptionKey`] if the carrier is encrypted and the
///   password is missing or does not match the recorded hash
/// - Any frame codec error (format, metadata, payload length)
/// - [`StegoError::Cipher`] if decryption fails
/// - [`StegoError::InvalidUtf8`] if a text payload is not UTF-8
pub fn decode(carrier: &RgbaImage, password: Option<&str>) -> Result<DecodedContent> {
    decode_with_depth(carrier, password, None)
}

/// Like [`decode`], with an optional bit depth overriding the metadata.
///
/// The override is a diagnostic path; a depth that differs from the one
/// used at encode time yields garbage or a [`StegoError::PayloadLengthInvalid`].
pub fn decode_with_depth(
    carrier: &RgbaImage,
    password: Option<&str>,
    depth_override: Option<u8>,
) -> Result<DecodedContent> {
    let metadata = frame::extract_metadata(carrier)?;

    if let Some(expected) = &metadata.key_hash {
        match password {
            Some(password) if !password.is_empty() && cipher::hash_key(password) == *expected => {}
            Some(_) => {
                warn!("Rejected decode: password does not match the embedded key hash");
                return Err(StegoError::InvalidEncryptionKey(
                    "password does not match the one used to encode".to_string(),
                ));
            }
            None => {
                return Err(StegoError::InvalidEncryptionKey(
                    "payload is encrypted but no password was supplied".to_string(),
                ));
            }
        }
    } else if password.is_some() {
        debug!("Carrier is not encrypted; ignoring supplied password");
    }

    let depth = match depth_override {
        Some(depth) => BitDepth::try_from(depth)?,
        None => metadata.depth()?,
    };
    let raw = frame::decode(carrier, depth)?;

    let bytes = match (password, metadata.is_encrypted()) {
        (Some(password), true) => cipher::decrypt(&raw, password)?,
        _ => raw,
    };

    let mut content = DecodedContent::default();
    if metadata.has_text {
        content.text = Some(String::from_utf8(bytes)?);
    } else if metadata.has_file {
        content.file = Some(bytes);
        content.file_name = metadata.original_file_name;
    }
    Ok(content)
}

/// Read the embedded metadata without extracting the payload.
pub fn inspect(carrier: &RgbaImage) -> Result<StegoMetadata> {
    frame::extract_metadata(carrier)
}

/// Maximum payload bytes `carrier` can hold for the given metadata.
///
/// For an encrypted payload this bounds the ciphertext (salt + IV + padded
/// blocks), not the plaintext.
pub fn payload_capacity(carrier: &RgbaImage, metadata: &StegoMetadata) -> Result<u64> {
    frame::payload_capacity(carrier, metadata)
}

/// Embed into encoded image bytes and return a PNG.
///
/// Accepts any format the `image` crate can decode; the result is always
/// PNG so the modified low-order bits survive.
pub fn encode_to_png(
    image_bytes: &[u8],
    payload: &Payload,
    password: Option<&str>,
    bit_depth: u8,
) -> Result<Vec<u8>> {
    let carrier = image::load_from_memory(image_bytes)?.to_rgba8();
    let stego = encode(&carrier, payload, password, bit_depth)?;

    let mut output_bytes = Vec::new();
    stego.write_to(
        &mut std::io::Cursor::new(&mut output_bytes),
        image::ImageFormat::Png,
    )?;
    Ok(output_bytes)
}

/// Decode from encoded image bytes. See [`decode`].
pub fn decode_from_bytes(image_bytes: &[u8], password: Option<&str>) -> Result<DecodedContent> {
    let carrier = image::load_from_memory(image_bytes)?.to_rgba8();
    decode(&carrier, password)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::cipher::CipherError;
    use image::Rgba;

    fn carrier(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x * 3) as u8, (y * 5) as u8, (x + y) as u8, 200])
        })
    }

    #[test]
    fn test_hello_world_depth_one() {
        let cover = carrier(100, 100);
        let stego = encode_text(&cover, "Hello World", None, 1).unwrap();

        let decoded = decode(&stego, None).unwrap();
        assert_eq!(
            decoded.text.unwrap().as_bytes(),
            &[0x48, 0x65, 0x6C, 0x6C, 0x6F, 0x20, 0x57, 0x6F, 0x72, 0x6C, 0x64]
        );
        assert!(decoded.file.is_none());
    }

    #[test]
    fn test_tiny_carrier_rejected() {
        let result = encode_text(&carrier(4, 4), "Hello World", None, 1);
        assert!(matches!(
            result,
            Err(StegoError::MetadataTooLarge(_)) | Err(StegoError::PayloadTooLarge(_))
        ));
    }

    #[test]
    fn test_carrier_not_mutated() {
        let cover = carrier(50, 50);
        let snapshot = cover.clone();
        let stego = encode_text(&cover, "do not touch", None, 2).unwrap();
        assert_eq!(cover, snapshot);
        assert_ne!(stego, snapshot);
    }

    #[test]
    fn test_failed_encode_leaves_carrier_intact() {
        let cover = carrier(20, 20);
        let snapshot = cover.clone();
        let big = "x".repeat(1000);
        assert!(matches!(
            encode_text(&cover, &big, None, 2),
            Err(StegoError::PayloadTooLarge(_))
        ));
        assert_eq!(cover, snapshot);
    }

    #[test]
    fn test_file_roundtrip_with_password() {
        let cover = carrier(120, 80);
        let data: Vec<u8> = (0..500u32).map(|i| (i * 31 % 251) as u8).collect();
        let stego = encode_file(&cover, "notes.bin", &data, Some("s3cret"), 2).unwrap();

        let meta = inspect(&stego).unwrap();
        assert_eq!(meta.key_hash.as_deref(), Some(cipher::hash_key("s3cret").as_str()));
        assert_eq!(meta.original_file_name.as_deref(), Some("notes.bin"));

        let decoded = decode(&stego, Some("s3cret")).unwrap();
        assert_eq!(decoded.file.as_deref(), Some(data.as_slice()));
        assert_eq!(decoded.file_name.as_deref(), Some("notes.bin"));
        assert!(decoded.text.is_none());
    }

    #[test]
    fn test_wrong_password_rejected_by_key_hash() {
        let stego = encode_text(&carrier(80, 80), "classified", Some("right"), 1).unwrap();

        assert!(matches!(
            decode(&stego, Some("wrong")),
            Err(StegoError::InvalidEncryptionKey(_))
        ));
        assert!(matches!(
            decode(&stego, None),
            Err(StegoError::InvalidEncryptionKey(_))
        ));
        assert!(matches!(
            decode(&stego, Some("")),
            Err(StegoError::InvalidEncryptionKey(_))
        ));
    }

    #[test]
    fn test_empty_password_on_encode() {
        assert!(matches!(
            encode_text(&carrier(80, 80), "x", Some(""), 1),
            Err(StegoError::Cipher(CipherError::KeyInvalid(_)))
        ));
    }

    #[test]
    fn test_invalid_depth() {
        assert!(matches!(
            encode_text(&carrier(80, 80), "x", None, 3),
            Err(StegoError::InvalidBitDepth(3))
        ));
        let stego = encode_text(&carrier(80, 80), "x", None, 1).unwrap();
        assert!(matches!(
            decode_with_depth(&stego, None, Some(0)),
            Err(StegoError::InvalidBitDepth(0))
        ));
    }

    #[test]
    fn test_password_ignored_for_plain_carrier() {
        let stego = encode_text(&carrier(60, 60), "open", None, 1).unwrap();
        let decoded = decode(&stego, Some("anything")).unwrap();
        assert_eq!(decoded.text.as_deref(), Some("open"));
    }

    #[test]
    fn test_explicit_depth_matching_metadata() {
        let stego = encode_text(&carrier(60, 60), "depth two", None, 2).unwrap();
        let decoded = decode_with_depth(&stego, None, Some(2)).unwrap();
        assert_eq!(decoded.text.as_deref(), Some("depth two"));
    }

    #[test]
    fn test_unencoded_image_rejected() {
        assert!(matches!(
            decode(&carrier(60, 60), None),
            Err(StegoError::InvalidCarrierFormat(_))
        ));
    }

    #[test]
    fn test_png_bytes_roundtrip() {
        let cover = carrier(64, 64);
        let mut png = Vec::new();
        cover
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();

        let payload = Payload::Text("through PNG".to_string());
        let stego_png = encode_to_png(&png, &payload, None, 1).unwrap();
        let decoded = decode_from_bytes(&stego_png, None).unwrap();
        assert_eq!(decoded.text.as_deref(), Some("through PNG"));
    }

    #[test]
    fn test_invalid_image_bytes() {
        let payload = Payload::Text("x".to_string());
        assert!(matches!(
            encode_to_png(b"not an image", &payload, None, 1),
            Err(StegoError::Image(_))
        ));
    }
}
