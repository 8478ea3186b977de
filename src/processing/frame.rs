//! # Frame Codec
//!
//! Defines the binary layout embedded in a carrier and enforces its capacity
//! rules. All integers are big-endian.
//!
//! ```text
//! metadata block, pixel 0, depth 1:
//!   [4 bytes] magic "STEG"
//!   [1 byte ] format version
//!   [4 bytes] metadata length (u32)
//!   [N bytes] serialized StegoMetadata
//! payload block, next pixel boundary, metadata bit depth:
//!   [8 bytes] payload length (u64)
//!   [N bytes] payload
//! ```
//!
//! Fields inside a block are contiguous in the bitstream; each block starts
//! on a fresh pixel. The metadata block is always written at depth 1 so the
//! decoder can learn the payload depth before touching payload bits.

use image::RgbaImage;
use log::debug;

use crate::error::{Result, StegoError};
use crate::processing::bits::BitDepth;
use crate::processing::capacity::{max_payload_bytes, pixels_needed};
use crate::processing::metadata::StegoMetadata;
use crate::processing::pixels::{total_pixels, PixelReader, PixelWriter};

/// Fixed tag identifying a stego carrier.
pub const MAGIC: [u8; 4] = *b"STEG";
/// Current frame format version.
pub const VERSION: u8 = 1;

pub const HEADER_LEN: u64 = MAGIC.len() as u64 + 1;
pub const META_LEN_BYTES: u64 = 4;
pub const PAYLOAD_LEN_BYTES: u64 = 8;

/// Metadata block depth, independent of the payload depth.
const META_DEPTH: BitDepth = BitDepth::One;

/// Build `[magic][version][metadata length][metadata]`.
fn metadata_block(metadata: &StegoMetadata) -> Result<Vec<u8>> {
    let meta = metadata.to_bytes()?;
    let meta_len = u32::try_from(meta.len())
        .ok()
        .filter(|&len| len <= i32::MAX as u32)
        .ok_or_else(|| {
            StegoError::MetadataTooLarge(format!("metadata is {} bytes", meta.len()))
        })?;

    let mut block = Vec::with_capacity((HEADER_LEN + META_LEN_BYTES) as usize + meta.len());
    block.extend_from_slice(&MAGIC);
    block.push(VERSION);
    block.extend_from_slice(&meta_len.to_be_bytes());
    block.extend_from_slice(&meta);
    Ok(block)
}

/// Pixels left for the payload block once `metadata` is embedded.
///
/// # Errors
/// [`StegoError::MetadataTooLarge`] if the metadata block alone does not fit.
fn payload_region(carrier: &RgbaImage, block_len: u64) -> Result<(u64, u64)> {
    let total = total_pixels(carrier);
    let meta_pixels = pixels_needed(block_len, META_DEPTH);
    if meta_pixels > total {
        return Err(StegoError::MetadataTooLarge(format!(
            "metadata block needs {} pixels but the carrier has {}",
            meta_pixels, total
        )));
    }
    Ok((meta_pixels, total - meta_pixels))
}

/// Embed `payload` and `metadata` into `carrier`, returning the stego carrier.
///
/// All capacity checks run before the first pixel is written.
///
/// # Errors
/// - [`StegoError::InvalidBitDepth`] if `metadata.bit_depth` is not 1 or 2.
/// - [`StegoError::MetadataTooLarge`] if the metadata block does not fit.
/// - [`StegoError::PayloadTooLarge`] if the payload block does not fit in the
///   remaining pixels.
pub fn encode(
    mut carrier: RgbaImage,
    payload: &[u8],
    metadata: &StegoMetadata,
) -> Result<RgbaImage> {
    let depth = metadata.depth()?;

    let meta_block = metadata_block(metadata)?;
    let (meta_pixels, remaining) = payload_region(&carrier, meta_block.len() as u64)?;
    let capacity = max_payload_bytes(remaining, depth);

    let payload_block_len = PAYLOAD_LEN_BYTES + payload.len() as u64;
    if payload_block_len > capacity {
        return Err(StegoError::PayloadTooLarge(format!(
            "payload block needs {} bytes but only {} fit at depth {}",
            payload_block_len, capacity, depth
        )));
    }

    debug!(
        "Frame: metadata {} bytes in {} pixels, payload {} bytes at depth {} (capacity {})",
        meta_block.len(),
        meta_pixels,
        payload.len(),
        depth,
        capacity
    );

    PixelWriter::new(&mut carrier, 0, META_DEPTH).write_bytes(&meta_block)?;

    let mut writer = PixelWriter::new(&mut carrier, meta_pixels, depth);
    writer.write_bytes(&(payload.len() as u64).to_be_bytes())?;
    writer.write_bytes(payload)?;

    Ok(carrier)
}

/// Read and validate the metadata block.
///
/// Returns the metadata and the number of pixels the block occupies.
fn read_metadata(carrier: &RgbaImage) -> Result<(StegoMetadata, u64)> {
    let mut reader = PixelReader::new(carrier, 0, META_DEPTH);

    let header = reader.read_bytes(HEADER_LEN).map_err(|_| {
        StegoError::InvalidCarrierFormat("carrier too small to hold a header".to_string())
    })?;
    if header[..MAGIC.len()] != MAGIC || header[MAGIC.len()] != VERSION {
        return Err(StegoError::InvalidCarrierFormat(
            "carrier does not contain a valid stego header".to_string(),
        ));
    }

    let len_bytes = reader.read_bytes(META_LEN_BYTES).map_err(|_| {
        StegoError::MetadataNotFound("carrier too small to hold a metadata length".to_string())
    })?;
    let meta_len = i32::from_be_bytes([len_bytes[0], len_bytes[1], len_bytes[2], len_bytes[3]]);
    if meta_len <= 0 {
        return Err(StegoError::MetadataNotFound(format!(
            "metadata length is {}",
            meta_len
        )));
    }
    let meta_len = meta_len as u64;

    let available = reader.remaining_bits() / 8;
    if meta_len > available {
        return Err(StegoError::MetadataNotFound(format!(
            "metadata length {} exceeds the {} bytes left in the carrier",
            meta_len, available
        )));
    }

    let meta_bytes = reader.read_bytes(meta_len)?;
    let metadata = StegoMetadata::from_bytes(&meta_bytes)?;
    let meta_pixels = pixels_needed(HEADER_LEN + META_LEN_BYTES + meta_len, META_DEPTH);

    Ok((metadata, meta_pixels))
}

/// Extract the embedded metadata without touching the payload.
///
/// # Errors
/// - [`StegoError::InvalidCarrierFormat`] on a magic or version mismatch.
/// - [`StegoError::MetadataNotFound`] if the metadata length is not positive
///   or does not fit in the carrier.
/// - [`StegoError::MetadataDecodingFailed`] if the metadata bytes do not parse.
pub fn extract_metadata(carrier: &RgbaImage) -> Result<StegoMetadata> {
    read_metadata(carrier).map(|(metadata, _)| metadata)
}

/// Extract the payload, reading it at `depth`.
///
/// `depth` normally equals the metadata's bit depth; passing a different
/// value is allowed for diagnostics.
///
/// # Errors
/// Any metadata extraction error, plus
/// [`StegoError::PayloadLengthInvalid`] if the stored length is negative or
/// larger than the carrier can hold at `depth`.
pub fn decode(carrier: &RgbaImage, depth: BitDepth) -> Result<Vec<u8>> {
    let (_, meta_pixels) = read_metadata(carrier)?;
    let remaining = total_pixels(carrier).saturating_sub(meta_pixels);
    let capacity = max_payload_bytes(remaining, depth);

    let mut reader = PixelReader::new(carrier, meta_pixels, depth);
    let len_bytes = reader.read_bytes(PAYLOAD_LEN_BYTES)?;
    let mut raw = [0u8; PAYLOAD_LEN_BYTES as usize];
    raw.copy_from_slice(&len_bytes);
    let length = u64::from_be_bytes(raw);

    let fits = length <= i64::MAX as u64
        && length
            .checked_add(PAYLOAD_LEN_BYTES)
            .is_some_and(|block| block <= capacity);
    if !fits {
        return Err(StegoError::PayloadLengthInvalid(format!(
            "payload length {} exceeds capacity of {} bytes at depth {}",
            length,
            capacity.saturating_sub(PAYLOAD_LEN_BYTES),
            depth
        )));
    }

    debug!(
        "Frame: reading {} payload bytes from pixel {} at depth {}",
        length, meta_pixels, depth
    );

    reader.read_bytes(length)
}

/// Maximum payload bytes `carrier` can hold alongside `metadata`.
///
/// # Errors
/// [`StegoError::InvalidBitDepth`] or [`StegoError::MetadataTooLarge`].
pub fn payload_capacity(carrier: &RgbaImage, metadata: &StegoMetadata) -> Result<u64> {
    let depth = metadata.depth()?;
    let block = metadata_block(metadata)?;
    let (_, remaining) = payload_region(carrier, block.len() as u64)?;
    Ok(max_payload_bytes(remaining, depth).saturating_sub(PAYLOAD_LEN_BYTES))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::pixels::{read_bytes, write_bytes};
    use image::Rgba;

    fn carrier(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x * 7 + y) as u8, (x + y * 13) as u8, (x ^ y) as u8, 255])
        })
    }

    #[test]
    fn test_header_written_at_depth_one() {
        let meta = StegoMetadata::text(BitDepth::Two, None);
        let stego = encode(carrier(20, 20), b"hi", &meta).unwrap();

        let block = read_bytes(&stego, 0, BitDepth::One, 11).unwrap();
        assert_eq!(&block[..4], b"STEG");
        assert_eq!(block[4], VERSION);
        assert_eq!(&block[5..9], &[0, 0, 0, 2]);
        assert_eq!(&block[9..], &[2, 0b0001]);
    }

    #[test]
    fn test_payload_block_starts_on_pixel_boundary() {
        let meta = StegoMetadata::text(BitDepth::Two, None);
        let stego = encode(carrier(20, 20), b"hi", &meta).unwrap();

        // 11-byte metadata block = 88 bits = 30 pixels at depth 1.
        let block = read_bytes(&stego, 30, BitDepth::Two, 10).unwrap();
        assert_eq!(&block[..8], &2u64.to_be_bytes());
        assert_eq!(&block[8..], b"hi");
    }

    #[test]
    fn test_roundtrip_both_depths() {
        let payload: Vec<u8> = (0..=255).collect();
        for depth in [BitDepth::One, BitDepth::Two] {
            let meta = StegoMetadata::file(depth, "bytes.bin", Some("00ff".to_string()));
            let stego = encode(carrier(40, 40), &payload, &meta).unwrap();

            assert_eq!(extract_metadata(&stego).unwrap(), meta);
            assert_eq!(decode(&stego, depth).unwrap(), payload);
        }
    }

    #[test]
    fn test_empty_payload() {
        let meta = StegoMetadata::text(BitDepth::One, None);
        let stego = encode(carrier(20, 20), b"", &meta).unwrap();
        assert!(decode(&stego, BitDepth::One).unwrap().is_empty());
    }

    #[test]
    fn test_exact_capacity_boundary() {
        // 30 metadata pixels + 32 payload pixels = 96 bits = 8-byte length + 4 bytes.
        let meta = StegoMetadata::text(BitDepth::One, None);
        assert_eq!(payload_capacity(&carrier(62, 1), &meta).unwrap(), 4);

        let stego = encode(carrier(62, 1), b"four", &meta).unwrap();
        assert_eq!(decode(&stego, BitDepth::One).unwrap(), b"four");

        assert!(matches!(
            encode(carrier(62, 1), b"five!", &meta),
            Err(StegoError::PayloadTooLarge(_))
        ));
    }

    #[test]
    fn test_metadata_too_large() {
        let meta = StegoMetadata::text(BitDepth::One, None);
        assert!(matches!(
            encode(carrier(4, 4), b"Hello World", &meta),
            Err(StegoError::MetadataTooLarge(_))
        ));
        assert!(matches!(
            payload_capacity(&carrier(4, 4), &meta),
            Err(StegoError::MetadataTooLarge(_))
        ));
    }

    #[test]
    fn test_invalid_depth_rejected_before_writing() {
        let mut meta = StegoMetadata::text(BitDepth::One, None);
        meta.bit_depth = 3;
        assert!(matches!(
            encode(carrier(20, 20), b"x", &meta),
            Err(StegoError::InvalidBitDepth(3))
        ));
    }

    #[test]
    fn test_blank_carrier_has_no_header() {
        let img = carrier(20, 20);
        assert!(matches!(
            extract_metadata(&img),
            Err(StegoError::InvalidCarrierFormat(_))
        ));
        assert!(matches!(
            decode(&img, BitDepth::One),
            Err(StegoError::InvalidCarrierFormat(_))
        ));
    }

    #[test]
    fn test_tiny_carrier_has_no_header() {
        assert!(matches!(
            extract_metadata(&carrier(2, 2)),
            Err(StegoError::InvalidCarrierFormat(_))
        ));
    }

    #[test]
    fn test_wrong_version_rejected() {
        let mut img = carrier(20, 20);
        write_bytes(&mut img, 0, BitDepth::One, b"STEG\x02\x00\x00\x00\x02\x01\x01").unwrap();
        assert!(matches!(
            extract_metadata(&img),
            Err(StegoError::InvalidCarrierFormat(_))
        ));
    }

    #[test]
    fn test_zero_and_negative_metadata_length() {
        let mut img = carrier(20, 20);
        write_bytes(&mut img, 0, BitDepth::One, b"STEG\x01\x00\x00\x00\x00").unwrap();
        assert!(matches!(
            extract_metadata(&img),
            Err(StegoError::MetadataNotFound(_))
        ));

        write_bytes(&mut img, 0, BitDepth::One, b"STEG\x01\xFF\xFF\xFF\xFF").unwrap();
        assert!(matches!(
            extract_metadata(&img),
            Err(StegoError::MetadataNotFound(_))
        ));
    }

    #[test]
    fn test_metadata_length_beyond_carrier() {
        let mut img = carrier(20, 20);
        write_bytes(&mut img, 0, BitDepth::One, b"STEG\x01\x00\x01\x00\x00").unwrap();
        assert!(matches!(
            extract_metadata(&img),
            Err(StegoError::MetadataNotFound(_))
        ));
    }

    #[test]
    fn test_garbage_metadata() {
        let mut img = carrier(20, 20);
        write_bytes(&mut img, 0, BitDepth::One, b"STEG\x01\x00\x00\x00\x02\x01\xF0").unwrap();
        assert!(matches!(
            extract_metadata(&img),
            Err(StegoError::MetadataDecodingFailed(_))
        ));
    }

    #[test]
    fn test_corrupt_payload_length() {
        let meta = StegoMetadata::text(BitDepth::One, None);
        let mut stego = encode(carrier(20, 20), b"hello", &meta).unwrap();

        write_bytes(&mut stego, 30, BitDepth::One, &u64::MAX.to_be_bytes()).unwrap();
        assert!(matches!(
            decode(&stego, BitDepth::One),
            Err(StegoError::PayloadLengthInvalid(_))
        ));

        write_bytes(&mut stego, 30, BitDepth::One, &10_000u64.to_be_bytes()).unwrap();
        assert!(matches!(
            decode(&stego, BitDepth::One),
            Err(StegoError::PayloadLengthInvalid(_))
        ));
    }

    #[test]
    fn test_depth_override_reads_other_depth() {
        let payload = vec![0x5Au8; 32];
        let meta = StegoMetadata::text(BitDepth::Two, None);
        let stego = encode(carrier(40, 40), &payload, &meta).unwrap();

        assert_eq!(decode(&stego, BitDepth::Two).unwrap(), payload);
        // Reading depth-2 data at depth 1 does not reproduce the payload.
        assert!(!matches!(decode(&stego, BitDepth::One), Ok(ref bytes) if *bytes == payload));
    }
}
