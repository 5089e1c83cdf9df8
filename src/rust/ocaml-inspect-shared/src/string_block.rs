// Strings as heap blocks
//
// The payload is always a whole number of 8 byte units (even on 32 bit targets). The final byte of
// the block says how many padding bytes come before it, which is how the exact length is recovered
// without storing it anywhere:
//
//   "hi" -> 'h' 'i' 00 00 00 00 00 05

use log::debug;

use crate::error::{HeaderError, StringBlockError};
use crate::header::{BlockHeader, Color, Tag};
use crate::word::WordCodec;

const PAYLOAD_UNIT: usize = 8;

/// Size in payload units for a string of `len` bytes. There's always at least one byte spare for
/// the padding marker.
pub fn wosize_for_length(len: usize) -> u64 {
    (len / PAYLOAD_UNIT + 1) as u64
}

/// Builds the complete block (header, bytes and padding) for `bytes`. Text is stored as its UTF-8
/// bytes.
pub fn build<B: AsRef<[u8]>>(
    codec: &WordCodec,
    bytes: B,
    color: Color,
) -> Result<Vec<u8>, HeaderError> {
    let bytes = bytes.as_ref();

    let wosize = wosize_for_length(bytes.len());
    let payload_len = wosize as usize * PAYLOAD_UNIT;
    let padding_len = payload_len - bytes.len();
    debug_assert!((1..=PAYLOAD_UNIT).contains(&padding_len));

    let header = BlockHeader::encode(Tag::STRING, color, wosize, codec.word_size)?;
    debug!(
        "Building string block: {} bytes, {} padding, header 0x{:x}",
        bytes.len(),
        padding_len,
        header
    );

    let mut block = codec.pack(header);
    block.reserve(payload_len);
    block.extend_from_slice(bytes);
    block.resize(block.len() + padding_len - 1, 0);
    block.push((padding_len - 1) as u8);

    debug_assert_eq!(block.len(), payload_len + codec.word_size.bytes());
    Ok(block)
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DecodedString {
    pub header: BlockHeader,
    pub bytes: Vec<u8>,
}

impl DecodedString {
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

/// The inverse of `build`: checks the block really is a string and strips the padding
pub fn decode(codec: &WordCodec, block: &[u8]) -> Result<DecodedString, StringBlockError> {
    let header_len = codec.word_size.bytes().min(block.len());
    let (header_bytes, payload) = block.split_at(header_len);

    let header = BlockHeader::decode(codec.unpack(header_bytes)?, codec.word_size);
    if header.tag != Tag::STRING {
        return Err(StringBlockError::NotAString(header.tag));
    }

    // An empty payload has nowhere to put the padding marker
    let expected_payload = header.wosize.max(1) as usize * PAYLOAD_UNIT;
    if payload.len() != expected_payload || header.wosize == 0 {
        return Err(StringBlockError::BadSize {
            expected: header_len + expected_payload,
            actual: block.len(),
        });
    }

    let (rest, marker) = payload.split_at(payload.len() - 1);
    let marker = marker[0];
    if marker as usize >= PAYLOAD_UNIT {
        return Err(StringBlockError::BadPaddingMarker(marker));
    }

    let (bytes, padding) = rest.split_at(rest.len() - marker as usize);
    if padding.iter().any(|&b| b != 0) {
        return Err(StringBlockError::NonZeroPadding);
    }

    Ok(DecodedString {
        header,
        bytes: bytes.to_vec(),
    })
}
