use std::{error, io};

use thiserror::Error;

use crate::header::Tag;
use crate::word::WordSize;

/// The underlying failure reported by whatever is hosting the inspector
pub type Cause = Box<dyn error::Error + Send + Sync + 'static>;

// all the ways it can go wrong

#[derive(Error, Debug, Copy, Clone, Eq, PartialEq)]
pub enum ConfigurationError {
    #[error("Unknown system word bits: {0}")]
    UnsupportedWordSize(u32),
}

#[derive(Error, Debug, Copy, Clone, Eq, PartialEq)]
#[error("Malformed word: expected {expected} bytes but got {actual}")]
pub struct MalformedWordError {
    pub expected: usize,
    pub actual: usize,
}

#[derive(Error, Debug, Copy, Clone, Eq, PartialEq)]
pub enum HeaderError {
    #[error("Tag {0} can't be used to construct a block")]
    TagOutOfRange(Tag),

    #[error("Size {size} doesn't fit in a {word_size} header")]
    FieldOverflow { size: u64, word_size: WordSize },
}

#[derive(Error, Debug)]
#[error("Couldn't read word at 0x{address:x}: {cause}")]
pub struct ReadWordError {
    pub address: u64,
    #[source]
    pub cause: Cause,
}

impl ReadWordError {
    pub fn new<C: Into<Cause>>(address: u64, cause: C) -> ReadWordError {
        ReadWordError {
            address,
            cause: cause.into(),
        }
    }
}

#[derive(Error, Debug)]
#[error("Couldn't evaluate `{expression}`: {cause}")]
pub struct EvaluateExpressionError {
    pub expression: String,
    #[source]
    pub cause: Cause,
}

impl EvaluateExpressionError {
    pub fn new<S: Into<String>, C: Into<Cause>>(expression: S, cause: C) -> EvaluateExpressionError {
        EvaluateExpressionError {
            expression: expression.into(),
            cause: cause.into(),
        }
    }
}

#[derive(Error, Debug)]
#[error("Couldn't dereference pointer 0x{pointer:x}")]
pub struct DereferenceFailedError {
    pub pointer: u64,
    #[source]
    pub source: ReadWordError,
}

#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum StringBlockError {
    #[error("Malformed header: {0}")]
    MalformedHeader(#[from] MalformedWordError),

    #[error("Block has tag {0}, not STRING")]
    NotAString(Tag),

    #[error("Bad sizes: header says {expected} bytes but the block has {actual}")]
    BadSize { expected: usize, actual: usize },

    #[error("Invalid padding marker {0}")]
    BadPaddingMarker(u8),

    #[error("Padding contains non-zero bytes")]
    NonZeroPadding,
}

#[derive(Error, Debug)]
pub enum ImageError {
    #[error("IO Error: {0}")]
    IO(#[from] io::Error),

    #[error("Invalid image description: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Region at 0x{0:x} has invalid hex bytes: {1}")]
    BadHex(u64, hex::FromHexError),

    #[error("Regions at 0x{0:x} and 0x{1:x} overlap")]
    OverlappingRegions(u64, u64),
}
