// Machine words of the inspected process: their width and how they are laid out as bytes

use std::convert::TryFrom;
use std::fmt;

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigurationError, MalformedWordError};

/// Sys.word_size of the inspected process.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[serde(try_from = "u32", into = "u32")]
pub enum WordSize {
    W32,
    W64,
}

impl WordSize {
    pub fn from_bits(bits: u32) -> Result<WordSize, ConfigurationError> {
        match bits {
            32 => Ok(WordSize::W32),
            64 => Ok(WordSize::W64),
            _ => Err(ConfigurationError::UnsupportedWordSize(bits)),
        }
    }

    pub fn bits(&self) -> u32 {
        match self {
            WordSize::W32 => 32,
            WordSize::W64 => 64,
        }
    }

    pub fn bytes(&self) -> usize {
        self.bits() as usize / 8
    }

    /// All ones in the low `bits()` bits
    pub fn mask(&self) -> u64 {
        match self {
            WordSize::W32 => u32::MAX as u64,
            WordSize::W64 => u64::MAX,
        }
    }

    /// Reinterprets the low `bits()` bits of `word` as a two's complement number
    pub fn sign_extend(&self, word: u64) -> i64 {
        match self {
            WordSize::W32 => word as u32 as i32 as i64,
            WordSize::W64 => word as i64,
        }
    }
}

impl TryFrom<u32> for WordSize {
    type Error = ConfigurationError;

    fn try_from(bits: u32) -> Result<Self, Self::Error> {
        WordSize::from_bits(bits)
    }
}

impl From<WordSize> for u32 {
    fn from(w: WordSize) -> Self {
        w.bits()
    }
}

impl fmt::Display for WordSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-bit", self.bits())
    }
}

#[derive(Serialize, Deserialize, Debug, Copy, Clone, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Endianness {
    Little,
    Big,
}

impl Endianness {
    pub fn native() -> Endianness {
        if cfg!(target_endian = "big") {
            Endianness::Big
        } else {
            Endianness::Little
        }
    }
}

impl Default for Endianness {
    fn default() -> Self {
        Endianness::native()
    }
}

/// Converts single words to and from the byte buffers the target process stores them in
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct WordCodec {
    pub word_size: WordSize,
    pub endianness: Endianness,
}

impl WordCodec {
    pub fn new(word_size: WordSize) -> WordCodec {
        WordCodec {
            word_size,
            endianness: Endianness::native(),
        }
    }

    pub fn with_endianness(word_size: WordSize, endianness: Endianness) -> WordCodec {
        WordCodec {
            word_size,
            endianness,
        }
    }

    pub fn pack(&self, word: u64) -> Vec<u8> {
        let mut buf = vec![0; self.word_size.bytes()];
        match (self.word_size, self.endianness) {
            (WordSize::W32, Endianness::Little) => LittleEndian::write_u32(&mut buf, word as u32),
            (WordSize::W32, Endianness::Big) => BigEndian::write_u32(&mut buf, word as u32),
            (WordSize::W64, Endianness::Little) => LittleEndian::write_u64(&mut buf, word),
            (WordSize::W64, Endianness::Big) => BigEndian::write_u64(&mut buf, word),
        }
        buf
    }

    pub fn unpack(&self, bytes: &[u8]) -> Result<u64, MalformedWordError> {
        let expected = self.word_size.bytes();
        if bytes.len() != expected {
            return Err(MalformedWordError {
                expected,
                actual: bytes.len(),
            });
        }

        let word = match (self.word_size, self.endianness) {
            (WordSize::W32, Endianness::Little) => LittleEndian::read_u32(bytes) as u64,
            (WordSize::W32, Endianness::Big) => BigEndian::read_u32(bytes) as u64,
            (WordSize::W64, Endianness::Little) => LittleEndian::read_u64(bytes),
            (WordSize::W64, Endianness::Big) => BigEndian::read_u64(bytes),
        };

        Ok(word)
    }
}
