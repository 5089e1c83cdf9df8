// Values as the OCaml runtime sees them
//
// Reminder - ints are stored shifted left by one with the lsb always 1, and heap pointers have 0

use std::fmt;

use log::debug;

use crate::error::DereferenceFailedError;
use crate::header::BlockHeader;
use crate::memory::MemorySource;
use crate::word::WordSize;

/// One word read out of (or destined for) the inspected process
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Value {
    word: u64,
    word_size: WordSize,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum ValueType {
    Integer(i64),
    Pointer(u64),
}

impl Value {
    /// Bits above the word size are dropped
    pub fn new(word: u64, word_size: WordSize) -> Value {
        Value {
            word: word & word_size.mask(),
            word_size,
        }
    }

    /// The immediate encoding of `i`, wrapping if it needs more than `bits() - 1` bits
    pub fn of_integer(i: i64, word_size: WordSize) -> Value {
        Value::new(((i as u64) << 1) | 1, word_size)
    }

    pub fn word(&self) -> u64 {
        self.word
    }

    pub fn word_size(&self) -> WordSize {
        self.word_size
    }

    pub fn is_integer(&self) -> bool {
        self.word & 1 != 0
    }

    pub fn is_pointer(&self) -> bool {
        !self.is_integer()
    }

    pub fn decode_type(&self) -> ValueType {
        if self.is_integer() {
            ValueType::Integer(self.as_integer())
        } else {
            ValueType::Pointer(self.word)
        }
    }

    /// Panics if the value is a pointer
    pub fn as_integer(&self) -> i64 {
        assert!(
            self.is_integer(),
            "as_integer called on a pointer value (0x{:x})",
            self.word
        );

        self.word_size.sign_extend(self.word) >> 1
    }

    /// Reads the header word the pointer refers to.
    ///
    /// Panics if the value is an integer. A failed read isn't a bug though - the pointer may well
    /// be garbage, or the target may have gone away - so that comes back as an error.
    pub fn dereference<M: MemorySource + ?Sized>(
        &self,
        source: &M,
    ) -> Result<BlockHeader, DereferenceFailedError> {
        assert!(
            self.is_pointer(),
            "dereference called on an integer value ({})",
            self.as_integer()
        );

        debug!("Reading header word at 0x{:x}", self.word);
        let header_word = source
            .read_word(self.word)
            .map_err(|e| DereferenceFailedError {
                pointer: self.word,
                source: e,
            })?;

        Ok(BlockHeader::decode(header_word, self.word_size))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.decode_type() {
            ValueType::Integer(i) => write!(f, "integer {}", i),
            ValueType::Pointer(p) => write!(f, "pointer 0x{:x}", p),
        }
    }
}
