// Block headers: the word in front of every heap block
//
// From the low bits up a header is laid out as
//
//   | wosize (bits - 10 bits) | color (2 bits) | tag (8 bits) |
//
// There's no spacetime profiling so nothing else is packed in there.

use std::fmt;

use crate::error::HeaderError;
use crate::word::WordSize;

const TAG_BITS: u32 = 8;
const COLOR_BITS: u32 = 2;
const WOSIZE_SHIFT: u32 = TAG_BITS + COLOR_BITS;

/* Tags */

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct Tag(pub u8);

impl Tag {
    pub const FORCING: Tag = Tag(244);
    pub const CONT: Tag = Tag(245);
    pub const LAZY: Tag = Tag(246);
    pub const CLOSURE: Tag = Tag(247);
    pub const OBJECT: Tag = Tag(248);
    pub const INFIX: Tag = Tag(249);
    pub const FORWARD: Tag = Tag(250);
    pub const NO_SCAN: Tag = Tag(251);
    pub const ABSTRACT: Tag = Tag(251);
    pub const STRING: Tag = Tag(252);
    pub const DOUBLE: Tag = Tag(253);
    pub const DOUBLE_ARRAY: Tag = Tag(254);
    pub const CUSTOM: Tag = Tag(255);

    /// Highest tag a block can be constructed with
    pub const MAX_CONSTRUCTIBLE: Tag = Tag::DOUBLE_ARRAY;

    pub fn named(&self) -> Option<NamedTag> {
        NamedTag::from_tag(*self)
    }

    /// The payload of a no-scan block isn't made of values, so the GC doesn't look inside it
    pub fn is_no_scan(&self) -> bool {
        *self >= Tag::NO_SCAN
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.named() {
            Some(named) => write!(f, "{}", named),
            None => write!(f, "{}", self.0),
        }
    }
}

/// The tags the runtime reserves a meaning for. Everything below `Forcing` is an ordinary block.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[repr(u8)]
pub enum NamedTag {
    Forcing = 244,
    Cont = 245,
    Lazy = 246,
    Closure = 247,
    Object = 248,
    Infix = 249,
    Forward = 250,
    Abstract = 251,
    String = 252,
    Double = 253,
    DoubleArray = 254,
    Custom = 255,
}

impl NamedTag {
    pub fn from_tag(tag: Tag) -> Option<NamedTag> {
        use NamedTag::*;

        let named = match tag.0 {
            244 => Forcing,
            245 => Cont,
            246 => Lazy,
            247 => Closure,
            248 => Object,
            249 => Infix,
            250 => Forward,
            251 => Abstract,
            252 => String,
            253 => Double,
            254 => DoubleArray,
            255 => Custom,
            _ => return None,
        };

        Some(named)
    }

    pub fn tag(&self) -> Tag {
        Tag(*self as u8)
    }

    pub fn name(&self) -> &'static str {
        use NamedTag::*;

        match self {
            Forcing => "FORCING",
            Cont => "CONT",
            Lazy => "LAZY",
            Closure => "CLOSURE",
            Object => "OBJECT",
            Infix => "INFIX",
            Forward => "FORWARD",
            Abstract => "ABSTRACT",
            String => "STRING",
            Double => "DOUBLE",
            DoubleArray => "DOUBLE_ARRAY",
            Custom => "CUSTOM",
        }
    }
}

impl fmt::Display for NamedTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/* Colors */

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum Color {
    White = 0,
    Gray = 1,
    Blue = 2,
    Black = 3,
}

impl Color {
    /// Only the low two bits are looked at, so every input maps to a color
    pub fn from_bits(bits: u64) -> Color {
        match bits & 0x3 {
            0 => Color::White,
            1 => Color::Gray,
            2 => Color::Blue,
            _ => Color::Black,
        }
    }

    pub fn bits(&self) -> u64 {
        *self as u64
    }

    fn mask(&self) -> u64 {
        self.bits() << TAG_BITS
    }
}

/* Headers */

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct BlockHeader {
    pub tag: Tag,
    pub color: Color,
    pub wosize: u64,
}

impl BlockHeader {
    /// Largest size in words that can be stored in a header of this width
    pub fn max_wosize(word_size: WordSize) -> u64 {
        word_size.mask() >> WOSIZE_SHIFT
    }

    /// Every word is a valid header, any bits above the word size are ignored
    pub fn decode(header_word: u64, word_size: WordSize) -> BlockHeader {
        let word = header_word & word_size.mask();

        BlockHeader {
            // This truncates in Rust to just the bottom 8 bits (as we want)
            tag: Tag(word as u8),
            color: Color::from_bits(word >> TAG_BITS),
            wosize: word >> WOSIZE_SHIFT,
        }
    }

    pub fn make(
        tag: Tag,
        color: Color,
        wosize: u64,
        word_size: WordSize,
    ) -> Result<BlockHeader, HeaderError> {
        if tag > Tag::MAX_CONSTRUCTIBLE {
            return Err(HeaderError::TagOutOfRange(tag));
        }

        if wosize > BlockHeader::max_wosize(word_size) {
            return Err(HeaderError::FieldOverflow {
                size: wosize,
                word_size,
            });
        }

        Ok(BlockHeader { tag, color, wosize })
    }

    pub fn encode(
        tag: Tag,
        color: Color,
        wosize: u64,
        word_size: WordSize,
    ) -> Result<u64, HeaderError> {
        Ok(BlockHeader::make(tag, color, wosize, word_size)?.to_word(word_size))
    }

    pub fn to_word(&self, word_size: WordSize) -> u64 {
        let word = self.wosize << WOSIZE_SHIFT | self.color.mask() | self.tag.0 as u64;

        let decoded = BlockHeader::decode(word, word_size);
        assert_eq!(
            &decoded, self,
            "header word 0x{:x} doesn't decode back to the fields it was built from",
            word
        );

        word
    }

    pub fn is_no_scan(&self) -> bool {
        self.tag.is_no_scan()
    }
}

impl fmt::Display for BlockHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "block tag={} color={} size={}",
            self.tag,
            self.color.bits(),
            self.wosize
        )?;

        if self.is_no_scan() {
            write!(f, " no-scan")?;
        }

        Ok(())
    }
}
