//! Decoding of the OCaml runtime's in-memory value representation.
//!
//! Words come from a [`MemorySource`] (a debugger session, a snapshot, ...) and are classified as
//! immediate integers or heap pointers; pointers are followed to their block header.

pub use error::*;
pub use header::{BlockHeader, Color, NamedTag, Tag};
pub use image::MemoryImage;
pub use memory::MemorySource;
pub use mlvalues::{Value, ValueType};
pub use printer::{Inspection, ValuePrinter};
pub use string_block::DecodedString;
pub use word::{Endianness, WordCodec, WordSize};

mod error;
mod header;
mod image;
mod memory;
mod mlvalues;
mod printer;
pub mod string_block;
mod word;
