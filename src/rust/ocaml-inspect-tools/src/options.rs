// Settings shared between subcommands

use std::num::ParseIntError;

use ocaml_inspect_shared::{Color, Endianness, WordCodec, WordSize};
use structopt::clap::arg_enum;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
pub struct TargetOptions {
    /// Sys.word_size of the target (32 or 64)
    #[structopt(
        short,
        long,
        env = "OCAML_INSPECT_WORD_SIZE",
        default_value = "64",
        parse(try_from_str = parse_word_size)
    )]
    pub word_size: WordSize,

    /// Lay words out most significant byte first instead of in host order
    #[structopt(long)]
    pub big_endian: bool,
}

impl TargetOptions {
    pub fn codec(&self) -> WordCodec {
        let endianness = if self.big_endian {
            Endianness::Big
        } else {
            Endianness::native()
        };

        WordCodec::with_endianness(self.word_size, endianness)
    }
}

arg_enum! {
    #[derive(Debug, Copy, Clone, Eq, PartialEq)]
    pub enum ColorArg {
        White,
        Gray,
        Blue,
        Black,
    }
}

impl From<ColorArg> for Color {
    fn from(c: ColorArg) -> Self {
        match c {
            ColorArg::White => Color::White,
            ColorArg::Gray => Color::Gray,
            ColorArg::Blue => Color::Blue,
            ColorArg::Black => Color::Black,
        }
    }
}

fn parse_word_size(s: &str) -> Result<WordSize, String> {
    let bits = s
        .parse::<u32>()
        .map_err(|e| format!("Invalid word size \"{}\": {}", s, e))?;
    WordSize::from_bits(bits).map_err(|e| e.to_string())
}

/// Parses a word given in decimal or with a 0x prefix in hex
pub fn parse_word(s: &str) -> Result<u64, ParseIntError> {
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse(),
    }
}
