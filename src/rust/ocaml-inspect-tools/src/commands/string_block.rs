use std::io::{self, Write};

use anyhow::{Context, Result};
use colored::Colorize;
use pretty_hex::PrettyHex;
use structopt::StructOpt;

use ocaml_inspect_shared::{string_block, WordCodec};

use crate::options::{ColorArg, TargetOptions};

#[derive(StructOpt)]
#[structopt(about = "show the heap block the runtime would use for a string")]
pub struct Options {
    #[structopt(flatten)]
    target: TargetOptions,

    #[structopt(long, possible_values = &ColorArg::variants(), case_insensitive = true, default_value = "White")]
    color: ColorArg,

    text: String,
}

pub fn run(options: Options) -> Result<()> {
    let codec = options.target.codec();
    let block = string_block::build(&codec, &options.text, options.color.into())
        .context("Problem building string block")?;

    println!("{}", format!("{:?}:", options.text).red().bold());
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_block(&codec, &block, &mut out).context("Problem writing output")?;

    Ok(())
}

fn write_block<W: Write>(codec: &WordCodec, block: &[u8], out: &mut W) -> Result<()> {
    let decoded = string_block::decode(codec, block).context("Built block doesn't decode")?;

    writeln!(out, "{}", decoded.header)?;
    writeln!(
        out,
        "{} bytes of text, {} of padding",
        decoded.bytes.len(),
        block.len() - codec.word_size.bytes() - decoded.bytes.len()
    )?;
    writeln!(out, "{:?}", block.hex_dump())?;

    Ok(())
}
