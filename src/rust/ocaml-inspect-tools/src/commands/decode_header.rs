use std::io::{self, Write};

use anyhow::{Context, Result};
use colored::Colorize;
use prettytable::{format::consts::FORMAT_NO_LINESEP_WITH_TITLE, Table};
use structopt::StructOpt;

use ocaml_inspect_shared::{BlockHeader, WordSize};

use crate::options::{parse_word, TargetOptions};

#[derive(StructOpt)]
#[structopt(about = "split a block header word into its fields")]
pub struct Options {
    #[structopt(flatten)]
    target: TargetOptions,

    /// The header word, in decimal or 0x-prefixed hex
    #[structopt(parse(try_from_str = parse_word))]
    word: u64,
}

pub fn run(options: Options) -> Result<()> {
    let header = BlockHeader::decode(options.word, options.target.word_size);

    println!("{}", format!("0x{:x}:", options.word).red().bold());
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_fields(&header, options.target.word_size, &mut out)
        .context("Problem writing output")?;

    Ok(())
}

fn write_fields<W: Write>(
    header: &BlockHeader,
    word_size: WordSize,
    out: &mut W,
) -> io::Result<()> {
    writeln!(out, "{}", header)?;

    let mut table = Table::new();
    table.set_format(*FORMAT_NO_LINESEP_WITH_TITLE);
    table.set_titles(row![b => "Field", "Bits", "Value"]);
    table.add_row(row!["tag", "0-7", r -> header.tag.0]);
    table.add_row(row!["color", "8-9", r -> format!("{:?}", header.color)]);
    table.add_row(row![
        "wosize",
        format!("10-{}", word_size.bits() - 1),
        r -> header.wosize
    ]);
    table.add_row(row!["no-scan", "", r -> header.is_no_scan()]);
    table.print(out)?;

    Ok(())
}
