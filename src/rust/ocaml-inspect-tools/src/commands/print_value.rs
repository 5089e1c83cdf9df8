use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use structopt::StructOpt;

use ocaml_inspect_shared::{MemoryImage, MemorySource, ValuePrinter};

#[derive(StructOpt)]
#[structopt(about = "evaluate expressions against a memory image and print the values")]
pub struct Options {
    /// JSON description of the memory to read from
    #[structopt(short, long, parse(from_os_str))]
    image: PathBuf,

    #[structopt(required = true)]
    expressions: Vec<String>,
}

pub fn run(options: Options) -> Result<()> {
    let image = MemoryImage::load(&options.image)
        .with_context(|| format!("Problem loading image {}", options.image.display()))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    print_values(image, &options.expressions, &mut out)
}

fn print_values<M: MemorySource, W: Write>(
    source: M,
    expressions: &[String],
    out: &mut W,
) -> Result<()> {
    let printer = ValuePrinter::new(source).context("Problem setting up the printer")?;

    for expression in expressions {
        printer
            .print_value(expression, out)
            .context("Problem writing output")?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use expect_test::expect;

    #[test]
    fn test_print_values() {
        let image = MemoryImage::from_json(
            r#"{
                "word_size": 64,
                "endianness": "little",
                "regions": [{ "base": 4096, "bytes": "1c04000000000000" }],
                "symbols": { "record": 4096 }
            }"#,
        )
        .unwrap();

        let expressions: Vec<String> = vec!["7".into(), "record".into(), "0x3000".into()];
        let mut out = Vec::new();
        print_values(&image, &expressions, &mut out).unwrap();

        expect![[r#"
            integer 3
            pointer 0x1000 -> block tag=28 color=0 size=1
            pointer 0x3000 -> (couldn't dereference)
        "#]]
        .assert_eq(&String::from_utf8(out).unwrap());
    }
}
