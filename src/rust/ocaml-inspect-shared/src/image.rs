// A memory snapshot that can stand in for a live process
//
// Images are described in JSON:
//
//   {
//     "word_size": 64,
//     "endianness": "little",
//     "regions": [{ "base": 4096, "bytes": "fc04000000000000" }],
//     "symbols": { "s": 4096, "x": 7 }
//   }
//
// Expressions are a literal (decimal or 0x hex), a symbol name, or `*` followed by an expression,
// which reads the word at that address.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use log::debug;
use serde::Deserialize;

use crate::error::{EvaluateExpressionError, ImageError, ReadWordError};
use crate::memory::MemorySource;
use crate::mlvalues::Value;
use crate::word::{Endianness, WordCodec, WordSize};

#[derive(Deserialize)]
struct ImageDescription {
    word_size: WordSize,
    #[serde(default)]
    endianness: Endianness,
    #[serde(default)]
    regions: Vec<RegionDescription>,
    #[serde(default)]
    symbols: BTreeMap<String, u64>,
}

#[derive(Deserialize)]
struct RegionDescription {
    base: u64,
    bytes: String,
}

#[derive(Debug, Clone)]
pub struct MemoryImage {
    codec: WordCodec,
    regions: BTreeMap<u64, Vec<u8>>,
    symbols: BTreeMap<String, u64>,
}

impl MemoryImage {
    pub fn new(codec: WordCodec) -> MemoryImage {
        MemoryImage {
            codec,
            regions: BTreeMap::new(),
            symbols: BTreeMap::new(),
        }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<MemoryImage, ImageError> {
        let contents = fs::read_to_string(path)?;
        MemoryImage::from_json(&contents)
    }

    pub fn from_json(json: &str) -> Result<MemoryImage, ImageError> {
        let description: ImageDescription = serde_json::from_str(json)?;

        let mut image = MemoryImage::new(WordCodec::with_endianness(
            description.word_size,
            description.endianness,
        ));

        for region in description.regions {
            let bytes =
                hex::decode(region.bytes.trim()).map_err(|e| ImageError::BadHex(region.base, e))?;
            image.add_region(region.base, bytes)?;
        }

        for (name, word) in description.symbols {
            image.add_symbol(name, word);
        }

        Ok(image)
    }

    pub fn codec(&self) -> WordCodec {
        self.codec
    }

    pub fn add_region(&mut self, base: u64, bytes: Vec<u8>) -> Result<(), ImageError> {
        // Offsets rather than end addresses, so regions may run up to the top of memory
        if let Some((&prev_base, prev)) = self.regions.range(..=base).next_back() {
            if base - prev_base < prev.len() as u64 {
                return Err(ImageError::OverlappingRegions(prev_base, base));
            }
        }

        if let Some((&next_base, _)) = self.regions.range(base..).next() {
            if next_base - base < bytes.len() as u64 || next_base == base {
                return Err(ImageError::OverlappingRegions(base, next_base));
            }
        }

        self.regions.insert(base, bytes);
        Ok(())
    }

    /// Stores `word` in a new region at `address`
    pub fn add_word(&mut self, address: u64, word: u64) -> Result<(), ImageError> {
        let bytes = self.codec.pack(word);
        self.add_region(address, bytes)
    }

    pub fn add_symbol<S: Into<String>>(&mut self, name: S, word: u64) {
        self.symbols.insert(name.into(), word);
    }

    fn bytes_at(&self, address: u64, len: usize) -> Option<&[u8]> {
        let (base, bytes) = self.regions.range(..=address).next_back()?;
        let start = (address - base) as usize;
        let end = start.checked_add(len)?;
        bytes.get(start..end)
    }

    fn evaluate_word(&self, expression: &str) -> Result<u64, String> {
        let mut operand = expression.trim();
        let mut derefs = 0;
        while let Some(inner) = operand.strip_prefix('*') {
            operand = inner.trim_start();
            derefs += 1;
        }

        let mut word = self.evaluate_operand(operand)?;
        for _ in 0..derefs {
            word = self.read_word(word).map_err(|e| e.to_string())?;
        }

        Ok(word)
    }

    fn evaluate_operand(&self, expression: &str) -> Result<u64, String> {
        if expression.is_empty() {
            return Err(String::from("Expected an expression"));
        }

        if let Some(hex) = expression
            .strip_prefix("0x")
            .or_else(|| expression.strip_prefix("0X"))
        {
            return u64::from_str_radix(hex, 16)
                .map_err(|e| format!("Invalid number \"{}\": {}", expression, e));
        }

        let first = expression.chars().next().unwrap_or_default();
        if first.is_ascii_digit() || first == '-' {
            return expression
                .parse::<i64>()
                .map(|i| i as u64)
                .or_else(|_| expression.parse::<u64>())
                .map_err(|e| format!("Invalid number \"{}\": {}", expression, e));
        }

        self.symbols
            .get(expression)
            .copied()
            .ok_or_else(|| format!("No symbol \"{}\" in current context.", expression))
    }
}

impl MemorySource for MemoryImage {
    fn word_size_bits(&self) -> u32 {
        self.codec.word_size.bits()
    }

    fn read_word(&self, address: u64) -> Result<u64, ReadWordError> {
        debug!("Reading word at 0x{:x}", address);

        let bytes = self
            .bytes_at(address, self.codec.word_size.bytes())
            .ok_or_else(|| {
                ReadWordError::new(
                    address,
                    format!("Cannot access memory at address 0x{:x}", address),
                )
            })?;

        self.codec
            .unpack(bytes)
            .map_err(|e| ReadWordError::new(address, e))
    }

    fn evaluate_expression_as_value(
        &self,
        expression: &str,
    ) -> Result<Value, EvaluateExpressionError> {
        debug!("Evaluating `{}`", expression);

        let word = self
            .evaluate_word(expression)
            .map_err(|cause| EvaluateExpressionError::new(expression, cause))?;

        Ok(Value::new(word, self.codec.word_size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::{BlockHeader, Color, Tag};
    use crate::printer::ValuePrinter;
    use crate::string_block;
    use expect_test::expect;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn sample_image() -> MemoryImage {
        let mut image = MemoryImage::new(WordCodec::with_endianness(
            WordSize::W64,
            Endianness::Little,
        ));
        image.add_word(0x1000, 0x41C).unwrap();
        image.add_word(0x1008, 0x2001).unwrap();
        image.add_symbol("block", 0x1000);
        image.add_symbol("ptr_to_int", 0x1008);
        image
    }

    #[test]
    fn test_read_word() {
        let image = sample_image();
        assert_eq!(image.read_word(0x1000).unwrap(), 0x41C);
        assert_eq!(image.read_word(0x1008).unwrap(), 0x2001);

        // Straddles the end of a region
        assert!(image.read_word(0x1004).is_err());
        assert!(image.read_word(0x0FFC).is_err());
        assert!(image.read_word(0x2000).is_err());

        expect![[r#"Couldn't read word at 0x10: Cannot access memory at address 0x10"#]]
            .assert_eq(&image.read_word(0x10).unwrap_err().to_string());
    }

    #[test]
    fn test_evaluate() {
        let image = sample_image();
        let eval = |e: &str| image.evaluate_expression_as_value(e).map(|v| v.word());

        assert_eq!(eval("7").unwrap(), 7);
        assert_eq!(eval("0x1000").unwrap(), 0x1000);
        assert_eq!(eval(" block ").unwrap(), 0x1000);
        assert_eq!(eval("-1").unwrap(), u64::MAX);
        assert_eq!(eval("*block").unwrap(), 0x41C);
        assert_eq!(eval("*ptr_to_int").unwrap(), 0x2001);
        assert_eq!(eval("*0x1008").unwrap(), 0x2001);

        expect![[r#"Couldn't evaluate `missing`: No symbol "missing" in current context."#]]
            .assert_eq(&eval("missing").unwrap_err().to_string());
        expect![[r#"Couldn't evaluate `12abc`: Invalid number "12abc": invalid digit found in string"#]]
            .assert_eq(&eval("12abc").unwrap_err().to_string());
        expect![[r#"Couldn't evaluate `*0x50`: Couldn't read word at 0x50: Cannot access memory at address 0x50"#]]
            .assert_eq(&eval("*0x50").unwrap_err().to_string());
        assert!(eval("").is_err());
        assert!(eval("*").is_err());
    }

    #[test]
    fn test_overlapping_regions() {
        let mut image = sample_image();
        assert!(matches!(
            image.add_word(0x1004, 0),
            Err(ImageError::OverlappingRegions(0x1000, 0x1004))
        ));
        assert!(matches!(
            image.add_region(0xFF8, vec![0; 9]),
            Err(ImageError::OverlappingRegions(0xFF8, 0x1000))
        ));
        assert!(matches!(
            image.add_word(0x1000, 0),
            Err(ImageError::OverlappingRegions(0x1000, 0x1000))
        ));
        image.add_word(0xFF8, 0).unwrap();
        image.add_word(0x1010, 0).unwrap();
    }

    #[test]
    fn test_regions_at_the_top_of_memory() {
        let mut image = sample_image();
        image.add_region(u64::MAX - 3, vec![0xAB; 8]).unwrap();
        assert!(matches!(
            image.add_region(u64::MAX, vec![0; 1]),
            Err(ImageError::OverlappingRegions(0xFFFF_FFFF_FFFF_FFFC, u64::MAX))
        ));
        assert_eq!(image.read_word(u64::MAX - 3).unwrap(), 0xABAB_ABAB_ABAB_ABAB);
        assert!(image.read_word(u64::MAX).is_err());

        let mut image = sample_image();
        image.add_region(u64::MAX, vec![0; 1]).unwrap();
        assert!(matches!(
            image.add_region(u64::MAX - 3, vec![0; 8]),
            Err(ImageError::OverlappingRegions(0xFFFF_FFFF_FFFF_FFFC, u64::MAX))
        ));
        image.add_region(u64::MAX - 3, vec![0; 3]).unwrap();
    }

    #[test]
    fn test_evaluate_many_dereferences() {
        let mut image = sample_image();
        image.add_word(0x3000, 0x3000).unwrap();
        let stars = "*".repeat(200_000);

        assert_eq!(
            image
                .evaluate_expression_as_value(&format!("{}0x3000", stars))
                .unwrap()
                .word(),
            0x3000
        );
        assert_eq!(
            image.evaluate_expression_as_value("* block").unwrap().word(),
            0x41C
        );

        let err = image
            .evaluate_expression_as_value(&format!("{}0x10", stars))
            .unwrap_err();
        assert!(err
            .to_string()
            .ends_with("Couldn't read word at 0x10: Cannot access memory at address 0x10"));
    }

    #[test]
    fn test_from_json() {
        let image = MemoryImage::from_json(
            r#"{
                "word_size": 32,
                "endianness": "big",
                "regions": [{ "base": 256, "bytes": "000006fc" }],
                "symbols": { "s": 256 }
            }"#,
        )
        .unwrap();

        assert_eq!(image.word_size_bits(), 32);
        assert_eq!(image.read_word(0x100).unwrap(), 0x6FC);
        assert_eq!(
            image.evaluate_expression_as_value("s").unwrap(),
            Value::new(0x100, WordSize::W32)
        );
    }

    #[test]
    fn test_from_json_errors() {
        assert!(matches!(
            MemoryImage::from_json(r#"{ "word_size": 16 }"#),
            Err(ImageError::Json(_))
        ));
        assert!(matches!(
            MemoryImage::from_json(
                r#"{ "word_size": 64, "regions": [{ "base": 8, "bytes": "zz" }] }"#
            ),
            Err(ImageError::BadHex(8, _))
        ));
    }

    #[test]
    fn test_load() {
        let mut f = NamedTempFile::new().unwrap();
        write!(
            f,
            r#"{{ "word_size": 64, "endianness": "little", "symbols": {{ "x": 7 }} }}"#
        )
        .unwrap();

        let image = MemoryImage::load(f.path()).unwrap();
        assert_eq!(image.codec().endianness, Endianness::Little);
        assert!(image.regions.is_empty());

        assert!(matches!(
            MemoryImage::load("/definitely/not/a/real/image.json"),
            Err(ImageError::IO(_))
        ));
    }

    // The whole pipeline, from an expression down to the rendered header
    #[test]
    fn test_print_values() {
        let codec = WordCodec::with_endianness(WordSize::W64, Endianness::Little);
        let mut image = MemoryImage::new(codec);

        let block = string_block::build(&codec, "hello", Color::Black).unwrap();
        image.add_region(0x4000, block).unwrap();
        image.add_symbol("greeting", 0x4000);
        image.add_symbol("answer", 85);
        image.add_symbol("dangling", 0x8000);
        image
            .add_word(
                0x5000,
                BlockHeader::encode(Tag::CLOSURE, Color::White, 3, WordSize::W64).unwrap(),
            )
            .unwrap();

        let printer = ValuePrinter::new(&image).unwrap();
        let mut out = Vec::new();
        for expression in &["answer", "greeting", "0x5000", "dangling", "nowhere", "*greeting"] {
            printer.print_value(expression, &mut out).unwrap();
        }

        expect![[r#"
            integer 42
            pointer 0x4000 -> block tag=STRING color=3 size=1 no-scan
            pointer 0x5000 -> block tag=CLOSURE color=0 size=3
            pointer 0x8000 -> (couldn't dereference)
            Couldn't evaluate `nowhere`: No symbol "nowhere" in current context.
            pointer 0x7fc -> (couldn't dereference)
        "#]]
        .assert_eq(&String::from_utf8(out).unwrap());
    }
}
