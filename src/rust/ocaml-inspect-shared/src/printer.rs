use std::fmt;
use std::io::{self, Write};

use log::debug;

use crate::error::ConfigurationError;
use crate::header::BlockHeader;
use crate::memory::MemorySource;
use crate::mlvalues::Value;
use crate::word::WordSize;

/// What came of looking at one expression. Nothing in here is an error as far as the caller is
/// concerned - failures are reported to the user as text.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Inspection {
    EvaluationFailed(String),
    Integer(Value),
    Pointer {
        value: Value,
        header: Option<BlockHeader>,
    },
}

impl fmt::Display for Inspection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Inspection::EvaluationFailed(message) => f.write_str(message),
            Inspection::Integer(value) => write!(f, "{}", value),
            Inspection::Pointer {
                value,
                header: Some(header),
            } => write!(f, "{} -> {}", value, header),
            Inspection::Pointer {
                value,
                header: None,
            } => write!(f, "{} -> (couldn't dereference)", value),
        }
    }
}

pub struct ValuePrinter<M> {
    source: M,
    word_size: WordSize,
}

impl<M: MemorySource> ValuePrinter<M> {
    /// Asks the source for its word size once; everything printed afterwards uses it
    pub fn new(source: M) -> Result<ValuePrinter<M>, ConfigurationError> {
        let word_size = WordSize::from_bits(source.word_size_bits())?;
        debug!("Inspecting a {} target", word_size);

        Ok(ValuePrinter { source, word_size })
    }

    pub fn word_size(&self) -> WordSize {
        self.word_size
    }

    pub fn source(&self) -> &M {
        &self.source
    }

    pub fn inspect(&self, expression: &str) -> Inspection {
        let value = match self.source.evaluate_expression_as_value(expression) {
            Ok(v) => Value::new(v.word(), self.word_size),
            Err(e) => {
                debug!("{}", e);
                return Inspection::EvaluationFailed(e.to_string());
            }
        };

        if value.is_integer() {
            return Inspection::Integer(value);
        }

        let header = match value.dereference(&self.source) {
            Ok(header) => Some(header),
            Err(e) => {
                debug!("{}: {}", e, e.source);
                None
            }
        };

        Inspection::Pointer { value, header }
    }

    pub fn print_value<W: Write>(&self, expression: &str, out: &mut W) -> io::Result<()> {
        writeln!(out, "{}", self.inspect(expression))
    }
}
