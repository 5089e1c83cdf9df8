use crate::error::{EvaluateExpressionError, ReadWordError};
use crate::mlvalues::Value;

/// Whatever is hosting the inspector: a debugger session, a core file, a memory snapshot.
///
/// This is the only way the decoding code gets hold of words from the inspected process. Nothing
/// read through it is cached, so every dereference sees the target as it is right now.
pub trait MemorySource {
    /// Sys.word_size of the target. Queried once when a printer is set up and expected not to
    /// change after that.
    fn word_size_bits(&self) -> u32;

    /// Reads a single word from memory at `address`
    fn read_word(&self, address: u64) -> Result<u64, ReadWordError>;

    /// Evaluates an expression in the host's current context and casts the result to a word
    fn evaluate_expression_as_value(&self, expression: &str)
        -> Result<Value, EvaluateExpressionError>;
}

impl<'a, M: MemorySource + ?Sized> MemorySource for &'a M {
    fn word_size_bits(&self) -> u32 {
        (**self).word_size_bits()
    }

    fn read_word(&self, address: u64) -> Result<u64, ReadWordError> {
        (**self).read_word(address)
    }

    fn evaluate_expression_as_value(
        &self,
        expression: &str,
    ) -> Result<Value, EvaluateExpressionError> {
        (**self).evaluate_expression_as_value(expression)
    }
}
