//! Per-call parser options

use crate::error::{CsvError, Result};

/// The quote character. Not configurable.
pub const QUOTE: u8 = b'"';

/// Options applied to each `read_record` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserConfig {
    /// Field separator
    pub delimiter: u8,
    /// Merge runs of delimiters into a single boundary
    pub compress: bool,
    /// Reject quoted fields that reach end of record without a closing quote
    pub strict_quotes: bool,
    /// Upper bound, in bytes, for any single session buffer
    pub memory_limit: Option<usize>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            delimiter: b',',
            compress: false,
            strict_quotes: false,
            memory_limit: None,
        }
    }
}

impl ParserConfig {
    pub fn new(delimiter: u8) -> Self {
        Self {
            delimiter,
            ..Self::default()
        }
    }

    pub fn compress(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    pub fn strict_quotes(mut self, strict: bool) -> Self {
        self.strict_quotes = strict;
        self
    }

    pub fn memory_limit(mut self, limit: Option<usize>) -> Self {
        self.memory_limit = limit;
        self
    }

    /// Check that the delimiter can actually separate fields.
    ///
    /// The quote byte and line terminators never reach the splitter as
    /// separators, so they are rejected up front. Non-ASCII bytes would
    /// split inside multi-byte characters.
    pub fn validate(&self) -> Result<()> {
        match self.delimiter {
            QUOTE | b'\r' | b'\n' => Err(CsvError::InvalidDelimiter(self.delimiter as char)),
            d if !d.is_ascii() => Err(CsvError::InvalidDelimiter(d as char)),
            _ => Ok(()),
        }
    }
}
