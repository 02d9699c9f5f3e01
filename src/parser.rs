//! Field splitter: partitions a record's working copy into field spans in place

use crate::config::{ParserConfig, QUOTE};
use crate::error::{CsvError, Result};
use crate::memory::{grow_to, INITIAL_CAPACITY};
use tracing::debug;

/// One field: `len` bytes starting at `start` in the working copy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub len: usize,
}

impl Span {
    #[inline(always)]
    pub fn range(&self) -> std::ops::Range<usize> {
        self.start..self.start + self.len
    }
}

/// Field spans of the current record, in order
#[derive(Debug, Default)]
pub struct FieldTable {
    spans: Vec<Span>,
    capacity: usize,
}

impl FieldTable {
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    #[inline(always)]
    pub fn get(&self, index: usize) -> Option<Span> {
        self.spans.get(index).copied()
    }

    #[inline(always)]
    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    /// Current logical capacity in entries
    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.spans.clear();
    }

    fn push(&mut self, span: Span, limit: Option<usize>) -> Result<()> {
        if self.spans.len() >= self.capacity {
            let capacity = if self.capacity == 0 {
                INITIAL_CAPACITY
            } else {
                self.capacity.saturating_mul(2)
            };
            grow_to(&mut self.spans, capacity, limit)?;
            debug!(from = self.capacity, to = capacity, "grew field table");
            self.capacity = capacity;
        }
        self.spans.push(span);
        Ok(())
    }
}

/// Where a quoted field ended
#[derive(Debug, PartialEq, Eq)]
struct QuotedField {
    /// Content length after unescaping, from the byte after the opening quote
    len: usize,
    /// Offset of the terminating delimiter, or of end of text
    end: usize,
    /// Whether a closing quote was seen
    closed: bool,
}

/// Offset of the first `delimiter` in `buf`, or `buf.len()`
#[inline(always)]
fn find_delimiter(buf: &[u8], delimiter: u8) -> usize {
    buf.iter()
        .position(|&b| b == delimiter)
        .unwrap_or(buf.len())
}

/// Scan a quoted field starting just past its opening quote.
///
/// Content is compacted toward the start of `buf`: `""` collapses to `"`, and
/// the first lone `"` closes the quoted region, after which everything up to
/// the next delimiter is appended verbatim. A lone `"` is one not followed by
/// another `"`, so a field of exactly `""` is empty rather than an escape.
fn advance_quoted(buf: &mut [u8], delimiter: u8) -> QuotedField {
    let n = buf.len();
    let (mut i, mut j) = (0, 0);

    while j < n {
        if buf[j] == QUOTE {
            j += 1;
            if j >= n || buf[j] != QUOTE {
                let k = find_delimiter(&buf[j..], delimiter);
                buf.copy_within(j..j + k, i);
                return QuotedField {
                    len: i + k,
                    end: j + k,
                    closed: true,
                };
            }
        }
        buf[i] = buf[j];
        i += 1;
        j += 1;
    }

    QuotedField {
        len: i,
        end: j,
        closed: false,
    }
}

/// Split `work` into fields, recording a span per field in `table`.
///
/// `work` is rewritten in place where quoted fields are unescaped; spans index
/// the rewritten bytes. Returns the number of fields. On error the table is
/// left empty.
pub fn split(work: &mut [u8], config: &ParserConfig, table: &mut FieldTable) -> Result<usize> {
    table.clear();
    if work.is_empty() {
        return Ok(0);
    }

    let result = split_fields(work, config, table);
    if result.is_err() {
        table.clear();
    }
    result
}

fn split_fields(work: &mut [u8], config: &ParserConfig, table: &mut FieldTable) -> Result<usize> {
    let delimiter = config.delimiter;
    let len = work.len();
    let mut p = 0;

    loop {
        if config.compress {
            while p < len && work[p] == delimiter {
                p += 1;
            }
        }

        let (span, end) = if p < len && work[p] == QUOTE {
            let quoted = advance_quoted(&mut work[p + 1..], delimiter);
            if !quoted.closed && config.strict_quotes {
                return Err(CsvError::MalformedQuoting {
                    field: table.len(),
                    offset: p,
                });
            }
            let start = p + 1;
            (
                Span {
                    start,
                    len: quoted.len,
                },
                start + quoted.end,
            )
        } else {
            let end = p + find_delimiter(&work[p..], delimiter);
            (Span { start: p, len: end - p }, end)
        };

        table.push(span, config.memory_limit)?;

        if end >= len {
            return Ok(table.len());
        }
        p = end + 1;
    }
}
