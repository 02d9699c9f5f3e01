//! Line reader: pulls one terminator-normalized record at a time from a stream

use crate::error::{CsvError, Result};
use crate::memory::{grow_to, next_capacity, INITIAL_CAPACITY};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

/// The raw record and its working copy, grown in lockstep.
///
/// `capacity` follows the doubling schedule and always leaves one slot past
/// the longest record seen for the terminator, so it is never smaller than
/// `raw.len() + 1`. A capacity of zero means nothing has been allocated yet.
#[derive(Debug, Default)]
pub struct RecordBuffer {
    raw: Vec<u8>,
    work: Vec<u8>,
    capacity: usize,
}

impl RecordBuffer {
    /// Current logical capacity in bytes
    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes of the last record read
    #[inline(always)]
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    #[inline(always)]
    pub fn work(&self) -> &[u8] {
        &self.work
    }

    /// Refresh the working copy from the raw record and hand it out for splitting
    pub fn working_copy(&mut self) -> &mut [u8] {
        self.work.clear();
        self.work.extend_from_slice(&self.raw);
        &mut self.work
    }

    /// Read the next record, without its terminator, into the raw buffer.
    ///
    /// Returns `Ok(None)` when the stream was already exhausted, otherwise the
    /// record length. An empty line is `Some(0)`.
    pub fn read_line<R: BufRead>(
        &mut self,
        input: &mut R,
        limit: Option<usize>,
    ) -> Result<Option<usize>> {
        if self.capacity == 0 {
            self.grow(INITIAL_CAPACITY, limit)?;
        }
        self.raw.clear();

        loop {
            let chunk = input.fill_buf()?;
            if chunk.is_empty() {
                return Ok(if self.raw.is_empty() {
                    None
                } else {
                    Some(self.raw.len())
                });
            }

            match chunk.iter().position(|&b| b == b'\r' || b == b'\n') {
                Some(pos) => {
                    let carriage_return = chunk[pos] == b'\r';
                    self.append(&chunk[..pos], limit)?;
                    input.consume(pos + 1);
                    if carriage_return {
                        skip_line_feed(input)?;
                    }
                    return Ok(Some(self.raw.len()));
                }
                None => {
                    let len = chunk.len();
                    self.append(chunk, limit)?;
                    input.consume(len);
                }
            }
        }
    }

    fn append(&mut self, bytes: &[u8], limit: Option<usize>) -> Result<()> {
        // one extra slot for the terminator
        let needed = self.raw.len() + bytes.len() + 1;
        if needed > self.capacity {
            self.grow(next_capacity(self.capacity, needed), limit)?;
        }
        self.raw.extend_from_slice(bytes);
        Ok(())
    }

    fn grow(&mut self, capacity: usize, limit: Option<usize>) -> Result<()> {
        grow_to(&mut self.raw, capacity, limit)?;
        grow_to(&mut self.work, capacity, limit)?;
        debug!(from = self.capacity, to = capacity, "grew record buffers");
        self.capacity = capacity;
        Ok(())
    }
}

/// Consume the `\n` of a CRLF pair. Any other byte stays in the stream.
fn skip_line_feed<R: BufRead>(input: &mut R) -> Result<()> {
    let next = input.fill_buf()?;
    if next.first() == Some(&b'\n') {
        input.consume(1);
    }
    Ok(())
}

/// Open a file for record-at-a-time reading
///
/// # Arguments
/// * `path` - Path to the delimited text file
///
/// # Returns
/// A buffered reader positioned at the first record
pub fn open_input<P: AsRef<Path>>(path: P) -> Result<BufReader<File>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| CsvError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(BufReader::new(file))
}
