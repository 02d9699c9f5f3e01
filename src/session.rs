//! Record-at-a-time parsing session

use crate::config::ParserConfig;
use crate::error::{CsvError, Result};
use crate::io::RecordBuffer;
use crate::parser::{split, FieldTable};
use std::io::BufRead;
use tracing::{debug, trace, warn};

/// Buffers and field table for parsing one stream.
///
/// A session reads one record at a time; the fields of the current record
/// stay available until the next call to [`CsvSession::read_record`].
/// Buffers are allocated on the first read, only ever grow, and are released
/// by [`CsvSession::reset_session`] or when growth fails.
///
/// ```
/// use linecsv::{CsvSession, ParserConfig};
/// use std::io::Cursor;
///
/// let mut input = Cursor::new("name,label\n\"a, b\",1\n");
/// let mut session = CsvSession::new();
/// let config = ParserConfig::default();
///
/// session.read_record(&mut input, &config).unwrap();
/// session.read_record(&mut input, &config).unwrap();
/// assert_eq!(session.field_count(), 2);
/// assert_eq!(session.field_at(0), Some("a, b"));
/// assert!(session.read_record(&mut input, &config).unwrap().is_none());
/// ```
#[derive(Debug, Default)]
pub struct CsvSession {
    record: RecordBuffer,
    fields: FieldTable,
    records: u64,
    current: bool,
}

impl CsvSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read and split the next record from `input`.
    ///
    /// Returns the unsplit record text, or `None` once the stream is
    /// exhausted. Fields are queried with [`field_at`](Self::field_at).
    /// On `OutOfMemory` the session has been reset and `input` is left
    /// somewhere inside the failed record. On any error no fields are exposed.
    pub fn read_record<R: BufRead>(
        &mut self,
        input: &mut R,
        config: &ParserConfig,
    ) -> Result<Option<&str>> {
        self.current = false;
        self.fields.clear();
        config.validate()?;

        match self.fill(input, config) {
            Ok(true) => {}
            Ok(false) => return Ok(None),
            Err(err) => {
                if let CsvError::OutOfMemory { requested } = &err {
                    warn!(
                        requested = *requested,
                        record = self.records + 1,
                        "allocation failed, resetting session"
                    );
                    self.reset_session();
                }
                return Err(err);
            }
        }

        self.records += 1;
        self.current = true;
        trace!(
            record = self.records,
            bytes = self.record.raw().len(),
            fields = self.fields.len(),
            "read record"
        );
        Ok(self.raw_record())
    }

    fn fill<R: BufRead>(&mut self, input: &mut R, config: &ParserConfig) -> Result<bool> {
        if self.record.read_line(input, config.memory_limit)?.is_none() {
            return Ok(false);
        }

        if let Err(err) = std::str::from_utf8(self.record.raw()) {
            return Err(CsvError::InvalidUtf8 {
                record: self.records + 1,
                valid_up_to: err.valid_up_to(),
            });
        }

        split(self.record.working_copy(), config, &mut self.fields)?;
        Ok(true)
    }

    /// Number of fields in the current record
    #[inline]
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Field `index` of the current record, `None` when out of range
    pub fn field_at(&self, index: usize) -> Option<&str> {
        // records are validated as UTF-8 when read, and splitting only
        // removes ASCII quote bytes
        self.field_bytes(index)
            .and_then(|bytes| std::str::from_utf8(bytes).ok())
    }

    pub fn field_bytes(&self, index: usize) -> Option<&[u8]> {
        let span = self.fields.get(index)?;
        self.record.work().get(span.range())
    }

    /// Iterate over the fields of the current record
    pub fn fields(&self) -> impl Iterator<Item = &str> + '_ {
        (0..self.field_count()).filter_map(move |i| self.field_at(i))
    }

    /// Unsplit text of the current record
    pub fn raw_record(&self) -> Option<&str> {
        if !self.current {
            return None;
        }
        std::str::from_utf8(self.record.raw()).ok()
    }

    /// Records successfully read since the session started or was last reset
    #[inline]
    pub fn records_read(&self) -> u64 {
        self.records
    }

    /// Logical capacity of the record buffers, in bytes
    #[inline]
    pub fn capacity(&self) -> usize {
        self.record.capacity()
    }

    /// Logical capacity of the field table, in entries
    #[inline]
    pub fn field_capacity(&self) -> usize {
        self.fields.capacity()
    }

    /// Release all buffers. The session can then parse a new stream.
    pub fn reset_session(&mut self) {
        debug!(
            records = self.records,
            capacity = self.record.capacity(),
            "reset session"
        );
        *self = Self::default();
    }
}
