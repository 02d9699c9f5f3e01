//! Error type shared by the reader, splitter and session

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced while reading or splitting a record.
///
/// End of stream is not an error; `read_record` reports it as `Ok(None)`.
#[derive(Debug, Error)]
pub enum CsvError {
    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not open '{}': {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A session buffer could not grow; the session has been reset.
    #[error("out of memory growing a session buffer to {requested} bytes")]
    OutOfMemory { requested: usize },

    /// Strict mode only: a quoted field ran to end of record without a closing quote.
    #[error("unterminated quoted field {field} starting at byte {offset}")]
    MalformedQuoting { field: usize, offset: usize },

    #[error("record {record} is not valid UTF-8 (valid up to byte {valid_up_to})")]
    InvalidUtf8 { record: u64, valid_up_to: usize },

    #[error("delimiter {0:?} cannot be used as a field separator")]
    InvalidDelimiter(char),
}

pub type Result<T> = std::result::Result<T, CsvError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = CsvError::OutOfMemory { requested: 64 };
        assert_eq!(
            err.to_string(),
            "out of memory growing a session buffer to 64 bytes"
        );

        let err = CsvError::MalformedQuoting { field: 2, offset: 7 };
        assert_eq!(
            err.to_string(),
            "unterminated quoted field 2 starting at byte 7"
        );

        let err = CsvError::InvalidDelimiter('"');
        assert_eq!(
            err.to_string(),
            "delimiter '\"' cannot be used as a field separator"
        );
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "boom");
        let err: CsvError = io.into();
        assert!(matches!(err, CsvError::Io(_)));
        assert_eq!(err.to_string(), "read failed: boom");
    }
}
