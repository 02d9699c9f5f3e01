//! # linecsv
//!
//! A streaming, quote-aware parser for delimited text.
//!
//! Records are read one at a time from any [`std::io::BufRead`], with `\n`,
//! `\r` and `\r\n` all accepted as terminators. Each record is split into
//! fields in place, honoring `"` quoting with `""` escapes and an optional
//! mode that merges runs of delimiters. All buffers live in a
//! [`CsvSession`] owned by the caller and are reused across records.

pub mod config;
pub mod error;
pub mod io;
pub mod memory;
pub mod parser;
pub mod session;

pub use config::ParserConfig;
pub use error::{CsvError, Result};
pub use session::CsvSession;
