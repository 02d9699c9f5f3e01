//! linecsv - streaming CSV record reader
//!
//! Reads a delimited text file one record at a time and reports on its shape,
//! optionally printing selected columns or every field.

use clap::Parser;
use linecsv::{io::open_input, CsvError, CsvSession, ParserConfig};
use std::io::{self, BufWriter, Write};
use std::time::Instant;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "linecsv")]
#[command(about = "Read a delimited text file one record at a time", long_about = None)]
struct Args {
    /// CSV file to read
    #[arg(value_name = "FILE")]
    file: String,

    /// Field delimiter (a single ASCII character, or \t)
    #[arg(short, long, default_value = ",", value_parser = parse_delimiter)]
    delimiter: u8,

    /// Treat runs of delimiters as a single separator
    #[arg(short, long)]
    compress: bool,

    /// Reject quoted fields without a closing quote
    #[arg(long)]
    strict: bool,

    /// Print the given field of every record (repeatable)
    #[arg(short, long = "field", value_name = "N")]
    fields: Vec<usize>,

    /// Dump every field of every record
    #[arg(long)]
    dump: bool,

    /// Number of passes over the file for throughput measurement
    #[arg(short, long, default_value = "1")]
    iterations: usize,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn parse_delimiter(s: &str) -> Result<u8, String> {
    match s.as_bytes() {
        b"\\t" => Ok(b'\t'),
        [b] if b.is_ascii() => Ok(*b),
        _ => Err(format!("'{}' is not a single ASCII character", s)),
    }
}

#[derive(Debug, Default)]
struct Summary {
    records: u64,
    fields: usize,
    bytes: usize,
    widest: usize,
    /// Size of the file, terminators included
    file_bytes: u64,
}

/// One pass over the file. Selected or dumped fields go to `out`.
fn scan<W: Write>(
    args: &Args,
    config: &ParserConfig,
    session: &mut CsvSession,
    out: &mut W,
) -> Result<Summary, CsvError> {
    let mut input = open_input(&args.file)?;
    let mut summary = Summary {
        file_bytes: input.get_ref().metadata()?.len(),
        ..Summary::default()
    };

    while let Some(record) = session.read_record(&mut input, config)? {
        summary.bytes += record.len();
        summary.records += 1;
        summary.fields += session.field_count();
        summary.widest = summary.widest.max(session.field_count());

        if args.dump {
            for (i, field) in session.fields().enumerate() {
                writeln!(out, "{}:{}: {}", summary.records, i, field)?;
            }
        }

        if !args.fields.is_empty() {
            let selected: Vec<&str> = args
                .fields
                .iter()
                .map(|&n| session.field_at(n).unwrap_or(""))
                .collect();
            writeln!(out, "{}", selected.join("\t"))?;
        }
    }

    Ok(summary)
}

fn run(args: &Args) -> Result<(), CsvError> {
    let config = ParserConfig::new(args.delimiter)
        .compress(args.compress)
        .strict_quotes(args.strict);
    config.validate()?;

    let mut session = CsvSession::new();
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    let start = Instant::now();
    let summary = scan(args, &config, &mut session, &mut out)?;
    let mut total_time = start.elapsed().as_secs_f64();
    out.flush()?;

    for pass in 1..args.iterations {
        session.reset_session();
        let start = Instant::now();
        scan(args, &config, &mut session, &mut io::sink())?;
        total_time += start.elapsed().as_secs_f64();
        debug!(pass, "finished pass");
    }

    eprintln!("records        : {}", summary.records);
    eprintln!("fields         : {}", summary.fields);
    eprintln!("widest record  : {} fields", summary.widest);
    eprintln!("record bytes   : {}", summary.bytes);
    eprintln!("file bytes     : {}", summary.file_bytes);
    eprintln!("buffer capacity: {} bytes", session.capacity());

    if args.iterations > 1 && total_time > 0.0 {
        let volume = args.iterations as f64 * summary.file_bytes as f64;
        eprintln!(" MB/s: {:.3}", volume / total_time / (1024.0 * 1024.0));
    }

    Ok(())
}

fn init_logging(verbose: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init()
}

fn main() {
    let args = Args::parse();

    if let Err(err) = init_logging(args.verbose) {
        eprintln!("Could not set up logging: {}", err);
    }

    if let Err(err) = run(&args) {
        eprintln!("Could not read the file {}: {}", args.file, err);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_delimiter() {
        assert_eq!(parse_delimiter(","), Ok(b','));
        assert_eq!(parse_delimiter(";"), Ok(b';'));
        assert_eq!(parse_delimiter("\\t"), Ok(b'\t'));
        assert!(parse_delimiter(",,").is_err());
        assert!(parse_delimiter("é").is_err());
        assert!(parse_delimiter("").is_err());
    }

    #[test]
    fn test_scan_selects_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"img1.png,f,\"1 2 3\"\r\nimg2.png,m\n").unwrap();

        let args = Args::parse_from([
            "linecsv",
            file.path().to_str().unwrap(),
            "-f",
            "0",
            "-f",
            "2",
        ]);
        let config = ParserConfig::default();
        let mut session = CsvSession::new();
        let mut out = Vec::new();

        let summary = scan(&args, &config, &mut session, &mut out).unwrap();
        assert_eq!(summary.records, 2);
        assert_eq!(summary.fields, 5);
        assert_eq!(summary.widest, 3);
        assert_eq!(summary.bytes, 28);
        assert_eq!(summary.file_bytes, 31);
        assert_eq!(String::from_utf8(out).unwrap(), "img1.png\t1 2 3\nimg2.png\t\n");
    }

    #[test]
    fn test_scan_dump() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"a b\r\n").unwrap();

        let args = Args::parse_from([
            "linecsv",
            file.path().to_str().unwrap(),
            "--dump",
            "-d",
            " ",
        ]);
        let config = ParserConfig::new(args.delimiter);
        let mut session = CsvSession::new();
        let mut out = Vec::new();

        scan(&args, &config, &mut session, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "1:0: a\n1:1: b\n");
    }

    #[test]
    fn test_init_logging_reports_second_install() {
        let _ = init_logging(false);
        assert!(init_logging(false).is_err());
    }
}
