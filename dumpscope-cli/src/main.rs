//! dumpscope CLI - Inspect a mongodump archive without restoring it
//!
//! Reads an archive from a file or standard input, decodes its header and
//! collection metadata, and prints them as one extended JSON document.

use clap::{ArgAction, Parser};
use dumpscope_io::{read_report, write_report, DumpError, ExtJsonMode, InspectOptions, Limits};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dumpscope")]
#[command(about = "Print a mongodump archive's header and collection metadata as extended JSON")]
#[command(
    long_about = "Reads a mongodump archive, parses its header and collection metadata, and \
                  prints them as extended JSON. This shows what an archive holds without \
                  restoring it. Problems with individual metadata strings are reported on \
                  stderr and do not stop the run."
)]
#[command(version)]
struct Cli {
    /// Archive file; `-` or absent reads standard input
    input: Option<PathBuf>,
    /// Write the report here instead of standard output
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Emit canonical extended JSON (type-preserving wrappers for all numbers and dates)
    #[arg(long)]
    canonical: bool,
    /// Indent the output
    #[arg(long)]
    pretty: bool,
    /// Re-encode the report and check it decodes to the same tree
    #[arg(long)]
    verify_roundtrip: bool,
    /// Maximum nesting depth of documents and arrays
    #[arg(long, default_value_t = Limits::default().max_nesting_depth)]
    max_depth: usize,
    /// Log more (-v warnings, -vv debug, -vvv trace); RUST_LOG is used otherwise
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("failed to open {}: {source}", path.display())]
    Open { path: PathBuf, source: io::Error },
    #[error("failed to create {}: {source}", path.display())]
    Create { path: PathBuf, source: io::Error },
    #[error("failed to parse archive: {0}")]
    Parse(#[source] DumpError),
    #[error("failed to output report: {0}")]
    Output(#[source] DumpError),
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error")),
        1 => EnvFilter::new("warn"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<(), CliError> {
    let opts = InspectOptions {
        limits: Limits {
            max_nesting_depth: cli.max_depth,
            ..Limits::default()
        },
        verify_roundtrip: cli.verify_roundtrip,
    };
    let mode = if cli.canonical {
        ExtJsonMode::Canonical
    } else {
        ExtJsonMode::Relaxed
    };

    let input = open_input(cli.input.as_deref())?;
    let report = read_report(input, &mut io::stderr().lock(), &opts).map_err(CliError::Parse)?;
    tracing::debug!(
        collections = report.collection_metadata.len(),
        "archive parsed"
    );

    let written = match cli.output {
        Some(path) => {
            let file = File::create(&path).map_err(|source| CliError::Create {
                path: path.clone(),
                source,
            })?;
            write_report(&report, BufWriter::new(file), mode, cli.pretty)
        }
        None => write_report(&report, BufWriter::new(io::stdout().lock()), mode, cli.pretty),
    };
    written.map_err(CliError::Output)
}

fn open_input(path: Option<&Path>) -> Result<Box<dyn Read>, CliError> {
    match path {
        None => Ok(Box::new(BufReader::new(io::stdin().lock()))),
        Some(p) if p == Path::new("-") => Ok(Box::new(BufReader::new(io::stdin().lock()))),
        Some(p) => {
            let file = File::open(p).map_err(|source| CliError::Open {
                path: p.to_path_buf(),
                source,
            })?;
            Ok(Box::new(BufReader::new(file)))
        }
    }
}
