//! `xmlson` CLI — convert JSON to typed XML and back from the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Encode JSON to XML (stdin → stdout)
//! echo '{"name":"Alice","age":30}' | xmlson encode
//!
//! # Encode from file to file, indented by two spaces
//! xmlson encode --indent 2 -i data.json -o data.xml
//!
//! # Keep only the listed property names at every level
//! echo '{"name":"Event","etag":"abc"}' | xmlson encode --keys name
//!
//! # Decode XML back to pretty-printed JSON, dropping nulls
//! xmlson decode --drop-nulls -i data.xml
//!
//! # Compare JSON and XML sizes
//! xmlson stats -i data.json
//!
//! # Debug logging on stderr (or set RUST_LOG)
//! xmlson -vv decode -i data.xml
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, Read};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use xmlson_core::{Indent, Replacer, Value};

#[derive(Parser)]
#[command(name = "xmlson", version, about = "JSON ⇄ typed XML converter CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode JSON to XML
    Encode {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Indentation: a number of spaces (clamped to 10) or a literal string
        #[arg(long, allow_hyphen_values = true)]
        indent: Option<String>,
        /// Comma-separated property names to keep; all others are dropped
        #[arg(long)]
        keys: Option<String>,
    },
    /// Decode XML back to JSON
    Decode {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Write single-line JSON instead of pretty-printed
        #[arg(long)]
        compact: bool,
        /// Drop null entries from objects and arrays
        #[arg(long)]
        drop_nulls: bool,
    },
    /// Show encoding statistics (JSON vs XML size)
    Stats {
        /// Input JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Encode {
            input,
            output,
            indent,
            keys,
        } => {
            let json = read_input(input.as_deref())?;
            let value = json_to_value(&json)?;
            let replacer = match keys.as_deref() {
                Some(raw) => Replacer::keys(split_keys(raw)),
                None => Replacer::All,
            };
            let indent = indent.as_deref().map(parse_indent).unwrap_or_default();
            debug!(?indent, "encoding");

            let xml = xmlson_core::stringify_with(&value, replacer, indent)
                .context("Failed to encode JSON to XML")?;
            write_output(output.as_deref(), &xml)?;
        }
        Commands::Decode {
            input,
            output,
            compact,
            drop_nulls,
        } => {
            let xml = read_input(input.as_deref())?;
            let value = if drop_nulls {
                xmlson_core::parse_with(&xml, |_, v| (!v.is_null()).then_some(v))
            } else {
                xmlson_core::parse(&xml)
            }
            .context("Failed to decode XML to JSON")?;

            let json = value.to_json();
            let text = if compact {
                serde_json::to_string(&json)?
            } else {
                serde_json::to_string_pretty(&json)?
            };
            write_output(output.as_deref(), &text)?;
        }
        Commands::Stats { input } => {
            let json = read_input(input.as_deref())?;
            let value = json_to_value(&json)?;
            let xml = xmlson_core::stringify(&value).context("Failed to encode JSON to XML")?;
            let json_bytes = json.trim_end().len();
            let xml_bytes = xml.len();
            let growth = if json_bytes > 0 {
                (xml_bytes as f64 / json_bytes as f64 - 1.0) * 100.0
            } else {
                0.0
            };
            println!("JSON size:  {} bytes", json_bytes);
            println!("XML size:   {} bytes", xml_bytes);
            println!("Overhead:   {:.1}%", growth);
        }
    }

    Ok(())
}

/// Install a stderr `fmt` subscriber. Without `-v`, `RUST_LOG` decides and
/// the fallback is `warn`.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = if verbose == 0 {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    } else {
        EnvFilter::new(level)
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn json_to_value(json: &str) -> Result<Value> {
    let parsed: serde_json::Value =
        serde_json::from_str(json).context("Failed to parse input as JSON")?;
    Ok(Value::from(parsed))
}

/// `--indent 4` means four spaces; anything non-numeric is used verbatim.
fn parse_indent(raw: &str) -> Indent {
    match raw.trim().parse::<i64>() {
        Ok(n) => Indent::Spaces(n),
        Err(_) => Indent::Text(unescape_whitespace(raw)),
    }
}

/// Shells make a literal tab awkward to pass, so accept `\t` as well.
fn unescape_whitespace(raw: &str) -> String {
    raw.replace("\\t", "\t")
}

/// - `--keys a,b` produces `["a", "b"]`
/// - Blank segments are skipped, so `--keys ""` keeps no properties at all
fn split_keys(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}
