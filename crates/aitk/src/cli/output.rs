//! Writing resolved configs to stdout as JSON or JSON Lines.

use clap::ValueEnum;
use serde::Serialize;
use std::io::{self, Write};

/// Supported output formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Single pretty-printed JSON document
    Json,
    /// One JSON object per line (newline-delimited)
    Jsonl,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Jsonl => write!(f, "jsonl"),
        }
    }
}

/// Write `items` in `format`. JSON writes an array, JSONL one item per line.
pub fn write_items<W: Write, T: Serialize>(
    mut writer: W,
    items: &[T],
    format: OutputFormat,
) -> io::Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, items).map_err(io::Error::other)?;
            writeln!(writer)?;
        }
        OutputFormat::Jsonl => {
            // JSONL is never pretty-printed (one object per line)
            for item in items {
                serde_json::to_writer(&mut writer, item).map_err(io::Error::other)?;
                writeln!(writer)?;
            }
        }
    }
    writer.flush()
}
