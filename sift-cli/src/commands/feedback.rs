//! Feedback command handlers
//!
//! Offline conversion of review dumps into the normalized feedback format.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Subcommand, ValueEnum};
use colored::*;
use sift_core::feedback;

/// Output format of a converted feedback file
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Json,
    Csv,
}

impl Format {
    fn extension(self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Csv => "csv",
        }
    }
}

/// Feedback subcommands
#[derive(Subcommand)]
pub enum FeedbackCommands {
    /// Normalize a feedback dump (JSON array or loose JSON)
    Convert {
        /// Input file
        file: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,

        /// Directory for the converted file
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
}

pub fn handle_feedback_command(command: FeedbackCommands) -> Result<()> {
    match command {
        FeedbackCommands::Convert { file, format, out } => {
            let (path, count) = convert_file(&file, format, &out)?;
            println!(
                "{} {}",
                "✓".green(),
                format!("Wrote {} record(s) to {}", count, path.display()).green()
            );
            Ok(())
        }
    }
}

/// Converts `input` into a timestamped file under `out_dir`
///
/// Returns the written path and the number of records.
fn convert_file(input: &Path, format: Format, out_dir: &Path) -> Result<(PathBuf, usize)> {
    let raw =
        std::fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;

    if feedback::is_loose_json(&raw) {
        println!("{}", "Input is loose JSON, normalizing".dimmed());
    }

    let records = feedback::process_json(&raw)
        .with_context(|| format!("Failed to parse {}", input.display()))?;

    let path = out_dir.join(feedback::processed_file_name(format.extension(), Utc::now()));
    let file =
        File::create(&path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    match format {
        Format::Json => feedback::write_json(&records, &mut writer)?,
        Format::Csv => feedback::write_csv(&records, &mut writer)?,
    }
    writer.flush()?;

    Ok((path, records.len()))
}
