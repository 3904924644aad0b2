//! csv-splitter CLI
//!
//! # Commands
//!
//! - `split` - Split a CSV file into size-bounded Parquet segments
//! - `convert` - Convert a CSV file, or every CSV under a directory, to Parquet
//! - `view` - Show the schema and first rows of a Parquet file

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use csv_splitter::config::DEFAULT_CHUNK_SIZE_MB;
use csv_splitter::{
    ConversionRequest, CsvOptions, LogProgress, SegmentCompression, SplitOptions, convert_dir,
    convert_file, inspect_parquet, logging, split_file,
};
use std::path::PathBuf;
use std::process::ExitCode;

/// Convert large CSV files to Parquet.
#[derive(Parser)]
#[command(name = "csv-splitter")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Split a large CSV file into Parquet segments of roughly equal size
    Split {
        /// Path to input CSV file
        input_csv: PathBuf,

        /// Directory to save output files
        output_dir: PathBuf,

        /// Target size for each chunk in megabytes
        #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE_MB)]
        chunk_size: f64,

        /// Field delimiter
        #[arg(long, default_value_t = ',')]
        delimiter: char,

        /// Parquet compression (snappy, zstd, uncompressed)
        #[arg(long, default_value = "snappy")]
        compression: SegmentCompression,

        /// Print the run summary as JSON on stdout
        #[arg(long)]
        json: bool,
    },

    /// Convert a CSV file or a directory of CSV files to Parquet
    Convert {
        /// Input CSV file or directory
        input: PathBuf,

        /// Output Parquet file or directory (optional)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Field delimiter
        #[arg(long, default_value_t = ',')]
        delimiter: char,

        /// Parquet compression (snappy, zstd, uncompressed)
        #[arg(long, default_value = "snappy")]
        compression: SegmentCompression,
    },

    /// View contents of a Parquet file
    View {
        /// Path to Parquet file
        file: PathBuf,

        /// Number of rows to display
        #[arg(long, default_value_t = 5)]
        rows: usize,

        /// Skip showing file info
        #[arg(long)]
        no_info: bool,

        /// Skip showing schema
        #[arg(long)]
        no_schema: bool,
    },
}

fn csv_options(delimiter: char) -> Result<CsvOptions> {
    if !delimiter.is_ascii() {
        bail!("delimiter must be a single ASCII character, got {delimiter:?}");
    }
    Ok(CsvOptions {
        delimiter: delimiter as u8,
        ..CsvOptions::default()
    })
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match run(cli.command) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<ExitCode> {
    match command {
        Commands::Split {
            input_csv,
            output_dir,
            chunk_size,
            delimiter,
            compression,
            json,
        } => {
            let request = ConversionRequest::from_megabytes(&input_csv, &output_dir, chunk_size)?;
            let options = SplitOptions {
                csv: csv_options(delimiter)?,
                compression,
                ..SplitOptions::default()
            };
            match split_file(&request, &options, &mut LogProgress::default()) {
                Ok(result) => {
                    if json {
                        println!("{}", serde_json::to_string_pretty(&result)?);
                    }
                    Ok(ExitCode::SUCCESS)
                }
                Err(failure) => {
                    if json {
                        println!("{}", serde_json::to_string_pretty(&failure.completed)?);
                    }
                    eprintln!("Error during conversion: {:#}", anyhow::Error::from(failure));
                    Ok(ExitCode::FAILURE)
                }
            }
        }

        Commands::Convert {
            input,
            output,
            delimiter,
            compression,
        } => {
            let csv = csv_options(delimiter)?;
            if input.is_file() {
                let out = convert_file(&input, output.as_deref(), &csv, compression)
                    .context("conversion failed")?;
                println!("Successfully converted: {} -> {}", input.display(), out.display());
            } else if input.is_dir() {
                let converted = convert_dir(&input, output.as_deref(), &csv, compression)?;
                println!("Converted {} files", converted.len());
            } else {
                bail!("{} is not a valid file or directory", input.display());
            }
            Ok(ExitCode::SUCCESS)
        }

        Commands::View {
            file,
            rows,
            no_info,
            no_schema,
        } => {
            if !file.exists() {
                bail!("file {} does not exist", file.display());
            }
            let summary = inspect_parquet(&file, rows)
                .with_context(|| format!("reading parquet file {}", file.display()))?;
            print!("{}", summary.render(!no_info, !no_schema)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}
