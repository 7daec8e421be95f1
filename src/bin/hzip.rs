//! HZIP command-line front end.
//!
//! ```bash
//! hzip compress notes.txt -o output
//! hzip decompress output/notes.hzip -o restored
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{error, Level};
use tracing_subscriber::FmtSubscriber;

use hzip::{compress_file, decompress_file, CodecConfig, FileReport};

#[derive(Parser, Debug)]
#[command(name = "hzip")]
#[command(version)]
#[command(about = "Canonical Huffman file compressor", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Read chunk size in bytes
    #[arg(long, global = true, default_value_t = hzip::config::DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compress a file into an .hzip container
    Compress {
        file: PathBuf,
        /// Output directory
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// Restore the original file from an .hzip container
    Decompress {
        file: PathBuf,
        /// Output directory
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,
    },
}

fn print_report(action: &str, report: &FileReport) {
    println!("{} {}", action, report.input.display());
    println!("  saved to:  {}", report.output.display());
    println!(
        "  size:      {} -> {} bytes ({:.2}%)",
        report.input_size,
        report.output_size,
        report.ratio()
    );
    println!("  time:      {}ms", report.elapsed.as_millis());
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };
    // Also forwards records from the `log` facade the library logs through.
    if FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .try_init()
        .is_err()
    {
        eprintln!("failed to install log subscriber");
    }

    let config = match CodecConfig::new(args.chunk_size) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = match &args.command {
        Command::Compress { file, out_dir } => {
            compress_file(&config, file, out_dir).map(|r| print_report("compressed", &r))
        }
        Command::Decompress { file, out_dir } => {
            decompress_file(&config, file, out_dir).map(|r| print_report("decompressed", &r))
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("hzip: {}", e);
            ExitCode::FAILURE
        }
    }
}
