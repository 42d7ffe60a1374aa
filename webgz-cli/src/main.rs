//! webgz - small-window GZIP encoder
//!
//! Compresses files for decoders with a limited deflate window. Every
//! `FILE` is written to `FILE.gz` and left untouched; `-` reads standard
//! input and writes standard output.

use clap::Parser;
use log::info;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use thiserror::Error;
use webgz_core::error::WebgzError;
use webgz_gzip::{GzipEncoder, GzipOptions, gz_path};

#[derive(Parser)]
#[command(name = "webgz")]
#[command(
    author,
    version,
    about = "Compress files with a small deflate window and leave the originals untouched"
)]
#[command(long_about = "
Compresses each FILE to FILE.gz with a deflate window the target device
can hold in memory.

Examples:
  webgz index.html
  webgz -c 1 --window-size=-9 app.js style.css
  webgz < bundle.js > bundle.js.gz
")]
struct Cli {
    /// The deflate window size to use (-8 to -15)
    #[arg(
        long = "window-size",
        value_name = "SIZE",
        default_value_t = -10,
        allow_negative_numbers = true
    )]
    window_size: i32,

    /// The level of compression to use. 1 is fastest, 9 is best
    #[arg(
        short = 'c',
        long = "compression-level",
        value_name = "LEVEL",
        default_value_t = 9
    )]
    compression_level: i64,

    /// Files to compress. Use '-' to read from standard input and write to standard output
    #[arg(value_name = "FILE", default_value = "-")]
    files: Vec<PathBuf>,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("File or directory {} not found!", .0.display())]
    NotFound(PathBuf),

    #[error("File {} is a directory!", .0.display())]
    IsDirectory(PathBuf),

    #[error("Error: {0}")]
    Webgz(#[from] WebgzError),

    #[error("Error: {0}")]
    Io(#[from] io::Error),
}

fn main() -> ExitCode {
    env_logger::builder().format_timestamp(None).init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let options = GzipOptions::from_raw(cli.compression_level, cli.window_size, true)?;

    for file in &cli.files {
        if file.as_os_str() == "-" {
            compress_stdin(options)?;
        } else {
            compress_file(file, options)?;
        }
    }
    Ok(())
}

fn compress_stdin(options: GzipOptions) -> Result<(), CliError> {
    let mut encoder = GzipEncoder::stdout(options)?;
    io::copy(&mut io::stdin().lock(), &mut encoder)?;
    encoder.finish()?;
    Ok(())
}

fn compress_file(path: &Path, options: GzipOptions) -> Result<(), CliError> {
    let mut source = open_source(path)?;
    let mut encoder = GzipEncoder::create(path, options)?;
    let read = io::copy(&mut source, &mut encoder)?;
    encoder.finish()?;

    info!("{} -> {} ({read} bytes)", path.display(), gz_path(path).display());
    Ok(())
}

fn open_source(path: &Path) -> Result<File, CliError> {
    if path.is_dir() {
        return Err(CliError::IsDirectory(path.to_path_buf()));
    }
    File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => CliError::NotFound(path.to_path_buf()),
        _ => CliError::Io(e),
    })
}
