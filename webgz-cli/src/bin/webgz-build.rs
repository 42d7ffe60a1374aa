//! webgz-build - prepare web assets for the device
//!
//! Runs the minify + gzip pipeline described by a JSON configuration.

use clap::Parser;
use std::path::PathBuf;
use webgz_pipeline::{PipelineConfig, run_pipeline};

#[derive(Parser)]
#[command(name = "webgz-build")]
#[command(
    author,
    version,
    about = "Minify and gzip the web assets listed in a configuration file"
)]
#[command(long_about = "
Reads a JSON configuration (camelCase keys: projectDir, dataDir,
textAssets, binaryAssets, gzipExcluded, debugBuild, compressionLevel,
windowSize, verify), minifies text assets into the data directory and
compresses everything not excluded into <dataDir>/gzip.

Examples:
  webgz-build
  webgz-build --config ui/webgz.json --verify
  webgz-build --debug --json
")]
struct Cli {
    /// Pipeline configuration file
    #[arg(short, long, value_name = "FILE", default_value = "webgz.json")]
    config: PathBuf,

    /// Debug build: copy text assets without minifying them
    #[arg(long)]
    debug: bool,

    /// Decode every artifact again with the configured window
    #[arg(long)]
    verify: bool,

    /// Output the report as JSON (machine-readable)
    #[arg(short, long)]
    json: bool,
}

fn main() {
    env_logger::builder().format_timestamp(None).init();
    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = PipelineConfig::from_json_file(&cli.config)?;
    if cli.debug {
        config.debug_build = true;
    }
    if cli.verify {
        config.verify = true;
    }

    let report = run_pipeline(&config)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for artifact in &report.artifacts {
        println!(
            "{:>10} {:>10}  {}",
            artifact.input_size,
            artifact.output_size,
            artifact.output.display()
        );
    }
    println!(
        "{:>10} {:>10}  total ({} files)",
        report.total_input(),
        report.total_output(),
        report.artifacts.len()
    );
    Ok(())
}
