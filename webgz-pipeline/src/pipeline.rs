//! Asset preparation run.

use crate::config::PipelineConfig;
use log::{debug, info};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use webgz_core::error::{Result, WebgzError};
use webgz_core::traits::WindowBits;
use webgz_gzip::{GzipOptions, decompress, gzip_file};
use webgz_minify::{MinifyMode, minify, split_lines};

/// Kind of configured asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    /// Minifiable text.
    Text,
    /// Opaque bytes.
    Binary,
}

/// One produced file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    /// Source asset.
    pub source: PathBuf,
    /// File the device will serve.
    pub output: PathBuf,
    /// Asset kind.
    pub kind: AssetKind,
    /// Minify mode, for text assets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<MinifyMode>,
    /// Whether the text was minified.
    pub minified: bool,
    /// Whether the output is gzip-compressed.
    pub compressed: bool,
    /// Size of the source asset.
    pub input_size: u64,
    /// Size of `output`.
    pub output_size: u64,
}

/// Result of a pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineReport {
    /// Artifacts in processing order: text assets, then binary assets.
    pub artifacts: Vec<Artifact>,
}

impl PipelineReport {
    /// Sum of source sizes.
    pub fn total_input(&self) -> u64 {
        self.artifacts.iter().map(|a| a.input_size).sum()
    }

    /// Sum of output sizes.
    pub fn total_output(&self) -> u64 {
        self.artifacts.iter().map(|a| a.output_size).sum()
    }
}

/// Prepare every configured asset.
///
/// The configuration is validated before anything is written; a missing
/// asset aborts the run with [`WebgzError::MissingAsset`]. The first
/// failure after that aborts the run as well.
pub fn run_pipeline(config: &PipelineConfig) -> Result<PipelineReport> {
    config.validate()?;
    let options = config.gzip_options()?;

    let data_dir = config.data_path();
    let gzip_dir = config.gzip_path();
    fs::create_dir_all(&gzip_dir)?;

    let minify_text = !config.debug_build;
    if !minify_text {
        info!("Debug build, text assets are not minified");
    }

    let mut report = PipelineReport::default();

    for asset in &config.text_assets {
        let artifact = process_text(config, asset, &data_dir, &gzip_dir, minify_text, options)?;
        report.artifacts.push(artifact);
    }

    for asset in &config.binary_assets {
        let source = config.asset_path(asset);
        let output = gzip_dir.join(gz_name(asset)?);
        gzip_file(&source, &output, options)?;
        if config.verify {
            verify(&source, &output, options.window)?;
        }
        report.artifacts.push(finish_artifact(
            source,
            output,
            AssetKind::Binary,
            None,
            false,
            true,
        )?);
    }

    info!(
        "{} artifacts, {} -> {} bytes",
        report.artifacts.len(),
        report.total_input(),
        report.total_output()
    );
    Ok(report)
}

fn process_text(
    config: &PipelineConfig,
    asset: &Path,
    data_dir: &Path,
    gzip_dir: &Path,
    minify_text: bool,
    options: GzipOptions,
) -> Result<Artifact> {
    let source = config.asset_path(asset);
    let mode = MinifyMode::from_path(asset);

    let copy = data_dir.join(file_name(asset)?);
    if minify_text {
        debug!("{}: minifying in {mode} mode", asset.display());
        let lines = split_lines(&fs::read_to_string(&source)?);
        fs::write(&copy, minify(&lines, mode).concat())?;
    } else {
        fs::copy(&source, &copy)?;
    }

    let compressed = !config.is_excluded(asset);
    let output = if compressed {
        let output = gzip_dir.join(gz_name(asset)?);
        gzip_file(&copy, &output, options)?;
        if config.verify {
            verify(&copy, &output, options.window)?;
        }
        output
    } else {
        debug!("{}: excluded from compression", asset.display());
        copy
    };

    finish_artifact(
        source,
        output,
        AssetKind::Text,
        Some(mode),
        minify_text,
        compressed,
    )
}

fn finish_artifact(
    source: PathBuf,
    output: PathBuf,
    kind: AssetKind,
    mode: Option<MinifyMode>,
    minified: bool,
    compressed: bool,
) -> Result<Artifact> {
    let artifact = Artifact {
        input_size: fs::metadata(&source)?.len(),
        output_size: fs::metadata(&output)?.len(),
        source,
        output,
        kind,
        mode,
        minified,
        compressed,
    };

    info!(
        "{} -> {} ({} -> {} bytes)",
        artifact.source.display(),
        artifact.output.display(),
        artifact.input_size,
        artifact.output_size
    );
    Ok(artifact)
}

/// Decode `gz` like the device would and compare it with `plain`.
fn verify(plain: &Path, gz: &Path, window: WindowBits) -> Result<()> {
    let expected = fs::read(plain)?;
    let decoded = decompress(&fs::read(gz)?, window)?;
    if decoded != expected {
        return Err(WebgzError::corrupted(
            0,
            format!("{} does not decode to {}", gz.display(), plain.display()),
        ));
    }
    debug!("{}: verified with a {} byte window", gz.display(), window.size());
    Ok(())
}

fn file_name(asset: &Path) -> Result<&std::ffi::OsStr> {
    asset.file_name().ok_or_else(|| {
        WebgzError::invalid_configuration(format!("asset {} has no file name", asset.display()))
    })
}

fn gz_name(asset: &Path) -> Result<String> {
    Ok(format!("{}.gz", file_name(asset)?.to_string_lossy()))
}
