use crate::cli::OutputFormat;
use crate::config::{self, BddsniffConfig};
use crate::io::{FileWalker, JsonWriter, OutputWriter, TerminalWriter};
use crate::suite::{self, SuiteReport};
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub struct AnalyzeConfig {
    pub features: PathBuf,
    pub step_definitions: PathBuf,
    pub config: Option<PathBuf>,
    pub format: OutputFormat,
    pub output: Option<PathBuf>,
    pub top: usize,
    pub jobs: usize,
    pub ignore: Vec<String>,
    pub no_color: bool,
}

/// Runs an analysis and writes the report. Returns whether the suite total
/// stays within the project threshold.
pub fn handle_analyze(config: AnalyzeConfig) -> Result<bool> {
    configure_output(&config);
    configure_thread_pool(config.jobs);

    let settings = load_settings(config.config.as_deref())?;
    let report = analyze_paths(
        &config.features,
        &config.step_definitions,
        &config.ignore,
        &settings,
    )?;

    let sink: Box<dyn Write> = match &config.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path)
                .with_context(|| format!("Failed to create output file {}", path.display()))?,
        )),
        None => Box::new(std::io::stdout()),
    };
    let mut writer: Box<dyn OutputWriter> = match config.format {
        OutputFormat::Json => Box::new(JsonWriter::new(sink)),
        OutputFormat::Terminal => Box::new(TerminalWriter::new(sink).with_worst(config.top)),
    };
    writer.write_report(&report)?;

    Ok(report.summary.good())
}

/// Discovers, reads and analyzes the suite under the given roots, skipping
/// paths that match any of the `ignore` globs.
pub fn analyze_paths(
    features: &Path,
    step_definitions: &Path,
    ignore: &[String],
    settings: &BddsniffConfig,
) -> Result<SuiteReport> {
    let feature_files = FileWalker::features(features.to_path_buf())
        .with_ignore_patterns(ignore)
        .read_sources()
        .context("Failed to read feature files")?;
    let step_files = FileWalker::step_definitions(step_definitions.to_path_buf())
        .with_ignore_patterns(ignore)
        .read_sources()
        .context("Failed to read step definitions")?;
    if feature_files.is_empty() {
        log::warn!("No feature files found under {}", features.display());
    }

    Ok(suite::analyze(&feature_files, &step_files, settings)?)
}

fn load_settings(path: Option<&Path>) -> Result<BddsniffConfig> {
    match path {
        Some(path) => Ok(config::load_config_file(path)?),
        None => Ok(config::load_config()),
    }
}

fn configure_output(config: &AnalyzeConfig) {
    if config.no_color || config.output.is_some() {
        colored::control::set_override(false);
    }
}

fn configure_thread_pool(jobs: usize) {
    let mut builder = rayon::ThreadPoolBuilder::new();
    if jobs > 0 {
        builder = builder.num_threads(jobs);
    }
    if let Err(e) = builder.build_global() {
        log::debug!("Thread pool already configured: {}", e);
    }
}
