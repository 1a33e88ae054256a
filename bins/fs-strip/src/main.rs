//! fs-strip: CLI tool for stripping metadata from images.

mod config;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use foodshare_strip::{
    classify, inspect, strip_metadata_with, ErrorKind, ErrorReport, FormatKind, ImageBytes,
    OutputSummary, StripOptions, CLEANED_PREFIX,
};
use indicatif::ParallelProgressIterator;
use output::{file_progress, format_size, images, size_change, Status};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use walkdir::WalkDir;

/// Files read and stripped together before outputs are written.
const CHUNK_SIZE: usize = 32;

/// Exit codes
mod exit_codes {
    pub const SUCCESS: u8 = 0;
    pub const FAILURE: u8 = 1;
    pub const INVALID_INPUT: u8 = 2;
}

#[derive(Parser)]
#[command(name = "fs-strip")]
#[command(about = "Strip EXIF, IPTC, XMP and C2PA metadata from PNG and JPEG images")]
#[command(version)]
struct Cli {
    /// Path to config file (default: .fs-strip.toml in the working directory)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Re-encode images without any metadata
    Clean {
        /// Image files or directories
        #[arg(required = true, value_name = "PATH")]
        paths: Vec<PathBuf>,
        /// Write cleaned files here instead of next to the originals
        #[arg(short, long, value_name = "DIR")]
        out_dir: Option<PathBuf>,
        /// Declared content type, used only when a file is too short to sniff
        #[arg(long, value_name = "TYPE")]
        mime: Option<String>,
        /// JPEG re-encode quality
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=100))]
        quality: Option<u8>,
        /// Worker threads (default: one per CPU)
        #[arg(short, long)]
        jobs: Option<usize>,
        /// Output results as JSON
        #[arg(long)]
        json: bool,
    },
    /// Detect image format from file content
    Detect {
        /// Path to image file
        path: PathBuf,
        /// Declared content type fallback
        #[arg(long, value_name = "TYPE")]
        mime: Option<String>,
    },
    /// List metadata chunks and segments in an image
    Inspect {
        /// Path to image file
        path: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show supported formats and re-encode settings
    Formats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Outcome for one file in a `clean` run.
#[derive(Debug, Serialize)]
struct FileReport {
    path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    written_to: Option<PathBuf>,
    original_size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<OutputSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorReport>,
}

impl FileReport {
    fn failed(path: PathBuf, original_size: u64, error: ErrorReport) -> Self {
        Self {
            path,
            written_to: None,
            original_size,
            output: None,
            error: Some(error),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            Status::error(format!("{:#}", e));
            ExitCode::from(exit_codes::FAILURE)
        }
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "warn,fs_strip=debug,foodshare_strip=debug"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(verbose)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

fn run(cli: Cli) -> Result<u8> {
    let config = config::Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Clean {
            paths,
            out_dir,
            mime,
            quality,
            jobs,
            json,
        } => {
            let mut options = config.strip_options();
            if let Some(q) = quality {
                options.jpeg_quality = q;
            }
            let out_dir = out_dir.or_else(|| config.schema.output.out_dir.clone());

            if let Some(n) = jobs {
                rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build_global()
                    .context("Failed to configure worker threads")?;
            }

            clean(&paths, out_dir.as_deref(), mime.as_deref(), &options, json)
        }

        Commands::Detect { path, mime } => {
            let data = read_file(&path)?;
            let format = classify(&data, mime.as_deref());
            match format.mime_type() {
                Some(mime_type) => {
                    println!("Format: {}", format);
                    println!("MIME: {}", mime_type);
                    println!("Extensions: {:?}", format.extensions());
                    Ok(exit_codes::SUCCESS)
                }
                None => {
                    Status::error(format!("{}: unsupported format", path.display()));
                    Ok(exit_codes::INVALID_INPUT)
                }
            }
        }

        Commands::Inspect { path, json } => {
            let data = read_file(&path)?;
            let Some(report) = inspect(&data) else {
                Status::error(format!("{}: unsupported format", path.display()));
                return Ok(exit_codes::INVALID_INPUT);
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("Format: {}", report.format);
                if let (Some(w), Some(h)) = (report.width, report.height) {
                    println!("Dimensions: {}x{}", w, h);
                }
                println!("Size: {}", format_size(report.size_bytes as u64));
                if report.segments.is_empty() {
                    println!("No ancillary chunks or application segments");
                }
                for segment in &report.segments {
                    let flag = if segment.kind.is_metadata() { "metadata" } else { "structure" };
                    println!(
                        "  {:<6} {:<12} {:>10} @ {:<8} {}",
                        segment.name,
                        format!("{:?}", segment.kind),
                        format_size(segment.length as u64),
                        segment.offset,
                        flag
                    );
                }
            }
            Ok(exit_codes::SUCCESS)
        }

        Commands::Formats { json } => {
            let options = config.strip_options();
            if json {
                let formats: Vec<_> = FormatKind::SUPPORTED
                    .iter()
                    .map(|f| {
                        serde_json::json!({
                            "format": f,
                            "mime": f.mime_type(),
                            "extensions": f.extensions(),
                        })
                    })
                    .collect();
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "formats": formats,
                        "jpeg_quality": options.jpeg_quality,
                        "output_prefix": CLEANED_PREFIX,
                    }))?
                );
            } else {
                Status::header("Supported formats");
                for f in FormatKind::SUPPORTED {
                    println!(
                        "  {:<5} {:<11} {}",
                        f.to_string(),
                        f.mime_type().unwrap_or_default(),
                        f.extensions().join(", ")
                    );
                }
                println!();
                println!("JPEG re-encode quality: {}", options.jpeg_quality);
                println!("Output names: {}<original name>", CLEANED_PREFIX);
            }
            Ok(exit_codes::SUCCESS)
        }
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// A file to clean, with its directory relative to the walked root so
/// `--out-dir` can mirror the input tree.
#[derive(Debug)]
struct InputFile {
    path: PathBuf,
    subdir: PathBuf,
}

impl InputFile {
    fn target_dir(&self, out_dir: Option<&Path>) -> PathBuf {
        match out_dir {
            Some(dir) => dir.join(&self.subdir),
            None => self.path.parent().map(Path::to_path_buf).unwrap_or_default(),
        }
    }
}

/// Expand directories into supported image files; explicit files are kept
/// as given so content sniffing decides.
fn collect_inputs(paths: &[PathBuf]) -> Vec<InputFile> {
    let mut files = Vec::new();

    for root in paths {
        if root.is_dir() {
            files.extend(
                WalkDir::new(root)
                    .into_iter()
                    .filter_map(|e| e.ok())
                    .filter(|e| e.file_type().is_file())
                    .map(|e| e.into_path())
                    .filter(|p| has_supported_extension(p) && !is_cleaned_output(p))
                    .map(|path| {
                        let subdir = path
                            .strip_prefix(root)
                            .ok()
                            .and_then(Path::parent)
                            .map(Path::to_path_buf)
                            .unwrap_or_default();
                        InputFile { path, subdir }
                    }),
            );
        } else {
            files.push(InputFile {
                path: root.clone(),
                subdir: PathBuf::new(),
            });
        }
    }

    files
}

fn has_supported_extension(path: &Path) -> bool {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    FormatKind::SUPPORTED
        .iter()
        .flat_map(|f| f.extensions())
        .any(|known| known.eq_ignore_ascii_case(ext))
}

fn is_cleaned_output(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with(CLEANED_PREFIX))
}

fn clean(
    paths: &[PathBuf],
    out_dir: Option<&Path>,
    mime: Option<&str>,
    options: &StripOptions,
    json: bool,
) -> Result<u8> {
    let files = collect_inputs(paths);
    if files.is_empty() {
        anyhow::bail!("No image files found in the specified paths");
    }
    if let Some(dir) = out_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    tracing::info!(files = files.len(), quality = options.jpeg_quality, "cleaning images");

    let pb = file_progress(files.len() as u64, json);
    let mut reports = Vec::with_capacity(files.len());
    let mut claimed = HashSet::new();

    for chunk in files.chunks(CHUNK_SIZE) {
        let mut inputs = Vec::with_capacity(chunk.len());
        let mut pending = Vec::with_capacity(chunk.len());

        for file in chunk {
            match std::fs::read(&file.path) {
                Ok(data) => {
                    let size = data.len() as u64;
                    let mut input = ImageBytes::new(data);
                    if let Some(name) = file.path.file_name() {
                        input = input.with_filename(name.to_string_lossy());
                    }
                    if let Some(mime) = mime {
                        input = input.with_mime_hint(mime);
                    }
                    inputs.push(input);
                    pending.push((file, size));
                }
                Err(e) => {
                    pb.inc(1);
                    reports.push(FileReport::failed(file.path.clone(), 0, io_report(&e)));
                }
            }
        }

        let results: Vec<_> = inputs
            .into_par_iter()
            .map(|input| strip_metadata_with(input, options))
            .progress_with(pb.clone())
            .collect();

        for ((file, original_size), result) in pending.into_iter().zip(results) {
            let path = file.path.clone();
            let report = match result {
                Ok(output) => {
                    let target = file.target_dir(out_dir).join(&output.filename);
                    if !claimed.insert(target.clone()) {
                        FileReport::failed(path, original_size, conflict_report(&target))
                    } else {
                        match write_output(&target, &output.bytes) {
                            Ok(()) => FileReport {
                                path,
                                written_to: Some(target),
                                original_size,
                                output: Some(output.summary()),
                                error: None,
                            },
                            Err(e) => FileReport::failed(path, original_size, io_report(&e)),
                        }
                    }
                }
                Err(e) => {
                    tracing::debug!(path = %path.display(), error = %e, "strip failed");
                    FileReport::failed(path, original_size, e.to_report())
                }
            };
            reports.push(report);
        }
    }
    pb.finish_and_clear();

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        print_summary(&reports);
    }

    Ok(exit_code_for(&reports))
}

fn write_output(target: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(dir) = target.parent() {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(target, bytes)
}

/// Another input in this run already produced `target`.
fn conflict_report(target: &Path) -> ErrorReport {
    ErrorReport {
        code: "output_conflict",
        kind: ErrorKind::ClientInput,
        message: format!("{} is already written by another input", target.display()),
        source: None,
    }
}

fn io_report(err: &std::io::Error) -> ErrorReport {
    ErrorReport {
        code: "io_error",
        kind: ErrorKind::Internal,
        message: err.to_string(),
        source: None,
    }
}

fn print_summary(reports: &[FileReport]) {
    let mut before = 0u64;
    let mut after = 0u64;

    for report in reports {
        match (&report.written_to, &report.output, &report.error) {
            (Some(target), Some(output), _) => {
                let size = output.size_bytes as u64;
                before += report.original_size;
                after += size;
                Status::cleaned(
                    &report.path,
                    target,
                    (output.width, output.height),
                    report.original_size,
                    size,
                );
            }
            (_, _, Some(error)) => Status::rejected(&report.path, error.code, &error.message),
            _ => {}
        }
    }

    let cleaned = reports.iter().filter(|r| r.error.is_none()).count();
    let failed = reports.len() - cleaned;

    Status::header("Summary");
    println!("Cleaned: {}", images(cleaned));
    if cleaned > 0 {
        println!("Size: {}", size_change(before, after));
    }
    if failed > 0 {
        println!("Failed: {}", images(failed));
    }
}

/// 0 when everything was cleaned, 1 if anything failed internally,
/// 2 if every failure was caused by the input.
fn exit_code_for(reports: &[FileReport]) -> u8 {
    let kinds: Vec<_> = reports
        .iter()
        .filter_map(|r| r.error.as_ref().map(|e| e.kind))
        .collect();

    if kinds.is_empty() {
        exit_codes::SUCCESS
    } else if kinds.contains(&ErrorKind::Internal) {
        exit_codes::FAILURE
    } else {
        exit_codes::INVALID_INPUT
    }
}
