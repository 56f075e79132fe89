//! Main entry point for the gzpipe CLI application.
//!
//! This binary maps subcommands onto the four pipeline operations and the
//! header listing, and prints progress and statistics.

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Local};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use gzpipe::cli::{Command, DirArgs, PathArgs};
use gzpipe::gzip::{self, ContainerInfo};
use gzpipe::stats::{format_percent, format_size};
use gzpipe::{
    BatchObserver, Cli, CompressionLevel, CompressionStats, Compressor, Error, FileSystem,
    FileTask, Mode,
};

/// Application entry point.
///
/// Parses command-line arguments, installs logging and dispatches to the
/// handler for the selected subcommand.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    if let Some(level) = cli.requested_level()
        && CompressionLevel::checked(level).is_none()
        && !cli.is_very_quiet()
    {
        eprintln!(
            "Invalid compression level {}, using {}",
            level,
            CompressionLevel::DEFAULT
        );
    }

    let compressor = Compressor::local(cli.pipeline_config());

    match &cli.command {
        Command::Compress(args) => process_file(&compressor, &args.paths, Mode::Compress, &cli).await,
        Command::Decompress(args) => process_file(&compressor, args, Mode::Decompress, &cli).await,
        Command::CompressDir(args) => {
            process_directory(&compressor, &args.dir, Mode::Compress, &cli).await
        }
        Command::DecompressDir(args) => {
            process_directory(&compressor, args, Mode::Decompress, &cli).await
        }
        Command::List { files, verbose } => list_files(files, *verbose).await,
    }
}

/// Log to stderr so stdout only carries the report. `RUST_LOG` overrides
/// the default, which only shows errors.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Compress or decompress one file and print its statistics.
///
/// Any error aborts the program with a non-zero exit status.
async fn process_file<F: FileSystem>(
    compressor: &Compressor<F>,
    args: &PathArgs,
    mode: Mode,
    cli: &Cli,
) -> Result<()> {
    if !cli.is_quiet() {
        match mode {
            Mode::Compress => println!(
                "Compressing {} to {} (level {})...",
                args.input.display(),
                args.output.display(),
                compressor.config().level
            ),
            Mode::Decompress => println!(
                "Decompressing {} to {}...",
                args.input.display(),
                args.output.display()
            ),
        }
    }

    let stats = compressor
        .process_file(&args.input, &args.output, mode)
        .await
        .with_context(|| format!("failed to process {}", args.input.display()))?;

    if !cli.is_quiet() {
        match mode {
            Mode::Compress => println!("✓ Compression completed successfully!"),
            Mode::Decompress => println!("✓ Decompression completed successfully!"),
        }
        print_stats(&stats, mode);
    }

    Ok(())
}

/// Run a best-effort batch over a directory tree.
///
/// Per-file failures are printed as they happen and do not change the exit
/// status unless `--strict` is given.
async fn process_directory<F: FileSystem>(
    compressor: &Compressor<F>,
    args: &DirArgs,
    mode: Mode,
    cli: &Cli,
) -> Result<()> {
    let input = &args.paths.input;
    let output = &args.paths.output;

    if !cli.is_quiet() {
        match mode {
            Mode::Compress => println!(
                "Compressing directory {} to {} (level {})...",
                input.display(),
                output.display(),
                compressor.config().level
            ),
            Mode::Decompress => println!(
                "Decompressing directory {} to {}...",
                input.display(),
                output.display()
            ),
        }
    }

    let start = std::time::Instant::now();
    let observer = ConsoleObserver { quiet: cli.quiet };
    let summary = compressor
        .process_directory(input, output, mode, &observer)
        .await
        .with_context(|| format!("failed to process directory {}", input.display()))?;

    if !cli.is_quiet() {
        let total = summary.total(start.elapsed());
        match mode {
            Mode::Compress => println!("✓ Directory compression completed!"),
            Mode::Decompress => println!("✓ Directory decompression completed!"),
        }
        println!(
            "Files: {} processed, {} failed; {} -> {} ({} of original) in {:?}",
            summary.succeeded,
            summary.failed(),
            format_size(total.original_size),
            format_size(total.processed_size),
            format_percent(total.ratio()),
            total.elapsed
        );
    }

    if args.strict && !summary.is_clean() {
        bail!(
            "{} of {} files failed",
            summary.failed(),
            summary.failed() + summary.succeeded
        );
    }

    Ok(())
}

/// Prints one line per finished file.
struct ConsoleObserver {
    quiet: u8,
}

impl BatchObserver for ConsoleObserver {
    fn file_completed(&self, mode: Mode, task: &FileTask, stats: &CompressionStats) {
        if self.quiet == 0 {
            println!(
                "{}: {} -> {} ({} of original)",
                mode.verb(),
                task.input.display(),
                task.output.display(),
                format_percent(stats.ratio())
            );
        }
    }

    fn file_failed(&self, mode: Mode, input: &Path, error: &Error) {
        if self.quiet < 2 {
            let action = match mode {
                Mode::Compress => "compressing",
                Mode::Decompress => "decompressing",
            };
            eprintln!("Error {} {}: {}", action, input.display(), error);
        }
    }
}

/// Print statistics for a single-file operation.
fn print_stats(stats: &CompressionStats, mode: Mode) {
    let title = match mode {
        Mode::Compress => "Compression",
        Mode::Decompress => "Decompression",
    };
    println!("\n=== {} Statistics ===", title);
    println!(
        "Original Size:     {} bytes ({:.2} KB)",
        stats.original_size,
        stats.original_size as f64 / 1024.0
    );
    println!(
        "Processed Size:    {} bytes ({:.2} KB)",
        stats.processed_size,
        stats.processed_size as f64 / 1024.0
    );

    match mode {
        Mode::Compress => {
            println!("Compression Ratio: {}", format_percent(stats.ratio()));
            println!("Space Saved:       {}", format_percent(stats.space_saved()));
        }
        Mode::Decompress => {
            println!("Expansion Ratio:   {}", format_percent(stats.ratio()));
        }
    }

    println!("Time Taken:        {:?}", stats.elapsed);
}

/// List gzip files.
///
/// Supports two output formats:
/// - Simple format: compressed size, uncompressed size, ratio and name
/// - Verbose format (`-v`): adds method, OS, CRC and timestamp, plus a totals line
///
/// Unreadable files are reported and skipped; the command fails at the end
/// if any were.
async fn list_files(files: &[PathBuf], verbose: bool) -> Result<()> {
    if verbose {
        println!(
            "{:>6}  {:>9}  {:>8}  {:>16}  {:>12}  {:>12}  {:>7}  Name",
            "Method", "OS", "CRC", "Date     Time", "Compressed", "Uncompressed", "Ratio"
        );
    } else {
        println!(
            "{:>12}  {:>12}  {:>7}  Name",
            "Compressed", "Uncompressed", "Ratio"
        );
    }

    let mut total_compressed = 0u64;
    let mut total_uncompressed = 0u64;
    let mut listed = 0usize;
    let mut failed = 0usize;

    for path in files {
        let info = match gzip::inspect(path).await {
            Ok(info) => info,
            Err(e) => {
                eprintln!("{}: {}", path.display(), e);
                failed += 1;
                continue;
            }
        };

        let stats = info.stats();
        if verbose {
            println!(
                "{:>6}  {:>9}  {:08x}  {:>16}  {:>12}  {:>12}  {:>7}  {}",
                "defla",
                info.header.os_name(),
                info.trailer.crc32,
                format_mtime(&info),
                info.compressed_size,
                info.uncompressed_size(),
                format_percent(stats.space_saved()),
                display_name(&info)
            );
        } else {
            println!(
                "{:>12}  {:>12}  {:>7}  {}",
                info.compressed_size,
                info.uncompressed_size(),
                format_percent(stats.space_saved()),
                display_name(&info)
            );
        }

        total_compressed += info.compressed_size;
        total_uncompressed += info.uncompressed_size();
        listed += 1;
    }

    if verbose && listed > 1 {
        let total = CompressionStats::new(
            total_uncompressed,
            total_compressed,
            std::time::Duration::ZERO,
        );
        println!(
            "{:>6}  {:>9}  {:>8}  {:>16}  {:>12}  {:>12}  {:>7}  (totals, {} files)",
            "",
            "",
            "",
            "",
            total_compressed,
            total_uncompressed,
            format_percent(total.space_saved()),
            listed
        );
    }

    if failed > 0 {
        bail!("{} of {} files could not be listed", failed, files.len());
    }
    Ok(())
}

/// Name stored in the header, falling back to the file's own path.
fn display_name(info: &ContainerInfo) -> String {
    info.header
        .file_name
        .clone()
        .unwrap_or_else(|| info.path.display().to_string())
}

fn format_mtime(info: &ContainerInfo) -> String {
    match info.header.modified() {
        Some(time) => DateTime::<Local>::from(time)
            .format("%Y-%m-%d %H:%M")
            .to_string(),
        None => "-".to_string(),
    }
}
