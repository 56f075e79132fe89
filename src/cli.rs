use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{CompressionLevel, DEFAULT_SUFFIX, PipelineConfig};

#[derive(Parser, Debug)]
#[command(name = "gzpipe")]
#[command(version)]
#[command(about = "Compress and decompress files or whole directory trees with gzip", long_about = None)]
#[command(after_help = "Examples:\n  \
  gzpipe compress document.txt document.txt.gz 9     compress at maximum level\n  \
  gzpipe decompress document.txt.gz restored.txt    restore a single file\n  \
  gzpipe compress-dir ./documents ./compressed_docs  mirror a tree as .gz files\n  \
  gzpipe list -v ./compressed_docs/*.gz              show sizes without inflating")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Suffix appended on compression and stripped on decompression
    #[arg(long, global = true, default_value = DEFAULT_SUFFIX, value_name = "SUFFIX")]
    pub suffix: String,

    /// Quiet mode (-qq => quieter)
    #[arg(short = 'q', global = true, action = clap::ArgAction::Count)]
    pub quiet: u8,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compress a single file
    Compress(FileArgs),

    /// Decompress a single file
    Decompress(PathArgs),

    /// Compress every file under a directory
    #[command(name = "compress-dir")]
    CompressDir(CompressDirArgs),

    /// Decompress every file under a directory
    #[command(name = "decompress-dir")]
    DecompressDir(DirArgs),

    /// Show gzip header information and sizes
    List {
        /// gzip files to inspect
        #[arg(value_name = "FILES", required = true)]
        files: Vec<PathBuf>,

        /// Show header details and a totals line
        #[arg(short = 'v')]
        verbose: bool,
    },
}

#[derive(Args, Debug)]
pub struct PathArgs {
    /// Input path
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output path
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,
}

#[derive(Args, Debug)]
pub struct FileArgs {
    #[command(flatten)]
    pub paths: PathArgs,

    /// Compression level 1-9 (1=fastest, 9=best); anything else means 6
    #[arg(value_name = "LEVEL", allow_negative_numbers = true)]
    pub level: Option<i64>,
}

#[derive(Args, Debug)]
pub struct DirArgs {
    #[command(flatten)]
    pub paths: PathArgs,

    /// Exit with an error if any file in the batch failed
    #[arg(long)]
    pub strict: bool,
}

#[derive(Args, Debug)]
pub struct CompressDirArgs {
    #[command(flatten)]
    pub dir: DirArgs,

    /// Compression level 1-9 (1=fastest, 9=best); anything else means 6
    #[arg(value_name = "LEVEL", allow_negative_numbers = true)]
    pub level: Option<i64>,
}

impl Cli {
    pub fn is_quiet(&self) -> bool {
        self.quiet > 0
    }

    pub fn is_very_quiet(&self) -> bool {
        self.quiet > 1
    }

    /// Level requested on the command line, if any.
    pub fn requested_level(&self) -> Option<i64> {
        match &self.command {
            Command::Compress(args) => args.level,
            Command::CompressDir(args) => args.level,
            _ => None,
        }
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        let level = self
            .requested_level()
            .map(CompressionLevel::new)
            .unwrap_or_default();
        PipelineConfig::default()
            .with_level(level)
            .with_suffix(self.suffix.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_compress_with_level() {
        let cli = Cli::parse_from(["gzpipe", "compress", "a.txt", "a.txt.gz", "9"]);
        assert_eq!(cli.pipeline_config().level.get(), 9);
        match cli.command {
            Command::Compress(args) => assert_eq!(args.paths.output, PathBuf::from("a.txt.gz")),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn out_of_range_level_uses_default() {
        let cli = Cli::parse_from(["gzpipe", "compress-dir", "in", "out", "42"]);
        assert_eq!(cli.pipeline_config().level, CompressionLevel::DEFAULT);
        let cli = Cli::parse_from(["gzpipe", "compress", "in", "out", "0"]);
        assert_eq!(cli.pipeline_config().level, CompressionLevel::DEFAULT);
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "gzpipe",
            "decompress-dir",
            "in",
            "out",
            "--strict",
            "--suffix",
            ".gzip",
            "-qq",
        ]);
        assert!(cli.is_very_quiet());
        assert_eq!(cli.pipeline_config().suffix, ".gzip");
        match cli.command {
            Command::DecompressDir(args) => assert!(args.strict),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn unknown_command_is_rejected() {
        assert!(Cli::try_parse_from(["gzpipe", "explode", "a", "b"]).is_err());
    }
}
