use clap::Parser;
use std::path::PathBuf;

/// Strip DRM wrapping from vendor encrypted music files.
#[derive(Debug, Clone, Parser)]
#[command(version, author = "clitic <clitic21@gmail.com>", about)]
pub struct Args {
    /// Files, directories or glob patterns to decrypt.
    #[arg(required = true)]
    pub paths: Vec<String>,

    /// Attempt files whose extension is not a known vendor extension.
    /// By default such files are skipped when expanding directories and globs.
    #[arg(short = 'x', long)]
    pub extensive: bool,

    /// Overwrite output files which already exist.
    #[arg(short, long)]
    pub force: bool,

    /// Directory to write decrypted files into.
    /// By default files are written next to their input.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Walk directories recursively instead of top level only.
    #[arg(short, long)]
    pub recursive: bool,

    /// Maximum number of files decrypted in parallel.
    /// Number of threads should be in range 1-16 (inclusive).
    #[arg(short, long, default_value_t = 4, value_parser = clap::value_parser!(u8).range(1..=16))]
    pub threads: u8,

    /// Raise log verbosity, once for debug and twice for trace.
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
