//! CLI definitions using clap derive API
//!
//! This module is organized into submodules for each command's argument types:
//! - download: Download command arguments
//! - cache: Cache command arguments
//! - completions: Completions command arguments

use clap::builder::{Styles, styling::AnsiColor};
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

pub mod cache;
pub mod completions;
pub mod download;

pub use cache::{CacheArgs, CacheSubcommand, ClearCacheArgs};
pub use completions::CompletionsArgs;
pub use download::DownloadArgs;

use crate::config::{CACHE_DIR_ENV, MAX_CACHE_SIZE_ENV};

/// srcfetch - cache-aware git source downloader
///
/// Download package sources from git repositories, reusing local mirrors.
#[derive(Parser, Debug)]
#[command(
    name = "srcfetch",
    author,
    version,
    color = clap::ColorChoice::Always,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Cache-aware git source downloader for dependency managers",
    long_about = "srcfetch materializes a repository at a commit, branch or tag into a \
                  directory, keeping one local mirror per remote so repeated downloads \
                  skip the network whenever possible.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n   \
                  srcfetch download github:author/repo Pods/Repo           \x1b[90m# Remote HEAD\x1b[0m\n   \
                  srcfetch download <url> Pods/Repo --tag v1.1 --submodules \x1b[90m# Tag with submodules\x1b[0m\n   \
                  srcfetch download --spec source.yaml Pods/Repo            \x1b[90m# Descriptor file\x1b[0m\n   \
                  srcfetch cache list                                       \x1b[90m# List cached mirrors\x1b[0m\n\n\
                  "
)]
pub struct Cli {
    /// Cache directory holding repository mirrors
    #[arg(long, global = true, env = CACHE_DIR_ENV)]
    pub cache_dir: Option<PathBuf>,

    /// Total size budget for cached mirrors (bytes, or with K/M/G suffix)
    #[arg(long, global = true, env = MAX_CACHE_SIZE_ENV)]
    pub max_cache_size: Option<String>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(long, short = 'v', global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download a source into a directory
    Download(DownloadArgs),

    /// Manage cached mirrors
    #[command(name = "cache")]
    Cache(CacheArgs),

    /// Show version information
    #[command(hide = true)]
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}
