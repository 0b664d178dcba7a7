//! srcfetch - cache-aware git source downloader
//!
//! CLI entry point that dispatches to subcommands.

use std::process::ExitCode;

use clap::Parser;
use console::style;
use miette::Diagnostic;
use tracing_subscriber::EnvFilter;

use srcfetch::cli::{Cli, Commands};
use srcfetch::commands::{self, GlobalOptions};
use srcfetch::error::{DownloadError, Result};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}

fn report(e: &DownloadError) {
    eprintln!("{} {}", style("Error:").red().bold(), e);
    if let Some(help) = e.help() {
        eprintln!("{} {}", style("Hint:").yellow(), help);
    }
}

fn init_logging(verbose: u8) {
    // RUST_LOG wins; otherwise 0 = warn, 1 = info, 2+ = debug
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new("srcfetch=warn"),
        1 => EnvFilter::new("srcfetch=info"),
        _ => EnvFilter::new("srcfetch=debug"),
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let globals = GlobalOptions {
        cache_dir: cli.cache_dir,
        max_cache_size: cli.max_cache_size,
        verbose: cli.verbose,
    };

    match cli.command {
        Commands::Download(args) => commands::download::run(&globals, args),
        Commands::Cache(args) => commands::cache::run(&globals, args),
        Commands::Version => commands::version::run(),
        Commands::Completions(args) => commands::completions::run(args),
    }
}
