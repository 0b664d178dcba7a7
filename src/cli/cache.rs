use clap::{Parser, Subcommand};

/// Arguments for cache command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Show cache statistics:\n    srcfetch cache\n\n\
                  List cached mirrors:\n    srcfetch cache list\n\n\
                  Clear all cached mirrors:\n    srcfetch cache clear\n\n\
                  Remove a specific mirror:\n    srcfetch cache clear --only https://github.com/author/repo.git")]
pub struct CacheArgs {
    #[command(subcommand)]
    pub command: Option<CacheSubcommand>,
}

/// Cache subcommands
#[derive(Subcommand, Debug)]
pub enum CacheSubcommand {
    /// List cached mirrors, least recently used first
    List,

    /// Clear cached mirrors
    Clear(ClearCacheArgs),
}

/// Arguments for cache clear command
#[derive(Parser, Debug)]
pub struct ClearCacheArgs {
    /// Remove only the mirror of this repository URL
    #[arg(long)]
    pub only: Option<String>,
}
