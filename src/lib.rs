//! srcfetch - cache-aware git source downloader
//!
//! The source-acquisition layer of a dependency manager: given a repository
//! URL and an optional commit, branch or tag, produce a working copy on local
//! disk, reusing a cache of mirrors whenever possible.
//!
//! ```no_run
//! use srcfetch::{Downloader, DownloaderConfig, SourceDescriptor};
//!
//! # fn main() -> srcfetch::Result<()> {
//! let downloader = Downloader::new(DownloaderConfig::from_env()?);
//! let source = SourceDescriptor::new("https://github.com/lukeredpath/libPusher.git")
//!     .with_tag("v1.1")
//!     .with_submodules(true);
//! downloader.download(&source, std::path::Path::new("Pods/libPusher"))?;
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod cache;
pub mod checkout;
pub mod cli;
pub mod commands;
pub mod config;
pub mod downloader;
pub mod error;
pub mod git;
pub mod progress;
pub mod resolver;
pub mod source;

#[cfg(test)]
mod test_fixtures;

pub use config::DownloaderConfig;
pub use downloader::Downloader;
pub use error::{DownloadError, Result};
pub use source::{GitReference, SourceDescriptor};
