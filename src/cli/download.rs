use clap::Parser;
use std::path::{Path, PathBuf};

/// Arguments for download command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Download the remote HEAD:\n    srcfetch download https://github.com/author/repo.git Pods/Repo\n\n\
                  Download a commit:\n    srcfetch download github:author/repo Pods/Repo --commit fd56054\n\n\
                  Download a tag with submodules:\n    srcfetch download github:author/repo Pods/Repo --tag v1.1 --submodules\n\n\
                  Download a GitHub snapshot without cloning:\n    srcfetch download github:author/repo Pods/Repo --download-only\n\n\
                  Read the source from a YAML or JSON file:\n    srcfetch download --spec source.yaml Pods/Repo")]
pub struct DownloadArgs {
    /// Repository URL (https, ssh, git://, file:// or local path; github:author/repo).
    /// With --spec, the only positional argument is the destination.
    #[arg(value_name = "URL")]
    pub url: Option<String>,

    /// Destination directory (must be absent or empty)
    #[arg(value_name = "DEST")]
    pub dest: Option<PathBuf>,

    /// Commit SHA to check out (full or abbreviated)
    #[arg(long, conflicts_with_all = ["branch", "tag"])]
    pub commit: Option<String>,

    /// Branch to check out
    #[arg(long, conflicts_with = "tag")]
    pub branch: Option<String>,

    /// Tag to check out
    #[arg(long)]
    pub tag: Option<String>,

    /// Initialize and update submodules
    #[arg(long)]
    pub submodules: bool,

    /// Download a snapshot archive instead of cloning (GitHub only)
    #[arg(long)]
    pub download_only: bool,

    /// Read the source descriptor from a YAML or JSON file
    #[arg(long, value_name = "FILE", conflicts_with_all = ["commit", "branch", "tag"])]
    pub spec: Option<PathBuf>,
}

impl DownloadArgs {
    /// The repository URL and destination given on the command line
    ///
    /// With `--spec` the URL comes from the file, so a single positional
    /// argument names the destination. Returns `None` for any other shape.
    pub fn positionals(&self) -> Option<(Option<&str>, &Path)> {
        match (&self.spec, self.url.as_deref(), self.dest.as_deref()) {
            (Some(_), Some(dest), None) => Some((None, Path::new(dest))),
            (None, Some(url), Some(dest)) => Some((Some(url), dest)),
            _ => None,
        }
    }
}
