//! Download command implementation

use std::path::Path;

use console::Style;

use super::GlobalOptions;
use crate::cli::DownloadArgs;
use crate::downloader::Downloader;
use crate::error::{Result, source};
use crate::progress::DownloadSpinner;
use crate::source::SourceDescriptor;

/// Run download command
pub fn run(globals: &GlobalOptions, args: DownloadArgs) -> Result<()> {
    let (descriptor, dest) = descriptor_from_args(&args)?;
    let downloader = Downloader::new(globals.config()?);

    let spinner = DownloadSpinner::start(
        &format!("Downloading {} ({})", descriptor.url, descriptor.reference),
        globals.verbose > 0,
    );
    match downloader.download(&descriptor, dest) {
        Ok(()) => spinner.finish(),
        Err(e) => {
            spinner.abandon();
            return Err(e);
        }
    }

    let green = Style::new().green().bold();
    println!(
        "{} {} ({}) into {}",
        green.apply_to("Downloaded"),
        descriptor.url,
        descriptor.reference,
        dest.display()
    );
    Ok(())
}

/// Build the descriptor from flags or from a `--spec` file
fn descriptor_from_args(args: &DownloadArgs) -> Result<(SourceDescriptor, &Path)> {
    let (url, dest) = args.positionals().ok_or_else(|| {
        source::invalid("expected <URL> <DEST>, or --spec <FILE> <DEST>")
    })?;

    let descriptor = match (&args.spec, url) {
        (Some(file), _) => load_descriptor(file)?,
        (None, Some(url)) => SourceDescriptor::from_parts(
            url,
            args.commit.clone(),
            args.branch.clone(),
            args.tag.clone(),
        )?,
        (None, None) => return Err(source::invalid("a repository URL is required")),
    };

    // Flags can switch these on for a descriptor read from a file
    let submodules = descriptor.submodules || args.submodules;
    let download_only = descriptor.download_only || args.download_only;
    Ok((
        descriptor
            .with_submodules(submodules)
            .with_download_only(download_only),
        dest,
    ))
}

/// Read a descriptor from a YAML or JSON file
pub fn load_descriptor(path: &Path) -> Result<SourceDescriptor> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        source::invalid(format!("Failed to read {}: {e}", path.display()))
    })?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        serde_json::from_str(&content)
            .map_err(|e| source::invalid(format!("{}: {e}", path.display())))
    } else {
        Ok(serde_yaml::from_str(&content)?)
    }
}
