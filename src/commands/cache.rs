//! Cache command implementation

use std::sync::Arc;

use console::Style;

use super::GlobalOptions;
use crate::cache::{CacheStore, stats::format_size};
use crate::cli::{CacheArgs, CacheSubcommand};
use crate::error::{Result, cache};
use crate::git::LibGit2Backend;

pub fn run(globals: &GlobalOptions, args: CacheArgs) -> Result<()> {
    let config = globals.config()?;
    let store = CacheStore::new(
        config.cache_root,
        config.max_cache_size,
        Arc::new(LibGit2Backend),
    );

    match args.command {
        Some(CacheSubcommand::List) => list_cached_mirrors(&store),
        Some(CacheSubcommand::Clear(clear_args)) => match clear_args.only {
            Some(url) => clean_specific_mirror(&store, &url),
            None => clean_all_cache(&store),
        },
        // Default: show only cache statistics
        None => show_cache_stats(&store),
    }
}

fn print_stats_header(store: &CacheStore) -> Result<usize> {
    let stats = store.stats()?;

    println!("Cache Statistics:");
    println!("  Location: {}", store.root().display());
    println!("  Repositories: {}", stats.repositories);
    println!(
        "  Size: {} (budget {})",
        stats.formatted_size(),
        format_size(store.max_size())
    );

    Ok(stats.repositories)
}

fn show_cache_stats(store: &CacheStore) -> Result<()> {
    if print_stats_header(store)? == 0 {
        println!("\nCache is empty.");
    } else {
        println!("\nRun 'srcfetch cache list' to list cached mirrors.");
        println!("Run 'srcfetch cache clear' to remove everything from cache.");
        println!("Run 'srcfetch cache clear --only <url>' to remove a specific mirror.");
    }

    Ok(())
}

fn list_cached_mirrors(store: &CacheStore) -> Result<()> {
    print_stats_header(store)?;
    println!();

    let entries = store.entries()?;
    if entries.is_empty() {
        println!("No cached mirrors.");
        return Ok(());
    }

    let dim = Style::new().dim();
    println!("Cached mirrors ({}), least recently used first:", entries.len());
    for entry in &entries {
        println!(
            "  {} ({})",
            entry.source_url,
            format_size(entry.size_on_disk())
        );
        println!(
            "    {}",
            dim.apply_to(format!(
                "last used {}, {}",
                entry.last_used_at.format("%Y-%m-%d %H:%M:%S UTC"),
                entry.local_path.display()
            ))
        );
    }

    Ok(())
}

fn clean_all_cache(store: &CacheStore) -> Result<()> {
    let removed = store.clear()?;
    println!(
        "Cache cleared successfully ({removed} mirror{}).",
        if removed == 1 { "" } else { "s" }
    );
    Ok(())
}

fn clean_specific_mirror(store: &CacheStore, url: &str) -> Result<()> {
    if !store.remove(url)? {
        return Err(cache::operation_failed(format!(
            "Repository not found in cache: {url}"
        )));
    }
    println!("Removed cached mirror: {url}");
    Ok(())
}
