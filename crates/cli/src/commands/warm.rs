//! `sdkpack warm`: fill the fragment cache from SDK checkouts.

use sdkpack_builder::warm_libraries;
use std::path::{Path, PathBuf};

use super::{CmdResult, load_config};

pub async fn run(
    config_path: Option<&Path>,
    lib_paths: Vec<PathBuf>,
    cache_dir: Option<PathBuf>,
    concurrency: Option<usize>,
) -> CmdResult {
    let config = load_config(config_path)?;
    let cache_dir = cache_dir.unwrap_or_else(|| config.build.cache_dir.clone());
    let concurrency = concurrency.unwrap_or(config.warm.concurrency);

    let results = warm_libraries(&lib_paths, &cache_dir, &config.build, concurrency).await;

    let mut failed = 0;
    for (path, result) in &results {
        match result {
            Ok(report) => println!(
                "  ✅ {} → {} ({} fragments, {} minified)",
                path.display(),
                report.cache_root.display(),
                report.plain_fragments,
                report.minified_fragments
            ),
            Err(e) => {
                println!("  ❌ {}: {e}", path.display());
                failed += 1;
            }
        }
    }

    if failed > 0 {
        return Err(format!("{failed} of {} libraries failed to warm", results.len()).into());
    }
    Ok(())
}
