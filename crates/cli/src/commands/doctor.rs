//! `sdkpack doctor`: diagnose configuration, library and cache.

use sdkpack_builder::SdkLibrary;
use sdkpack_cache::FragmentCache;
use sdkpack_config::AppConfig;
use std::path::Path;

use super::{CmdResult, load_config};

pub async fn run(config_path: Option<&Path>) -> CmdResult {
    println!("sdkpack doctor");
    println!("==============\n");

    let mut issues = 0;

    let default_path = AppConfig::config_dir().join("config.toml");
    let shown = config_path.unwrap_or(default_path.as_path());
    let config = match load_config(config_path) {
        Ok(config) => {
            if shown.exists() {
                println!("  ✅ Config file valid ({})", shown.display());
            } else {
                println!("  ⚠️  No config file at {}, using defaults", shown.display());
            }
            config
        }
        Err(e) => {
            println!("  ❌ {e}");
            return Err("configuration is invalid".into());
        }
    };

    match &config.build.lib_path {
        Some(lib_path) => match SdkLibrary::open(lib_path).await {
            Ok(library) => {
                let library = library.with_core_entry(config.build.core_entry.clone());
                println!(
                    "  ✅ SDK library {} ({} services, version {})",
                    lib_path.display(),
                    library.catalog().len(),
                    library.catalog().sdk_version().unwrap_or("unknown")
                );
                if !library.entry_point().exists() {
                    println!("  ❌ Core entry point missing: {}", library.entry_point().display());
                    issues += 1;
                }
            }
            Err(e) => {
                println!("  ❌ SDK library unusable: {e}");
                issues += 1;
            }
        },
        None => println!("  ⚠️  No lib_path configured, builds use the cache only"),
    }

    if config.build.cache_dir.is_dir() {
        println!("  ✅ Build cache directory {}", config.build.cache_dir.display());
    } else {
        println!(
            "  ⚠️  Build cache directory {} does not exist yet",
            config.build.cache_dir.display()
        );
    }

    let server_dir = &config.server.cache_dir;
    if server_dir.is_dir() {
        let mut versions = Vec::new();
        if let Ok(entries) = std::fs::read_dir(server_dir) {
            for entry in entries.flatten() {
                if entry.path().is_dir() {
                    versions.push(entry.file_name().to_string_lossy().into_owned());
                }
            }
        }
        versions.sort();
        for version in &versions {
            let entries = FragmentCache::new(server_dir.join(version))
                .entries()
                .await
                .map(|e| e.len())
                .unwrap_or(0);
            println!("  ✅ Served version {version} ({entries} cached fragments)");
        }
        if versions.is_empty() && config.server.master_lib_path.is_none() {
            println!("  ⚠️  Server has no versions to serve, run `sdkpack warm`");
            issues += 1;
        }
    } else if config.server.master_lib_path.is_none() {
        println!("  ⚠️  Server cache directory {} does not exist", server_dir.display());
        issues += 1;
    }

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
