//! The two build strategies and their construction from configuration.

pub mod cache_only;
pub mod live;

pub use cache_only::{CacheOnlyStrategy, catalog_from_entries};
pub use live::LiveStrategy;

use sdkpack_cache::FragmentCache;
use sdkpack_config::BuildConfig;
use sdkpack_core::error::{Error, Result};
use sdkpack_core::strategy::BuildStrategy;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use crate::bundler::bundler_from_config;
use crate::source::SdkLibrary;
use crate::transform::TransformPipeline;

/// The stamp prepended to every core fragment.
pub fn license_header(sdk_version: Option<&str>) -> String {
    let title = match sdk_version {
        Some(version) => format!("// AWS SDK for JavaScript v{version}"),
        None => "// AWS SDK for JavaScript".to_string(),
    };
    format!(
        "{title}\n\
         // Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.\n\
         // License at https://sdk.amazonaws.com/js/BUNDLE_LICENSE.txt\n"
    )
}

/// Pick and build the strategy for one build.
///
/// - `cached_version` set: cache-only over `<cache_dir>/<cached_version>`
/// - `lib_path` set: live over the checkout, caching into
///   `<cache_dir>/<library cache name>` when `cache` is on
/// - neither: cache-only over the newest `v<version>` root in `cache_dir`
pub async fn strategy_from_config(
    config: &BuildConfig,
    minify: bool,
    cached_version: Option<&str>,
) -> Result<Arc<dyn BuildStrategy>> {
    if cached_version.is_none()
        && let Some(lib_path) = &config.lib_path
    {
        let library = SdkLibrary::open(lib_path)
            .await?
            .with_core_entry(config.core_entry.clone());
        let pipeline = TransformPipeline::from_config(config)?;
        let cache_root = config.cache_dir.join(library.cache_name());

        let mut strategy = LiveStrategy::new(
            Arc::new(library),
            Arc::new(pipeline),
            bundler_from_config(config),
            minify,
        );
        if config.cache {
            strategy = strategy.with_cache(FragmentCache::new(cache_root));
        }
        info!(
            lib_path = %lib_path.display(),
            cache = config.cache,
            minify,
            "Using live build strategy"
        );
        return Ok(Arc::new(strategy));
    }

    let root = match cached_version {
        Some(version) => config.cache_dir.join(version),
        None => newest_cached_version(&config.cache_dir)
            .await
            .map(|(_, root)| root)
            .ok_or_else(|| Error::NoCachedVersion(config.cache_dir.display().to_string()))?,
    };
    info!(cache_root = %root.display(), minify, "Using cache-only build strategy");
    let strategy = CacheOnlyStrategy::open(FragmentCache::new(root), minify).await?;
    Ok(Arc::new(strategy))
}

/// `(name, root)` of every per-version cache root under `cache_dir`,
/// sorted by name. A missing directory has none.
pub async fn cached_versions(cache_dir: &Path) -> Vec<(String, PathBuf)> {
    let mut dir = match tokio::fs::read_dir(cache_dir).await {
        Ok(dir) => dir,
        Err(e) => {
            if e.kind() != ErrorKind::NotFound {
                warn!(cache_dir = %cache_dir.display(), error = %e, "Cannot list cache directory");
            }
            return Vec::new();
        }
    };

    let mut found = Vec::new();
    loop {
        let entry = match dir.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                warn!(cache_dir = %cache_dir.display(), error = %e, "Cache directory listing failed");
                break;
            }
        };
        let is_dir = entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false);
        match entry.file_name().into_string() {
            Ok(name) if is_dir && !name.starts_with('.') => found.push((name, entry.path())),
            _ => {}
        }
    }
    found.sort();
    found
}

/// The highest `v<major>.<minor>.<patch>` root under `cache_dir`.
pub async fn newest_cached_version(cache_dir: &Path) -> Option<(String, PathBuf)> {
    cached_versions(cache_dir)
        .await
        .into_iter()
        .filter_map(|(name, root)| Some((version_key(&name)?, name, root)))
        .max()
        .map(|(_, name, root)| (name, root))
}

/// Numeric sort key of `v2.10.0`; `None` for anything not shaped like a
/// library version.
fn version_key(name: &str) -> Option<Vec<u64>> {
    let rest = name.strip_prefix('v')?;
    if !rest.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    Some(
        rest.split('.')
            .map(|part| {
                let digits: String = part.chars().take_while(char::is_ascii_digit).collect();
                digits.parse().unwrap_or(0)
            })
            .collect(),
    )
}
