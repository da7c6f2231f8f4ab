//! Cache warming: build every stable fragment of a library ahead of time.
//!
//! For each library both flavours of `all` are assembled through a caching
//! live strategy, which leaves headers, definitions (prerelease ones
//! included) and the core under `<cache_dir>/<library cache name>/`.

use futures::StreamExt;
use sdkpack_cache::FragmentCache;
use sdkpack_config::BuildConfig;
use sdkpack_core::error::Result;
use sdkpack_core::request::ALL_SERVICES;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};

use crate::bundler::bundler_from_config;
use crate::engine::AssemblyEngine;
use crate::source::SdkLibrary;
use crate::strategy::LiveStrategy;
use crate::transform::TransformPipeline;

/// What one library's warm-up produced.
#[derive(Debug, Clone)]
pub struct WarmReport {
    pub library: PathBuf,
    /// The cache root written to.
    pub cache_root: PathBuf,
    pub plain_fragments: usize,
    pub minified_fragments: usize,
}

/// Warm the cache for one library checkout.
pub async fn warm_library(lib_path: &Path, cache_dir: &Path, config: &BuildConfig) -> Result<WarmReport> {
    let library = Arc::new(
        SdkLibrary::open(lib_path)
            .await?
            .with_core_entry(config.core_entry.clone()),
    );
    let pipeline = Arc::new(TransformPipeline::from_config(config)?);
    let bundler = bundler_from_config(config);
    let cache = FragmentCache::new(cache_dir.join(library.cache_name()));
    cache.ensure_root().await?;

    info!(library = %lib_path.display(), cache_root = %cache.root().display(), "Warming cache");

    let engine = |minify: bool| {
        let strategy = LiveStrategy::new(library.clone(), pipeline.clone(), bundler.clone(), minify)
            .with_cache(cache.clone());
        AssemblyEngine::from_config(Arc::new(strategy), config)
    };
    let plain = engine(false);
    let minified = engine(true);

    let (plain, minified) = tokio::join!(
        plain.assemble(Some(ALL_SERVICES)),
        minified.assemble(Some(ALL_SERVICES))
    );
    let (plain, minified) = (plain?, minified?);

    let report = WarmReport {
        library: lib_path.to_path_buf(),
        cache_root: cache.root().to_path_buf(),
        plain_fragments: plain.fragments.len(),
        minified_fragments: minified.fragments.len(),
    };
    info!(
        library = %lib_path.display(),
        plain = report.plain_fragments,
        minified = report.minified_fragments,
        "Cache warmed"
    );
    Ok(report)
}

/// Warm several libraries, at most `concurrency` at a time.
///
/// Results come back in completion order; one library failing does not
/// stop the others.
pub async fn warm_libraries(
    paths: &[PathBuf],
    cache_dir: &Path,
    config: &BuildConfig,
    concurrency: usize,
) -> Vec<(PathBuf, Result<WarmReport>)> {
    futures::stream::iter(paths)
        .map(|path| async move {
            let result = warm_library(path, cache_dir, config).await;
            if let Err(e) = &result {
                error!(library = %path.display(), error = %e, "Cache warming failed");
            }
            (path.clone(), result)
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::CacheOnlyStrategy;
    use crate::test_support::write_fixture_library;
    use sdkpack_core::fragment::FragmentId;

    #[tokio::test]
    async fn warms_both_flavours() {
        let dir = tempfile::tempdir().unwrap();
        let lib = dir.path().join("lib-2.0.0");
        write_fixture_library(&lib);
        let cache_dir = dir.path().join("cache");

        let report = warm_library(&lib, &cache_dir, &BuildConfig::default())
            .await
            .unwrap();
        assert_eq!(report.cache_root, cache_dir.join("v2.0.0"));
        // Five services, one stable version each
        assert_eq!(report.plain_fragments, 10);
        assert_eq!(report.minified_fragments, 10);

        let cache = FragmentCache::new(&report.cache_root);
        for minified in [false, true] {
            assert!(cache.exists(&FragmentId::Core, minified).await);
            assert!(cache.exists(&FragmentId::header("s3"), minified).await);
            // Prerelease definitions are warmed but never emitted
            assert!(
                cache
                    .exists(&FragmentId::definition("dynamodb", "2011-12-05-preview"), minified)
                    .await
            );
        }
    }

    #[tokio::test]
    async fn warmed_cache_serves_identical_bundle() {
        let dir = tempfile::tempdir().unwrap();
        let lib = dir.path().join("lib");
        write_fixture_library(&lib);
        let cache_dir = dir.path().join("cache");
        let config = BuildConfig {
            lib_path: Some(lib.clone()),
            ..Default::default()
        };
        warm_library(&lib, &cache_dir, &config).await.unwrap();

        let live = crate::strategy_from_config(&config, false, None).await.unwrap();
        let live = AssemblyEngine::from_config(live, &config);
        let cached = CacheOnlyStrategy::open(FragmentCache::new(cache_dir.join("v2.0.0")), false)
            .await
            .unwrap();
        let cached = AssemblyEngine::from_config(Arc::new(cached), &config);

        assert_eq!(
            live.build(Some("s3,dynamodb")).await.unwrap(),
            cached.build(Some("s3,dynamodb")).await.unwrap()
        );
    }

    #[tokio::test]
    async fn one_failure_does_not_stop_others() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good");
        write_fixture_library(&good);
        let bad = dir.path().join("missing");

        let results = warm_libraries(
            &[good.clone(), bad.clone()],
            &dir.path().join("cache"),
            &BuildConfig::default(),
            2,
        )
        .await;

        assert_eq!(results.len(), 2);
        for (path, result) in results {
            if path == good {
                assert!(result.is_ok());
            } else {
                assert_eq!(path, bad);
                assert!(result.is_err());
            }
        }
    }
}
