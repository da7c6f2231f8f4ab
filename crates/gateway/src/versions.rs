//! The SDK versions a server instance can deliver.

use sdkpack_builder::{
    AssemblyEngine, CacheOnlyStrategy, LiveStrategy, SdkLibrary, TransformPipeline,
    bundler_from_config, cached_versions,
};
use sdkpack_cache::FragmentCache;
use sdkpack_config::AppConfig;
use sdkpack_core::error::Result;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// One deliverable version, with an engine per flavour.
pub struct ServedVersion {
    pub plain: AssemblyEngine,
    pub minified: AssemblyEngine,
}

impl ServedVersion {
    pub fn engine(&self, minified: bool) -> &AssemblyEngine {
        if minified {
            &self.minified
        } else {
            &self.plain
        }
    }
}

#[derive(Default)]
pub struct VersionRegistry {
    versions: HashMap<String, ServedVersion>,
}

impl VersionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_version(mut self, name: impl Into<String>, version: ServedVersion) -> Self {
        self.versions.insert(name.into(), version);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ServedVersion> {
        self.versions.get(name)
    }

    /// Served version names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.versions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    /// Every sub-directory of `server.cache_dir` served from cache (when
    /// `server.cache` is on), plus `master_lib_path` served live as `latest`.
    pub async fn load(config: &AppConfig) -> Result<Self> {
        let mut registry = Self::new();

        if config.server.cache {
            for (name, root) in cached_versions(&config.server.cache_dir).await {
                let served = ServedVersion {
                    plain: cache_engine(&root, false, config).await?,
                    minified: cache_engine(&root, true, config).await?,
                };
                info!(version = %name, root = %root.display(), "Serving cached version");
                registry.versions.insert(name, served);
            }
        }

        if let Some(lib_path) = &config.server.master_lib_path {
            let library = Arc::new(
                SdkLibrary::open(lib_path)
                    .await?
                    .with_core_entry(config.build.core_entry.clone()),
            );
            let pipeline = Arc::new(TransformPipeline::from_config(&config.build)?);
            let bundler = bundler_from_config(&config.build);
            let engine = |minify: bool| {
                let strategy = LiveStrategy::new(library.clone(), pipeline.clone(), bundler.clone(), minify);
                AssemblyEngine::from_config(Arc::new(strategy), &config.build)
            };
            registry.versions.insert(
                sdkpack_core::LATEST.to_string(),
                ServedVersion {
                    plain: engine(false),
                    minified: engine(true),
                },
            );
            info!(lib_path = %lib_path.display(), "Serving live library as latest");
        }

        Ok(registry)
    }
}

async fn cache_engine(root: &Path, minify: bool, config: &AppConfig) -> Result<AssemblyEngine> {
    let strategy = CacheOnlyStrategy::open(FragmentCache::new(root), minify).await?;
    Ok(AssemblyEngine::from_config(Arc::new(strategy), &config.build))
}
