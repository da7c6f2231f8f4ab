//! Cache-only strategy: serves finished fragments and never reads source.

use async_trait::async_trait;
use sdkpack_cache::FragmentCache;
use sdkpack_core::catalog::ServiceCatalog;
use sdkpack_core::error::{CacheError, Error, Result};
use sdkpack_core::fragment::FragmentId;
use sdkpack_core::strategy::BuildStrategy;
use tracing::debug;

pub struct CacheOnlyStrategy {
    cache: FragmentCache,
    catalog: ServiceCatalog,
    minify: bool,
}

impl CacheOnlyStrategy {
    /// Open over a cache root, deriving the catalog from its file names.
    ///
    /// A root named `v<version>` also carries that SDK version.
    pub async fn open(cache: FragmentCache, minify: bool) -> Result<Self> {
        let entries = cache.entries().await?;
        let mut catalog = catalog_from_entries(&entries, minify);

        let sdk_version = cache
            .root()
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| n.strip_prefix('v'))
            .map(str::to_string);
        if let Some(version) = sdk_version {
            catalog = catalog.with_sdk_version(version);
        }

        debug!(
            root = %cache.root().display(),
            services = catalog.len(),
            minify,
            "Opened cache-only strategy"
        );
        Ok(Self {
            cache,
            catalog,
            minify,
        })
    }

    /// Replace the derived catalog.
    pub fn with_catalog(mut self, catalog: ServiceCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn cache(&self) -> &FragmentCache {
        &self.cache
    }

    async fn read(&self, id: &FragmentId) -> Result<Option<String>> {
        match self.cache.read(id, self.minify).await {
            Ok(text) => Ok(Some(text)),
            Err(CacheError::NotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Catalog of the fragments cached in one flavour.
pub fn catalog_from_entries(entries: &[(FragmentId, bool)], minified: bool) -> ServiceCatalog {
    let mut catalog = ServiceCatalog::new();
    for (id, flavour) in entries {
        if *flavour != minified {
            continue;
        }
        match id {
            FragmentId::Header { service } => catalog.insert_service(service.clone()),
            FragmentId::Definition { service, version } => {
                catalog.insert_version(service.clone(), version.clone())
            }
            FragmentId::Core => {}
        }
    }
    catalog
}

#[async_trait]
impl BuildStrategy for CacheOnlyStrategy {
    fn name(&self) -> &str {
        "cache-only"
    }

    fn catalog(&self) -> &ServiceCatalog {
        &self.catalog
    }

    fn minified(&self) -> bool {
        self.minify
    }

    async fn service_header(&self, service: &str) -> Result<Option<String>> {
        self.read(&FragmentId::header(service)).await
    }

    async fn service(&self, service: &str, version: &str) -> Result<Option<String>> {
        let Some(version) = self.catalog.resolve_version(service, version) else {
            return Ok(None);
        };
        self.read(&FragmentId::definition(service, version)).await
    }

    async fn core(&self) -> Result<String> {
        match self.read(&FragmentId::Core).await? {
            Some(text) => Ok(text),
            None => Err(Error::CoreNotFound(
                self.cache.path_for(&FragmentId::Core, self.minify).display().to_string(),
            )),
        }
    }
}
