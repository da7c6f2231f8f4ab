//! Live strategy: derives fragments from an SDK checkout.
//!
//! With a cache attached every lookup reads the cache first and every
//! derived fragment is written back. A failed write is logged and the
//! derived text is still served.

use async_trait::async_trait;
use sdkpack_cache::FragmentCache;
use sdkpack_core::catalog::ServiceCatalog;
use sdkpack_core::bundler::CoreBundler;
use sdkpack_core::error::{CacheError, Result, SourceError};
use sdkpack_core::fragment::FragmentId;
use sdkpack_core::strategy::BuildStrategy;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::license_header;
use crate::source::SdkLibrary;
use crate::transform::TransformPipeline;

pub struct LiveStrategy {
    library: Arc<SdkLibrary>,
    pipeline: Arc<TransformPipeline>,
    bundler: Arc<dyn CoreBundler>,
    cache: Option<FragmentCache>,
    minify: bool,
}

impl LiveStrategy {
    pub fn new(
        library: Arc<SdkLibrary>,
        pipeline: Arc<TransformPipeline>,
        bundler: Arc<dyn CoreBundler>,
        minify: bool,
    ) -> Self {
        Self {
            library,
            pipeline,
            bundler,
            cache: None,
            minify,
        }
    }

    /// Read from and write to `cache`.
    pub fn with_cache(mut self, cache: FragmentCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn library(&self) -> &SdkLibrary {
        &self.library
    }

    pub fn cache(&self) -> Option<&FragmentCache> {
        self.cache.as_ref()
    }

    async fn cached(&self, id: &FragmentId) -> Option<String> {
        let cache = self.cache.as_ref()?;
        match cache.read(id, self.minify).await {
            Ok(text) => Some(text),
            Err(CacheError::NotFound(_)) => None,
            Err(e) => {
                warn!(fragment = %id, error = %e, "Cache read failed, deriving from source");
                None
            }
        }
    }

    async fn store(&self, id: &FragmentId, text: &str) {
        if let Some(cache) = &self.cache
            && let Err(e) = cache.write(id, self.minify, text).await
        {
            warn!(fragment = %id, error = %e, "Failed to cache fragment");
        }
    }
}

#[async_trait]
impl BuildStrategy for LiveStrategy {
    fn name(&self) -> &str {
        "live"
    }

    fn catalog(&self) -> &ServiceCatalog {
        self.library.catalog()
    }

    fn minified(&self) -> bool {
        self.minify
    }

    fn writes_cache(&self) -> bool {
        self.cache.is_some()
    }

    async fn service_header(&self, service: &str) -> Result<Option<String>> {
        let id = FragmentId::header(service);
        if let Some(text) = self.cached(&id).await {
            return Ok(Some(text));
        }

        let handle = match self.library.resolve(service).await {
            Ok(handle) => handle,
            Err(SourceError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let text = self.pipeline.transform(&handle.source, self.minify)?;
        debug!(fragment = %id, bytes = text.len(), "Derived header fragment");
        self.store(&id, &text).await;
        Ok(Some(text))
    }

    async fn service(&self, service: &str, version: &str) -> Result<Option<String>> {
        let Some(version) = self.library.catalog().resolve_version(service, version) else {
            return Ok(None);
        };
        let id = FragmentId::definition(service, version);
        if let Some(text) = self.cached(&id).await {
            return Ok(Some(text));
        }

        let definition = match self.library.definition(service, version).await {
            Ok(definition) => definition,
            Err(SourceError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let text = definition.render(self.pipeline.qualified_binding(), version)?;
        debug!(fragment = %id, bytes = text.len(), "Derived definition fragment");
        self.store(&id, &text).await;
        Ok(Some(text))
    }

    async fn core(&self) -> Result<String> {
        let id = FragmentId::Core;
        if let Some(text) = self.cached(&id).await {
            return Ok(text);
        }

        let entry = self.library.entry_point();
        info!(bundler = self.bundler.name(), entry = %entry.display(), "Building core runtime");
        let bundled = self.bundler.bundle(&entry).await?;
        let body = self.pipeline.finish(&bundled, self.minify)?;
        let text = format!("{}{body}", license_header(self.library.catalog().sdk_version()));

        self.store(&id, &text).await;
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::FileBundler;
    use crate::test_support::write_fixture_library;
    use sdkpack_config::BuildConfig;
    use std::path::Path;

    async fn live(root: &Path, minify: bool) -> LiveStrategy {
        let library = SdkLibrary::open(root).await.unwrap();
        let pipeline = TransformPipeline::from_config(&BuildConfig::default()).unwrap();
        LiveStrategy::new(Arc::new(library), Arc::new(pipeline), Arc::new(FileBundler), minify)
    }

    #[tokio::test]
    async fn header_is_transformed_source() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture_library(dir.path());
        let strategy = live(dir.path(), false).await;

        let text = strategy.service_header("s3").await.unwrap().unwrap();
        assert!(text.contains("window.AWS.S3 = window.AWS.Service.defineService('s3');"));
        assert!(!text.contains("require("));
        assert!(!text.contains("module.exports"));
        assert!(!text.contains("Copyright"));
        assert!(!text.contains("customizations follow"));
    }

    #[tokio::test]
    async fn unknown_service_is_none() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture_library(dir.path());
        let strategy = live(dir.path(), false).await;

        assert!(strategy.service_header("doesnotexist").await.unwrap().is_none());
        assert!(strategy.service("s3", "1999-01-01").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn definition_fragment_registers_api() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture_library(dir.path());
        let strategy = live(dir.path(), false).await;

        let text = strategy.service("sts", "latest").await.unwrap().unwrap();
        assert!(text.starts_with(
            r#"window.AWS.Service.defineServiceApi(window.AWS.STS, "2011-06-15", {"#
        ));
        assert!(text.ends_with("});"));
    }

    #[tokio::test]
    async fn core_is_stamped_and_stripped() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture_library(dir.path());
        let strategy = live(dir.path(), false).await;

        let core = strategy.core().await.unwrap();
        assert!(core.starts_with("// AWS SDK for JavaScript v2.0.0\n"));
        assert!(!core.contains("runtime entry"));
        // Module plumbing survives in the core
        assert!(core.contains("var AWS = require('./core');"));
    }

    #[tokio::test]
    async fn writes_fragments_through_cache() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture_library(dir.path());
        let cache = FragmentCache::new(dir.path().join("cache"));
        let strategy = live(dir.path(), true).await.with_cache(cache.clone());
        assert!(strategy.writes_cache());

        let header = strategy.service_header("sqs").await.unwrap().unwrap();
        strategy.core().await.unwrap();

        assert_eq!(cache.read(&FragmentId::header("sqs"), true).await.unwrap(), header);
        assert!(cache.exists(&FragmentId::Core, true).await);
        assert!(!cache.exists(&FragmentId::header("sqs"), false).await);
    }

    #[tokio::test]
    async fn cached_fragment_wins_over_source() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture_library(dir.path());
        let cache = FragmentCache::new(dir.path().join("cache"));
        cache
            .write(&FragmentId::header("s3"), false, "cached header")
            .await
            .unwrap();

        let strategy = live(dir.path(), false).await.with_cache(cache);
        assert_eq!(
            strategy.service_header("s3").await.unwrap().as_deref(),
            Some("cached header")
        );
    }

    #[tokio::test]
    async fn unwritable_cache_still_serves() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture_library(dir.path());
        // A file where the cache root directory should be
        let blocked = dir.path().join("blocked");
        std::fs::write(&blocked, "not a directory").unwrap();

        let strategy = live(dir.path(), false).await.with_cache(FragmentCache::new(&blocked));
        assert!(strategy.service_header("sns").await.unwrap().is_some());
    }
}
