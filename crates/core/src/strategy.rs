//! Build strategy trait: where fragment text comes from.
//!
//! Two implementations exist in `sdkpack-builder`:
//! - cache-only: reads finished fragments and never touches source
//! - live: derives fragments from an SDK checkout, optionally caching them
//!
//! The assembly engine depends only on this trait.

use async_trait::async_trait;

use crate::catalog::ServiceCatalog;
use crate::error::Result;

/// The capability set the assembly engine drives.
///
/// `Ok(None)` means "module missing"; the engine decides whether that is
/// fatal. `Err` is reserved for failures of the environment.
#[async_trait]
pub trait BuildStrategy: Send + Sync {
    /// Strategy name for logs (e.g. "cache-only", "live").
    fn name(&self) -> &str;

    /// Services and versions this strategy knows about.
    fn catalog(&self) -> &ServiceCatalog;

    /// Whether this strategy produces minified fragments.
    fn minified(&self) -> bool;

    /// Whether fragments built by this strategy are persisted to a cache.
    fn writes_cache(&self) -> bool {
        false
    }

    /// The shared header fragment of a service.
    async fn service_header(&self, service: &str) -> Result<Option<String>>;

    /// The definition fragment of one concrete API version.
    async fn service(&self, service: &str, version: &str) -> Result<Option<String>>;

    /// The mandatory core runtime fragment. Failure is always fatal.
    async fn core(&self) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    /// A fixed in-memory strategy for trait-level tests.
    struct FixedStrategy {
        catalog: ServiceCatalog,
    }

    #[async_trait]
    impl BuildStrategy for FixedStrategy {
        fn name(&self) -> &str {
            "fixed"
        }
        fn catalog(&self) -> &ServiceCatalog {
            &self.catalog
        }
        fn minified(&self) -> bool {
            false
        }
        async fn service_header(&self, service: &str) -> Result<Option<String>> {
            Ok(self.catalog.contains(service).then(|| format!("// {service}")))
        }
        async fn service(&self, service: &str, version: &str) -> Result<Option<String>> {
            Ok(self
                .catalog
                .resolve_version(service, version)
                .map(|v| format!("// {service} {v}")))
        }
        async fn core(&self) -> Result<String> {
            Err(Error::CoreNotFound("fixed".into()))
        }
    }

    #[tokio::test]
    async fn strategy_is_object_safe() {
        let mut catalog = ServiceCatalog::new();
        catalog.insert_version("s3", "2006-03-01");
        let strategy: Box<dyn BuildStrategy> = Box::new(FixedStrategy { catalog });

        assert!(!strategy.writes_cache());
        assert_eq!(
            strategy.service_header("s3").await.unwrap().as_deref(),
            Some("// s3")
        );
        assert!(strategy.service("s3", "1999-01-01").await.unwrap().is_none());
        assert!(strategy.core().await.is_err());
    }
}
