//! Core bundler trait. Turns the runtime entry point into one script.

use async_trait::async_trait;
use std::path::Path;

use crate::error::Result;

/// Produces the service-independent runtime bundle from its entry point.
///
/// Bundling may block on an external tool; callers treat it as a single
/// await point with no cancellation.
#[async_trait]
pub trait CoreBundler: Send + Sync {
    fn name(&self) -> &str;

    async fn bundle(&self, entry: &Path) -> Result<String>;
}
