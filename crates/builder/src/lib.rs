//! Bundle building for sdkpack: fragment resolution, caching and assembly.
//!
//! The flow for one request:
//!
//! 1. **Parse** the request spec and sort its tokens ([`AssemblyEngine`])
//! 2. **Resolve** each header and definition fragment through the active
//!    [`BuildStrategy`](sdkpack_core::BuildStrategy), skipping fragments
//!    already emitted
//! 3. **Derive** fragments on a miss: read the source ([`SdkLibrary`]) and
//!    run it through the [`TransformPipeline`], caching the result
//! 4. **Compose** the core runtime and the fragments into one script

pub mod bundler;
pub mod definition;
pub mod engine;
pub mod minify;
pub mod source;
pub mod strategy;
pub mod transform;
pub mod warm;

#[cfg(test)]
pub(crate) mod test_support;

pub use bundler::{CommandBundler, FileBundler, bundler_from_config};
pub use definition::ApiDefinition;
pub use engine::{Assembly, AssemblyEngine, compose};
pub use minify::BasicMinifier;
pub use source::{SdkLibrary, SourceHandle};
pub use strategy::{
    CacheOnlyStrategy, LiveStrategy, cached_versions, license_header, newest_cached_version,
    strategy_from_config,
};
pub use transform::TransformPipeline;
pub use warm::{WarmReport, warm_libraries, warm_library};
