//! # sdkpack Core
//!
//! Domain types, traits, and error definitions for the sdkpack bundle
//! assembler. This crate has **no I/O of its own**. It defines the model
//! that the cache, builder, and delivery crates implement against.
//!
//! ## Design Philosophy
//!
//! Every replaceable collaborator is a trait here:
//! - [`BuildStrategy`]: where fragments come from (cache only, or live source)
//! - [`Minifier`]: the opaque text → text minification step
//! - [`CoreBundler`]: produces the service-independent runtime bundle
//!
//! Implementations live in `sdkpack-builder`. The service catalog is a plain
//! immutable value ([`ServiceCatalog`]) passed by reference, never a global.

pub mod error;
pub mod fragment;
pub mod catalog;
pub mod request;
pub mod strategy;
pub mod minifier;
pub mod bundler;

// Re-export key types at crate root for ergonomics
pub use error::{CacheError, Error, Result, SourceError, TransformError};
pub use fragment::{BuildSet, FragmentId};
pub use catalog::{ServiceCatalog, is_prerelease};
pub use request::{ALL_SERVICES, BuildRequest, LATEST, RequestOrigin, RequestSpec};
pub use strategy::BuildStrategy;
pub use minifier::{Minifier, MinifyOptions};
pub use bundler::CoreBundler;
