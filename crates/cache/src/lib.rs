//! Fragment cache for sdkpack.

pub mod file_cache;

pub use file_cache::FragmentCache;
