//! Error types for the sdkpack domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context (cache, source, transform) has its own error enum
//! that folds into the top-level [`Error`].

use std::path::PathBuf;
use thiserror::Error;

/// The top-level error type for all sdkpack operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Request errors ---
    #[error("Incorrectly formatted service names: {0}")]
    InvalidServiceSpec(String),

    #[error("Missing modules: {}", .0.join(", "))]
    MissingModules(Vec<String>),

    // --- Core runtime errors ---
    #[error("Core runtime fragment not found: {0}")]
    CoreNotFound(String),

    #[error("Core bundle failed: {0}")]
    Bundle(String),

    #[error("No cached SDK version under {0}")]
    NoCachedVersion(String),

    // --- Bounded contexts ---
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether this error must abort an assembly even when it happens while
    /// resolving a single service token.
    ///
    /// Storage and source read failures on one fragment are downgraded to a
    /// missing module; core, bundling and transform failures never are.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Cache(_) | Self::Source(_))
    }

    /// Whether this error was caused by the caller's request rather than by
    /// the build environment.
    pub fn is_request_error(&self) -> bool {
        matches!(self, Self::InvalidServiceSpec(_) | Self::MissingModules(_))
    }
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Error)]
pub enum CacheError {
    /// Internal signal: no entry for the key. Consumed by build strategies.
    #[error("Cache entry not found: {0}")]
    NotFound(String),

    #[error("Cache storage failed at {path}: {reason}")]
    Storage { path: PathBuf, reason: String },
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Service not found in catalog: {0}")]
    NotFound(String),

    #[error("Failed to read {path}: {reason}")]
    Read { path: PathBuf, reason: String },

    #[error("Invalid API definition at {path}: {reason}")]
    InvalidDefinition { path: PathBuf, reason: String },
}

#[derive(Debug, Clone, Error)]
pub enum TransformError {
    #[error("Minifier {minifier} failed: {reason}")]
    Minify { minifier: String, reason: String },

    #[error("Invalid transform pattern: {0}")]
    Pattern(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_modules_lists_every_name() {
        let err = Error::MissingModules(vec!["doesnotexist".into(), "s3-1999-01-01".into()]);
        assert_eq!(
            err.to_string(),
            "Missing modules: doesnotexist, s3-1999-01-01"
        );
    }

    #[test]
    fn storage_errors_are_recoverable_per_token() {
        let err = Error::Cache(CacheError::Storage {
            path: PathBuf::from("/tmp/x.js"),
            reason: "disk full".into(),
        });
        assert!(!err.is_fatal());
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn core_and_transform_errors_are_fatal() {
        assert!(Error::CoreNotFound("_core.js".into()).is_fatal());
        assert!(
            Error::Transform(TransformError::Pattern("(".into())).is_fatal()
        );
    }

    #[test]
    fn request_errors_are_classified() {
        assert!(Error::InvalidServiceSpec("s3;rm".into()).is_request_error());
        assert!(!Error::Bundle("exit 1".into()).is_request_error());
    }
}
