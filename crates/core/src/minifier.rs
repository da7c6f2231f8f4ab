//! Minifier trait: the opaque text → text minification step.

use serde::{Deserialize, Serialize};

use crate::error::TransformError;

/// Caller-supplied minifier options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinifyOptions {
    /// Apply more aggressive whitespace compression.
    #[serde(default)]
    pub compress: bool,
}

/// A pure, deterministic minifier: the same input and options must always
/// yield byte-identical output, since minified fragments are cached.
pub trait Minifier: Send + Sync {
    fn name(&self) -> &str;

    fn minify(&self, code: &str, options: &MinifyOptions) -> Result<String, TransformError>;
}
