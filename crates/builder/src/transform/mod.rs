//! Transform pipeline: raw service source → final fragment text.
//!
//! Steps, in order:
//!
//! 1. Blank out module import lines (`var x = require(...)`) and module
//!    export lines (`module.exports = ...`); they are no-ops in the bundle
//! 2. Rewrite bare references to the global runtime binding (`AWS.`) to the
//!    bundle-qualified form (`window.AWS.`)
//! 3. Minify, or strip comments (including the Amazon copyright block)
//!
//! # Determinism
//!
//! The pipeline is a pure function of its input and the minify flag. Cached
//! fragments depend on this: two processes deriving the same fragment must
//! write the same bytes.

pub mod strip;

use regex_lite::{Captures, Regex};
use sdkpack_config::BuildConfig;
use sdkpack_core::error::TransformError;
use sdkpack_core::minifier::{Minifier, MinifyOptions};
use std::sync::Arc;

use crate::minify::BasicMinifier;
use strip::{split_lines, strip_comment_lines};

const IMPORT_LINE: &str = r"^var\s*.*\s*=\s*require\s*\(.+\).*";
const EXPORT_LINE: &str = r"^module\.exports\s*=.*";
const COPYRIGHT_BLOCK: &str = r"(?s)/\*\*.+?Copyright\s+[^\n]+?Amazon.+?\*/";

/// The configured transform. Cheap to share behind an `Arc`.
pub struct TransformPipeline {
    import_line: Regex,
    export_line: Regex,
    global_ref: Regex,
    copyright: Regex,
    qualified_binding: String,
    minifier: Arc<dyn Minifier>,
    minify_options: MinifyOptions,
}

impl TransformPipeline {
    pub fn new(
        global_binding: &str,
        qualified_binding: impl Into<String>,
        minifier: Arc<dyn Minifier>,
        minify_options: MinifyOptions,
    ) -> Result<Self, TransformError> {
        // A reference is bare when it is not itself a property access or the
        // tail of a longer identifier.
        let global_ref = format!(r"(?m)(^|[^.\w$]){}\.", regex_lite::escape(global_binding));

        Ok(Self {
            import_line: compile(IMPORT_LINE)?,
            export_line: compile(EXPORT_LINE)?,
            global_ref: compile(&global_ref)?,
            copyright: compile(COPYRIGHT_BLOCK)?,
            qualified_binding: qualified_binding.into(),
            minifier,
            minify_options,
        })
    }

    /// Pipeline with the configured bindings and the built-in minifier.
    pub fn from_config(config: &BuildConfig) -> Result<Self, TransformError> {
        Self::new(
            &config.global_binding,
            config.qualified_binding.clone(),
            Arc::new(BasicMinifier),
            config.minify_options.clone(),
        )
    }

    /// The form references are rewritten to, e.g. `window.AWS`.
    pub fn qualified_binding(&self) -> &str {
        &self.qualified_binding
    }

    pub fn minifier(&self) -> &dyn Minifier {
        self.minifier.as_ref()
    }

    /// Run all three steps over a service source.
    pub fn transform(&self, raw: &str, minify: bool) -> Result<String, TransformError> {
        let code = self.strip_module_lines(raw);
        let code = self.qualify_globals(&code);
        self.finish(&code, minify)
    }

    /// Step 3 alone. Used for the core runtime, whose module plumbing must
    /// survive.
    pub fn finish(&self, code: &str, minify: bool) -> Result<String, TransformError> {
        if minify {
            self.minifier.minify(code, &self.minify_options)
        } else {
            Ok(self.strip_comments(code))
        }
    }

    /// Step 1. Matching lines become empty so line structure is preserved.
    pub fn strip_module_lines(&self, code: &str) -> String {
        split_lines(code)
            .map(|line| {
                if self.import_line.is_match(line) || self.export_line.is_match(line) {
                    ""
                } else {
                    line
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Step 2.
    pub fn qualify_globals(&self, code: &str) -> String {
        self.global_ref
            .replace_all(code, |caps: &Captures| {
                format!("{}{}.", &caps[1], self.qualified_binding)
            })
            .into_owned()
    }

    /// Non-minified step 3.
    pub fn strip_comments(&self, code: &str) -> String {
        let stripped = strip_comment_lines(code);
        self.copyright.replace_all(&stripped, "").into_owned()
    }
}

fn compile(pattern: &str) -> Result<Regex, TransformError> {
    Regex::new(pattern).map_err(|e| TransformError::Pattern(format!("{pattern}: {e}")))
}
