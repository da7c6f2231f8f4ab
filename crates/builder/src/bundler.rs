//! Core runtime bundlers.

use async_trait::async_trait;
use sdkpack_config::BuildConfig;
use sdkpack_core::bundler::CoreBundler;
use sdkpack_core::error::{Error, Result};
use std::path::Path;
use std::sync::Arc;
use tokio::process::Command;
use tracing::{debug, warn};

/// Reads an already-bundled entry file verbatim.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileBundler;

#[async_trait]
impl CoreBundler for FileBundler {
    fn name(&self) -> &str {
        "file"
    }

    async fn bundle(&self, entry: &Path) -> Result<String> {
        tokio::fs::read_to_string(entry)
            .await
            .map_err(|e| Error::Bundle(format!("{}: {e}", entry.display())))
    }
}

/// Runs an external bundler and captures its stdout.
///
/// The entry path is appended as the last argument, e.g.
/// `["browserify", "--standalone", "AWS"]` runs
/// `browserify --standalone AWS <entry>`.
#[derive(Debug, Clone)]
pub struct CommandBundler {
    program: String,
    args: Vec<String>,
}

impl CommandBundler {
    /// `None` for an empty argv.
    pub fn new(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }
}

#[async_trait]
impl CoreBundler for CommandBundler {
    fn name(&self) -> &str {
        &self.program
    }

    async fn bundle(&self, entry: &Path) -> Result<String> {
        debug!(program = %self.program, entry = %entry.display(), "Running core bundler");

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(entry)
            .output()
            .await
            .map_err(|e| Error::Bundle(format!("failed to run {}: {e}", self.program)))?;

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(program = %self.program, exit_code = code, "Core bundler failed");
            return Err(Error::Bundle(format!(
                "{} exited with code {code}: {}",
                self.program,
                stderr.trim()
            )));
        }

        String::from_utf8(output.stdout)
            .map_err(|_| Error::Bundle(format!("{} produced non UTF-8 output", self.program)))
    }
}

/// The configured bundler: a command when `bundler_command` is set, else
/// [`FileBundler`].
pub fn bundler_from_config(config: &BuildConfig) -> Arc<dyn CoreBundler> {
    match CommandBundler::new(&config.bundler_command) {
        Some(bundler) => Arc::new(bundler),
        None => Arc::new(FileBundler),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn file_bundler_reads_entry() {
        let dir = tempfile::tempdir().unwrap();
        let entry = dir.path().join("browser.js");
        std::fs::write(&entry, "window.AWS = {};").unwrap();

        assert_eq!(FileBundler.bundle(&entry).await.unwrap(), "window.AWS = {};");
    }

    #[tokio::test]
    async fn file_bundler_missing_entry_is_bundle_error() {
        let result = FileBundler.bundle(Path::new("/nonexistent/browser.js")).await;
        assert!(matches!(result, Err(Error::Bundle(_))));
    }

    #[test]
    fn empty_command_falls_back_to_file() {
        let config = BuildConfig::default();
        assert_eq!(bundler_from_config(&config).name(), "file");

        let config = BuildConfig {
            bundler_command: vec!["browserify".into(), "-s".into(), "AWS".into()],
            ..Default::default()
        };
        assert_eq!(bundler_from_config(&config).name(), "browserify");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn command_bundler_captures_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let entry = dir.path().join("browser.js");
        std::fs::write(&entry, "var core = 1;").unwrap();

        let bundler = CommandBundler::new(&["cat".to_string()]).unwrap();
        assert_eq!(bundler.bundle(&entry).await.unwrap(), "var core = 1;");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn command_bundler_failure_is_bundle_error() {
        let bundler = CommandBundler::new(&["cat".to_string()]).unwrap();
        let result = bundler.bundle(Path::new("/nonexistent/browser.js")).await;
        assert!(matches!(result, Err(Error::Bundle(msg)) if msg.contains("exited with code")));
    }
}
