pub mod build;
pub mod catalog;
pub mod doctor;
pub mod serve;
pub mod warm;

use clap::Args;
use sdkpack_config::AppConfig;
use std::path::{Path, PathBuf};

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Options shared by `build` and `catalog`. Flags override the config file
/// and the environment.
#[derive(Args, Debug, Default)]
pub struct BuildArgs {
    /// Services to include, e.g. `s3,dynamodb-2012-08-10` (default: the
    /// configured default list)
    pub services: Option<String>,

    /// Minify instead of stripping comments
    #[arg(short, long)]
    pub minify: bool,

    /// Read and write the fragment cache
    #[arg(long, conflicts_with = "no_cache")]
    pub cache: bool,

    /// Never touch the fragment cache
    #[arg(long)]
    pub no_cache: bool,

    /// SDK library checkout to build from
    #[arg(long)]
    pub lib_path: Option<PathBuf>,

    /// Parent directory of the per-version cache roots
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,

    /// Build only from the cache of this SDK version (e.g. `v2.0.0`)
    #[arg(long)]
    pub sdk_version: Option<String>,
}

impl BuildArgs {
    pub fn apply(&self, config: &mut AppConfig) {
        let build = &mut config.build;
        if let Some(services) = &self.services {
            build.services = Some(services.clone());
        }
        if self.minify {
            build.minify = true;
        }
        if self.cache {
            build.cache = true;
        }
        if self.no_cache {
            build.cache = false;
        }
        if let Some(path) = &self.lib_path {
            build.lib_path = Some(path.clone());
        }
        if let Some(dir) = &self.cache_dir {
            build.cache_dir = dir.clone();
        }
    }
}

/// Load the config from `path` or the default location.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let config = match path {
        Some(path) => AppConfig::load_with_env(path),
        None => AppConfig::load(),
    };
    config.map_err(|e| format!("Failed to load config: {e}").into())
}
