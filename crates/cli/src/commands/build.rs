//! `sdkpack build`: assemble one bundle to stdout.

use sdkpack_builder::{AssemblyEngine, strategy_from_config};
use std::io::Write;
use std::path::Path;
use tracing::debug;

use super::{BuildArgs, CmdResult, load_config};

pub async fn run(config_path: Option<&Path>, args: BuildArgs) -> CmdResult {
    let mut config = load_config(config_path)?;
    args.apply(&mut config);

    let strategy =
        strategy_from_config(&config.build, config.build.minify, args.sdk_version.as_deref()).await?;
    let engine = AssemblyEngine::from_config(strategy, &config.build);
    let bundle = engine.build(config.build.services.as_deref()).await?;

    debug!(bytes = bundle.len(), "Writing bundle to stdout");
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(bundle.as_bytes())?;
    stdout.flush()?;
    Ok(())
}
