//! `sdkpack serve`: start the HTTP bundle server.

use std::path::Path;

use super::{CmdResult, load_config};

pub async fn run(config_path: Option<&Path>, port_override: Option<u16>) -> CmdResult {
    let mut config = load_config(config_path)?;

    if let Some(port) = port_override {
        config.server.port = port;
    }

    println!("sdkpack server");
    println!("   Listening:  {}:{}", config.server.host, config.server.port);
    println!("   Cache dir:  {}", config.server.cache_dir.display());
    if let Some(master) = &config.server.master_lib_path {
        println!("   Latest:     {}", master.display());
    }

    sdkpack_gateway::start(config).await?;

    Ok(())
}
