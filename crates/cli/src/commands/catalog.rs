//! `sdkpack catalog`: list what a build with these options can include.

use sdkpack_builder::strategy_from_config;
use sdkpack_core::is_prerelease;
use std::path::Path;

use super::{BuildArgs, CmdResult, load_config};

pub async fn run(config_path: Option<&Path>, args: BuildArgs) -> CmdResult {
    let mut config = load_config(config_path)?;
    args.apply(&mut config);

    let strategy =
        strategy_from_config(&config.build, config.build.minify, args.sdk_version.as_deref()).await?;
    let catalog = strategy.catalog();

    println!(
        "SDK {} ({}, {} services)",
        catalog.sdk_version().unwrap_or("unknown"),
        strategy.name(),
        catalog.len()
    );
    for service in catalog.services() {
        let latest = catalog.latest(service);
        let versions: Vec<String> = catalog
            .versions(service)
            .into_iter()
            .flatten()
            .map(|v| {
                let mut label = v.to_string();
                if is_prerelease(v) {
                    label.push('*');
                }
                if Some(v) == latest {
                    label.push_str(" (latest)");
                }
                label
            })
            .collect();
        println!("  {service:<24} {}", versions.join(", "));
    }

    Ok(())
}
