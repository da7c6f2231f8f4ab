//! sdkpack CLI, the main entry point.
//!
//! Commands:
//! - `build`    Assemble a bundle and write it to stdout (the default)
//! - `serve`    Start the HTTP bundle server
//! - `warm`     Pre-build every fragment of one or more SDK checkouts
//! - `catalog`  List the services and versions a build can use
//! - `doctor`   Diagnose configuration, library and cache

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;

use commands::BuildArgs;

#[derive(Parser)]
#[command(
    name = "sdkpack",
    about = "sdkpack: browser-ready SDK bundles from cached fragments",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    build: BuildArgs,

    /// Configuration file (default: ~/.sdkpack/config.toml)
    #[arg(long, global = true, env = "SDKPACK_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Assemble a bundle and write it to stdout
    Build(BuildArgs),

    /// Start the HTTP bundle server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Pre-build every fragment of SDK library checkouts into the cache
    Warm {
        /// SDK library checkouts to warm
        #[arg(required = true)]
        lib_paths: Vec<PathBuf>,

        /// Parent directory of the per-version cache roots
        #[arg(long)]
        cache_dir: Option<PathBuf>,

        /// Libraries warmed at the same time
        #[arg(short = 'j', long)]
        concurrency: Option<usize>,
    },

    /// List the services and versions available to a build
    Catalog(BuildArgs),

    /// Diagnose configuration, library and cache
    Doctor,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries only the bundle
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = cli.config.as_deref();
    let result = match cli.command.unwrap_or(Commands::Build(cli.build)) {
        Commands::Build(args) => commands::build::run(config, args).await,
        Commands::Serve { port } => commands::serve::run(config, port).await,
        Commands::Warm {
            lib_paths,
            cache_dir,
            concurrency,
        } => commands::warm::run(config, lib_paths, cache_dir, concurrency).await,
        Commands::Catalog(args) => commands::catalog::run(config, args).await,
        Commands::Doctor => commands::doctor::run(config).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_flag_works_with_every_subcommand() {
        for args in [
            vec!["sdkpack", "--config", "c.toml", "build", "s3"],
            vec!["sdkpack", "build", "s3", "--config", "c.toml"],
            vec!["sdkpack", "--config", "c.toml", "warm", "/sdk"],
            vec!["sdkpack", "--config", "c.toml", "serve", "-p", "9000"],
            vec!["sdkpack", "--config", "c.toml", "catalog"],
            vec!["sdkpack", "-v", "--config", "c.toml", "doctor"],
        ] {
            let cli = Cli::try_parse_from(args.iter().copied()).unwrap();
            assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("c.toml")));
            assert!(cli.command.is_some());
        }
    }

    #[test]
    fn bare_services_build_without_subcommand() {
        let cli = Cli::try_parse_from(["sdkpack", "--config", "c.toml", "s3,sqs", "-m"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.build.services.as_deref(), Some("s3,sqs"));
        assert!(cli.build.minify);
    }

    #[test]
    fn subcommand_arguments_stay_with_the_subcommand() {
        let cli = Cli::try_parse_from(["sdkpack", "build", "s3,doesnotexist", "--lib-path", "/x"]).unwrap();
        match cli.command {
            Some(Commands::Build(args)) => {
                assert_eq!(args.services.as_deref(), Some("s3,doesnotexist"));
                assert_eq!(args.lib_path, Some(PathBuf::from("/x")));
            }
            _ => panic!("expected the build subcommand"),
        }
        assert!(cli.build.services.is_none());
    }
}
