//! sandcache - Content-addressed code cache
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use sandcache::cache::CodeCache;
use sandcache::cli::commands;
use sandcache::cli::{Cli, Commands, LogFormat};
use sandcache::config::{Config, ConfigManager};
use sandcache::error::{SandcacheError, SandcacheResult};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8, format: LogFormat) {
    // 0 = warn, 1 = info, 2+ = debug
    let filter = match verbose {
        0 => EnvFilter::new("sandcache=warn"),
        1 => EnvFilter::new("sandcache=info"),
        _ => EnvFilter::new("sandcache=debug"),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.without_time().init(),
    }
}

/// Apply command-line overrides on top of the loaded configuration
fn apply_overrides(cli: &Cli, config: &mut Config) -> SandcacheResult<()> {
    if let Some(ref root) = cli.root {
        config.cache.root = Some(root.clone());
    }
    if let Some(max_size_mb) = cli.max_size_mb {
        config.cache.max_size_mb = max_size_mb;
    }
    if let Some(ttl_secs) = cli.ttl_secs {
        config.cache.ttl_secs = ttl_secs;
    }
    config.cache.validate()
}

async fn run() -> SandcacheResult<()> {
    let cli = Cli::parse();

    let config_manager = if let Some(ref path) = cli.config {
        ConfigManager::with_path(path.clone())
    } else {
        ConfigManager::new()
    };
    let mut config = config_manager.load().await?;

    let log_format = cli
        .log_format
        .unwrap_or_else(|| LogFormat::from_config(&config.general.log_format));
    init_logging(cli.verbose, log_format);
    debug!("Using config file {}", config_manager.path().display());

    apply_overrides(&cli, &mut config)?;

    // Key and config commands never touch the cache root
    match cli.command {
        Commands::Key(args) => commands::key(args).await,
        Commands::Config(args) => commands::config(args, &config, &config_manager).await,
        Commands::Put(args) => commands::put(args, &*open_cache(&config)?).await,
        Commands::Lookup(args) => commands::lookup(args, &*open_cache(&config)?).await,
        Commands::Stats(args) => commands::stats(args, &*open_cache(&config)?).await,
        Commands::List(args) => commands::list(args, &*open_cache(&config)?).await,
        Commands::Evict(args) => commands::evict(args, &*open_cache(&config)?).await,
        Commands::Clear(args) => commands::clear(args, &*open_cache(&config)?).await,
    }
}

/// Build the cache from configuration, failing when it is disabled
fn open_cache(config: &Config) -> SandcacheResult<Arc<CodeCache>> {
    CodeCache::from_config(&config.cache)?.ok_or(SandcacheError::CacheDisabled)
}
