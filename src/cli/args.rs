//! CLI argument definitions using clap derive

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// sandcache - Content-addressed code cache
///
/// Maps source code to a reusable file on disk so sandboxes can execute
/// the same program repeatedly without rewriting it.
#[derive(Parser, Debug)]
#[command(name = "sandcache")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "SANDCACHE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log output format (defaults to general.log_format)
    #[arg(long, global = true, value_enum)]
    pub log_format: Option<LogFormat>,

    /// Cache root directory (overrides cache.root)
    #[arg(long, global = true, env = "SANDCACHE_ROOT")]
    pub root: Option<PathBuf>,

    /// Maximum cache size in MB (overrides cache.max_size_mb)
    #[arg(long, global = true)]
    pub max_size_mb: Option<u64>,

    /// Entry time-to-live in seconds (overrides cache.ttl_secs)
    #[arg(long, global = true)]
    pub ttl_secs: Option<u64>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Cache code and print the path of its file
    Put(CodeArgs),

    /// Print the path of cached code, failing if it is not cached
    Lookup(CodeArgs),

    /// Print the cache key for code without touching the cache
    Key(CodeArgs),

    /// Show cache size and usage
    Stats(FormatArgs),

    /// List cached entries, least recently used first
    List(FormatArgs),

    /// Evict least recently used entries if over the size limit
    Evict(FormatArgs),

    /// Remove every cached entry
    Clear(ClearArgs),

    /// Show or edit configuration
    Config(ConfigArgs),
}

/// Code to cache or look up
#[derive(Args, Debug)]
pub struct CodeArgs {
    /// Language tag (e.g., python, cpp)
    pub language: String,

    /// File suffix for the cached file (e.g., .py)
    #[arg(short, long, default_value = "")]
    pub suffix: String,

    /// Read code from this file instead of stdin
    #[arg(short, long)]
    pub file: Option<PathBuf>,
}

/// Output format selection
#[derive(Args, Debug)]
pub struct FormatArgs {
    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the clear command
#[derive(Args, Debug)]
pub struct ClearArgs {
    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., cache.ttl_secs)
        key: String,
        /// Value to set
        value: String,
    },
}

/// Output format for listing commands
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one per line)
    Plain,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    Text,
    /// One JSON object per line
    Json,
}

impl LogFormat {
    /// Parse the `general.log_format` config value
    pub fn from_config(value: &str) -> Self {
        if value.eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Text
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_debug_assert() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_put_with_suffix() {
        let cli = Cli::try_parse_from(["sandcache", "put", "python", "--suffix", ".py"]).unwrap();
        match cli.command {
            Commands::Put(args) => {
                assert_eq!(args.language, "python");
                assert_eq!(args.suffix, ".py");
                assert!(args.file.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parse_global_overrides() {
        let cli = Cli::try_parse_from([
            "sandcache",
            "stats",
            "--root",
            "/tmp/x",
            "--ttl-secs",
            "5",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.root, Some(PathBuf::from("/tmp/x")));
        assert_eq!(cli.ttl_secs, Some(5));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn log_format_from_config() {
        assert_eq!(LogFormat::from_config("json"), LogFormat::Json);
        assert_eq!(LogFormat::from_config("text"), LogFormat::Text);
        assert_eq!(LogFormat::from_config("other"), LogFormat::Text);
    }
}
