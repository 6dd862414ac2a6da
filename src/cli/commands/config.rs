//! Config command - show or edit configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::{Config, ConfigManager};
use crate::error::{SandcacheError, SandcacheResult};
use console::style;
use std::path::PathBuf;

/// Execute the config command
pub async fn execute(
    args: ConfigArgs,
    config: &Config,
    manager: &ConfigManager,
) -> SandcacheResult<()> {
    match args.action {
        None | Some(ConfigAction::Show) => show_config(config),
        Some(ConfigAction::Path) => show_path(manager),
        Some(ConfigAction::Init { force }) => init_config(manager, force).await?,
        Some(ConfigAction::Set { key, value }) => set_value(manager, &key, &value).await?,
    }

    Ok(())
}

fn show_config(config: &Config) {
    let toml =
        toml::to_string_pretty(config).unwrap_or_else(|_| "Error serializing config".to_string());
    println!("{}", toml);
}

fn show_path(manager: &ConfigManager) {
    println!("{}", manager.path().display());
}

async fn init_config(manager: &ConfigManager, force: bool) -> SandcacheResult<()> {
    let path = manager.path();

    if path.exists() && !force {
        println!(
            "{} Config already exists at {}",
            style("!").yellow(),
            path.display()
        );
        println!("  Use --force to overwrite");
        return Ok(());
    }

    manager.save(&Config::default()).await?;
    println!(
        "{} Configuration initialized at {}",
        style("✓").green(),
        path.display()
    );

    Ok(())
}

async fn set_value(manager: &ConfigManager, key: &str, value: &str) -> SandcacheResult<()> {
    // Edit the file as written, not the copy with command-line overrides applied
    let mut config = manager.load().await?;
    apply_value(&mut config, key, value)?;
    config.cache.validate()?;

    manager.save(&config).await?;
    println!("{} Set {} = {}", style("✓").green(), key, value);

    Ok(())
}

/// Apply a dot-separated key to the configuration
pub fn apply_value(config: &mut Config, key: &str, value: &str) -> SandcacheResult<()> {
    let parts: Vec<&str> = key.split('.').collect();

    match parts.as_slice() {
        ["general", "log_format"] => match value {
            "text" | "json" => config.general.log_format = value.to_string(),
            _ => return Err(invalid(key, "expected 'text' or 'json'")),
        },

        ["cache", "enabled"] => config.cache.enabled = parse_bool(key, value)?,
        ["cache", "root"] => {
            config.cache.root = if value.is_empty() {
                None
            } else {
                Some(PathBuf::from(value))
            }
        }
        ["cache", "max_size_mb"] => config.cache.max_size_mb = parse_num(key, value)?,
        ["cache", "ttl_secs"] => config.cache.ttl_secs = parse_num(key, value)?,
        ["cache", "evict_to_percent"] => config.cache.evict_to_percent = parse_num(key, value)?,

        _ => {
            return Err(SandcacheError::User(format!(
                "Unknown config key: {key}. Valid keys: {}",
                VALID_KEYS.join(", ")
            )))
        }
    }

    Ok(())
}

const VALID_KEYS: &[&str] = &[
    "general.log_format",
    "cache.enabled",
    "cache.root",
    "cache.max_size_mb",
    "cache.ttl_secs",
    "cache.evict_to_percent",
];

fn invalid(key: &str, reason: &str) -> SandcacheError {
    SandcacheError::ConfigValue {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_bool(key: &str, value: &str) -> SandcacheResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Ok(true),
        "false" | "no" | "0" | "off" => Ok(false),
        _ => Err(invalid(key, "expected a boolean (true/false)")),
    }
}

fn parse_num<T: std::str::FromStr>(key: &str, value: &str) -> SandcacheResult<T> {
    value
        .parse()
        .map_err(|_| invalid(key, &format!("'{value}' is not a valid number")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn apply_cache_values() {
        let mut config = Config::default();
        apply_value(&mut config, "cache.ttl_secs", "30").unwrap();
        apply_value(&mut config, "cache.enabled", "off").unwrap();
        apply_value(&mut config, "cache.root", "/var/cache/code").unwrap();

        assert_eq!(config.cache.ttl_secs, 30);
        assert!(!config.cache.enabled);
        assert_eq!(config.cache.root, Some(PathBuf::from("/var/cache/code")));

        apply_value(&mut config, "cache.root", "").unwrap();
        assert_eq!(config.cache.root, None);
    }

    #[test]
    fn apply_rejects_bad_input() {
        let mut config = Config::default();
        assert!(apply_value(&mut config, "cache.max_size_mb", "lots").is_err());
        assert!(apply_value(&mut config, "general.log_format", "xml").is_err());
        assert!(apply_value(&mut config, "vm.name", "x").is_err());
    }

    #[tokio::test]
    async fn set_value_persists() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_path(temp.path().join("config.toml"));

        set_value(&manager, "cache.max_size_mb", "64").await.unwrap();

        let loaded = manager.load().await.unwrap();
        assert_eq!(loaded.cache.max_size_mb, 64);
    }

    #[tokio::test]
    async fn set_value_rejects_invalid_percent() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_path(temp.path().join("config.toml"));

        assert!(set_value(&manager, "cache.evict_to_percent", "0").await.is_err());
        assert!(!manager.path().exists());
    }
}
