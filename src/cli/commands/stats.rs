//! Stats command - show cache size and usage

use crate::cache::{format_bytes, CacheSizeStatus, CacheStats, CodeCache};
use crate::cli::args::{FormatArgs, OutputFormat};
use crate::error::SandcacheResult;
use console::style;

/// Execute the stats command
pub async fn execute(args: FormatArgs, cache: &CodeCache) -> SandcacheResult<()> {
    let stats = cache.stats()?;

    match args.format {
        OutputFormat::Table => print_table(&stats),
        OutputFormat::Json => print_json(&stats)?,
        OutputFormat::Plain => print_plain(&stats),
    }

    Ok(())
}

fn print_table(stats: &CacheStats) {
    let status = match stats.status() {
        CacheSizeStatus::Ok => style("ok").green(),
        CacheSizeStatus::Warning => style("warning").yellow(),
        CacheSizeStatus::Exceeded => style("exceeded").red(),
    };

    println!("{:<10} {}", style("Root").bold(), stats.root.display());
    println!("{:<10} {}", style("Entries").bold(), stats.entry_count);
    println!(
        "{:<10} {} / {} ({:.1}%)",
        style("Size").bold(),
        format_bytes(stats.total_size_bytes),
        format_bytes(stats.ceiling_bytes),
        stats.usage_percent()
    );
    println!("{:<10} {}", style("Status").bold(), status);
}

fn print_json(stats: &CacheStats) -> SandcacheResult<()> {
    #[derive(serde::Serialize)]
    struct StatsJson<'a> {
        #[serde(flatten)]
        stats: &'a CacheStats,
        usage_percent: f64,
        status: CacheSizeStatus,
    }

    let json = StatsJson {
        stats,
        usage_percent: stats.usage_percent(),
        status: stats.status(),
    };

    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

fn print_plain(stats: &CacheStats) {
    println!(
        "{} {} {}",
        stats.entry_count, stats.total_size_bytes, stats.ceiling_bytes
    );
}
