//! Evict command - run an eviction pass

use crate::cache::{format_bytes, CodeCache, EvictionReport};
use crate::cli::args::{FormatArgs, OutputFormat};
use crate::error::SandcacheResult;
use console::style;

/// Execute the evict command
pub async fn execute(args: FormatArgs, cache: &CodeCache) -> SandcacheResult<()> {
    let report = cache.evict_if_over_limit();

    match args.format {
        OutputFormat::Table => print!("{}", summary(&report, cache.settings().max_size_bytes)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Plain => println!("{} {}", report.removed, report.freed_bytes),
    }

    Ok(())
}

fn summary(report: &EvictionReport, limit: u64) -> String {
    let mut out = if report.evicted() {
        format!(
            "{} evicted {} entr{} ({} freed, {} remaining)\n",
            style("✓").green(),
            report.removed,
            if report.removed == 1 { "y" } else { "ies" },
            format_bytes(report.freed_bytes),
            format_bytes(report.size_after)
        )
    } else if report.size_after > limit {
        format!(
            "{} Cache is still over its limit ({} of {}), nothing evicted.\n",
            style("!").red(),
            format_bytes(report.size_after),
            format_bytes(limit)
        )
    } else {
        format!(
            "Cache is within its limit ({} of {}), nothing evicted.\n",
            format_bytes(report.size_after),
            format_bytes(limit)
        )
    };

    if report.skipped > 0 || report.failed > 0 {
        out.push_str(&format!(
            "  {} {} in use, {} failed\n",
            style("•").yellow(),
            report.skipped,
            report.failed
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_within_limit() {
        let report = EvictionReport {
            scanned: 2,
            size_before: 500,
            size_after: 500,
            ..Default::default()
        };
        let out = summary(&report, 1000);
        assert!(out.contains("within its limit"));
        assert!(!out.contains("in use"));
    }

    #[test]
    fn summary_over_limit_when_nothing_could_be_removed() {
        let report = EvictionReport {
            scanned: 3,
            skipped: 2,
            failed: 1,
            size_before: 1500,
            size_after: 1500,
            ..Default::default()
        };
        let out = summary(&report, 1000);
        assert!(out.contains("still over its limit"));
        assert!(!out.contains("within"));
        assert!(out.contains("2 in use, 1 failed"));
    }

    #[test]
    fn summary_after_eviction() {
        let report = EvictionReport {
            scanned: 5,
            removed: 2,
            failed: 1,
            size_before: 1250,
            freed_bytes: 500,
            size_after: 750,
            ..Default::default()
        };
        let out = summary(&report, 1000);
        assert!(out.contains("evicted 2 entries"));
        assert!(out.contains("0 in use, 1 failed"));
    }
}
