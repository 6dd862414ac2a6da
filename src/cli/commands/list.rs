//! List command - show cached entries

use crate::cache::{format_bytes, CodeCache, EntryInfo};
use crate::cli::args::{FormatArgs, OutputFormat};
use crate::error::SandcacheResult;
use chrono::{DateTime, Utc};
use console::style;

/// Execute the list command
pub async fn execute(args: FormatArgs, cache: &CodeCache) -> SandcacheResult<()> {
    let entries = cache.entries()?;

    if entries.is_empty() {
        match args.format {
            OutputFormat::Json => println!("[]"),
            OutputFormat::Plain => {}
            OutputFormat::Table => println!("No cached entries."),
        }
        return Ok(());
    }

    match args.format {
        OutputFormat::Table => print_table(&entries),
        OutputFormat::Json => print_json(&entries)?,
        OutputFormat::Plain => print_plain(&entries),
    }

    Ok(())
}

fn last_access(entry: &EntryInfo) -> DateTime<Utc> {
    DateTime::<Utc>::from(entry.last_access)
}

fn print_table(entries: &[EntryInfo]) {
    println!(
        "{:<72} {:<10} {:<20}",
        style("ENTRY").bold(),
        style("SIZE").bold(),
        style("LAST ACCESS").bold()
    );
    println!("{}", "-".repeat(102));

    for entry in entries {
        println!(
            "{:<72} {:<10} {:<20}",
            entry.name,
            format_bytes(entry.size_bytes),
            last_access(entry).format("%Y-%m-%d %H:%M:%S")
        );
    }

    let total: u64 = entries.iter().map(|e| e.size_bytes).sum();
    println!();
    println!("{} entries, {}", entries.len(), format_bytes(total));
}

fn print_json(entries: &[EntryInfo]) -> SandcacheResult<()> {
    #[derive(serde::Serialize)]
    struct EntryJson {
        name: String,
        path: String,
        size_bytes: u64,
        last_access: String,
    }

    let json_entries: Vec<EntryJson> = entries
        .iter()
        .map(|e| EntryJson {
            name: e.name.clone(),
            path: e.path.display().to_string(),
            size_bytes: e.size_bytes,
            last_access: last_access(e).to_rfc3339(),
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&json_entries)?);
    Ok(())
}

fn print_plain(entries: &[EntryInfo]) {
    for entry in entries {
        println!("{}", entry.path.display());
    }
}
