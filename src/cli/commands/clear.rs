//! Clear command - remove every cached entry

use crate::cache::{format_bytes, CodeCache};
use crate::cli::args::ClearArgs;
use crate::error::SandcacheResult;
use console::style;
use std::io::{self, Write};

/// Execute the clear command
pub async fn execute(args: ClearArgs, cache: &CodeCache) -> SandcacheResult<()> {
    let stats = cache.stats()?;

    if stats.entry_count == 0 {
        println!("No cached entries to clear.");
        return Ok(());
    }

    println!(
        "This will remove {} cached entr{} ({}) from {}",
        stats.entry_count,
        if stats.entry_count == 1 { "y" } else { "ies" },
        format_bytes(stats.total_size_bytes),
        stats.root.display()
    );

    if !args.yes {
        print!("Are you sure? [y/N] ");
        let _ = io::stdout().flush();

        let mut input = String::new();
        if io::stdin().read_line(&mut input).is_err() {
            println!("Failed to read input, aborting.");
            return Ok(());
        }

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return Ok(());
        }
    }

    cache.clear()?;
    println!(
        "{} cleared {} entr{}",
        style("✓").green(),
        stats.entry_count,
        if stats.entry_count == 1 { "y" } else { "ies" }
    );

    Ok(())
}
