//! Put command - cache code and print its path

use crate::cache::CodeCache;
use crate::cli::args::CodeArgs;
use crate::cli::commands::input::read_code;
use crate::error::SandcacheResult;
use console::style;

/// Execute the put command
pub async fn execute(args: CodeArgs, cache: &CodeCache) -> SandcacheResult<()> {
    let code = read_code(&args).await?;
    let (path, was_hit) = cache.get_or_create(&code, &args.language, &args.suffix)?;

    let status = if was_hit {
        style("hit").green()
    } else {
        style("miss").yellow()
    };

    eprintln!("{} {}", style("cache").dim(), status);
    println!("{}", path.display());
    Ok(())
}
