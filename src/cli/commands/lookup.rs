//! Lookup command - print the path of already cached code

use crate::cache::CodeCache;
use crate::cli::args::CodeArgs;
use crate::cli::commands::input::read_code;
use crate::error::{SandcacheError, SandcacheResult};

/// Execute the lookup command
pub async fn execute(args: CodeArgs, cache: &CodeCache) -> SandcacheResult<()> {
    let code = read_code(&args).await?;
    let key = cache.derive(&code, &args.language, &args.suffix);

    match cache.lookup(&key, &args.suffix)? {
        Some(path) => {
            println!("{}", path.display());
            Ok(())
        }
        None => Err(SandcacheError::NotCached {
            language: args.language,
        }),
    }
}
