//! Key command - print the cache key for code

use crate::cache::key::derive;
use crate::cli::args::CodeArgs;
use crate::cli::commands::input::read_code;
use crate::error::SandcacheResult;

/// Execute the key command
pub async fn execute(args: CodeArgs) -> SandcacheResult<()> {
    let code = read_code(&args).await?;
    println!("{}", derive(&code, &args.language, &args.suffix));
    Ok(())
}
