//! Reading code from a file or stdin

use crate::cli::args::CodeArgs;
use crate::error::{SandcacheError, SandcacheResult};
use tokio::fs;
use tokio::io::{self, AsyncReadExt};

/// Read the code named by the arguments
pub async fn read_code(args: &CodeArgs) -> SandcacheResult<String> {
    match &args.file {
        Some(path) => fs::read_to_string(path)
            .await
            .map_err(|e| SandcacheError::io(format!("reading code from {}", path.display()), e)),
        None => {
            let mut code = String::new();
            io::stdin()
                .read_to_string(&mut code)
                .await
                .map_err(|e| SandcacheError::io("reading code from stdin", e))?;
            Ok(code)
        }
    }
}
