//! CLI command implementations

pub mod clear;
pub mod config;
pub mod evict;
pub mod input;
pub mod key;
pub mod list;
pub mod lookup;
pub mod put;
pub mod stats;

pub use clear::execute as clear;
pub use config::execute as config;
pub use evict::execute as evict;
pub use key::execute as key;
pub use list::execute as list;
pub use lookup::execute as lookup;
pub use put::execute as put;
pub use stats::execute as stats;
