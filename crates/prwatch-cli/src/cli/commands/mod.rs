//! CLI command handlers, one per file.

mod checksum;
mod completions;
mod fetch;
mod links;
mod watch;

pub use checksum::run_checksum;
pub use completions::run_completions;
pub use fetch::{run_fetch, FetchArgs};
pub use links::run_links;
pub use watch::run_watch;
