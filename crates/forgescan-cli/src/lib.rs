// NOTE: Output contract
//
// Every command prints exactly one JSON document on stdout, including
// failures, which become `{"error": ...}` with exit status 1. Diagnostics go
// through tracing to stderr so stdout stays machine-readable.

mod args;
mod commands;
mod handlers;
pub mod logging;
pub mod output;
pub mod types;

pub use args::{Cli, Commands};
pub use commands::run;
pub use logging::init_tracing;
pub use output::{error_document, print_json};
