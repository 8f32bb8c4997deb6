//! Testing infrastructure for forgescan integration tests.
//!
//! - `TestWorld`: temporary session corpus plus a configured CLI command
//! - `records`: builders for the JSONL lines agent sessions are made of

pub mod records;
pub mod world;

pub use world::{CliResult, TestWorld};
