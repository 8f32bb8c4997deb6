use anyhow::Result;
use forgescan_runtime::Error;
use serde::Serialize;
use serde_json::{Value, json};
use std::io::Write;

/// Print one pretty JSON document to stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}

/// The structured object reported in place of a result when a command fails.
pub fn error_document(err: &anyhow::Error) -> Value {
    match err.downcast_ref::<Error>() {
        Some(Error::CorpusNotFound(path)) => json!({
            "error": "No projects directory found",
            "path": path.display().to_string(),
        }),
        Some(runtime_err) => json!({ "error": runtime_err.to_string() }),
        None => json!({ "error": format!("{:#}", err) }),
    }
}
