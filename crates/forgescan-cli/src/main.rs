use clap::Parser;
use forgescan::{Cli, error_document, init_tracing, print_json, run};

fn main() {
    // Reset SIGPIPE to default behavior to prevent panic on broken pipe
    // (e.g., when piping to `head` or `less` that exits early)
    #[cfg(unix)]
    reset_sigpipe();

    let cli = Cli::parse();
    init_tracing(cli.log_level);

    if let Err(e) = run(cli) {
        tracing::debug!(error = ?e, "command failed");
        let _ = print_json(&error_document(&e));
        std::process::exit(1);
    }
}

#[cfg(unix)]
fn reset_sigpipe() {
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_DFL);
    }
}
