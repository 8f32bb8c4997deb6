use super::args::{Cli, Commands};
use super::handlers;
use anyhow::Result;
use forgescan_providers::Corpus;
use forgescan_runtime::{Config, resolve_config_path};

pub fn run(cli: Cli) -> Result<()> {
    let config_path = resolve_config_path(cli.config.as_deref())?;
    let config = Config::load_from(&config_path)?;
    let corpus = Corpus::new(config.corpus_root(cli.corpus.as_deref())?);
    tracing::debug!(
        config = %config_path.display(),
        corpus = %corpus.root().display(),
        "resolved paths"
    );

    match cli.command {
        Commands::ListProjects => handlers::projects::handle_list(&corpus),

        Commands::ListSessions { project_filter } => {
            handlers::sessions::handle_list(&corpus, &project_filter)
        }

        Commands::Scan {
            project,
            after,
            before,
        } => handlers::scan::handle(&corpus, &config, project, after, before),

        Commands::Extract {
            session_id,
            project_dir,
            context,
        } => handlers::extract::handle(&corpus, &config, &session_id, &project_dir, context),
    }
}
