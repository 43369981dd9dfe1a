use clap::Parser;
use tracing::{info, warn};

use dbviewer::cli::{self, Cli};
use dbviewer::config::{default_config_path, Config};
use dbviewer::{BrowserService, SqliteBrowser};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::load_or_default(default_config_path())?,
    };
    if let Some(dir) = args.data_dir {
        config.data_dir = dir;
    }

    config.init_logging();
    info!(data_dir = %config.data_dir.display(), "dbviewer starting");

    let service = SqliteBrowser::new(&config);
    if config.bootstrap_sample {
        // A broken sample must not keep the user from opening their own files.
        if let Err(e) = service.create_sample().await {
            warn!(error = %e, "sample bootstrap failed");
        }
    }

    cli::run(&service, args.command, args.json).await
}
