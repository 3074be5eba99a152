mod app;
mod commands;
mod effects;
mod logging;
mod render;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use crawler_engine::{ApiSettings, DEFAULT_BASE_URL};
use url::Url;

/// Console client for the scraping service: manual extractions, recurring
/// schedules and extraction history.
#[derive(Debug, Parser)]
#[command(name = "crawler_app", version)]
struct Cli {
    /// Base URL of the scraping service.
    #[arg(long, env = "CRAWLER_API_BASE_URL", default_value = DEFAULT_BASE_URL)]
    api_base_url: String,

    /// Also write logs to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log at debug level.
    #[arg(long, short)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::initialize(cli.verbose, cli.log_file.as_deref())?;

    let base_url = Url::parse(&cli.api_base_url)
        .with_context(|| format!("invalid --api-base-url `{}`", cli.api_base_url))?;
    app::run(ApiSettings::with_base_url(base_url))
}
