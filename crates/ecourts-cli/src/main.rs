mod cli;
mod display;
mod report;
mod run;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,ecourts=info,ecourts_portal=info,ecourts_api=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::debug!("ecourts v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Some(Command::Serve { bind, portal }) => ecourts_api::serve(&bind, portal.api_state()).await,
        None => {
            let plan = match cli::resolve(&cli.search, &cli.portal) {
                Ok(plan) => plan,
                Err(e) => Cli::command().error(e.kind(), e).exit(),
            };
            run::run(&plan).await
        }
    }
}
