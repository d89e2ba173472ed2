//! Catalog importer entry point

mod api;
mod config;
mod graphql;
mod run;

use std::sync::Arc;

use catsync_shared::LogReporter;

use crate::config::Config;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    if let Err(error) = try_main().await {
        tracing::error!(error = %error, "Import failed");
        std::process::exit(1);
    }
}

async fn try_main() -> anyhow::Result<()> {
    let config = Config::load()?;
    run::run(&config, Arc::new(LogReporter)).await?;
    Ok(())
}
