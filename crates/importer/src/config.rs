//! Importer configuration
//!
//! Flags win over environment variables; `.env` is loaded first so either
//! works. Required values are validated here, before any network activity.

use catsync_catalog::RunOptions;
use clap::Parser;
use thiserror::Error;

/// Public API endpoint used when BASE_URL is not set.
const DEFAULT_BASE_URL: &str = "https://api.stigg.io/graphql";

#[derive(Debug, Parser)]
#[command(
    name = "catsync-import",
    about = "Import a Zuora billing catalog into the subscription platform"
)]
pub struct Cli {
    /// Target environment id
    #[arg(long)]
    pub environment_id: Option<String>,

    /// Comma-separated Zuora product ids or names
    #[arg(long)]
    pub product_ids: Option<String>,

    /// Log intended mutations without issuing them
    #[arg(long)]
    pub dry_run: bool,

    /// Publish packages after the import
    #[arg(long)]
    pub publish: bool,

    /// Update existing entities whose display fields drifted
    #[arg(long)]
    pub update: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not defined, set it in .env or pass the matching flag")]
    Missing(&'static str),
}

/// Resolved configuration threaded into the gateways and reconciler.
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub api_key: String,
    pub environment_id: String,
    pub product_ids: Vec<String>,
    pub options: RunOptions,
}

impl Config {
    /// Load `.env`, parse flags, and validate.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_cli(Cli::parse(), |key| std::env::var(key).ok())
    }

    fn from_cli(cli: Cli, env: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_key = env("X_API_KEY")
            .filter(|value| !value.is_empty())
            .ok_or(ConfigError::Missing("X_API_KEY"))?;

        let environment_id = cli
            .environment_id
            .or_else(|| env("ENVIRONMENT_ID"))
            .filter(|value| !value.is_empty())
            .ok_or(ConfigError::Missing("ENVIRONMENT_ID"))?;

        let product_ids: Vec<String> = cli
            .product_ids
            .or_else(|| env("ZUORA_PRODUCT_IDS"))
            .unwrap_or_default()
            .split(',')
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .collect();
        if product_ids.is_empty() {
            return Err(ConfigError::Missing("ZUORA_PRODUCT_IDS"));
        }

        let flag = |cli_value: bool, key: &str| {
            cli_value || env(key).map(|value| value == "true").unwrap_or(false)
        };

        Ok(Self {
            base_url: env("BASE_URL")
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key,
            environment_id,
            product_ids,
            options: RunOptions {
                dry_run: flag(cli.dry_run, "DRY_RUN"),
                publish: flag(cli.publish, "PUBLISH"),
                update: flag(cli.update, "UPDATE"),
            },
        })
    }
}
