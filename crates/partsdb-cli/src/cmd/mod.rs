pub mod category;
pub mod config;
pub mod db;
pub mod library;
pub mod part;
pub mod query;
pub mod serve;

use anyhow::{Context as _, Result};
use partsdb_core::config::Config;
use partsdb_core::store::PgStore;
use std::future::Future;
use std::path::PathBuf;

/// Resolved global options shared by every subcommand.
pub struct Context {
    pub config: Config,
    pub config_path: PathBuf,
    pub json: bool,
}

/// Run an async command body on a fresh multi-threaded runtime.
pub fn block_on<F: Future<Output = Result<()>>>(fut: F) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(fut)
}

/// Connect to PostgreSQL using the resolved configuration.
pub async fn connect(config: &Config) -> Result<PgStore> {
    config.ensure_valid()?;
    PgStore::connect(&config.database.dsn, config.database.max_connections)
        .await
        .with_context(|| format!("connecting to {}", redact_dsn(&config.database.dsn)))
}

/// Hide the password in a connection URL before it reaches logs or stderr.
pub fn redact_dsn(dsn: &str) -> String {
    let Some((scheme, rest)) = dsn.split_once("://") else {
        return dsn.to_string();
    };
    let Some((userinfo, host)) = rest.rsplit_once('@') else {
        return dsn.to_string();
    };
    match userinfo.split_once(':') {
        Some((user, _)) => format!("{scheme}://{user}:***@{host}"),
        None => dsn.to_string(),
    }
}
