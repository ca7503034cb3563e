//! Where to eat tonight: the most hygienic restaurants of a cuisine, ranked
//! from NYC inspection results and shown on a map.
//!
//! The inspection table is loaded once at startup and never changes. Each
//! page request filters it, keeps every restaurant's best score, takes the
//! top N and geocodes those addresses one by one.

use std::sync::Arc;

use anyhow::{Context, Result};

pub mod app;
pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod geocode;
pub mod server;
pub mod state;
pub mod ui;

use config::Config;
use state::AppState;

/// Load the dataset, then serve the dashboard. A dataset that cannot be
/// loaded stops startup before the socket is bound.
pub async fn run(config: Config) -> Result<()> {
    config.log_summary();

    let dataset = data::loader::load_source(&config.dataset)
        .await
        .with_context(|| format!("loading inspection dataset {}", config.dataset))?;

    let state = AppState::from_config(&config, dataset).context("building templates")?;
    server::serve(Arc::new(state), config.bind).await
}
