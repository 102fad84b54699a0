//! Helpers shared by command implementations.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::Config;
use crate::models::Stage;
use crate::store::{DealStore, DirectusStore, InMemoryStore};

/// Open the configured backend, or the seeded in-memory pipeline for `--demo`.
pub fn open_store(config: &Config, demo: bool) -> Result<Arc<dyn DealStore>> {
    if demo {
        info!("using demo pipeline");
        return Ok(Arc::new(InMemoryStore::seeded()));
    }
    let backend = config.require_backend()?;
    let store = DirectusStore::new(backend).context("Failed to create backend client")?;
    info!(url = store.base_url(), "using backend");
    Ok(Arc::new(store))
}

/// Short marker for closed stages.
pub fn outcome_marker(stage: &Stage) -> &'static str {
    if !stage.is_closed() {
        ""
    } else if stage.is_won {
        "won"
    } else {
        "lost"
    }
}
