//! Record store access.
//!
//! The board treats the store as an external collaborator: it reads the
//! stage catalog, deals and filter reference data, and writes exactly one
//! field (a deal's stage).

pub mod directus;
pub mod memory;
pub mod wire;

use tracing::debug;

use crate::error::StoreError;
use crate::models::{AccountRef, BoardData, BoardSnapshot, Deal, PersonRef, Stage, StageCatalog};

pub use directus::DirectusStore;
pub use memory::InMemoryStore;

/// Default deal ordering: newest first.
pub const DEFAULT_DEAL_SORT: &str = "-date_created";

/// Optional filter/sort parameters for reading deals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DealQuery {
    pub owner: Option<String>,
    pub account: Option<String>,
    pub stage: Option<String>,
    pub sort: String,
    /// `None` fetches every record.
    pub limit: Option<usize>,
}

impl Default for DealQuery {
    fn default() -> Self {
        Self {
            owner: None,
            account: None,
            stage: None,
            sort: DEFAULT_DEAL_SORT.to_string(),
            limit: None,
        }
    }
}

impl DealQuery {
    /// Check a deal against the equality filters of this query.
    pub fn matches(&self, deal: &Deal) -> bool {
        let eq = |wanted: &Option<String>, actual: Option<&str>| match wanted {
            Some(w) => actual == Some(w.as_str()),
            None => true,
        };
        eq(&self.owner, deal.owner_id())
            && eq(&self.account, deal.account_id())
            && eq(&self.stage, Some(deal.stage_id()))
    }
}

/// Confirmation returned by a successful stage write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageAssignment {
    pub deal_id: String,
    pub stage_id: String,
}

/// Deal record store plus stage catalog.
pub trait DealStore: Send + Sync {
    fn fetch_stages(&self) -> Result<Vec<Stage>, StoreError>;

    fn fetch_deals(&self, query: &DealQuery) -> Result<Vec<Deal>, StoreError>;

    /// Active users that can own deals.
    fn fetch_owners(&self) -> Result<Vec<PersonRef>, StoreError>;

    /// Accounts sorted by name.
    fn fetch_accounts(&self) -> Result<Vec<AccountRef>, StoreError>;

    /// Set `stage = stage_id` on a single deal.
    fn update_deal_stage(&self, deal_id: &str, stage_id: &str)
        -> Result<StageAssignment, StoreError>;
}

/// Fetch stages and deals (what a refresh re-reads).
pub fn fetch_snapshot(store: &dyn DealStore, query: &DealQuery) -> Result<BoardSnapshot, StoreError> {
    let stages = store.fetch_stages()?;
    let deals = store.fetch_deals(query)?;
    debug!(stages = stages.len(), deals = deals.len(), "fetched board snapshot");
    Ok(BoardSnapshot::new(StageCatalog::new(stages), deals))
}

/// Fetch everything a board page needs on load.
pub fn fetch_board_data(store: &dyn DealStore, query: &DealQuery) -> Result<BoardData, StoreError> {
    let snapshot = fetch_snapshot(store, query)?;
    let owners = store.fetch_owners()?;
    let accounts = store.fetch_accounts()?;
    Ok(BoardData {
        snapshot,
        owners,
        accounts,
    })
}
