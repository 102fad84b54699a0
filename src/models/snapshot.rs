use super::deal::Deal;
use super::reference::{AccountRef, PersonRef};
use super::stage::StageCatalog;

/// Deals as fetched, paired with the stage catalog.
///
/// Never patched locally: after a stage write the whole snapshot is
/// replaced by a fresh fetch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoardSnapshot {
    pub stages: StageCatalog,
    /// Source order (newest first, as fetched).
    pub deals: Vec<Deal>,
}

impl BoardSnapshot {
    pub fn new(stages: StageCatalog, deals: Vec<Deal>) -> Self {
        Self { stages, deals }
    }

    pub fn deal(&self, deal_id: &str) -> Option<&Deal> {
        self.deals.iter().find(|d| d.id == deal_id)
    }
}

/// Everything a board page loads: the snapshot plus filter reference lists.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoardData {
    pub snapshot: BoardSnapshot,
    pub owners: Vec<PersonRef>,
    pub accounts: Vec<AccountRef>,
}
