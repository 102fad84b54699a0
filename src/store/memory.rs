//! In-process [`DealStore`] for demo mode and tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use chrono::{Duration, TimeZone, Utc};

use super::{DealQuery, DealStore, StageAssignment, DEFAULT_DEAL_SORT};
use crate::error::StoreError;
use crate::models::{AccountRef, Deal, PersonRef, Stage, StageRef};

#[derive(Default)]
struct Records {
    stages: Vec<Stage>,
    deals: Vec<Deal>,
    owners: Vec<PersonRef>,
    accounts: Vec<AccountRef>,
}

/// Thread-safe store backed by vectors.
#[derive(Default)]
pub struct InMemoryStore {
    records: Mutex<Records>,
    update_calls: AtomicUsize,
    fetch_calls: AtomicUsize,
    fail_updates: AtomicBool,
    fail_fetches: AtomicBool,
}

impl InMemoryStore {
    pub fn new(stages: Vec<Stage>, deals: Vec<Deal>) -> Self {
        Self {
            records: Mutex::new(Records {
                stages,
                deals,
                ..Records::default()
            }),
            ..Self::default()
        }
    }

    pub fn with_references(self, owners: Vec<PersonRef>, accounts: Vec<AccountRef>) -> Self {
        {
            let mut records = self.lock();
            records.owners = owners;
            records.accounts = accounts;
        }
        self
    }

    /// A small pipeline used by `--demo`.
    pub fn seeded() -> Self {
        let stages = vec![
            Stage::new("st-lead", "lead", "Lead").with_sort(1),
            Stage::new("st-qualified", "qualified", "Qualified").with_sort(2),
            Stage::new("st-proposal", "proposal", "Proposal").with_sort(3),
            Stage::new("st-negotiation", "negotiation", "Negotiation").with_sort(4),
            Stage {
                is_won: true,
                ..Stage::new("st-won", "won", "Won").with_sort(5)
            },
            Stage {
                is_lost: true,
                ..Stage::new("st-lost", "lost", "Lost").with_sort(6)
            },
        ];

        let owners = vec![
            PersonRef::new("u-ana", "Ana", "García"),
            PersonRef::new("u-marc", "Marc", "Puig"),
        ];
        let accounts = vec![
            AccountRef::new("a-acme", "Acme Logistics"),
            AccountRef::new("a-bravo", "Bravo Foods"),
            AccountRef::new("a-cierzo", "Cierzo Energía"),
        ];

        let seed = [
            ("d-101", "Fleet tracking rollout", Some(48_000.0), 20, "st-lead", 0, Some(0), None),
            ("d-102", "Warehouse audit", Some(6_500.0), 35, "st-qualified", 0, Some(1), Some("c-luis")),
            ("d-103", "Cold chain sensors", Some(18_250.0), 50, "st-proposal", 1, Some(0), None),
            ("d-104", "Solar maintenance plan", None, 10, "st-lead", 2, None, None),
            ("d-105", "Data platform migration", Some(120_000.0), 70, "st-negotiation", 0, Some(1), Some("c-marta")),
            ("d-106", "Retail analytics pilot", Some(9_900.0), 100, "st-won", 1, Some(0), None),
            ("d-107", "Route optimisation", Some(15_000.0), 0, "st-lost", 2, Some(1), None),
        ];

        let base = Utc.with_ymd_and_hms(2026, 9, 1, 9, 0, 0).single();
        let deals = seed
            .iter()
            .enumerate()
            .map(|(i, (id, title, value, prob, stage_id, account, owner, contact))| {
                let stage = stages
                    .iter()
                    .find(|s| s.id == *stage_id)
                    .map(stage_ref)
                    .unwrap_or_default();
                let mut deal = Deal::new(*id, *title, stage);
                deal.value = *value;
                deal.probability = *prob;
                deal.account = accounts.get(*account).cloned();
                deal.owner = owner.and_then(|o| owners.get(o).cloned());
                deal.contact = contact.map(|c| match c {
                    "c-luis" => PersonRef::new(c, "Luis", "Pérez"),
                    _ => PersonRef::new(c, "Marta", "Soler"),
                });
                deal.date_created = base.map(|b| b + Duration::days(i as i64));
                deal
            })
            .collect();

        Self::new(stages, deals).with_references(owners, accounts)
    }

    fn lock(&self) -> MutexGuard<'_, Records> {
        // A poisoned lock only means a test thread panicked mid-call; the
        // records themselves are always left consistent.
        self.records.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Number of `update_deal_stage` calls received, successful or not.
    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    /// Number of `fetch_deals` calls received.
    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn set_fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_fetches(&self, fail: bool) {
        self.fail_fetches.store(fail, Ordering::SeqCst);
    }

    /// Stage id currently stored for a deal.
    pub fn stage_of(&self, deal_id: &str) -> Option<String> {
        self.lock()
            .deals
            .iter()
            .find(|d| d.id == deal_id)
            .map(|d| d.stage.id.clone())
    }

    fn check_fetch(&self) -> Result<(), StoreError> {
        if self.fail_fetches.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable);
        }
        Ok(())
    }
}

fn stage_ref(stage: &Stage) -> StageRef {
    StageRef::new(stage.id.clone(), stage.key.clone(), stage.label.clone())
}

impl DealStore for InMemoryStore {
    fn fetch_stages(&self) -> Result<Vec<Stage>, StoreError> {
        self.check_fetch()?;
        Ok(self.lock().stages.clone())
    }

    fn fetch_deals(&self, query: &DealQuery) -> Result<Vec<Deal>, StoreError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.check_fetch()?;

        let mut deals: Vec<Deal> = self
            .lock()
            .deals
            .iter()
            .filter(|d| query.matches(d))
            .cloned()
            .collect();

        // Stable sort keeps insertion order among deals without a timestamp.
        if query.sort == DEFAULT_DEAL_SORT {
            deals.sort_by(|a, b| b.date_created.cmp(&a.date_created));
        }
        if let Some(limit) = query.limit {
            deals.truncate(limit);
        }
        Ok(deals)
    }

    fn fetch_owners(&self) -> Result<Vec<PersonRef>, StoreError> {
        self.check_fetch()?;
        Ok(self.lock().owners.clone())
    }

    fn fetch_accounts(&self) -> Result<Vec<AccountRef>, StoreError> {
        self.check_fetch()?;
        let mut accounts = self.lock().accounts.clone();
        accounts.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(accounts)
    }

    fn update_deal_stage(
        &self,
        deal_id: &str,
        stage_id: &str,
    ) -> Result<StageAssignment, StoreError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable);
        }
        if stage_id.trim().is_empty() {
            return Err(StoreError::InvalidInput("stage is required".to_string()));
        }

        let mut records = self.lock();
        let stage = records
            .stages
            .iter()
            .find(|s| s.id == stage_id)
            .map(stage_ref)
            .ok_or_else(|| StoreError::Rejected {
                reason: format!("unknown stage {stage_id}"),
            })?;
        let deal = records
            .deals
            .iter_mut()
            .find(|d| d.id == deal_id)
            .ok_or_else(|| StoreError::NotFound {
                collection: "deal".to_string(),
                id: deal_id.to_string(),
            })?;
        deal.stage = stage;

        Ok(StageAssignment {
            deal_id: deal_id.to_string(),
            stage_id: stage_id.to_string(),
        })
    }
}
