use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// A named phase of the sales pipeline (one board column).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    pub id: String,
    pub key: String,
    pub label: String,
    #[serde(default)]
    pub sort: Option<i32>,
    #[serde(default)]
    pub is_won: bool,
    #[serde(default)]
    pub is_lost: bool,
}

impl Stage {
    pub fn new(id: impl Into<String>, key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            key: key.into(),
            label: label.into(),
            sort: None,
            is_won: false,
            is_lost: false,
        }
    }

    pub fn with_sort(mut self, sort: i32) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Won and lost stages close the deal.
    pub fn is_closed(&self) -> bool {
        self.is_won || self.is_lost
    }
}

/// Board column order: `sort` ascending, unsorted stages last, ties by `key`.
pub fn catalog_order(a: &Stage, b: &Stage) -> Ordering {
    let by_sort = match (a.sort, b.sort) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_sort.then_with(|| a.key.cmp(&b.key))
}

/// Ordered, read-only list of pipeline stages.
///
/// Loaded once per board session; the board never edits stages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageCatalog {
    stages: Vec<Stage>,
}

impl StageCatalog {
    /// Build a catalog, re-sorting into board order regardless of fetch order.
    pub fn new(mut stages: Vec<Stage>) -> Self {
        stages.sort_by(catalog_order);
        Self { stages }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Stage> {
        self.stages.iter()
    }

    pub fn as_slice(&self) -> &[Stage] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn get(&self, stage_id: &str) -> Option<&Stage> {
        self.stages.iter().find(|s| s.id == stage_id)
    }

    pub fn contains(&self, stage_id: &str) -> bool {
        self.get(stage_id).is_some()
    }

    pub fn position(&self, stage_id: &str) -> Option<usize> {
        self.stages.iter().position(|s| s.id == stage_id)
    }

    /// Resolve a stage by id first, then by key.
    pub fn resolve(&self, id_or_key: &str) -> Option<&Stage> {
        self.get(id_or_key)
            .or_else(|| self.stages.iter().find(|s| s.key == id_or_key))
    }
}
