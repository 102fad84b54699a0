use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::reference::{AccountRef, PersonRef};

/// The expanded stage relation carried on a deal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageRef {
    pub id: String,
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub label: String,
}

impl StageRef {
    pub fn new(id: impl Into<String>, key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            key: key.into(),
            label: label.into(),
        }
    }
}

/// Board projection of a deal.
///
/// A deal belongs to exactly one stage. The board only ever writes the
/// stage, and only through the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deal {
    pub id: String,
    pub title: String,
    /// Monetary value in EUR; `None` counts as zero in totals.
    pub value: Option<f64>,
    /// Win probability, 0–100.
    pub probability: u8,
    pub stage: StageRef,
    pub account: Option<AccountRef>,
    pub contact: Option<PersonRef>,
    pub owner: Option<PersonRef>,
    pub expected_close_date: Option<NaiveDate>,
    pub date_created: Option<DateTime<Utc>>,
}

impl Deal {
    pub fn new(id: impl Into<String>, title: impl Into<String>, stage: StageRef) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            value: None,
            probability: 0,
            stage,
            account: None,
            contact: None,
            owner: None,
            expected_close_date: None,
            date_created: None,
        }
    }

    pub fn stage_id(&self) -> &str {
        &self.stage.id
    }

    pub fn owner_id(&self) -> Option<&str> {
        self.owner.as_ref().map(|o| o.id.as_str())
    }

    pub fn account_id(&self) -> Option<&str> {
        self.account.as_ref().map(|a| a.id.as_str())
    }

    /// Value used for column totals.
    pub fn value_or_zero(&self) -> f64 {
        self.value.unwrap_or(0.0)
    }
}

/// Clamp a raw probability into 0–100.
pub fn clamp_probability(raw: i64) -> u8 {
    raw.clamp(0, 100) as u8
}
