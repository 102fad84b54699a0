//! Directus JSON shapes and their conversion into board models.
//!
//! Directus wraps every payload in `{"data": ...}`, returns decimal
//! columns as strings, and returns a relation either expanded (object) or
//! collapsed (bare id) depending on the requested fields.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use tracing::warn;

use crate::models::deal::clamp_probability;
use crate::models::{AccountRef, Deal, PersonRef, Stage, StageRef};

/// Field projection requested for board deals.
pub const DEAL_FIELDS: &[&str] = &[
    "id",
    "title",
    "value_eur",
    "probability",
    "expected_close_date",
    "date_created",
    "stage.id",
    "stage.key",
    "stage.label",
    "account.id",
    "account.name",
    "contact.id",
    "contact.first_name",
    "contact.last_name",
    "owner.id",
    "owner.first_name",
    "owner.last_name",
];

pub const STAGE_FIELDS: &[&str] = &["id", "key", "label", "sort", "is_won", "is_lost"];

pub const OWNER_FIELDS: &[&str] = &["id", "first_name", "last_name"];

pub const ACCOUNT_FIELDS: &[&str] = &["id", "name"];

#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

/// Primary keys may be UUID strings or integers.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WireId {
    Text(String),
    Number(i64),
}

impl WireId {
    pub fn into_string(self) -> String {
        match self {
            WireId::Text(s) => s,
            WireId::Number(n) => n.to_string(),
        }
    }
}

/// A relation, expanded or collapsed to its key.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Relation<T> {
    Expanded(T),
    Key(WireId),
}

/// Numeric column that may be serialized as a number or a string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WireNumber {
    Number(f64),
    Text(String),
}

impl WireNumber {
    /// Non-finite values (`"NaN"`, `"inf"`) read as missing.
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            WireNumber::Number(n) => Some(*n),
            WireNumber::Text(s) => s.trim().parse::<f64>().ok(),
        };
        value.filter(|v| v.is_finite())
    }
}

#[derive(Debug, Deserialize)]
pub struct WireStage {
    pub id: WireId,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub sort: Option<i32>,
    #[serde(default)]
    pub is_won: Option<bool>,
    #[serde(default)]
    pub is_lost: Option<bool>,
}

impl From<WireStage> for Stage {
    fn from(wire: WireStage) -> Self {
        let key = wire.key.unwrap_or_default();
        let label = wire.label.unwrap_or_else(|| key.clone());
        Stage {
            id: wire.id.into_string(),
            key,
            label,
            sort: wire.sort,
            is_won: wire.is_won.unwrap_or(false),
            is_lost: wire.is_lost.unwrap_or(false),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct WireStageRef {
    pub id: WireId,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WirePerson {
    pub id: WireId,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

impl From<WirePerson> for PersonRef {
    fn from(wire: WirePerson) -> Self {
        PersonRef {
            id: wire.id.into_string(),
            first_name: wire.first_name.unwrap_or_default(),
            last_name: wire.last_name.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct WireAccount {
    pub id: WireId,
    #[serde(default)]
    pub name: Option<String>,
}

impl From<WireAccount> for AccountRef {
    fn from(wire: WireAccount) -> Self {
        AccountRef {
            id: wire.id.into_string(),
            name: wire.name.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct WireDeal {
    pub id: WireId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub value_eur: Option<WireNumber>,
    #[serde(default)]
    pub probability: Option<i64>,
    #[serde(default)]
    pub expected_close_date: Option<String>,
    #[serde(default)]
    pub date_created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub stage: Option<Relation<WireStageRef>>,
    #[serde(default)]
    pub account: Option<Relation<WireAccount>>,
    #[serde(default)]
    pub contact: Option<Relation<WirePerson>>,
    #[serde(default)]
    pub owner: Option<Relation<WirePerson>>,
}

impl From<WireDeal> for Deal {
    fn from(wire: WireDeal) -> Self {
        let id = wire.id.into_string();

        let stage = match wire.stage {
            Some(Relation::Expanded(s)) => StageRef {
                id: s.id.into_string(),
                key: s.key.unwrap_or_default(),
                label: s.label.unwrap_or_default(),
            },
            Some(Relation::Key(key)) => StageRef {
                id: key.into_string(),
                ..StageRef::default()
            },
            None => {
                warn!(deal_id = %id, "deal has no stage; it will not appear on the board");
                StageRef::default()
            }
        };

        let account = wire.account.map(|rel| match rel {
            Relation::Expanded(a) => a.into(),
            Relation::Key(key) => AccountRef::new(key.into_string(), ""),
        });
        let contact = wire.contact.map(person_from_relation);
        let owner = wire.owner.map(person_from_relation);

        let expected_close_date = wire
            .expected_close_date
            .as_deref()
            .and_then(parse_date);

        Deal {
            id,
            title: wire.title.unwrap_or_default(),
            value: wire.value_eur.as_ref().and_then(WireNumber::as_f64),
            probability: clamp_probability(wire.probability.unwrap_or(0)),
            stage,
            account,
            contact,
            owner,
            expected_close_date,
            date_created: wire.date_created,
        }
    }
}

fn person_from_relation(rel: Relation<WirePerson>) -> PersonRef {
    match rel {
        Relation::Expanded(p) => p.into(),
        Relation::Key(key) => PersonRef::new(key.into_string(), "", ""),
    }
}

/// Directus date columns come as `YYYY-MM-DD`, datetime columns with a time part.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let day = raw.get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

/// Item returned by `PATCH /items/deals/{id}`.
#[derive(Debug, Deserialize)]
pub struct WireStageUpdate {
    pub id: WireId,
    #[serde(default)]
    pub stage: Option<Relation<WireStageRef>>,
}

impl WireStageUpdate {
    pub fn stage_id(self) -> Option<String> {
        match self.stage? {
            Relation::Expanded(s) => Some(s.id.into_string()),
            Relation::Key(key) => Some(key.into_string()),
        }
    }
}

/// Directus error body: `{"errors": [{"message": "..."}]}`.
#[derive(Debug, Deserialize)]
pub struct WireErrors {
    #[serde(default)]
    pub errors: Vec<WireErrorItem>,
}

#[derive(Debug, Deserialize)]
pub struct WireErrorItem {
    #[serde(default)]
    pub message: String,
}

impl WireErrors {
    pub fn first_message(&self) -> Option<&str> {
        self.errors
            .iter()
            .map(|e| e.message.as_str())
            .find(|m| !m.is_empty())
    }
}
