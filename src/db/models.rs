use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A labeling account. Rows are provisioned through the `create-admin`
/// command, never over the network, and never deleted.
#[derive(Debug, Clone, PartialEq)]
pub struct Operator {
    pub id: i64,
    pub username: String,
    /// Argon2id PHC string; the plaintext password is never stored.
    pub password_hash: String,
}

/// One row per stored upload. `filename` mirrors the on-disk blob name
/// exactly; `label` is the only field ever mutated after insert.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ImageRecord {
    pub id: i64,
    pub filename: String,
    pub timestamp: DateTime<Utc>,
    pub label: Label,
    pub device_id: String,
}

/// Classification state of an image. `Unlabeled` is the insert default and
/// never a valid labeling decision; the two terminal values are assigned by
/// operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    Unlabeled,
    Snowy,
    NotSnowy,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Unlabeled => "unlabeled",
            Label::Snowy => "snowy",
            Label::NotSnowy => "not_snowy",
        }
    }

    /// Parse an operator's labeling decision. Only the terminal values are
    /// accepted; `unlabeled` (or anything else) is rejected.
    pub fn parse_decision(value: &str) -> Option<Label> {
        match value {
            "snowy" => Some(Label::Snowy),
            "not_snowy" => Some(Label::NotSnowy),
            _ => None,
        }
    }
}

impl FromStr for Label {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "unlabeled" => Ok(Label::Unlabeled),
            "snowy" => Ok(Label::Snowy),
            "not_snowy" => Ok(Label::NotSnowy),
            other => Err(format!("unknown label {:?}", other)),
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
