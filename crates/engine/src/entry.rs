//! The module contains the `Entry` type, a single income or expense record.
//!
//! Both expenses and income are represented by `Entry`; [`EntryKind`] tells
//! them apart.
use core::fmt;

use serde::{Deserialize, Serialize, Serializer};

use crate::{EngineError, ResultEngine};

/// Identifier of an entry in the ledger.
pub type EntryId = i64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Income,
    Expense,
}

impl EntryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for EntryKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(EngineError::InvalidData(format!(
                "invalid entry type: {other}"
            ))),
        }
    }
}

/// Represent a movement recorded in the ledger.
///
/// The serialized form is the on-disk and on-the-wire shape:
/// `{"id": 1700000000000, "type": "income", "amount": 5000, "description": "salary"}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    #[serde(serialize_with = "serialize_amount")]
    pub amount: f64,
    pub description: String,
}

/// Largest magnitude below which every whole `f64` is an exact `i64`.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Whole amounts are written as JSON integers (`5000`, not `5000.0`), so files
/// written by earlier deployments keep their shape after a rewrite.
fn serialize_amount<S: Serializer>(amount: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if amount.fract() == 0.0 && amount.abs() < MAX_EXACT_INTEGER {
        serializer.serialize_i64(*amount as i64)
    } else {
        serializer.serialize_f64(*amount)
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {} {} {}", self.id, self.kind, self.amount, self.description)
    }
}

/// Candidate for a new entry, as received from a caller.
///
/// Every field is optional so that a missing field can be reported as
/// [`EngineError::InvalidData`] instead of failing deserialization.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EntryNew {
    pub kind: Option<String>,
    pub amount: Option<f64>,
    pub description: Option<String>,
}

impl EntryNew {
    pub fn new(kind: EntryKind, amount: f64, description: impl Into<String>) -> Self {
        Self {
            kind: Some(kind.as_str().to_string()),
            amount: Some(amount),
            description: Some(description.into()),
        }
    }

    /// Check presence of every field and build the entry with the given id.
    pub(crate) fn into_entry(self, id: EntryId) -> ResultEngine<Entry> {
        let kind = match self.kind.as_deref() {
            None | Some("") => return Err(EngineError::InvalidData("missing type".to_string())),
            Some(kind) => EntryKind::try_from(kind)?,
        };
        let amount = match self.amount {
            Some(amount) if amount.is_finite() && amount != 0.0 => amount,
            Some(_) => {
                return Err(EngineError::InvalidData(
                    "amount must be a non-zero number".to_string(),
                ));
            }
            None => return Err(EngineError::InvalidData("missing amount".to_string())),
        };
        let description = match self.description {
            Some(description) if !description.is_empty() => description,
            _ => {
                return Err(EngineError::InvalidData(
                    "missing description".to_string(),
                ));
            }
        };

        Ok(Entry {
            id,
            kind,
            amount,
            description,
        })
    }
}
