//! Enumeration types for constrained API values.

use serde::{Deserialize, Serialize};

/// The `type` tag distinguishing the three transaction shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionKind {
    /// Money moving into or out of an account under a category.
    #[serde(rename = "transaction")]
    Transaction,
    /// Transfer between two of the user's own accounts.
    #[serde(rename = "self")]
    SelfTransfer,
    /// Money lent to or borrowed from a third party.
    #[serde(rename = "roll")]
    Roll,
}

impl TransactionKind {
    /// All kinds, in the order the type picker lists them.
    pub const ALL: [Self; 3] = [Self::Transaction, Self::Roll, Self::SelfTransfer];

    /// Returns the wire tag (`transaction`, `self` or `roll`).
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Transaction => "transaction",
            Self::SelfTransfer => "self",
            Self::Roll => "roll",
        }
    }

    /// Returns the human-readable picker label.
    #[inline]
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Transaction => "Transaction",
            Self::SelfTransfer => "Self Transfer",
            Self::Roll => "Rolling",
        }
    }

    /// Looks up a kind by its wire tag.
    #[inline]
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == tag)
    }
}

impl core::fmt::Display for TransactionKind {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not one of the three transaction tags.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown transaction type {0:?} (expected transaction, roll or self)")]
pub struct UnknownKindError(String);

impl core::str::FromStr for TransactionKind {
    type Err = UnknownKindError;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tag(s).ok_or_else(|| UnknownKindError(s.to_owned()))
    }
}
