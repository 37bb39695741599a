//! Transaction model.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{AccountId, CategoryId, PersonId, TransactionKind};

/// A financial transaction as the API stores and returns it.
///
/// The base fields are shared by every kind; the kind-specific references
/// live in [`TransactionDetails`], flattened next to them on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Signed amount; positive is an inflow, negative an outflow.
    pub amount: f64,
    /// Free-text comment, possibly empty. A missing or `null` comment
    /// decodes as empty.
    #[serde(default, deserialize_with = "deserialize_comment")]
    pub comment: String,
    /// When the transaction happened.
    ///
    /// Decoded from RFC 3339; timestamps without an offset are read as UTC.
    #[serde(
        serialize_with = "serialize_timestamp",
        deserialize_with = "deserialize_timestamp"
    )]
    pub date: DateTime<Utc>,
    /// Kind tag and kind-specific references.
    #[serde(flatten)]
    pub details: TransactionDetails,
}

/// Kind-specific part of a [`Transaction`], tagged by `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TransactionDetails {
    /// Money moving into or out of `account` under `category`.
    #[serde(rename = "transaction")]
    Transaction {
        /// Spending or income category.
        category: CategoryId,
        /// Affected account.
        account: AccountId,
    },
    /// Transfer between two of the user's own accounts.
    #[serde(rename = "self")]
    SelfTransfer {
        /// Source account.
        #[serde(rename = "fromaccount")]
        from_account: AccountId,
        /// Destination account.
        #[serde(rename = "toaccount")]
        to_account: AccountId,
    },
    /// Money lent to or borrowed from `person`, tracked against `account`.
    #[serde(rename = "roll")]
    Roll {
        /// Third party.
        #[serde(rename = "rollperson")]
        person: PersonId,
        /// Affected account.
        account: AccountId,
    },
}

impl TransactionDetails {
    /// Builds the details of a plain categorised transaction.
    #[inline]
    #[must_use]
    pub const fn transaction(category: CategoryId, account: AccountId) -> Self {
        Self::Transaction { category, account }
    }

    /// Builds the details of a transfer between own accounts.
    #[inline]
    #[must_use]
    pub const fn self_transfer(from_account: AccountId, to_account: AccountId) -> Self {
        Self::SelfTransfer {
            from_account,
            to_account,
        }
    }

    /// Builds the details of a rolling transaction with a third party.
    #[inline]
    #[must_use]
    pub const fn roll(person: PersonId, account: AccountId) -> Self {
        Self::Roll { person, account }
    }

    /// Returns the kind tag of these details.
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> TransactionKind {
        match *self {
            Self::Transaction { .. } => TransactionKind::Transaction,
            Self::SelfTransfer { .. } => TransactionKind::SelfTransfer,
            Self::Roll { .. } => TransactionKind::Roll,
        }
    }
}

impl Transaction {
    /// Creates a transaction from its base fields and details.
    #[inline]
    #[must_use]
    pub const fn new(
        amount: f64,
        comment: String,
        date: DateTime<Utc>,
        details: TransactionDetails,
    ) -> Self {
        Self {
            amount,
            comment,
            date,
            details,
        }
    }

    /// Returns the kind tag of this transaction.
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> TransactionKind {
        self.details.kind()
    }
}

/// Writes a timestamp as ISO-8601 UTC with millisecond precision
/// (`2024-01-15T10:30:00.000Z`).
fn serialize_timestamp<S: Serializer>(
    date: &DateTime<Utc>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&date.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Offset-less timestamp layouts accepted on input, tried in order.
const NAIVE_TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Reads a timestamp string, see [`parse_timestamp`].
fn deserialize_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<DateTime<Utc>, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).ok_or_else(|| D::Error::custom(format!("invalid timestamp {raw:?}")))
}

/// Parses an RFC 3339 timestamp. Offset-less date-times and bare dates
/// (midnight) are taken as UTC.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return Some(date.with_timezone(&Utc));
    }
    NAIVE_TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|day| day.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc())
}

/// Reads a comment, mapping `null` to an empty string.
fn deserialize_comment<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
