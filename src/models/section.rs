//! Grouped transaction list model.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use super::{Transaction, TransactionKind};

/// A named group of transactions (usually one calendar period) with its
/// running total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Group label, e.g. `"2024-01"`.
    #[serde(rename = "_id")]
    pub id: String,
    /// Sum of the contained amounts.
    pub total: f64,
    /// Transactions in server order.
    ///
    /// Entries whose `type` is not a known kind are dropped while decoding.
    #[serde(deserialize_with = "known_transactions")]
    pub data: Vec<Transaction>,
}

/// Decodes the `data` array, skipping entries with an unknown `type` tag.
///
/// Entries with a known tag must decode fully; a malformed one fails the
/// whole response.
fn known_transactions<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<Transaction>, D::Error> {
    let entries = Vec::<serde_json::Value>::deserialize(deserializer)?;
    let mut transactions = Vec::with_capacity(entries.len());
    for entry in entries {
        let tag = entry.get("type").and_then(serde_json::Value::as_str);
        if tag.and_then(TransactionKind::from_tag).is_none() {
            tracing::warn!(kind = ?tag, "skipping transaction of unknown type");
            continue;
        }
        transactions.push(serde_json::from_value(entry).map_err(D::Error::custom)?);
    }
    Ok(transactions)
}
