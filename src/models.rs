//! Data models for MoneyApp API entities.
//!
//! This module contains strongly-typed representations of transactions,
//! the grouped sections the list endpoint returns, the reference data used
//! by the add form, and newtype ID wrappers for the reference spaces.

mod enums;
mod ids;
mod section;
mod structure;
mod transaction;

pub use enums::{TransactionKind, UnknownKindError};
pub use ids::{AccountId, CategoryId, PersonId};
pub use section::Section;
pub use structure::{Structure, StructureItem};
pub use transaction::{Transaction, TransactionDetails};

pub use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, Utc};
