//! Reference data used to populate the form's pickers.

use serde::{Deserialize, Serialize};

use super::{AccountId, CategoryId, PersonId};

/// A selectable reference entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureItem<Id> {
    /// Display name.
    pub name: String,
    /// Identifier sent back in transaction payloads.
    #[serde(rename = "_id")]
    pub id: Id,
}

impl<Id: AsRef<str>> StructureItem<Id> {
    /// Returns `true` if `needle` equals the item's id, or its name
    /// ignoring case.
    #[inline]
    #[must_use]
    pub fn matches(&self, needle: &str) -> bool {
        self.id.as_ref() == needle || self.name.to_lowercase() == needle.to_lowercase()
    }
}

/// The reference dataset fetched from `/api/structure/`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Structure {
    /// Spending and income categories.
    #[serde(default)]
    pub categories: Vec<StructureItem<CategoryId>>,
    /// The user's own accounts.
    #[serde(default)]
    pub accounts: Vec<StructureItem<AccountId>>,
    /// Third parties for rolling transactions.
    #[serde(default)]
    pub people: Vec<StructureItem<PersonId>>,
}

impl Structure {
    /// Finds a category by id or case-insensitive name.
    #[inline]
    #[must_use]
    pub fn find_category(&self, needle: &str) -> Option<&StructureItem<CategoryId>> {
        self.categories.iter().find(|item| item.matches(needle))
    }

    /// Finds an account by id or case-insensitive name.
    #[inline]
    #[must_use]
    pub fn find_account(&self, needle: &str) -> Option<&StructureItem<AccountId>> {
        self.accounts.iter().find(|item| item.matches(needle))
    }

    /// Finds a person by id or case-insensitive name.
    #[inline]
    #[must_use]
    pub fn find_person(&self, needle: &str) -> Option<&StructureItem<PersonId>> {
        self.people.iter().find(|item| item.matches(needle))
    }
}
