//! Newtype wrappers for reference identifiers.
//!
//! Categories, accounts and people live in separate reference lists on the
//! server. Wrapping their `_id` strings keeps a person from being passed
//! where an account is expected.

use serde::{Deserialize, Serialize};

/// Macro to define a newtype ID wrapping a `String` inner type.
macro_rules! define_string_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier from the given string.
            #[inline]
            #[must_use]
            pub const fn new(value: String) -> Self {
                Self(value)
            }

            /// Returns a reference to the inner string.
            #[inline]
            #[must_use]
            pub fn as_inner(&self) -> &str {
                &self.0
            }

            /// Consumes the wrapper and returns the inner string.
            #[inline]
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }

            /// Returns `true` for the empty identifier, which pickers use
            /// as their "nothing selected" value.
            #[inline]
            #[must_use]
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl AsRef<str> for $name {
            #[inline]
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Display for $name {
            #[inline]
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<String> for $name {
            #[inline]
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            #[inline]
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }
    };
}

define_string_id! {
    /// Identifier of a spending/income category.
    CategoryId
}

define_string_id! {
    /// Identifier of one of the user's own accounts.
    AccountId
}

define_string_id! {
    /// Identifier of a third party money is rolled with.
    PersonId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_id_serde_is_transparent() {
        let id = AccountId::new("65a1f0c2e4b0a1b2c3d4e5f6".to_owned());
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, r#""65a1f0c2e4b0a1b2c3d4e5f6""#);
        let deserialized: AccountId = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, id);
    }

    #[test]
    fn string_id_display() {
        let id = CategoryId::from("food");
        assert_eq!(id.to_string(), "food");
    }

    #[test]
    fn id_from_inner_and_back() {
        let id: PersonId = "ravi".to_owned().into();
        assert_eq!(id.as_inner(), "ravi");
        assert_eq!(id.as_ref(), "ravi");
        assert_eq!(id.into_inner(), "ravi");
    }

    #[test]
    fn empty_id_is_unselected() {
        assert!(AccountId::from("").is_empty());
        assert!(!AccountId::from("cash").is_empty());
    }
}
