//! Identifier types for coinshop.
//!
//! Every row the ledger writes is keyed by a database-assigned `BIGSERIAL`.
//! The newtypes below keep account, transfer and inventory keys from being
//! mixed up at call sites while still serializing as plain integers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Macro to define an integer identifier type with standard trait implementations.
///
/// This macro generates a newtype wrapper around `i64` with implementations for:
/// - `Clone`, `Copy`, `PartialEq`, `Eq`, `PartialOrd`, `Ord`, `Hash`
/// - `Serialize`, `Deserialize` (as a bare integer)
/// - `FromStr`, `Display`, `Debug`
/// - `From<i64>`, `Into<i64>`
///
/// # Example
///
/// ```ignore
/// int_id_type!(MyId, "A custom identifier type.");
/// let id = MyId::new(7);
/// let parsed: MyId = id.to_string().parse().unwrap();
/// ```
macro_rules! int_id_type {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a raw database key.
            #[must_use]
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// Return the raw database key.
            #[must_use]
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl FromStr for $name {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim()
                    .parse::<i64>()
                    .map(Self)
                    .map_err(|_| IdError::NotAnInteger(s.to_string()))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

int_id_type!(UserId, "An account identifier.\n\nAssigned by the account store on auto-registration and carried in the `sub` claim of issued tokens.");
int_id_type!(TransferId, "A transfer history record identifier.");
int_id_type!(InventoryEntryId, "An inventory row identifier (one row per purchased unit).");

/// Errors that can occur when parsing identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    /// The input is not a decimal integer.
    #[error("invalid identifier: {0:?} is not an integer")]
    NotAnInteger(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_parses_from_display() {
        let id = UserId::new(42);
        let parsed = UserId::from_str(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn ids_serialize_as_bare_integers() {
        let json = serde_json::to_string(&TransferId::new(9)).unwrap();
        assert_eq!(json, "9");

        let parsed: InventoryEntryId = serde_json::from_str("17").unwrap();
        assert_eq!(parsed.get(), 17);
    }

    #[test]
    fn rejects_non_numeric_input() {
        let err = UserId::from_str("alice").unwrap_err();
        assert_eq!(err, IdError::NotAnInteger("alice".into()));
    }

    #[test]
    fn ordering_follows_raw_key() {
        assert!(UserId::new(3) < UserId::new(10));
    }

    #[test]
    fn debug_names_the_type() {
        assert_eq!(format!("{:?}", UserId::new(5)), "UserId(5)");
    }
}
