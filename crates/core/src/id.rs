//! Strongly-typed identifiers used across the commerce domain.

use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Declares a `Uuid`-backed identifier with serde, display and parsing support.
///
/// `KIND` names the identifier in parse errors and logs.
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            pub const KIND: &'static str = stringify!($name);

            /// Fresh time-ordered (v7) identifier.
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0.hyphenated(), f)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self::from_uuid(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl FromStr for $name {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::try_parse(s.trim())
                    .map(Self)
                    .map_err(|e| DomainError::invalid_id(format!("{}: {e}", Self::KIND)))
            }
        }
    };
}

define_id!(
    /// Identifier of a customer.
    CustomerId
);
define_id!(
    /// Identifier of a product (catalog entry and its stock record).
    ProductId
);
define_id!(
    /// Identifier of a persisted order.
    OrderId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_from_uuid_string() {
        let id = ProductId::new();
        let parsed: ProductId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn rejects_malformed_id_with_type_name() {
        let err = "not-a-uuid".parse::<CustomerId>().unwrap_err();
        match err {
            DomainError::InvalidId(msg) => assert!(msg.starts_with("CustomerId:")),
            other => panic!("expected InvalidId, got {other:?}"),
        }
    }

    #[test]
    fn parse_tolerates_surrounding_whitespace() {
        let id = OrderId::new();
        let parsed: OrderId = format!("  {id}\n").parse().unwrap();
        assert_eq!(parsed, id);
        assert_eq!(OrderId::KIND, "OrderId");
    }

    #[test]
    fn serializes_as_bare_string() {
        let uuid = Uuid::now_v7();
        let id = OrderId::from_uuid(uuid);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{uuid}\""));
    }
}
