//! # Persisted Envelope
//!
//! The stored document wraps the snapshot with a schema version:
//!
//! ```json
//! {
//!   "state": { "cartItems": [...], "isCartOpen": false },
//!   "version": 0
//! }
//! ```
//!
//! ## Decode Decision
//! ```text
//! raw text ──► parse envelope ──┬─ fails ───────────────► Err(Deserialization)
//!                               │
//!                               ├─ version == expected ──► decode state
//!                               │
//!                               └─ version != expected ─┬─ migrate set ──► migrate(state, version)
//!                                                       └─ no migrate ───► Err(VersionMismatch)
//! ```
//!
//! The store maps every `Err` here to "start from the default snapshot".

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cart::CartSnapshot;
use crate::error::{CoreError, CoreResult};

/// Migration hook: receives the raw persisted `state` and the version it
/// was written with, returns a snapshot for the current version.
pub type MigrateFn = dyn Fn(Value, u32) -> CoreResult<CartSnapshot> + Send + Sync;

/// The stored document. `S` is the snapshot type, or `Value` while the
/// version has not been checked yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedEnvelope<S = CartSnapshot> {
    pub state: S,
    #[serde(default)]
    pub version: u32,
}

/// Result of a successful decode.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub snapshot: CartSnapshot,
    /// True when the state went through a migration and should be written
    /// back under the current version.
    pub migrated: bool,
}

/// Serializes a snapshot under `version`.
pub fn encode(snapshot: &CartSnapshot, version: u32) -> CoreResult<String> {
    let envelope = PersistedEnvelope {
        state: snapshot,
        version,
    };
    serde_json::to_string(&envelope).map_err(CoreError::Serialization)
}

/// Parses stored text and resolves it to a snapshot for `expected_version`.
pub fn decode(
    raw: &str,
    expected_version: u32,
    migrate: Option<&MigrateFn>,
) -> CoreResult<Decoded> {
    let envelope: PersistedEnvelope<Value> =
        serde_json::from_str(raw).map_err(CoreError::Deserialization)?;

    if envelope.version == expected_version {
        let snapshot =
            serde_json::from_value(envelope.state).map_err(CoreError::Deserialization)?;
        return Ok(Decoded {
            snapshot,
            migrated: false,
        });
    }

    match migrate {
        Some(migrate) => Ok(Decoded {
            snapshot: migrate(envelope.state, envelope.version)?,
            migrated: true,
        }),
        None => Err(CoreError::VersionMismatch {
            stored: envelope.version,
            expected: expected_version,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CartItem;

    fn sample() -> CartSnapshot {
        let mut cart = CartSnapshot::new();
        cart.add_item(CartItem::new("123", "Product 1").with_price(10.0));
        cart.add_item(CartItem::new(456_i64, "Product 2"));
        cart.toggle();
        cart
    }

    #[test]
    fn test_encode_layout() {
        let raw = encode(&sample(), 3).unwrap();
        let json: Value = serde_json::from_str(&raw).unwrap();

        assert_eq!(json["version"], 3);
        assert_eq!(json["state"]["isCartOpen"], true);
        assert_eq!(json["state"]["cartItems"][0]["productId"], "123");
        assert_eq!(json["state"]["cartItems"][1]["productId"], 456);
    }

    #[test]
    fn test_round_trip() {
        let raw = encode(&sample(), 0).unwrap();
        let decoded = decode(&raw, 0, None).unwrap();

        assert_eq!(decoded.snapshot, sample());
        assert!(!decoded.migrated);
    }

    #[test]
    fn test_fractional_product_id_survives_decode() {
        let raw = r#"{"state":{"cartItems":[{"productId":1.5,"name":"Half","quantity":2}],"isCartOpen":true},"version":0}"#;
        let decoded = decode(raw, 0, None).unwrap();

        assert_eq!(decoded.snapshot.item_count(), 1);
        assert_eq!(decoded.snapshot.cart_items[0].product_id.to_string(), "1.5");
        assert!(decoded.snapshot.is_cart_open);
    }

    #[test]
    fn test_missing_version_reads_as_zero() {
        let raw = r#"{"state":{"cartItems":[],"isCartOpen":true}}"#;
        let decoded = decode(raw, 0, None).unwrap();
        assert!(decoded.snapshot.is_cart_open);
    }

    #[test]
    fn test_malformed_text_is_error() {
        assert!(matches!(
            decode("not json", 0, None),
            Err(CoreError::Deserialization(_))
        ));
        assert!(matches!(
            decode(r#"{"version":0}"#, 0, None),
            Err(CoreError::Deserialization(_))
        ));
    }

    #[test]
    fn test_malformed_item_is_error() {
        let raw = r#"{"state":{"cartItems":[{"productId":"1","name":"x"}]},"version":0}"#;
        assert!(matches!(
            decode(raw, 0, None),
            Err(CoreError::Deserialization(_))
        ));
    }

    #[test]
    fn test_version_mismatch_without_migrate() {
        let raw = encode(&sample(), 1).unwrap();
        assert!(matches!(
            decode(&raw, 2, None),
            Err(CoreError::VersionMismatch {
                stored: 1,
                expected: 2
            })
        ));
    }

    #[test]
    fn test_version_mismatch_with_migrate() {
        let raw = r#"{"state":{"items":[{"id":"9","title":"Old"}]},"version":1}"#;
        let migrate: &MigrateFn = &|state, from| {
            assert_eq!(from, 1);
            let mut cart = CartSnapshot::new();
            for old in state["items"].as_array().into_iter().flatten() {
                let id = old["id"].as_str().unwrap_or_default();
                let title = old["title"].as_str().unwrap_or_default();
                cart.add_item(CartItem::new(id, title));
            }
            Ok(cart)
        };

        let decoded = decode(raw, 2, Some(migrate)).unwrap();
        assert!(decoded.migrated);
        assert_eq!(decoded.snapshot.cart_items[0].name, "Old");
    }
}
