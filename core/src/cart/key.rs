// cartstore/src/cart/key.rs

//! Cart key layout in the store: one hash per user under `cart:{user_id}`,
//! one field per product holding the quantity as a decimal integer string.

use std::time::Duration;

pub const CART_KEY_PREFIX: &str = "cart:";

/// Two days. Reset on every add or update.
pub const DEFAULT_CART_LIFETIME: Duration = Duration::from_secs(2 * 24 * 3600);

/// User ids are opaque identity-provider tokens, never request-supplied text,
/// so no escaping is applied.
pub fn cart_key(user_id: &str) -> String {
  format!("{CART_KEY_PREFIX}{user_id}")
}
