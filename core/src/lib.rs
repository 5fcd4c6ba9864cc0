// src/lib.rs

//! cartstore: per-user shopping carts kept in a key-value store.
//!
//! A cart is a hash stored under `cart:{user_id}` mapping product ids to
//! positive integer quantities. The crate provides:
//!  - `CartEngine`, the add / update / read / clear operations with their
//!    removal rule (a quantity that reaches zero or below deletes the field).
//!  - Sliding expiry: every mutation resets the cart key's TTL to the cart
//!    lifetime (two days by default). Reads never touch the TTL.
//!  - The `KvStore` trait the engine is written against, with a Redis
//!    implementation for production and an in-process one for tests.
//!
//! The engine holds no state of its own. All cart data lives in the store, so
//! one engine can be cloned into every request handler.

pub mod cart;
pub mod error;
pub mod store;

// --- Re-exports for the Public API ---

pub use crate::cart::engine::CartEngine;
pub use crate::cart::key::{cart_key, CART_KEY_PREFIX, DEFAULT_CART_LIFETIME};
pub use crate::cart::view::Cart;

pub use crate::store::memory::MemoryStore;
pub use crate::store::redis_store::{RedisSettings, RedisStore};
pub use crate::store::{HashEntries, KeyTtl, KvStore};

pub use crate::error::{CartError, CartResult, StoreError, StoreResult};

/*
    Typical wiring:
    1. At process start, build one store: `RedisStore::connect(url, settings).await?`
       (or `MemoryStore::new()` for tests and local runs).
    2. Wrap it in an `Arc<dyn KvStore>` and hand it to `CartEngine::with_lifetime`.
    3. Clone the engine into request handlers; call `add`, `update`,
       `get_cart` and `clear_cart` with the authenticated user's id.
*/
