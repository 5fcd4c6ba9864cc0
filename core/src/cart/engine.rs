// cartstore/src/cart/engine.rs

//! Cart operations over a `KvStore`.
//!
//! Consistency notes:
//!  - Increments of one product field serialize at the store, so concurrent
//!    adds of the same product never lose updates.
//!  - `add` is three store calls (increment, delete when the result is not
//!    positive, expire) and is NOT atomic as a whole. Two interleaved adds
//!    that both observe a transient non-positive value may leave a result
//!    that depends on arrival order. This window is accepted.
//!  - A concurrent `get_cart` may observe a partially applied mutation.
//!  - Nothing here is transactional: a request cancelled mid-operation keeps
//!    whatever store calls already completed.

use crate::cart::key::{cart_key, DEFAULT_CART_LIFETIME};
use crate::cart::view::Cart;
use crate::error::CartResult;
use crate::store::{KeyTtl, KvStore};

use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

#[derive(Clone)]
pub struct CartEngine {
  store: Arc<dyn KvStore>,
  lifetime: Duration,
}

impl fmt::Debug for CartEngine {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("CartEngine")
      .field("backend", &self.store.backend_name())
      .field("lifetime", &self.lifetime)
      .finish()
  }
}

impl CartEngine {
  /// Engine with the default two-day cart lifetime.
  pub fn new(store: Arc<dyn KvStore>) -> Self {
    Self::with_lifetime(store, DEFAULT_CART_LIFETIME)
  }

  pub fn with_lifetime(store: Arc<dyn KvStore>, lifetime: Duration) -> Self {
    Self { store, lifetime }
  }

  pub fn lifetime(&self) -> Duration {
    self.lifetime
  }

  pub fn store(&self) -> &Arc<dyn KvStore> {
    &self.store
  }

  /// Adds `delta` (which may be negative) to a product's quantity.
  ///
  /// A resulting quantity of zero or below removes the product. The cart's
  /// TTL is reset afterwards even when that removal emptied the cart.
  #[instrument(name = "CartEngine::add", skip(self), fields(backend = self.store.backend_name()), err(Display))]
  pub async fn add(&self, user_id: &str, product_id: &str, delta: i64) -> CartResult<()> {
    let key = cart_key(user_id);
    self.increment_and_refresh(&key, product_id, delta).await
  }

  /// Sets a product's quantity to exactly `quantity`; zero or below removes it.
  #[instrument(name = "CartEngine::update", skip(self), fields(backend = self.store.backend_name()), err(Display))]
  pub async fn update(&self, user_id: &str, product_id: &str, quantity: i64) -> CartResult<()> {
    let key = cart_key(user_id);
    if quantity <= 0 {
      let existed = self.store.hash_delete(&key, product_id).await?;
      debug!(existed, "Removed product from cart.");
    } else {
      self.store.hash_set(&key, product_id, quantity).await?;
      debug!("Set product quantity.");
    }
    self.refresh_lifetime(&key).await
  }

  /// Reads the whole cart. An expired or never-created cart is empty.
  #[instrument(name = "CartEngine::get_cart", skip(self), fields(backend = self.store.backend_name()), err(Display))]
  pub async fn get_cart(&self, user_id: &str) -> CartResult<Cart> {
    let key = cart_key(user_id);
    let entries = self.store.hash_get_all(&key).await?;
    let cart = Cart::decode(&key, entries)?;
    debug!(items = cart.len(), "Read cart.");
    Ok(cart)
  }

  /// Deletes the whole cart. Clearing an absent cart is a no-op.
  #[instrument(name = "CartEngine::clear_cart", skip(self), fields(backend = self.store.backend_name()), err(Display))]
  pub async fn clear_cart(&self, user_id: &str) -> CartResult<()> {
    let key = cart_key(user_id);
    let existed = self.store.delete(&key).await?;
    debug!(existed, "Cleared cart.");
    Ok(())
  }

  /// Remaining lifetime of the user's cart key, straight from the store.
  pub async fn time_to_live(&self, user_id: &str) -> CartResult<KeyTtl> {
    Ok(self.store.time_to_live(&cart_key(user_id)).await?)
  }

  // The full add sequence. A scripted server-side transaction can replace
  // this body without touching `add`.
  async fn increment_and_refresh(&self, key: &str, product_id: &str, delta: i64) -> CartResult<()> {
    let quantity = self.store.hash_increment(key, product_id, delta).await?;
    if quantity <= 0 {
      self.store.hash_delete(key, product_id).await?;
      debug!(quantity, "Quantity dropped to zero or below; removed product.");
    } else {
      debug!(quantity, "Incremented product quantity.");
    }
    self.refresh_lifetime(key).await
  }

  // Issued unconditionally after every mutation. When the mutation emptied
  // the hash the store has already dropped the key and this is a no-op.
  async fn refresh_lifetime(&self, key: &str) -> CartResult<()> {
    let applied = self.store.expire(key, self.lifetime).await?;
    debug!(applied, lifetime_secs = self.lifetime.as_secs(), "Refreshed cart lifetime.");
    Ok(())
  }
}
