// cartstore/src/cart/view.rs
use crate::error::{CartError, CartResult};
use crate::store::HashEntries;

use serde::Serialize;
use std::collections::BTreeMap;

/// A decoded cart: product id -> quantity.
///
/// Serializes as a plain JSON object (`{"prod1": 1, "prod2": 3}`), which is
/// the body of `GET /cart`. Entries are ordered by product id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Cart(BTreeMap<String, i64>);

impl Cart {
  pub fn new() -> Self {
    Self::default()
  }

  /// Decodes a raw hash read. A missing key is an empty cart; a field that
  /// does not parse as an integer fails the whole read.
  pub(crate) fn decode(key: &str, entries: HashEntries) -> CartResult<Self> {
    let fields = match entries {
      HashEntries::Missing => return Ok(Self::new()),
      HashEntries::Present(fields) => fields,
    };

    fields
      .into_iter()
      .map(|(product_id, raw)| match raw.trim().parse::<i64>() {
        Ok(quantity) => Ok((product_id, quantity)),
        Err(_) => Err(CartError::CorruptQuantity {
          key: key.to_string(),
          product_id,
          raw,
        }),
      })
      .collect::<CartResult<BTreeMap<_, _>>>()
      .map(Cart)
  }

  pub fn get(&self, product_id: &str) -> Option<i64> {
    self.0.get(product_id).copied()
  }

  pub fn contains(&self, product_id: &str) -> bool {
    self.0.contains_key(product_id)
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  /// Sum of all quantities (the badge count a storefront header shows).
  pub fn total_quantity(&self) -> i64 {
    self.0.values().sum()
  }
}

impl<K: Into<String>> FromIterator<(K, i64)> for Cart {
  fn from_iter<I: IntoIterator<Item = (K, i64)>>(iter: I) -> Self {
    Cart(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
  }
}
