// cartstore/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;

/// Failures raised by a `KvStore` implementation.
#[derive(Debug, Error)]
pub enum StoreError {
  #[error("Key-value backend failure. Source: {source}")]
  Backend {
    #[source]
    source: AnyhowError,
  },

  #[error("Hash field '{field}' at key '{key}' does not hold an integer")]
  NotAnInteger { key: String, field: String },

  #[error("Increment of hash field '{field}' at key '{key}' would overflow")]
  Overflow { key: String, field: String },

  #[error("Key '{key}' holds a value of the wrong type")]
  WrongType { key: String },
}

impl StoreError {
  pub fn backend(err: impl Into<AnyhowError>) -> Self {
    StoreError::Backend { source: err.into() }
  }
}

// Any redis failure without more specific context is a backend failure.
// RedisStore maps the server replies it understands before falling back here.
impl From<redis::RedisError> for StoreError {
  fn from(err: redis::RedisError) -> Self {
    StoreError::Backend { source: err.into() }
  }
}

/// Failures raised by `CartEngine` operations.
#[derive(Debug, Error)]
pub enum CartError {
  #[error("Cart store error: {0}")]
  Store(#[from] StoreError),

  #[error("Cart '{key}' holds a non-integer quantity for product '{product_id}': {raw:?}")]
  CorruptQuantity {
    key: String,
    product_id: String,
    raw: String,
  },
}

pub type StoreResult<T, E = StoreError> = std::result::Result<T, E>;
pub type CartResult<T, E = CartError> = std::result::Result<T, E>;
