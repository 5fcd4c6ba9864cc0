// server/src/lib.rs

//! storefront: the HTTP backend of a small online shop.
//!
//! Accounts are delegated to an external identity provider, the catalog and
//! orders live in PostgreSQL, and carts live in a key-value store through
//! `cartstore::CartEngine`.

pub mod config;
pub mod db;
pub mod errors;
pub mod models;
pub mod services;
pub mod startup;
pub mod state;
pub mod web;

pub use crate::config::{AppConfig, KvBackend};
pub use crate::errors::{AppError, Result};
pub use crate::state::AppState;
