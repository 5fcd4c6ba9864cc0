// server/src/services/mod.rs

pub mod identity;

pub use identity::{FirebaseIdentity, IdentityError, IdentityProvider, SessionTokens, VerifiedIdentity};
