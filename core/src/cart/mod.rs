// cartstore/src/cart/mod.rs
pub mod engine;
pub mod key;
pub mod view;
