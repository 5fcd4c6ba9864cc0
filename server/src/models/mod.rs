// server/src/models/mod.rs

//! Contains data structures representing database entities and their API views.

pub mod order;
pub mod order_item;
pub mod product;
pub mod user;

pub use order::{Order, OrderView, UserOrders};
pub use order_item::{OrderItem, OrderItemView, OrderLine};
pub use product::Product;
pub use user::User;
