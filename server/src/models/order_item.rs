// server/src/models/order_item.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::product::Product;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OrderItem {
  pub id: Uuid,
  pub order_id: Uuid,
  pub product_id: String,
  pub quantity: i32,
}

/// One `{product_id, quantity}` pair in a request body (cart and order payloads share it).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
  pub product_id: String,
  pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderItemView {
  pub quantity: i32,
  pub product: Product,
}
