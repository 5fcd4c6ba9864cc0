// server/src/models/order.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::order_item::OrderItemView;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Order {
  pub id: Uuid,
  pub user_id: String,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderView {
  pub id: Uuid,
  pub order_items: Vec<OrderItemView>,
  pub purchase_date: DateTime<Utc>,
}

/// Body of `GET /orders`: the user with every order they placed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserOrders {
  pub id: String,
  pub email: String,
  pub orders: Vec<OrderView>,
}
