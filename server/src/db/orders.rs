// server/src/db/orders.rs

use std::collections::HashMap;

use sqlx::{FromRow, PgPool};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::db::is_foreign_key_violation;
use crate::errors::{AppError, Result};
use crate::models::{Order, OrderItem, OrderItemView, OrderLine, OrderView, Product, User, UserOrders};

/// Creates an order and all of its items in one transaction.
///
/// An unknown product rolls the whole order back and surfaces as a
/// validation error naming that product.
#[instrument(name = "db::create_order", skip(pool, lines), fields(items = lines.len()), err(Display))]
pub async fn create_order(pool: &PgPool, user_id: &str, lines: &[OrderLine]) -> Result<(Order, Vec<OrderItem>)> {
  let mut tx = pool.begin().await?;

  let order = sqlx::query_as::<_, Order>(
    "INSERT INTO orders (id, user_id, created_at) VALUES ($1, $2, NOW()) RETURNING id, user_id, created_at",
  )
  .bind(Uuid::new_v4())
  .bind(user_id)
  .fetch_one(&mut *tx)
  .await
  .map_err(|e| {
    if is_foreign_key_violation(&e) {
      warn!("Order placed by user {} who has no local record.", user_id);
      AppError::NotFound("User not found".to_string())
    } else {
      AppError::Sqlx(e)
    }
  })?;

  let mut items = Vec::with_capacity(lines.len());
  for line in lines {
    let quantity = i32::try_from(line.quantity).map_err(|_| {
      AppError::Validation(format!("Quantity {} for product {} is out of range", line.quantity, line.product_id))
    })?;

    let item = sqlx::query_as::<_, OrderItem>(
      "INSERT INTO order_items (id, order_id, product_id, quantity) VALUES ($1, $2, $3, $4) \
       RETURNING id, order_id, product_id, quantity",
    )
    .bind(Uuid::new_v4())
    .bind(order.id)
    .bind(&line.product_id)
    .bind(quantity)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
      if is_foreign_key_violation(&e) {
        AppError::Validation(format!("Product {} does not exist", line.product_id))
      } else {
        error!("Failed to insert item {} for order {}: {}", line.product_id, order.id, e);
        AppError::Sqlx(e)
      }
    })?;
    items.push(item);
  }

  tx.commit().await?;
  info!("Order {} created for user {} with {} items.", order.id, user_id, items.len());
  Ok((order, items))
}

#[derive(FromRow)]
struct OrderItemRow {
  order_id: Uuid,
  quantity: i32,
  #[sqlx(flatten)]
  product: Product,
}

/// Loads the user with every order they placed, newest first. `None` when
/// the user has no local record.
#[instrument(name = "db::list_user_orders", skip(pool), err(Display))]
pub async fn list_user_orders(pool: &PgPool, user_id: &str) -> Result<Option<UserOrders>> {
  let Some(user) = sqlx::query_as::<_, User>("SELECT id, email FROM users WHERE id = $1")
    .bind(user_id)
    .fetch_optional(pool)
    .await?
  else {
    return Ok(None);
  };

  let orders = sqlx::query_as::<_, Order>(
    "SELECT id, user_id, created_at FROM orders WHERE user_id = $1 ORDER BY created_at DESC, id ASC",
  )
  .bind(user_id)
  .fetch_all(pool);

  let item_rows = sqlx::query_as::<_, OrderItemRow>(
    r#"
    SELECT oi.order_id, oi.quantity,
           p.id, p.name, p.description, p.price, p.author, p.image_url
    FROM order_items oi
    JOIN orders o ON o.id = oi.order_id
    JOIN products p ON p.id = oi.product_id
    WHERE o.user_id = $1
    ORDER BY oi.order_id, p.id
    "#,
  )
  .bind(user_id)
  .fetch_all(pool);

  let (orders, item_rows) = tokio::try_join!(orders, item_rows)?;

  let mut items_by_order: HashMap<Uuid, Vec<OrderItemView>> = HashMap::new();
  for row in item_rows {
    items_by_order.entry(row.order_id).or_default().push(OrderItemView {
      quantity: row.quantity,
      product: row.product,
    });
  }

  Ok(Some(assemble_user_orders(user, orders, items_by_order)))
}

fn assemble_user_orders(user: User, orders: Vec<Order>, mut items_by_order: HashMap<Uuid, Vec<OrderItemView>>) -> UserOrders {
  let orders = orders
    .into_iter()
    .map(|order| OrderView {
      id: order.id,
      order_items: items_by_order.remove(&order.id).unwrap_or_default(),
      purchase_date: order.created_at,
    })
    .collect();

  UserOrders {
    id: user.id,
    email: user.email,
    orders,
  }
}
