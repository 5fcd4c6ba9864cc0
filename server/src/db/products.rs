// server/src/db/products.rs

use sqlx::PgPool;
use tracing::{error, instrument};

use crate::errors::{AppError, Result};
use crate::models::Product;

#[instrument(name = "db::list_products", skip(pool), err(Display))]
pub async fn list_products(pool: &PgPool, skip: i64, limit: i64) -> Result<Vec<Product>> {
  sqlx::query_as::<_, Product>(
    "SELECT id, name, description, price, author, image_url FROM products ORDER BY id ASC OFFSET $1 LIMIT $2",
  )
  .bind(skip)
  .bind(limit)
  .fetch_all(pool)
  .await
  .map_err(|e| {
    error!("Failed to fetch products from database: {}", e);
    AppError::Sqlx(e)
  })
}

#[instrument(name = "db::count_products", skip(pool), err(Display))]
pub async fn count_products(pool: &PgPool) -> Result<i64> {
  let count: i64 = sqlx::query_scalar("SELECT COUNT(id) FROM products")
    .fetch_one(pool)
    .await?;
  Ok(count)
}

#[instrument(name = "db::find_product", skip(pool), err(Display))]
pub async fn find_product(pool: &PgPool, product_id: &str) -> Result<Option<Product>> {
  sqlx::query_as::<_, Product>("SELECT id, name, description, price, author, image_url FROM products WHERE id = $1")
    .bind(product_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| {
      error!("Database error while fetching product {}: {}", product_id, e);
      AppError::Sqlx(e)
    })
}
