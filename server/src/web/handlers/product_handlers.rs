// server/src/web/handlers/product_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, instrument, warn};

use crate::db;
use crate::errors::AppError;
use crate::state::AppState;

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;
pub const MAX_QUERY_LEN: usize = 200;

#[derive(Deserialize, Debug, Default)]
pub struct ListProductsQuery {
  pub skip: Option<i64>,
  pub limit: Option<i64>,
  /// Free-text search. Accepted and length-checked, not yet used for filtering.
  pub query: Option<String>,
}

impl ListProductsQuery {
  /// Applies defaults and bounds, returning `(skip, limit)`.
  pub fn page(&self) -> Result<(i64, i64), AppError> {
    let skip = self.skip.unwrap_or(0);
    if skip < 0 {
      return Err(AppError::Validation("skip must be greater than or equal to 0".to_string()));
    }
    let limit = self.limit.unwrap_or(DEFAULT_PAGE_SIZE);
    if !(1..=MAX_PAGE_SIZE).contains(&limit) {
      return Err(AppError::Validation(format!("limit must be between 1 and {}", MAX_PAGE_SIZE)));
    }
    if self.query.as_ref().is_some_and(|q| q.chars().count() > MAX_QUERY_LEN) {
      return Err(AppError::Validation(format!("query must be at most {} characters", MAX_QUERY_LEN)));
    }
    Ok((skip, limit))
  }
}

#[instrument(name = "handler::list_products", skip(app_state, query_params))]
pub async fn list_products_handler(
  app_state: web::Data<AppState>,
  query_params: web::Query<ListProductsQuery>,
) -> Result<HttpResponse, AppError> {
  let (skip, limit) = query_params.page()?;
  let products = db::products::list_products(&app_state.db_pool, skip, limit).await?;
  debug!("Fetched {} products (skip {}, limit {}).", products.len(), skip, limit);
  Ok(HttpResponse::Ok().json(products))
}

#[instrument(name = "handler::count_products", skip(app_state))]
pub async fn count_products_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let count = db::products::count_products(&app_state.db_pool).await?;
  Ok(HttpResponse::Ok().json(json!({ "count": count })))
}

#[instrument(name = "handler::get_product", skip(app_state, path), fields(product_id = %path.as_ref()))]
pub async fn get_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let product_id = path.into_inner();

  match db::products::find_product(&app_state.db_pool, &product_id).await? {
    Some(product) => {
      info!("Product {} fetched successfully.", product_id);
      Ok(HttpResponse::Ok().json(product))
    }
    None => {
      warn!("Product with ID {} not found.", product_id);
      Err(AppError::NotFound("Product not found".to_string()))
    }
  }
}
