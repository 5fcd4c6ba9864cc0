// server/src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::db;
use crate::errors::AppError;
use crate::models::OrderLine;
use crate::state::AppState;
use crate::web::AuthenticatedUser;

#[instrument(
    name = "handler::create_order",
    skip(app_state, req_payload, auth_user),
    fields(user_id = %auth_user.user_id, items = req_payload.len())
)]
pub async fn create_order_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<Vec<OrderLine>>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  if let Some(line) = req_payload.iter().find(|line| line.quantity <= 0) {
    return Err(AppError::Validation(format!(
      "Quantity for product {} must be positive",
      line.product_id
    )));
  }

  let (order, items) = db::orders::create_order(&app_state.db_pool, &auth_user.user_id, &req_payload).await?;
  info!("User {} placed order {} with {} items.", auth_user.user_id, order.id, items.len());
  Ok(HttpResponse::Ok().json(json!({"message": "Your order has been placed successfully."})))
}

#[instrument(name = "handler::list_orders", skip(app_state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn list_orders_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  match db::orders::list_user_orders(&app_state.db_pool, &auth_user.user_id).await? {
    Some(user_orders) => Ok(HttpResponse::Ok().json(user_orders)),
    None => {
      warn!("Orders requested by user {} who has no local record.", auth_user.user_id);
      Err(AppError::NotFound("User not found".to_string()))
    }
  }
}
