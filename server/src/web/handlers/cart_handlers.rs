// server/src/web/handlers/cart_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::models::OrderLine;
use crate::state::AppState;
use crate::web::AuthenticatedUser;

/// `quantity` is a signed delta: a negative value takes items out, and a
/// product whose total reaches zero or below leaves the cart.
#[instrument(
    name = "handler::add_to_cart",
    skip(app_state, req_payload, auth_user),
    fields(user_id = %auth_user.user_id, product_id = %req_payload.product_id, quantity = %req_payload.quantity)
)]
pub async fn add_to_cart_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<OrderLine>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  app_state
    .cart
    .add(&auth_user.user_id, &req_payload.product_id, req_payload.quantity)
    .await?;

  info!(
    "User {} added {} of product {} to their cart.",
    auth_user.user_id, req_payload.quantity, req_payload.product_id
  );
  Ok(HttpResponse::Ok().json(json!({"message": "Item added to cart successfully."})))
}

#[instrument(
    name = "handler::update_cart",
    skip(app_state, req_payload, auth_user),
    fields(user_id = %auth_user.user_id, product_id = %req_payload.product_id, quantity = %req_payload.quantity)
)]
pub async fn update_cart_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<OrderLine>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  app_state
    .cart
    .update(&auth_user.user_id, &req_payload.product_id, req_payload.quantity)
    .await?;

  info!(
    "User {} set product {} to quantity {}.",
    auth_user.user_id, req_payload.product_id, req_payload.quantity
  );
  Ok(HttpResponse::Ok().json(json!({"message": "Item quantity updated successfully."})))
}

#[instrument(name = "handler::get_cart", skip(app_state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn get_cart_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let cart = app_state.cart.get_cart(&auth_user.user_id).await?;
  Ok(HttpResponse::Ok().json(cart))
}

#[instrument(name = "handler::clear_cart", skip(app_state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn clear_cart_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  app_state.cart.clear_cart(&auth_user.user_id).await?;
  info!("Cart cleared for user {}.", auth_user.user_id);
  Ok(HttpResponse::Ok().json(json!({"message": "Item successfully removed from cart."})))
}
