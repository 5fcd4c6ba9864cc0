// server/src/web/routes.rs

use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::web::handlers::{auth_handlers, cart_handlers, order_handlers, product_handlers};

async fn hello_handler() -> HttpResponse {
  HttpResponse::Ok().json(json!({ "message": "Hello, world" }))
}

async fn health_check_handler() -> HttpResponse {
  HttpResponse::Ok().json(json!({ "status": "ok" }))
}

pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg.route("/", web::get().to(hello_handler)).service(
    web::scope("/api")
      .route("/health", web::get().to(health_check_handler))
      // Authentication
      .route("/signup", web::post().to(auth_handlers::signup_handler))
      .route("/login", web::post().to(auth_handlers::login_handler))
      .route("/logout", web::post().to(auth_handlers::logout_handler))
      .route("/refresh", web::get().to(auth_handlers::refresh_handler))
      .route("/is-logged-in", web::get().to(auth_handlers::is_logged_in_handler))
      .route("/ping", web::get().to(auth_handlers::ping_handler))
      .service(
        web::resource("/user")
          .route(web::get().to(auth_handlers::get_user_handler))
          .route(web::delete().to(auth_handlers::delete_user_handler)),
      )
      // Cart
      .service(
        web::resource("/cart")
          .route(web::post().to(cart_handlers::add_to_cart_handler))
          .route(web::put().to(cart_handlers::update_cart_handler))
          .route(web::get().to(cart_handlers::get_cart_handler))
          .route(web::delete().to(cart_handlers::clear_cart_handler)),
      )
      // Catalog; `/count` is registered before `/{product_id}` so it is not taken as an id.
      .service(
        web::scope("/products")
          .route("", web::get().to(product_handlers::list_products_handler))
          .route("/count", web::get().to(product_handlers::count_products_handler))
          .route("/{product_id}", web::get().to(product_handlers::get_product_handler)),
      )
      // Orders
      .service(
        web::resource("/orders")
          .route(web::post().to(order_handlers::create_order_handler))
          .route(web::get().to(order_handlers::list_orders_handler)),
      ),
  );
}
