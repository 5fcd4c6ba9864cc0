// server/src/errors.rs

use actix_web::{HttpResponse, ResponseError};
use cartstore::{CartError, StoreError};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Authentication Failed: {0}")]
  Auth(String),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Conflict: {0}")]
  Conflict(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Migration Error: {0}")]
  Migrate(#[from] sqlx::migrate::MigrateError),

  #[error("Cart Error: {0}")]
  Cart(#[from] CartError),

  #[error("Identity Provider Error: {0}")]
  Identity(String),

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

// Allow anyhow::Error to be converted into AppError::Internal for convenience in handlers
impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    match err.downcast::<sqlx::Error>() {
      Ok(sqlx_err) => AppError::Sqlx(sqlx_err),
      Err(err) => AppError::Internal(err.to_string()),
    }
  }
}

impl ResponseError for AppError {
  fn error_response(&self) -> HttpResponse {
    // Log the full error when it's turned into a response
    tracing::error!(application_error = %self, "Responding with error");
    match self {
      AppError::Validation(m) => HttpResponse::BadRequest().json(json!({"detail": m})),
      AppError::Auth(m) => HttpResponse::Unauthorized().json(json!({"detail": format!("Unauthorized: {}", m)})),
      AppError::NotFound(m) => HttpResponse::NotFound().json(json!({"detail": m})),
      AppError::Conflict(m) => HttpResponse::Conflict().json(json!({"detail": m})),
      AppError::Config(_) => HttpResponse::InternalServerError().json(json!({"detail": "Configuration issue"})),
      AppError::Sqlx(_) | AppError::Migrate(_) => {
        HttpResponse::InternalServerError().json(json!({"detail": "Database operation failed"}))
      }
      // Only a backend failure is an outage; the other store errors come from the request or the stored data.
      AppError::Cart(CartError::Store(StoreError::Backend { .. })) => {
        HttpResponse::ServiceUnavailable().json(json!({"detail": "Cart store unavailable"}))
      }
      AppError::Cart(CartError::Store(StoreError::Overflow { field, .. })) => {
        HttpResponse::BadRequest().json(json!({"detail": format!("Quantity for product {} is out of range", field)}))
      }
      AppError::Cart(CartError::Store(StoreError::NotAnInteger { .. } | StoreError::WrongType { .. }))
      | AppError::Cart(CartError::CorruptQuantity { .. }) => {
        HttpResponse::InternalServerError().json(json!({"detail": "Cart data is corrupted"}))
      }
      AppError::Identity(_) => HttpResponse::BadGateway().json(json!({"detail": "Identity provider error"})),
      AppError::Internal(_) => {
        HttpResponse::InternalServerError().json(json!({"detail": "An internal error occurred"}))
      }
    }
  }
}

// Define a Result type alias for the application
pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use super::*;
  use actix_web::body::to_bytes;
  use actix_web::http::StatusCode;

  #[test]
  fn status_codes_follow_error_kind() {
    let cases = [
      (AppError::Validation("bad".into()), StatusCode::BAD_REQUEST),
      (AppError::Auth("no token".into()), StatusCode::UNAUTHORIZED),
      (AppError::NotFound("Product not found".into()), StatusCode::NOT_FOUND),
      (AppError::Conflict("exists".into()), StatusCode::CONFLICT),
      (AppError::Identity("down".into()), StatusCode::BAD_GATEWAY),
      (
        AppError::Cart(CartError::Store(StoreError::backend(anyhow::anyhow!("refused")))),
        StatusCode::SERVICE_UNAVAILABLE,
      ),
      (
        AppError::Cart(CartError::Store(StoreError::Overflow {
          key: "cart:u".into(),
          field: "p".into(),
        })),
        StatusCode::BAD_REQUEST,
      ),
      (
        AppError::Cart(CartError::Store(StoreError::NotAnInteger {
          key: "cart:u".into(),
          field: "p".into(),
        })),
        StatusCode::INTERNAL_SERVER_ERROR,
      ),
      (
        AppError::Cart(CartError::Store(StoreError::WrongType { key: "cart:u".into() })),
        StatusCode::INTERNAL_SERVER_ERROR,
      ),
      (
        AppError::Cart(CartError::CorruptQuantity {
          key: "cart:u".into(),
          product_id: "p".into(),
          raw: "x".into(),
        }),
        StatusCode::INTERNAL_SERVER_ERROR,
      ),
    ];
    for (err, status) in cases {
      assert_eq!(err.error_response().status(), status, "{}", err);
    }
  }

  #[actix_rt::test]
  async fn server_error_bodies_do_not_leak_internals() {
    let errors = [
      AppError::Cart(CartError::Store(StoreError::backend(anyhow::anyhow!("refused by cart:user1")))),
      AppError::Cart(CartError::Store(StoreError::WrongType { key: "cart:user1".into() })),
      AppError::Internal("cart:user1 exploded".into()),
      AppError::Identity("upstream cart:user1".into()),
    ];
    for err in errors {
      let body = to_bytes(err.error_response().into_body()).await.unwrap();
      let text = String::from_utf8(body.to_vec()).unwrap();
      assert!(!text.contains("cart:user1"), "{}", text);
      assert!(!text.contains("reason"), "{}", text);
    }
  }

  #[test]
  fn anyhow_wrapping_sqlx_error_stays_a_database_error() {
    let err: AppError = anyhow::Error::new(sqlx::Error::RowNotFound).into();
    assert!(matches!(err, AppError::Sqlx(sqlx::Error::RowNotFound)));
  }
}
