// server/src/web/extractors.rs

//! Request extractors shared by the handlers.

use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;
use tracing::{debug, warn};

use crate::errors::AppError;
use crate::state::AppState;

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

/// Finds the caller's ID token: the `access_token` cookie wins, then an
/// `Authorization: Bearer` header.
pub fn credential_from_request(req: &HttpRequest) -> Option<String> {
  if let Some(cookie) = req.cookie(ACCESS_TOKEN_COOKIE) {
    if !cookie.value().is_empty() {
      return Some(cookie.value().to_string());
    }
  }

  let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
  let (scheme, token) = value.split_once(' ')?;
  let token = token.trim();
  if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
    Some(token.to_string())
  } else {
    None
  }
}

/// A caller whose ID token the identity provider accepted.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
  pub user_id: String,
  pub token: String,
}

impl FromRequest for AuthenticatedUser {
  type Error = AppError;
  type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let token = credential_from_request(req);
    let app_state = req.app_data::<web::Data<AppState>>().cloned();
    let path = req.path().to_string();

    Box::pin(async move {
      let app_state =
        app_state.ok_or_else(|| AppError::Internal("Application state is not registered".to_string()))?;
      let token = token.ok_or_else(|| {
        warn!(%path, "Request without credentials.");
        AppError::Auth("Not authenticated".to_string())
      })?;

      let identity = app_state.identity.verify_token(&token).await?;
      debug!(user_id = %identity.user_id, %path, "Caller authenticated.");
      Ok(AuthenticatedUser {
        user_id: identity.user_id,
        token,
      })
    })
  }
}
