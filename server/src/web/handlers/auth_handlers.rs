// server/src/web/handlers/auth_handlers.rs

use actix_web::cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error, info, instrument, warn};

use crate::config::AppConfig;
use crate::db;
use crate::errors::AppError;
use crate::services::{IdentityError, SessionTokens};
use crate::state::AppState;
use crate::web::extractors::{ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE};
use crate::web::AuthenticatedUser;

// --- Request DTOs ---
#[derive(Deserialize, Debug)]
pub struct SignupRequestPayload {
  pub email: String,
  pub password: String,
}

/// OAuth2 password form: `username` carries the email.
#[derive(Deserialize, Debug)]
pub struct LoginForm {
  pub username: String,
  pub password: String,
}

// --- Cookies ---

fn auth_cookie(name: &'static str, value: String, max_age: Option<CookieDuration>, config: &AppConfig) -> Cookie<'static> {
  // Browsers drop SameSite=None cookies that are not Secure.
  let same_site = if config.cookie_secure { SameSite::None } else { SameSite::Lax };
  let mut cookie = Cookie::build(name, value)
    .path("/")
    .http_only(true)
    .secure(config.cookie_secure)
    .same_site(same_site)
    .finish();
  if let Some(max_age) = max_age {
    cookie.set_max_age(max_age);
  }
  cookie
}

/// Max-age of the access cookie: the configured value, cut short when the
/// provider says the token expires sooner.
fn access_cookie_max_age(provider_expiry_secs: Option<u64>, config: &AppConfig) -> CookieDuration {
  let configured = config.access_token_max_age.as_secs();
  let secs = provider_expiry_secs.map_or(configured, |expiry| expiry.min(configured));
  CookieDuration::seconds(i64::try_from(secs).unwrap_or(i64::MAX))
}

fn access_cookie(tokens: &SessionTokens, config: &AppConfig) -> Cookie<'static> {
  let max_age = access_cookie_max_age(tokens.expires_in_secs, config);
  auth_cookie(ACCESS_TOKEN_COOKIE, tokens.id_token.clone(), Some(max_age), config)
}

fn removal_cookie(name: &'static str) -> Cookie<'static> {
  let mut cookie = Cookie::build(name, "").path("/").finish();
  cookie.make_removal();
  cookie
}

// --- Handler Implementations ---

#[instrument(
    name = "handler::signup",
    skip(app_state, req_payload),
    fields(req_email = %req_payload.email)
)]
pub async fn signup_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<SignupRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let SignupRequestPayload { email, password } = req_payload.into_inner();

  let tokens = match app_state.identity.sign_up(&email, &password).await {
    Ok(tokens) => tokens,
    Err(IdentityError::EmailExists) => {
      warn!("Signup rejected, {} is already registered.", email);
      return Err(AppError::Conflict(format!("Account already created for the email {}", email)));
    }
    Err(e) => return Err(e.into()),
  };

  if let Err(db_err) = db::users::insert_user(&app_state.db_pool, &tokens.user_id, &email).await {
    // Undo the provider account so the email can sign up again.
    if let Err(cleanup_err) = app_state.identity.delete_account(&tokens.id_token).await {
      error!(
        "Could not remove provider account {} after a failed local insert: {}",
        tokens.user_id, cleanup_err
      );
    }
    return Err(db_err);
  }

  info!("Signup successful for {}. User ID: {}", email, tokens.user_id);
  Ok(HttpResponse::Ok().json(json!({
      "message": format!("Account created successfully for user {}", tokens.user_id)
  })))
}

#[instrument(name = "handler::login", skip(app_state, form), fields(req_email = %form.username))]
pub async fn login_handler(
  app_state: web::Data<AppState>,
  form: web::Form<LoginForm>,
) -> Result<HttpResponse, AppError> {
  let tokens = app_state.identity.sign_in(&form.username, &form.password).await?;
  let config = &app_state.config;

  info!("User {} logged in.", tokens.user_id);
  Ok(
    HttpResponse::Ok()
      .cookie(access_cookie(&tokens, config))
      .cookie(auth_cookie(REFRESH_TOKEN_COOKIE, tokens.refresh_token, None, config))
      .json(json!({"message": "Logged in and token set in cookie"})),
  )
}

#[instrument(name = "handler::logout")]
pub async fn logout_handler() -> HttpResponse {
  HttpResponse::Ok()
    .cookie(removal_cookie(ACCESS_TOKEN_COOKIE))
    .cookie(removal_cookie(REFRESH_TOKEN_COOKIE))
    .json(json!({"message": "Logged out and token removed from cookie"}))
}

/// Exchanges the caller's `refresh_token` cookie for a fresh ID token. The
/// new tokens are also written back as cookies.
#[instrument(name = "handler::refresh", skip(app_state, req, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn refresh_handler(
  app_state: web::Data<AppState>,
  req: HttpRequest,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let refresh_token = req
    .cookie(REFRESH_TOKEN_COOKIE)
    .map(|c| c.value().to_string())
    .filter(|v| !v.is_empty())
    .ok_or_else(|| AppError::Validation("refresh_token is missing".to_string()))?;

  let tokens = app_state.identity.refresh(&refresh_token).await?;
  if tokens.user_id != auth_user.user_id {
    warn!("Refresh token belongs to {}, not the caller.", tokens.user_id);
    return Err(AppError::Auth("Refresh token does not belong to the caller".to_string()));
  }

  let config = &app_state.config;
  Ok(
    HttpResponse::Ok()
      .cookie(access_cookie(&tokens, config))
      .cookie(auth_cookie(REFRESH_TOKEN_COOKIE, tokens.refresh_token, None, config))
      .json(json!({"access_token": tokens.id_token, "token_type": "bearer"})),
  )
}

/// Reports whether the `access_token` cookie holds a valid token. Never fails.
#[instrument(name = "handler::is_logged_in", skip(app_state, req))]
pub async fn is_logged_in_handler(app_state: web::Data<AppState>, req: HttpRequest) -> HttpResponse {
  let logged_in = match req.cookie(ACCESS_TOKEN_COOKIE) {
    Some(cookie) if !cookie.value().is_empty() => match app_state.identity.verify_token(cookie.value()).await {
      Ok(_) => true,
      Err(e) => {
        debug!("Access cookie rejected: {}", e);
        false
      }
    },
    _ => false,
  };
  HttpResponse::Ok().json(json!({ "isLoggedIn": logged_in }))
}

#[instrument(name = "handler::ping", skip(auth_user))]
pub async fn ping_handler(auth_user: AuthenticatedUser) -> HttpResponse {
  HttpResponse::Ok().json(json!({ "user_id": auth_user.user_id }))
}

#[instrument(name = "handler::get_user", skip(app_state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn get_user_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let user = db::users::find_user(&app_state.db_pool, &auth_user.user_id)
    .await?
    .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
  Ok(HttpResponse::Ok().json(user))
}

#[instrument(name = "handler::delete_user", skip(app_state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn delete_user_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  if db::users::find_user(&app_state.db_pool, &auth_user.user_id).await?.is_none() {
    return Err(AppError::NotFound("User not found".to_string()));
  }

  app_state.identity.delete_account(&auth_user.token).await?;
  db::users::delete_user(&app_state.db_pool, &auth_user.user_id).await?;

  info!("User {} deleted.", auth_user.user_id);
  Ok(HttpResponse::Ok().json(json!({"message": "User successfully deleted."})))
}
