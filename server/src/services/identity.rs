// server/src/services/identity.rs

//! Delegated authentication.
//!
//! Accounts live with an external identity provider. The backend never sees
//! password hashes: it forwards sign-up / sign-in to the provider, verifies the
//! ID tokens it issues, and mirrors `{uid, email}` locally.
//!
//! `FirebaseIdentity` talks to the Identity Toolkit REST API
//! (`accounts:lookup`, `accounts:signUp`, `accounts:signInWithPassword`,
//! `accounts:delete`) and the Secure Token API for refresh. Token verification
//! is a provider round trip per request.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::errors::AppError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
  pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTokens {
  pub user_id: String,
  pub id_token: String,
  pub refresh_token: String,
  pub expires_in_secs: Option<u64>,
}

#[derive(Debug, Error)]
pub enum IdentityError {
  #[error("Invalid or expired token: {0}")]
  InvalidToken(String),

  #[error("Invalid credentials: {0}")]
  InvalidCredentials(String),

  #[error("Email already registered")]
  EmailExists,

  #[error("Request rejected by identity provider: {0}")]
  Rejected(String),

  #[error("Identity provider unreachable or misbehaving: {0}")]
  Provider(String),
}

impl From<IdentityError> for AppError {
  fn from(err: IdentityError) -> Self {
    match err {
      IdentityError::InvalidToken(m) => AppError::Auth(m),
      IdentityError::InvalidCredentials(m) => AppError::Auth(format!("Could not login: {}", m)),
      IdentityError::EmailExists => AppError::Conflict("Email already registered".to_string()),
      IdentityError::Rejected(m) => AppError::Validation(m),
      IdentityError::Provider(m) => AppError::Identity(m),
    }
  }
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
  async fn verify_token(&self, id_token: &str) -> Result<VerifiedIdentity, IdentityError>;

  async fn sign_up(&self, email: &str, password: &str) -> Result<SessionTokens, IdentityError>;

  async fn sign_in(&self, email: &str, password: &str) -> Result<SessionTokens, IdentityError>;

  async fn refresh(&self, refresh_token: &str) -> Result<SessionTokens, IdentityError>;

  /// Deletes the account the token belongs to.
  async fn delete_account(&self, id_token: &str) -> Result<(), IdentityError>;
}

// --- Wire types ---

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IdTokenRequest<'a> {
  id_token: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
  email: &'a str,
  password: &'a str,
  return_secure_token: bool,
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
  grant_type: &'a str,
  refresh_token: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupResponse {
  #[serde(default)]
  users: Vec<LookupUser>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupUser {
  local_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PasswordResponse {
  local_id: String,
  id_token: String,
  refresh_token: String,
  expires_in: Option<String>,
}

#[derive(Deserialize)]
struct RefreshResponse {
  user_id: String,
  id_token: String,
  refresh_token: String,
  expires_in: Option<String>,
}

#[derive(Deserialize)]
struct ProviderErrorEnvelope {
  error: ProviderErrorBody,
}

#[derive(Deserialize)]
struct ProviderErrorBody {
  message: String,
}

/// Which call produced an error reply; the same provider code means
/// different things for token checks and password sign-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Call {
  Verify,
  SignUp,
  SignIn,
  Refresh,
  Delete,
}

/// Maps a non-2xx provider reply to an `IdentityError`.
///
/// Provider messages look like `"WEAK_PASSWORD : Password should be at least
/// 6 characters"`; the code is the part before the colon.
fn classify_error(call: Call, status: u16, body: &str) -> IdentityError {
  let message = match serde_json::from_str::<ProviderErrorEnvelope>(body) {
    Ok(envelope) => envelope.error.message,
    Err(_) => return IdentityError::Provider(format!("HTTP {}: {}", status, body)),
  };
  let code = message.split(':').next().unwrap_or_default().trim().to_string();

  match code.as_str() {
    "EMAIL_EXISTS" => IdentityError::EmailExists,
    "INVALID_ID_TOKEN" | "TOKEN_EXPIRED" | "USER_NOT_FOUND" | "CREDENTIAL_TOO_OLD_LOGIN_AGAIN" => {
      IdentityError::InvalidToken(message)
    }
    "INVALID_REFRESH_TOKEN" | "INVALID_GRANT_TYPE" | "MISSING_REFRESH_TOKEN" => IdentityError::InvalidToken(message),
    "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" | "USER_DISABLED" => {
      if call == Call::Verify || call == Call::Refresh || call == Call::Delete {
        IdentityError::InvalidToken(message)
      } else {
        IdentityError::InvalidCredentials(message)
      }
    }
    "WEAK_PASSWORD" | "INVALID_EMAIL" | "MISSING_PASSWORD" | "MISSING_EMAIL" => IdentityError::Rejected(message),
    _ if status >= 500 => IdentityError::Provider(message),
    _ if call == Call::Verify => IdentityError::InvalidToken(message),
    _ => IdentityError::Provider(message),
  }
}

fn parse_expiry(raw: Option<String>) -> Option<u64> {
  raw.and_then(|s| s.parse().ok())
}

pub struct FirebaseIdentity {
  client: reqwest::Client,
  api_key: String,
  base_url: String,
  token_url: String,
}

impl FirebaseIdentity {
  pub fn new(client: reqwest::Client, api_key: String, base_url: String, token_url: String) -> Self {
    Self {
      client,
      api_key,
      base_url: base_url.trim_end_matches('/').to_string(),
      token_url,
    }
  }

  fn accounts_url(&self, method: &str) -> String {
    format!("{}/accounts:{}", self.base_url, method)
  }

  async fn post_json<B, R>(&self, call: Call, url: &str, body: &B) -> Result<R, IdentityError>
  where
    B: Serialize + ?Sized,
    R: for<'de> Deserialize<'de>,
  {
    let response = self
      .client
      .post(url)
      .query(&[("key", self.api_key.as_str())])
      .json(body)
      .send()
      .await
      .map_err(|e| IdentityError::Provider(e.to_string()))?;
    Self::read_reply(call, response).await
  }

  async fn read_reply<R>(call: Call, response: reqwest::Response) -> Result<R, IdentityError>
  where
    R: for<'de> Deserialize<'de>,
  {
    let status = response.status();
    let body = response.text().await.map_err(|e| IdentityError::Provider(e.to_string()))?;
    if !status.is_success() {
      let err = classify_error(call, status.as_u16(), &body);
      warn!(status = status.as_u16(), error = %err, "Identity provider rejected {:?} call.", call);
      return Err(err);
    }
    serde_json::from_str(&body).map_err(|e| IdentityError::Provider(format!("Unexpected reply: {}", e)))
  }

  async fn password_call(&self, call: Call, method: &str, email: &str, password: &str) -> Result<SessionTokens, IdentityError> {
    let request = PasswordRequest {
      email,
      password,
      return_secure_token: true,
    };
    let reply: PasswordResponse = self.post_json(call, &self.accounts_url(method), &request).await?;
    Ok(SessionTokens {
      user_id: reply.local_id,
      id_token: reply.id_token,
      refresh_token: reply.refresh_token,
      expires_in_secs: parse_expiry(reply.expires_in),
    })
  }
}

#[async_trait]
impl IdentityProvider for FirebaseIdentity {
  #[instrument(name = "identity::verify_token", skip_all, err(Display))]
  async fn verify_token(&self, id_token: &str) -> Result<VerifiedIdentity, IdentityError> {
    let reply: LookupResponse = self
      .post_json(Call::Verify, &self.accounts_url("lookup"), &IdTokenRequest { id_token })
      .await?;
    let user = reply
      .users
      .into_iter()
      .next()
      .ok_or_else(|| IdentityError::InvalidToken("Token does not belong to any account".to_string()))?;
    debug!(user_id = %user.local_id, "Token verified.");
    Ok(VerifiedIdentity {
      user_id: user.local_id,
    })
  }

  #[instrument(name = "identity::sign_up", skip(self, password), err(Display))]
  async fn sign_up(&self, email: &str, password: &str) -> Result<SessionTokens, IdentityError> {
    self.password_call(Call::SignUp, "signUp", email, password).await
  }

  #[instrument(name = "identity::sign_in", skip(self, password), err(Display))]
  async fn sign_in(&self, email: &str, password: &str) -> Result<SessionTokens, IdentityError> {
    self.password_call(Call::SignIn, "signInWithPassword", email, password).await
  }

  #[instrument(name = "identity::refresh", skip_all, err(Display))]
  async fn refresh(&self, refresh_token: &str) -> Result<SessionTokens, IdentityError> {
    let request = RefreshRequest {
      grant_type: "refresh_token",
      refresh_token,
    };
    let response = self
      .client
      .post(&self.token_url)
      .query(&[("key", self.api_key.as_str())])
      .form(&request)
      .send()
      .await
      .map_err(|e| IdentityError::Provider(e.to_string()))?;
    let reply: RefreshResponse = Self::read_reply(Call::Refresh, response).await?;
    Ok(SessionTokens {
      user_id: reply.user_id,
      id_token: reply.id_token,
      refresh_token: reply.refresh_token,
      expires_in_secs: parse_expiry(reply.expires_in),
    })
  }

  #[instrument(name = "identity::delete_account", skip_all, err(Display))]
  async fn delete_account(&self, id_token: &str) -> Result<(), IdentityError> {
    let _: serde_json::Value = self
      .post_json(Call::Delete, &self.accounts_url("delete"), &IdTokenRequest { id_token })
      .await?;
    Ok(())
  }
}
