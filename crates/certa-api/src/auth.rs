//! HTTP Basic-auth extractor.
//!
//! A request without an `Authorization` header is anonymous. A header that is
//! present but malformed, or whose credentials the [`IdentityProvider`]
//! rejects, fails the request with `401`.

use std::sync::Arc;

use axum::{
  extract::{FromRef, FromRequestParts},
  http::{HeaderMap, header, request::Parts},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use certa_core::actor::{Actor, Credentials, IdentityProvider};

use crate::error::ApiError;

/// The caller's actor, or `None` when the request carried no credentials.
#[derive(Debug, Clone)]
pub struct MaybeActor(pub Option<Actor>);

impl MaybeActor {
  pub fn actor(&self) -> Option<&Actor> { self.0.as_ref() }

  /// The actor, or `401` for anonymous callers.
  pub fn require(&self) -> Result<&Actor, ApiError> {
    self.0.as_ref().ok_or(ApiError::Unauthorized)
  }
}

/// Decode `Authorization: Basic …`. `Ok(None)` when the header is absent.
pub fn basic_credentials(headers: &HeaderMap) -> Result<Option<Credentials>, ApiError> {
  let Some(value) = headers.get(header::AUTHORIZATION) else {
    return Ok(None);
  };
  let value = value.to_str().map_err(|_| ApiError::Unauthorized)?;
  let encoded = value.strip_prefix("Basic ").ok_or(ApiError::Unauthorized)?;

  let decoded = B64.decode(encoded.trim()).map_err(|_| ApiError::Unauthorized)?;
  let creds = String::from_utf8(decoded).map_err(|_| ApiError::Unauthorized)?;
  let (username, password) = creds.split_once(':').ok_or(ApiError::Unauthorized)?;

  Ok(Some(Credentials {
    username: username.to_owned(),
    password: password.to_owned(),
  }))
}

impl<St> FromRequestParts<St> for MaybeActor
where
  Arc<dyn IdentityProvider>: FromRef<St>,
  St: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request_parts(parts: &mut Parts, state: &St) -> Result<Self, Self::Rejection> {
    let Some(creds) = basic_credentials(&parts.headers)? else {
      return Ok(MaybeActor(None));
    };
    let identity = Arc::<dyn IdentityProvider>::from_ref(state);
    match identity.authenticate(&creds) {
      Some(actor) => Ok(MaybeActor(Some(actor))),
      None => {
        tracing::warn!(username = %creds.username, "rejected credentials");
        Err(ApiError::Unauthorized)
      }
    }
  }
}
