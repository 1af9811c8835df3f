//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::BytesRejection,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("unauthorized")]
  Unauthorized,

  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  /// The request was well-formed but carried nothing usable.
  #[error("unprocessable: {0}")]
  Unprocessable(String),

  #[error("payload too large: {0}")]
  PayloadTooLarge(String),

  #[error("internal error: {0}")]
  Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<certa_core::Error> for ApiError {
  fn from(e: certa_core::Error) -> Self {
    use certa_core::Error as E;
    match e {
      E::Unauthorized => Self::Unauthorized,
      E::NotFound(id) => Self::NotFound(format!("certificate {id} not found")),
      E::Invalid(msg) => Self::BadRequest(msg),
      other => Self::Internal(Box::new(other)),
    }
  }
}

impl From<BytesRejection> for ApiError {
  fn from(e: BytesRejection) -> Self {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
      Self::PayloadTooLarge(e.body_text())
    } else {
      Self::BadRequest(e.body_text())
    }
  }
}

impl From<certa_sheet::Error> for ApiError {
  fn from(e: certa_sheet::Error) -> Self {
    use certa_sheet::Error as E;
    match e {
      E::Service(inner) => inner.into(),
      E::EmptyImport => Self::Unprocessable(E::EmptyImport.to_string()),
      E::EmptySelection => Self::BadRequest(E::EmptySelection.to_string()),
      E::Workbook(inner) => Self::BadRequest(format!("unreadable workbook: {inner}")),
      other => Self::Internal(Box::new(other)),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized".to_owned()),
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Unprocessable(m) => (StatusCode::UNPROCESSABLE_ENTITY, m.clone()),
      ApiError::PayloadTooLarge(m) => (StatusCode::PAYLOAD_TOO_LARGE, m.clone()),
      ApiError::Internal(e) => {
        tracing::error!(error = %e, "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_owned())
      }
    };

    let mut res = (status, Json(json!({ "error": message }))).into_response();
    if status == StatusCode::UNAUTHORIZED {
      res.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static("Basic realm=\"certa\""),
      );
    }
    res
  }
}
