//! JSON REST API for Certa.
//!
//! Exposes an axum [`Router`] backed by a [`CertificateService`] over any
//! [`certa_core::store::CertificateStore`]. Credentials are resolved through
//! an [`IdentityProvider`]; TLS and transport concerns are the caller's
//! responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", certa_api::api_router(state))
//! ```

pub mod auth;
pub mod certificates;
pub mod error;

use std::sync::Arc;

use axum::{
  Router,
  extract::{DefaultBodyLimit, FromRef},
  routing::{get, post},
};
use certa_core::{actor::IdentityProvider, service::CertificateService, store::CertificateStore};

pub use error::ApiError;

/// Shared state threaded through the API handlers.
pub struct ApiState<S> {
  pub service:          CertificateService<S>,
  pub identity:         Arc<dyn IdentityProvider>,
  /// Origin used to build viewer links, e.g. `https://certs.example.org`.
  pub public_origin:    Arc<str>,
  /// Largest workbook accepted by `POST /certificates/import`.
  pub max_import_bytes: usize,
}

/// Default for [`ApiState::max_import_bytes`]: 64 MiB.
pub const DEFAULT_MAX_IMPORT_BYTES: usize = 64 * 1024 * 1024;

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self {
      service:          self.service.clone(),
      identity:         Arc::clone(&self.identity),
      public_origin:    Arc::clone(&self.public_origin),
      max_import_bytes: self.max_import_bytes,
    }
  }
}

impl<S> FromRef<ApiState<S>> for Arc<dyn IdentityProvider> {
  fn from_ref(state: &ApiState<S>) -> Self { Arc::clone(&state.identity) }
}

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: ApiState<S>) -> Router<()>
where
  S: CertificateStore + 'static,
{
  use certificates as c;

  let import_limit = DefaultBodyLimit::max(state.max_import_bytes);

  Router::new()
    .route("/config", get(c::public_config::<S>))
    .route("/certificates", get(c::list::<S>).post(c::create::<S>))
    .route("/certificates/bulk", post(c::bulk::<S>))
    .route("/certificates/import", post(c::import::<S>).layer(import_limit))
    .route("/certificates/export", post(c::export::<S>))
    .route(
      "/certificates/{id}",
      get(c::get_one::<S>).put(c::update::<S>).delete(c::delete::<S>),
    )
    .route("/codes/{access_code}", get(c::by_code::<S>))
    .with_state(state)
}
