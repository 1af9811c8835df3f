//! HTTP server for Certa.
//!
//! Mounts the JSON API under `/api`, serves the public certificate viewer at
//! `/c/{access_code}` and a landing page at `/`.

pub mod auth;
pub mod error;
pub mod viewer;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{Router, routing::get};
use certa_api::ApiState;
use certa_core::store::CertificateStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use auth::AdminAccount;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `CERTA_*` environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:             String,
  #[serde(default = "default_port")]
  pub port:             u16,
  /// Public origin that viewer links are built on.
  pub base_url:         String,
  /// Issuing organisation shown on the viewer page.
  #[serde(default = "default_organization")]
  pub organization:     String,
  pub store_path:       PathBuf,
  /// Largest workbook the import endpoint accepts, in bytes.
  #[serde(default = "default_max_import_bytes")]
  pub max_import_bytes: usize,
  #[serde(default)]
  pub admins:           Vec<AdminAccount>,
}

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 8080 }

fn default_organization() -> String { "Certa".to_string() }

fn default_max_import_bytes() -> usize { certa_api::DEFAULT_MAX_IMPORT_BYTES }

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through the page handlers.
pub struct AppState<S> {
  pub api:    ApiState<S>,
  pub config: Arc<ServerConfig>,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      api:    self.api.clone(),
      config: Arc::clone(&self.config),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: CertificateStore + 'static,
{
  let api = certa_api::api_router(state.api.clone());

  Router::new()
    .route("/",                 get(viewer::landing::<S>))
    .route("/c/{access_code}",  get(viewer::certificate_page::<S>))
    .with_state(state)
    .nest("/api", api)
    .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
  use certa_core::service::CertificateService;
  use certa_store_sqlite::SqliteStore;
  use serde_json::Value;
  use tower::ServiceExt as _;

  use super::*;
  use crate::auth::{PasswordIdentity, tests::admin};

  async fn make_state(password: &str) -> AppState<SqliteStore> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let config = ServerConfig {
      host:             "127.0.0.1".to_string(),
      port:             8080,
      base_url:         "https://certs.example.org".to_string(),
      organization:     "Acme Labs".to_string(),
      store_path:       PathBuf::from(":memory:"),
      max_import_bytes: certa_api::DEFAULT_MAX_IMPORT_BYTES,
      admins:           vec![admin("user", password)],
    };
    let identity = PasswordIdentity::new(config.admins.clone()).unwrap();

    AppState {
      api:    ApiState {
        service:          CertificateService::new(Arc::new(store)),
        identity:         Arc::new(identity),
        public_origin:    Arc::from(config.base_url.as_str()),
        max_import_bytes: config.max_import_bytes,
      },
      config: Arc::new(config),
    }
  }

  fn auth_header(user: &str, pass: &str) -> String {
    format!("Basic {}", B64.encode(format!("{user}:{pass}")))
  }

  async fn oneshot_raw(
    state:   AppState<SqliteStore>,
    method:  &str,
    uri:     &str,
    headers: Vec<(header::HeaderName, String)>,
    body:    &str,
  ) -> axum::response::Response {
    let mut builder = Request::builder().method(method).uri(uri);
    for (k, v) in headers {
      builder = builder.header(k, v);
    }
    let req = builder.body(Body::from(body.to_string())).unwrap();
    router(state).oneshot(req).await.unwrap()
  }

  async fn text(resp: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
  }

  /// Issue a certificate through the API and return its access code.
  async fn issue(state: &AppState<SqliteStore>, body: &str) -> String {
    let resp = oneshot_raw(
      state.clone(),
      "POST",
      "/api/certificates",
      vec![
        (header::AUTHORIZATION, auth_header("user", "secret")),
        (header::CONTENT_TYPE, "application/json".to_string()),
      ],
      body,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let issued: Value = serde_json::from_str(&text(resp).await).unwrap();
    issued["access_code"].as_str().unwrap().to_string()
  }

  // ── Viewer ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn viewer_renders_issued_certificate() {
    let state = make_state("secret").await;
    let code = issue(
      &state,
      r#"{"candidate_name":"Asha Rao","role":"Backend Intern","duration":"Jun–Aug 2024"}"#,
    )
    .await;

    let resp = oneshot_raw(state, "GET", &format!("/c/{code}"), vec![], "").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = text(resp).await;
    assert!(html.contains("Asha Rao"));
    assert!(html.contains("Backend Intern"));
    assert!(html.contains("Jun–Aug 2024"));
    assert!(html.contains("Verified by Acme Labs"));
  }

  #[tokio::test]
  async fn viewer_unknown_code_returns_404() {
    let state = make_state("secret").await;
    let resp = oneshot_raw(state, "GET", "/c/not-a-real-code", vec![], "").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(text(resp).await.contains("Certificate Not Found"));
  }

  #[tokio::test]
  async fn viewer_after_delete_returns_404() {
    let state = make_state("secret").await;
    let code = issue(&state, r#"{"candidate_name":"Ben","role":"QA"}"#).await;
    let cert = state.api.service.get_by_access_code(&code).await.unwrap().unwrap();

    let resp = oneshot_raw(
      state.clone(),
      "DELETE",
      &format!("/api/certificates/{}", cert.id),
      vec![(header::AUTHORIZATION, auth_header("user", "secret"))],
      "",
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = oneshot_raw(state, "GET", &format!("/c/{code}"), vec![], "").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn landing_page_names_the_organization() {
    let state = make_state("secret").await;
    let resp = oneshot_raw(state, "GET", "/", vec![], "").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(text(resp).await.contains("Acme Labs certificates"));
  }

  // ── Auth ────────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn wrong_password_returns_401() {
    let state = make_state("secret").await;
    let resp = oneshot_raw(
      state,
      "POST",
      "/api/certificates",
      vec![
        (header::AUTHORIZATION, auth_header("user", "wrong")),
        (header::CONTENT_TYPE, "application/json".to_string()),
      ],
      r#"{"candidate_name":"Ben","role":"QA"}"#,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(resp.headers().contains_key(header::WWW_AUTHENTICATE));
  }

  #[tokio::test]
  async fn anonymous_list_is_empty_not_401() {
    let state = make_state("secret").await;
    issue(&state, r#"{"candidate_name":"Ben","role":"QA"}"#).await;
    let resp = oneshot_raw(state, "GET", "/api/certificates", vec![], "").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(text(resp).await, "[]");
  }
}
