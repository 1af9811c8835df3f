//! Async HTTP client wrapping the certa JSON API.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use certa_core::certificate::{BulkIssued, Certificate, CertificateFields, Issued};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use uuid::Uuid;

/// Connection settings for the certa API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
  pub username: String,
  pub password: String,
}

/// Async HTTP client for the certa JSON REST API.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

/// `GET /api/config` response.
#[derive(Deserialize)]
struct PublicConfig {
  public_origin: String,
}

/// Body of a non-2xx API response.
#[derive(Deserialize)]
struct ErrorBody {
  error: String,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  /// Address the API is reached on. Viewer links use
  /// [`ApiClient::public_origin`] instead.
  pub fn base_url(&self) -> &str { self.config.base_url.trim_end_matches('/') }

  pub fn http(&self) -> &Client { &self.client }

  fn url(&self, path: &str) -> String { format!("{}/api{}", self.base_url(), path) }

  fn auth(&self, req: RequestBuilder) -> RequestBuilder {
    if self.config.username.is_empty() {
      req
    } else {
      req.basic_auth(&self.config.username, Some(&self.config.password))
    }
  }

  /// `GET /api/config`: the origin the server builds viewer links on.
  pub async fn public_origin(&self) -> Result<String> {
    let resp = self
      .client
      .get(self.url("/config"))
      .send()
      .await
      .context("GET /config failed")?;
    let config: PublicConfig = ok_or_error(resp, "GET /config")
      .await?
      .json()
      .await
      .context("deserialising server config")?;
    Ok(config.public_origin.trim_end_matches('/').to_owned())
  }

  // ── Certificates ──────────────────────────────────────────────────────────

  /// `GET /api/certificates`
  pub async fn list(&self) -> Result<Vec<Certificate>> {
    let resp = self
      .auth(self.client.get(self.url("/certificates")))
      .send()
      .await
      .context("GET /certificates failed")?;
    ok_or_error(resp, "GET /certificates")
      .await?
      .json()
      .await
      .context("deserialising certificates")
  }

  /// `GET /api/certificates/{id}`
  pub async fn get(&self, id: Uuid) -> Result<Certificate> {
    let resp = self
      .auth(self.client.get(self.url(&format!("/certificates/{id}"))))
      .send()
      .await
      .context("GET /certificates/{id} failed")?;
    ok_or_error(resp, "GET /certificates/{id}")
      .await?
      .json()
      .await
      .context("deserialising certificate")
  }

  /// `POST /api/certificates`
  pub async fn create(&self, fields: &CertificateFields) -> Result<Issued> {
    let resp = self
      .auth(self.client.post(self.url("/certificates")))
      .json(fields)
      .send()
      .await
      .context("POST /certificates failed")?;
    ok_or_error(resp, "POST /certificates")
      .await?
      .json()
      .await
      .context("deserialising issued certificate")
  }

  /// `PUT /api/certificates/{id}`
  pub async fn update(&self, id: Uuid, fields: &CertificateFields) -> Result<Certificate> {
    let resp = self
      .auth(self.client.put(self.url(&format!("/certificates/{id}"))))
      .json(fields)
      .send()
      .await
      .context("PUT /certificates/{id} failed")?;
    ok_or_error(resp, "PUT /certificates/{id}")
      .await?
      .json()
      .await
      .context("deserialising certificate")
  }

  /// `DELETE /api/certificates/{id}`
  pub async fn delete(&self, id: Uuid) -> Result<()> {
    let resp = self
      .auth(self.client.delete(self.url(&format!("/certificates/{id}"))))
      .send()
      .await
      .context("DELETE /certificates/{id} failed")?;
    ok_or_error(resp, "DELETE /certificates/{id}").await?;
    Ok(())
  }

  /// `POST /api/certificates/import` with the raw workbook bytes.
  pub async fn import(&self, workbook: Vec<u8>) -> Result<Vec<BulkIssued>> {
    let resp = self
      .auth(self.client.post(self.url("/certificates/import")))
      .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
      .body(workbook)
      .send()
      .await
      .context("POST /certificates/import failed")?;
    ok_or_error(resp, "POST /certificates/import")
      .await?
      .json()
      .await
      .context("deserialising import result")
  }

  // ── Public lookup ─────────────────────────────────────────────────────────

  /// `GET /api/codes/{code}`. A 404 is `Ok(None)`.
  pub async fn by_code(&self, code: &str) -> Result<Option<Certificate>> {
    let resp = self
      .client
      .get(self.url(&format!("/codes/{code}")))
      .send()
      .await
      .context("GET /codes/{code} failed")?;
    if resp.status() == StatusCode::NOT_FOUND {
      return Ok(None);
    }
    let cert = ok_or_error(resp, "GET /codes/{code}")
      .await?
      .json()
      .await
      .context("deserialising certificate")?;
    Ok(Some(cert))
  }
}

/// Pass 2xx responses through; turn anything else into an error carrying the
/// server's `{"error": ..}` message when there is one.
async fn ok_or_error(resp: Response, what: &str) -> Result<Response> {
  let status = resp.status();
  if status.is_success() {
    return Ok(resp);
  }
  let message = resp
    .json::<ErrorBody>()
    .await
    .map(|b| b.error)
    .unwrap_or_default();
  if message.is_empty() {
    Err(anyhow!("{what} → {status}"))
  } else {
    Err(anyhow!("{what} → {status}: {message}"))
  }
}
