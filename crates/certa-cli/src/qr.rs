//! QR images fetched from the external rendering endpoint over HTTP.

use certa_sheet::{export::QrImageSource, qr::QrEndpoint};
use reqwest::{Client, StatusCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QrFetchError {
  #[error("request failed: {0}")]
  Http(#[from] reqwest::Error),

  #[error("endpoint answered {0}")]
  Status(StatusCode),
}

pub struct HttpQrSource {
  client:   Client,
  endpoint: QrEndpoint,
}

impl HttpQrSource {
  pub fn new(client: Client, endpoint: QrEndpoint) -> Self { Self { client, endpoint } }
}

impl QrImageSource for HttpQrSource {
  type Error = QrFetchError;

  async fn fetch_png(&self, payload: &str) -> Result<Vec<u8>, QrFetchError> {
    let url = self.endpoint.request_url(payload);
    let resp = self.client.get(url).send().await?;
    if !resp.status().is_success() {
      return Err(QrFetchError::Status(resp.status()));
    }
    Ok(resp.bytes().await?.to_vec())
  }
}
