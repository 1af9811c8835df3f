//! Requests against the external QR image endpoint.
//!
//! The endpoint renders a PNG for the `data` query parameter. It is treated
//! as a best-effort collaborator; callers decide what a failure means.

use url::Url;

use crate::Result;

/// Public QR rendering service used when none is configured.
pub const DEFAULT_QR_ENDPOINT: &str = "https://api.qrserver.com/v1/create-qr-code/";

/// Requested image size, `<width>x<height>` in pixels.
pub const DEFAULT_QR_SIZE: &str = "400x400";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrEndpoint {
  base: Url,
  size: String,
}

impl QrEndpoint {
  pub fn new(base: &str, size: impl Into<String>) -> Result<Self> {
    Ok(Self { base: Url::parse(base)?, size: size.into() })
  }

  /// The URL that renders a QR code for `payload`.
  pub fn request_url(&self, payload: &str) -> Url {
    let mut url = self.base.clone();
    url
      .query_pairs_mut()
      .append_pair("size", &self.size)
      .append_pair("data", payload);
    url
  }
}

/// [`QrEndpoint::request_url`] against the default endpoint and size.
pub fn qr_request_url(payload: &str) -> Url { QrEndpoint::default().request_url(payload) }

impl Default for QrEndpoint {
  fn default() -> Self {
    Self {
      base: Url::parse(DEFAULT_QR_ENDPOINT).expect("DEFAULT_QR_ENDPOINT is a valid URL"),
      size: DEFAULT_QR_SIZE.to_owned(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn payload_is_percent_encoded() {
    let url = qr_request_url("https://certs.example.org/c/abc123");
    assert_eq!(
      url.as_str(),
      "https://api.qrserver.com/v1/create-qr-code/?size=400x400&data=https%3A%2F%2Fcerts.example.org%2Fc%2Fabc123"
    );
  }

  #[test]
  fn custom_endpoint_and_size() {
    let endpoint = QrEndpoint::new("http://localhost:9000/qr", "200x200").unwrap();
    let url = endpoint.request_url("x");
    assert_eq!(url.as_str(), "http://localhost:9000/qr?size=200x200&data=x");
  }

  #[test]
  fn bad_endpoint_is_rejected() {
    assert!(QrEndpoint::new("not a url", "1x1").is_err());
  }
}
