//! Exporting a selection to a local directory.

use std::path::PathBuf;

use certa_core::certificate::Certificate;
use certa_sheet::{
  export::{DirectorySink, ExportOptions, ExportReport, export_selection},
  qr::QrEndpoint,
};

use crate::{client::ApiClient, qr::HttpQrSource};

/// Writes the workbook and QR images for a selection into `out_dir`.
pub struct Exporter {
  qr:      HttpQrSource,
  sink:    DirectorySink,
  options: ExportOptions,
}

impl Exporter {
  /// `origin` is the server's public origin, as returned by
  /// [`ApiClient::public_origin`].
  pub fn new(
    client: &ApiClient,
    endpoint: QrEndpoint,
    origin: impl Into<String>,
    out_dir: impl Into<PathBuf>,
  ) -> Self {
    Self {
      qr:      HttpQrSource::new(client.http().clone(), endpoint),
      sink:    DirectorySink::new(out_dir),
      options: ExportOptions::new(origin),
    }
  }

  pub fn out_dir(&self) -> &std::path::Path { self.sink.dir() }

  /// Origin viewer links are built on.
  pub fn origin(&self) -> &str { &self.options.origin }

  pub async fn export(&self, certs: &[Certificate]) -> certa_sheet::Result<ExportReport> {
    let report = export_selection(certs, &self.options, &self.qr, &self.sink).await?;
    for failure in &report.failures {
      tracing::warn!(candidate = %failure.candidate_name, reason = %failure.reason, "QR image failed");
    }
    Ok(report)
  }
}

/// One-line summary of an export for the terminal.
pub fn summary(report: &ExportReport, exporter: &Exporter) -> String {
  let dir = exporter.out_dir().display();
  match report.partial_failure() {
    None => format!(
      "Exported {} and {} QR images to {dir}",
      report.workbook,
      report.qr_files.len()
    ),
    Some(failure) => format!("Exported {} to {dir}; {failure}", report.workbook),
  }
}
