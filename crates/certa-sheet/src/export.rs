//! Bulk export: a selection of certificates → one workbook + one QR image per
//! certificate.
//!
//! The workbook and the QR images are separate failure domains. A workbook
//! failure fails the export; a QR failure is recorded by candidate name and
//! the remaining images are still fetched.

use std::{
  collections::HashSet,
  future::Future,
  path::{Path, PathBuf},
};

use certa_core::{certificate::Certificate, viewer::viewer_link};
use rust_xlsxwriter::{Format, Workbook};

use crate::{Error, Result};

pub const SHEET_NAME: &str = "Certificates";

pub const HEADERS: [&str; 4] = ["NAME", "ROLE", "DURATION (TIME PERIOD)", "LINK"];

pub const DEFAULT_WORKBOOK_NAME: &str = "Selected_Certificates.xlsx";

// ─── Capabilities ────────────────────────────────────────────────────────────

/// Fetches a PNG QR code encoding `payload`.
pub trait QrImageSource: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn fetch_png<'a>(
    &'a self,
    payload: &'a str,
  ) -> impl Future<Output = Result<Vec<u8>, Self::Error>> + Send + 'a;
}

/// Destination for exported files.
pub trait ExportSink: Send + Sync {
  fn write<'a>(
    &'a self,
    file_name: &'a str,
    bytes: Vec<u8>,
  ) -> impl Future<Output = std::io::Result<()>> + Send + 'a;
}

/// Writes exported files into a directory, creating it on first use.
#[derive(Debug, Clone)]
pub struct DirectorySink {
  dir: PathBuf,
}

impl DirectorySink {
  pub fn new(dir: impl Into<PathBuf>) -> Self { Self { dir: dir.into() } }

  pub fn dir(&self) -> &Path { &self.dir }
}

impl ExportSink for DirectorySink {
  async fn write(&self, file_name: &str, bytes: Vec<u8>) -> std::io::Result<()> {
    tokio::fs::create_dir_all(&self.dir).await?;
    tokio::fs::write(self.dir.join(file_name), bytes).await
  }
}

// ─── Workbook ────────────────────────────────────────────────────────────────

/// Serialise `certs` into an xlsx workbook with a single `Certificates`
/// sheet.
pub fn build_workbook(certs: &[Certificate], origin: &str) -> Result<Vec<u8>> {
  let mut workbook = Workbook::new();
  let bold = Format::new().set_bold();
  let sheet = workbook.add_worksheet();
  sheet.set_name(SHEET_NAME)?;

  for (col, title) in HEADERS.iter().enumerate() {
    sheet.write_string_with_format(0, col as u16, *title, &bold)?;
  }
  for (i, cert) in certs.iter().enumerate() {
    let row = i as u32 + 1;
    sheet.write_string(row, 0, cert.candidate_name.as_str())?;
    sheet.write_string(row, 1, cert.role.as_str())?;
    sheet.write_string(row, 2, cert.duration.as_str())?;
    sheet.write_string(row, 3, viewer_link(origin, &cert.access_code))?;
  }
  sheet.set_column_width(0, 28)?;
  sheet.set_column_width(1, 24)?;
  sheet.set_column_width(2, 24)?;
  sheet.set_column_width(3, 56)?;

  Ok(workbook.save_to_buffer()?)
}

/// `<candidate name>_QR.png`, with whitespace runs and path separators
/// replaced by `_`.
pub fn qr_file_name(candidate_name: &str) -> String {
  let mut out = String::with_capacity(candidate_name.len() + 7);
  let mut in_space = false;
  for c in candidate_name.chars() {
    if c.is_whitespace() {
      if !in_space {
        out.push('_');
      }
      in_space = true;
      continue;
    }
    in_space = false;
    out.push(if matches!(c, '/' | '\\') { '_' } else { c });
  }
  out.push_str("_QR.png");
  out
}

// ─── Orchestration ────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ExportOptions {
  /// Origin the viewer links are built on, e.g. `https://certs.example.org`.
  pub origin:        String,
  pub workbook_name: String,
}

impl ExportOptions {
  pub fn new(origin: impl Into<String>) -> Self {
    Self {
      origin:        origin.into(),
      workbook_name: DEFAULT_WORKBOOK_NAME.to_owned(),
    }
  }
}

/// One QR image that could not be produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrFailure {
  pub candidate_name: String,
  pub reason:         String,
}

/// Some QR images failed after the workbook was written.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("workbook exported but QR images failed for: {}", .names.join(", "))]
pub struct PartialExportFailure {
  pub names: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ExportReport {
  pub workbook: String,
  pub qr_files: Vec<String>,
  pub failures: Vec<QrFailure>,
}

impl ExportReport {
  pub fn partial_failure(&self) -> Option<PartialExportFailure> {
    if self.failures.is_empty() {
      return None;
    }
    Some(PartialExportFailure {
      names: self.failures.iter().map(|f| f.candidate_name.clone()).collect(),
    })
  }
}

/// Export `certs`: write the workbook, then one QR image per certificate.
pub async fn export_selection<Q, K>(
  certs: &[Certificate],
  options: &ExportOptions,
  qr: &Q,
  sink: &K,
) -> Result<ExportReport>
where
  Q: QrImageSource,
  K: ExportSink,
{
  if certs.is_empty() {
    return Err(Error::EmptySelection);
  }

  let workbook = build_workbook(certs, &options.origin)?;
  sink
    .write(&options.workbook_name, workbook)
    .await
    .map_err(|source| Error::Sink { file: options.workbook_name.clone(), source })?;

  let mut report = ExportReport {
    workbook: options.workbook_name.clone(),
    ..Default::default()
  };
  let mut used = HashSet::new();

  for cert in certs {
    let link = viewer_link(&options.origin, &cert.access_code);
    let file_name = unique_name(&mut used, &cert.candidate_name);

    let outcome = match qr.fetch_png(&link).await {
      Ok(png) => sink.write(&file_name, png).await.map_err(|e| e.to_string()),
      Err(e) => Err(e.to_string()),
    };
    match outcome {
      Ok(()) => report.qr_files.push(file_name),
      Err(reason) => report.failures.push(QrFailure {
        candidate_name: cert.candidate_name.clone(),
        reason,
      }),
    }
  }

  Ok(report)
}

/// QR file name for `candidate_name`, suffixed `_2`, `_3`, … when a
/// previous certificate in the same export already took it.
fn unique_name(used: &mut HashSet<String>, candidate_name: &str) -> String {
  let base = qr_file_name(candidate_name);
  if used.insert(base.clone()) {
    return base;
  }
  let stem = base.trim_end_matches(".png");
  (2..)
    .map(|n| format!("{stem}_{n}.png"))
    .find(|name| used.insert(name.clone()))
    .unwrap_or(base)
}
