//! Error type for `certa-sheet`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The workbook could not be opened or its first sheet read.
  #[error("workbook error: {0}")]
  Workbook(#[from] calamine::Error),

  #[error("xlsx write error: {0}")]
  Xlsx(#[from] rust_xlsxwriter::XlsxError),

  /// No row carried both a candidate name and a role.
  #[error("no valid rows found in the workbook")]
  EmptyImport,

  #[error("select at least one certificate to export")]
  EmptySelection,

  #[error("failed to write {file}: {source}")]
  Sink {
    file:   String,
    #[source]
    source: std::io::Error,
  },

  #[error("invalid QR endpoint: {0}")]
  Endpoint(#[from] url::ParseError),

  #[error(transparent)]
  Service(#[from] certa_core::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
