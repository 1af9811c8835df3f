//! Error types for `certa-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  /// A protected operation was called without an authenticated actor.
  #[error("unauthorized")]
  Unauthorized,

  #[error("certificate not found: {0}")]
  NotFound(Uuid),

  /// A required field was blank.
  #[error("invalid certificate: {0}")]
  Invalid(String),

  #[error("could not allocate a unique access code after {attempts} attempts")]
  AccessCodeExhausted { attempts: usize },

  /// A bulk create stopped part-way. Entries before the failure stay
  /// persisted.
  #[error("bulk create aborted after {persisted} entries: {source}")]
  BatchAborted {
    persisted: usize,
    #[source]
    source:    Box<Error>,
  },

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub(crate) fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
