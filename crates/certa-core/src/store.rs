//! The `CertificateStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `certa-store-sqlite`).
//! Authorization is not the store's concern; it lives in
//! [`crate::service::CertificateService`].

use std::future::Future;

use uuid::Uuid;

use crate::certificate::{Certificate, CertificateFields, NewCertificate};

/// Outcome of [`CertificateStore::insert`].
#[derive(Debug, Clone)]
pub enum InsertOutcome {
  Inserted(Certificate),
  /// Another record already holds the requested access code. Nothing was
  /// written.
  AccessCodeTaken,
}

/// Abstraction over a certificate store backend.
///
/// Each method is atomic on its own. Nothing spans calls.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait CertificateStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist a new record, assigning its `id` and `issue_date`.
  ///
  /// Access codes are unique; a collision is reported as
  /// [`InsertOutcome::AccessCodeTaken`], not as an error.
  fn insert(
    &self,
    input: NewCertificate,
  ) -> impl Future<Output = Result<InsertOutcome, Self::Error>> + Send + '_;

  /// Overwrite the mutable fields of `id`. Returns the updated record, or
  /// `None` if no such record exists.
  fn update_fields(
    &self,
    id: Uuid,
    fields: CertificateFields,
  ) -> impl Future<Output = Result<Option<Certificate>, Self::Error>> + Send + '_;

  /// Permanently remove `id`. Returns whether a row was removed.
  fn delete(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Retrieve a record by id.
  fn get(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Certificate>, Self::Error>> + Send + '_;

  /// Retrieve the unique record with exactly this access code.
  fn get_by_access_code<'a>(
    &'a self,
    code: &'a str,
  ) -> impl Future<Output = Result<Option<Certificate>, Self::Error>> + Send + 'a;

  /// All records, newest first.
  fn list(
    &self,
  ) -> impl Future<Output = Result<Vec<Certificate>, Self::Error>> + Send + '_;
}
