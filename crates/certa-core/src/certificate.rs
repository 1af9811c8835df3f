//! Certificate records and their input shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, access_code::AccessCode, actor::ActorId};

// ─── Fields ──────────────────────────────────────────────────────────────────

/// The three caller-supplied, mutable fields of a certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateFields {
  pub candidate_name: String,
  pub role:           String,
  /// Free text, e.g. "Jun–Aug 2024". May be empty.
  #[serde(default)]
  pub duration:       String,
}

impl CertificateFields {
  pub fn new(
    candidate_name: impl Into<String>,
    role: impl Into<String>,
    duration: impl Into<String>,
  ) -> Self {
    Self {
      candidate_name: candidate_name.into(),
      role:           role.into(),
      duration:       duration.into(),
    }
  }

  /// Reject blank names and roles.
  pub fn validate(&self) -> Result<()> {
    if self.candidate_name.trim().is_empty() {
      return Err(Error::Invalid("candidate name is required".into()));
    }
    if self.role.trim().is_empty() {
      return Err(Error::Invalid("role is required".into()));
    }
    Ok(())
  }
}

// ─── Certificate ─────────────────────────────────────────────────────────────

/// A persisted certificate.
///
/// Only the fields in [`CertificateFields`] ever change after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certificate {
  pub id:             Uuid,
  pub candidate_name: String,
  pub role:           String,
  pub duration:       String,
  pub access_code:    AccessCode,
  /// Store-assigned creation timestamp.
  pub issue_date:     DateTime<Utc>,
  pub created_by:     ActorId,
}

impl Certificate {
  pub fn fields(&self) -> CertificateFields {
    CertificateFields {
      candidate_name: self.candidate_name.clone(),
      role:           self.role.clone(),
      duration:       self.duration.clone(),
    }
  }
}

// ─── NewCertificate ──────────────────────────────────────────────────────────

/// Input to [`crate::store::CertificateStore::insert`].
/// `id` and `issue_date` are always set by the store.
#[derive(Debug, Clone)]
pub struct NewCertificate {
  pub fields:      CertificateFields,
  pub access_code: AccessCode,
  pub created_by:  ActorId,
}

// ─── Results ─────────────────────────────────────────────────────────────────

/// Returned by a single create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issued {
  pub id:          Uuid,
  pub access_code: AccessCode,
}

/// One entry of a bulk create result: the new identity plus the input echo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkIssued {
  pub id:          Uuid,
  pub access_code: AccessCode,
  #[serde(flatten)]
  pub fields:      CertificateFields,
}
