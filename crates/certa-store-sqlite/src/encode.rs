//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings with microsecond precision so
//! they sort lexically. UUIDs are stored as hyphenated lowercase strings.

use certa_core::{access_code::AccessCode, actor::ActorId, certificate::Certificate};
use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawCertificate::from_row`].
pub const CERTIFICATE_COLUMNS: &str = "certificate_id, candidate_name, role, duration, access_code, issue_date, created_by";

/// Raw strings read directly from a `certificates` row.
pub struct RawCertificate {
  pub certificate_id: String,
  pub candidate_name: String,
  pub role:           String,
  pub duration:       String,
  pub access_code:    String,
  pub issue_date:     String,
  pub created_by:     String,
}

impl RawCertificate {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      certificate_id: row.get(0)?,
      candidate_name: row.get(1)?,
      role:           row.get(2)?,
      duration:       row.get(3)?,
      access_code:    row.get(4)?,
      issue_date:     row.get(5)?,
      created_by:     row.get(6)?,
    })
  }

  pub fn into_certificate(self) -> Result<Certificate> {
    Ok(Certificate {
      id:             decode_uuid(&self.certificate_id)?,
      candidate_name: self.candidate_name,
      role:           self.role,
      duration:       self.duration,
      access_code:    AccessCode::from_raw(self.access_code),
      issue_date:     decode_dt(&self.issue_date)?,
      created_by:     ActorId::new(self.created_by),
    })
  }
}
