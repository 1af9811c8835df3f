//! [`SqliteStore`] — the SQLite implementation of [`CertificateStore`].

use std::path::Path;

use certa_core::{
  certificate::{Certificate, CertificateFields, NewCertificate},
  store::{CertificateStore, InsertOutcome},
};
use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use crate::{
  Result,
  encode::{CERTIFICATE_COLUMNS, RawCertificate, encode_dt, encode_uuid},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A certificate store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Fetch a single row matching `column = value`.
  async fn get_where(&self, column: &'static str, value: String) -> Result<Option<Certificate>> {
    let raw: Option<RawCertificate> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {CERTIFICATE_COLUMNS} FROM certificates WHERE {column} = ?1"),
              rusqlite::params![value],
              RawCertificate::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawCertificate::into_certificate).transpose()
  }
}

/// Whether `e` is a UNIQUE constraint violation.
fn is_unique_violation(e: &rusqlite::Error) -> bool {
  matches!(
    e,
    rusqlite::Error::SqliteFailure(err, _)
      if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
  )
}

// ─── CertificateStore impl ───────────────────────────────────────────────────

impl CertificateStore for SqliteStore {
  type Error = crate::Error;

  async fn insert(&self, input: NewCertificate) -> Result<InsertOutcome> {
    let cert = Certificate {
      id:             Uuid::new_v4(),
      candidate_name: input.fields.candidate_name,
      role:           input.fields.role,
      duration:       input.fields.duration,
      access_code:    input.access_code,
      issue_date:     Utc::now(),
      created_by:     input.created_by,
    };

    let id_str   = encode_uuid(cert.id);
    let name     = cert.candidate_name.clone();
    let role     = cert.role.clone();
    let duration = cert.duration.clone();
    let code     = cert.access_code.as_str().to_owned();
    let at_str   = encode_dt(cert.issue_date);
    let actor    = cert.created_by.as_str().to_owned();

    let inserted: bool = self
      .conn
      .call(move |conn| {
        let result = conn.execute(
          "INSERT INTO certificates (
             certificate_id, candidate_name, role, duration,
             access_code, issue_date, created_by
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![id_str, name, role, duration, code, at_str, actor],
        );
        match result {
          Ok(_) => Ok(true),
          Err(e) if is_unique_violation(&e) => Ok(false),
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    Ok(if inserted {
      InsertOutcome::Inserted(cert)
    } else {
      InsertOutcome::AccessCodeTaken
    })
  }

  async fn update_fields(
    &self,
    id:     Uuid,
    fields: CertificateFields,
  ) -> Result<Option<Certificate>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawCertificate> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let changed = tx.execute(
          "UPDATE certificates
             SET candidate_name = ?2, role = ?3, duration = ?4
           WHERE certificate_id = ?1",
          rusqlite::params![id_str, fields.candidate_name, fields.role, fields.duration],
        )?;
        let raw = if changed == 0 {
          None
        } else {
          Some(tx.query_row(
            &format!("SELECT {CERTIFICATE_COLUMNS} FROM certificates WHERE certificate_id = ?1"),
            rusqlite::params![id_str],
            RawCertificate::from_row,
          )?)
        };
        tx.commit()?;
        Ok(raw)
      })
      .await?;

    raw.map(RawCertificate::into_certificate).transpose()
  }

  async fn delete(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM certificates WHERE certificate_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;
    Ok(removed > 0)
  }

  async fn get(&self, id: Uuid) -> Result<Option<Certificate>> {
    self.get_where("certificate_id", encode_uuid(id)).await
  }

  async fn get_by_access_code<'a>(&'a self, code: &'a str) -> Result<Option<Certificate>> {
    // `=` on TEXT uses the BINARY collation, so the match is case-sensitive.
    self.get_where("access_code", code.to_owned()).await
  }

  async fn list(&self) -> Result<Vec<Certificate>> {
    let raws: Vec<RawCertificate> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {CERTIFICATE_COLUMNS} FROM certificates
           ORDER BY issue_date DESC, seq DESC"
        ))?;
        let rows = stmt
          .query_map([], RawCertificate::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCertificate::into_certificate).collect()
  }
}
