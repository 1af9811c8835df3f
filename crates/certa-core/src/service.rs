//! [`CertificateService`] — the authorization gate in front of a store.
//!
//! Every write requires an [`Actor`]. Listing is empty for anonymous callers;
//! lookup by access code is public.

use std::sync::Arc;

use uuid::Uuid;

use crate::{
  Error, Result,
  access_code::{AccessCodeSource, RandomCodes},
  actor::Actor,
  certificate::{BulkIssued, Certificate, CertificateFields, Issued, NewCertificate},
  store::{CertificateStore, InsertOutcome},
};

/// How many fresh codes to try before giving up on an insert.
pub const MAX_CODE_ATTEMPTS: usize = 3;

pub struct CertificateService<S> {
  store: Arc<S>,
  codes: Arc<dyn AccessCodeSource>,
}

impl<S> Clone for CertificateService<S> {
  fn clone(&self) -> Self {
    Self {
      store: Arc::clone(&self.store),
      codes: Arc::clone(&self.codes),
    }
  }
}

fn require(actor: Option<&Actor>) -> Result<&Actor> { actor.ok_or(Error::Unauthorized) }

impl<S: CertificateStore> CertificateService<S> {
  pub fn new(store: Arc<S>) -> Self { Self::with_codes(store, Arc::new(RandomCodes)) }

  /// Use a custom access-code source.
  pub fn with_codes(store: Arc<S>, codes: Arc<dyn AccessCodeSource>) -> Self {
    Self { store, codes }
  }

  pub fn store(&self) -> &S { &self.store }

  /// Issue a single certificate.
  pub async fn create(
    &self,
    actor: Option<&Actor>,
    fields: CertificateFields,
  ) -> Result<Issued> {
    let actor = require(actor)?;
    fields.validate()?;
    let cert = self.insert_with_fresh_code(actor, fields).await?;
    Ok(Issued { id: cert.id, access_code: cert.access_code })
  }

  /// Issue one certificate per entry, sequentially and in input order.
  ///
  /// Entries are validated up front, so a blank field rejects the batch
  /// before anything is written. A store failure part-way returns
  /// [`Error::BatchAborted`]; the entries before it remain persisted.
  pub async fn bulk_create(
    &self,
    actor: Option<&Actor>,
    entries: Vec<CertificateFields>,
  ) -> Result<Vec<BulkIssued>> {
    let actor = require(actor)?;
    for (i, entry) in entries.iter().enumerate() {
      entry.validate().map_err(|e| Error::Invalid(format!("entry {}: {e}", i + 1)))?;
    }

    let mut issued = Vec::with_capacity(entries.len());
    for fields in entries {
      match self.insert_with_fresh_code(actor, fields).await {
        Ok(cert) => issued.push(BulkIssued {
          id:          cert.id,
          access_code: cert.access_code.clone(),
          fields:      cert.fields(),
        }),
        Err(source) => {
          return Err(Error::BatchAborted {
            persisted: issued.len(),
            source:    Box::new(source),
          });
        }
      }
    }
    Ok(issued)
  }

  /// Overwrite name, role and duration. Access code, issue date and creator
  /// are untouched.
  pub async fn update(
    &self,
    actor: Option<&Actor>,
    id: Uuid,
    fields: CertificateFields,
  ) -> Result<Certificate> {
    require(actor)?;
    fields.validate()?;
    self
      .store
      .update_fields(id, fields)
      .await
      .map_err(Error::store)?
      .ok_or(Error::NotFound(id))
  }

  /// Permanently delete. A missing id is not an error.
  pub async fn delete(&self, actor: Option<&Actor>, id: Uuid) -> Result<()> {
    require(actor)?;
    self.store.delete(id).await.map_err(Error::store)?;
    Ok(())
  }

  /// All certificates, newest first. Anonymous callers get an empty list.
  pub async fn list(&self, actor: Option<&Actor>) -> Result<Vec<Certificate>> {
    if actor.is_none() {
      return Ok(Vec::new());
    }
    self.store.list().await.map_err(Error::store)
  }

  pub async fn get(&self, actor: Option<&Actor>, id: Uuid) -> Result<Certificate> {
    require(actor)?;
    self
      .store
      .get(id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::NotFound(id))
  }

  /// Public lookup. A miss is `Ok(None)`.
  pub async fn get_by_access_code(&self, code: &str) -> Result<Option<Certificate>> {
    self.store.get_by_access_code(code).await.map_err(Error::store)
  }

  async fn insert_with_fresh_code(
    &self,
    actor: &Actor,
    fields: CertificateFields,
  ) -> Result<Certificate> {
    for _ in 0..MAX_CODE_ATTEMPTS {
      let input = NewCertificate {
        fields:      fields.clone(),
        access_code: self.codes.next_code(),
        created_by:  actor.id.clone(),
      };
      match self.store.insert(input).await.map_err(Error::store)? {
        InsertOutcome::Inserted(cert) => return Ok(cert),
        InsertOutcome::AccessCodeTaken => continue,
      }
    }
    Err(Error::AccessCodeExhausted { attempts: MAX_CODE_ATTEMPTS })
  }
}

#[cfg(test)]
mod tests {
  use std::sync::{
    Mutex,
    atomic::{AtomicUsize, Ordering},
  };

  use chrono::Utc;

  use super::*;
  use crate::access_code::AccessCode;

  #[derive(Debug, thiserror::Error)]
  #[error("disk on fire")]
  struct Boom;

  /// In-memory store that can be told to fail after a number of inserts.
  #[derive(Default)]
  struct MemoryStore {
    rows:        Mutex<Vec<Certificate>>,
    fail_after:  Option<usize>,
    insert_hits: AtomicUsize,
  }

  impl CertificateStore for MemoryStore {
    type Error = Boom;

    async fn insert(&self, input: NewCertificate) -> Result<InsertOutcome, Boom> {
      let n = self.insert_hits.fetch_add(1, Ordering::SeqCst);
      if self.fail_after.is_some_and(|limit| n >= limit) {
        return Err(Boom);
      }
      let mut rows = self.rows.lock().unwrap();
      if rows.iter().any(|c| c.access_code == input.access_code) {
        return Ok(InsertOutcome::AccessCodeTaken);
      }
      let cert = Certificate {
        id:             Uuid::new_v4(),
        candidate_name: input.fields.candidate_name,
        role:           input.fields.role,
        duration:       input.fields.duration,
        access_code:    input.access_code,
        issue_date:     Utc::now(),
        created_by:     input.created_by,
      };
      rows.push(cert.clone());
      Ok(InsertOutcome::Inserted(cert))
    }

    async fn update_fields(
      &self,
      id: Uuid,
      fields: CertificateFields,
    ) -> Result<Option<Certificate>, Boom> {
      let mut rows = self.rows.lock().unwrap();
      Ok(rows.iter_mut().find(|c| c.id == id).map(|c| {
        c.candidate_name = fields.candidate_name;
        c.role = fields.role;
        c.duration = fields.duration;
        c.clone()
      }))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, Boom> {
      let mut rows = self.rows.lock().unwrap();
      let before = rows.len();
      rows.retain(|c| c.id != id);
      Ok(rows.len() != before)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Certificate>, Boom> {
      Ok(self.rows.lock().unwrap().iter().find(|c| c.id == id).cloned())
    }

    async fn get_by_access_code<'a>(
      &'a self,
      code: &'a str,
    ) -> Result<Option<Certificate>, Boom> {
      Ok(
        self
          .rows
          .lock()
          .unwrap()
          .iter()
          .find(|c| c.access_code.as_str() == code)
          .cloned(),
      )
    }

    async fn list(&self) -> Result<Vec<Certificate>, Boom> {
      Ok(self.rows.lock().unwrap().iter().rev().cloned().collect())
    }
  }

  fn service(store: MemoryStore) -> CertificateService<MemoryStore> {
    CertificateService::new(Arc::new(store))
  }

  fn admin() -> Actor { Actor::new("admin") }

  #[tokio::test]
  async fn anonymous_writes_are_rejected() {
    let svc = service(MemoryStore::default());
    let fields = CertificateFields::new("Asha Rao", "Backend Intern", "Jun–Aug 2024");

    assert!(matches!(svc.create(None, fields.clone()).await, Err(Error::Unauthorized)));
    assert!(matches!(
      svc.bulk_create(None, vec![fields.clone()]).await,
      Err(Error::Unauthorized)
    ));
    assert!(matches!(
      svc.update(None, Uuid::new_v4(), fields).await,
      Err(Error::Unauthorized)
    ));
    assert!(matches!(svc.delete(None, Uuid::new_v4()).await, Err(Error::Unauthorized)));
    assert!(svc.store().rows.lock().unwrap().is_empty());
  }

  #[tokio::test]
  async fn anonymous_list_is_empty() {
    let svc = service(MemoryStore::default());
    let actor = admin();
    svc
      .create(Some(&actor), CertificateFields::new("Ben", "QA", ""))
      .await
      .unwrap();

    assert!(svc.list(None).await.unwrap().is_empty());
    assert_eq!(svc.list(Some(&actor)).await.unwrap().len(), 1);
  }

  #[tokio::test]
  async fn blank_name_or_role_is_invalid() {
    let svc = service(MemoryStore::default());
    let actor = admin();
    let err = svc
      .create(Some(&actor), CertificateFields::new("  ", "QA", ""))
      .await
      .unwrap_err();
    assert!(matches!(err, Error::Invalid(_)));

    let err = svc
      .bulk_create(Some(&actor), vec![
        CertificateFields::new("Ben", "QA", ""),
        CertificateFields::new("Cara", "", ""),
      ])
      .await
      .unwrap_err();
    assert!(matches!(err, Error::Invalid(_)));
    assert!(svc.store().rows.lock().unwrap().is_empty());
  }

  #[tokio::test]
  async fn collision_retries_with_a_fresh_code() {
    let store = Arc::new(MemoryStore::default());
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    // First two draws collide, the third is fresh.
    let codes = move || {
      let n = counter.fetch_add(1, Ordering::SeqCst);
      AccessCode::from_raw(if n < 2 { "dup" } else { "fresh" })
    };
    let svc = CertificateService::with_codes(Arc::clone(&store), Arc::new(codes));
    let actor = admin();

    let first = svc
      .create(Some(&actor), CertificateFields::new("Ben", "QA", ""))
      .await
      .unwrap();
    assert_eq!(first.access_code.as_str(), "dup");

    let second = svc
      .create(Some(&actor), CertificateFields::new("Cara", "QA", ""))
      .await
      .unwrap();
    assert_eq!(second.access_code.as_str(), "fresh");
    assert_eq!(calls.load(Ordering::SeqCst), 3);
  }

  #[tokio::test]
  async fn collision_gives_up_after_max_attempts() {
    let store = Arc::new(MemoryStore::default());
    let codes = || AccessCode::from_raw("always-the-same");
    let svc = CertificateService::with_codes(store, Arc::new(codes));
    let actor = admin();

    svc
      .create(Some(&actor), CertificateFields::new("Ben", "QA", ""))
      .await
      .unwrap();
    let err = svc
      .create(Some(&actor), CertificateFields::new("Cara", "QA", ""))
      .await
      .unwrap_err();
    assert!(matches!(err, Error::AccessCodeExhausted { attempts: MAX_CODE_ATTEMPTS }));
  }

  #[tokio::test]
  async fn bulk_create_failure_reports_persisted_prefix() {
    let svc = service(MemoryStore { fail_after: Some(2), ..Default::default() });
    let actor = admin();
    let entries = vec![
      CertificateFields::new("A", "QA", ""),
      CertificateFields::new("B", "QA", ""),
      CertificateFields::new("C", "QA", ""),
    ];

    let err = svc.bulk_create(Some(&actor), entries).await.unwrap_err();
    match err {
      Error::BatchAborted { persisted, source } => {
        assert_eq!(persisted, 2);
        assert!(matches!(*source, Error::Store(_)));
      }
      other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(svc.store().rows.lock().unwrap().len(), 2);
  }

  #[tokio::test]
  async fn update_missing_id_is_not_found() {
    let svc = service(MemoryStore::default());
    let actor = admin();
    let id = Uuid::new_v4();
    let err = svc
      .update(Some(&actor), id, CertificateFields::new("Ben", "QA", ""))
      .await
      .unwrap_err();
    assert!(matches!(err, Error::NotFound(missing) if missing == id));
  }

  #[tokio::test]
  async fn delete_missing_id_is_a_no_op() {
    let svc = service(MemoryStore::default());
    let actor = admin();
    svc.delete(Some(&actor), Uuid::new_v4()).await.unwrap();
  }
}
