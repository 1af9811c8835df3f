//! Integration tests for `SqliteStore` against an in-memory database, both
//! directly and through `CertificateService`.

use std::{collections::HashSet, sync::Arc};

use certa_core::{
  Error as CoreError,
  access_code::AccessCode,
  actor::{Actor, ActorId},
  certificate::{CertificateFields, NewCertificate},
  service::CertificateService,
  store::{CertificateStore, InsertOutcome},
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn service() -> CertificateService<SqliteStore> {
  CertificateService::new(Arc::new(store().await))
}

fn new_cert(name: &str, code: &str) -> NewCertificate {
  NewCertificate {
    fields:      CertificateFields::new(name, "QA", "3 months"),
    access_code: AccessCode::from_raw(code),
    created_by:  ActorId::new("admin"),
  }
}

fn inserted(outcome: InsertOutcome) -> certa_core::certificate::Certificate {
  match outcome {
    InsertOutcome::Inserted(c) => c,
    InsertOutcome::AccessCodeTaken => panic!("unexpected access code collision"),
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_and_get_by_id_and_code() {
  let s = store().await;
  let cert = inserted(s.insert(new_cert("Ben", "code-1")).await.unwrap());

  let by_id = s.get(cert.id).await.unwrap().unwrap();
  assert_eq!(by_id, cert);

  let by_code = s.get_by_access_code("code-1").await.unwrap().unwrap();
  assert_eq!(by_code, cert);
}

#[tokio::test]
async fn duplicate_access_code_is_reported_not_written() {
  let s = store().await;
  inserted(s.insert(new_cert("Ben", "same")).await.unwrap());

  let second = s.insert(new_cert("Cara", "same")).await.unwrap();
  assert!(matches!(second, InsertOutcome::AccessCodeTaken));
  assert_eq!(s.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn access_code_lookup_is_case_sensitive() {
  let s = store().await;
  inserted(s.insert(new_cert("Ben", "abcdef")).await.unwrap());

  assert!(s.get_by_access_code("ABCDEF").await.unwrap().is_none());
  assert!(s.get_by_access_code("abcde").await.unwrap().is_none());
}

#[tokio::test]
async fn list_is_newest_first() {
  let s = store().await;
  let a = inserted(s.insert(new_cert("A", "a")).await.unwrap());
  let b = inserted(s.insert(new_cert("B", "b")).await.unwrap());
  let c = inserted(s.insert(new_cert("C", "c")).await.unwrap());

  let ids: Vec<Uuid> = s.list().await.unwrap().into_iter().map(|c| c.id).collect();
  assert_eq!(ids, vec![c.id, b.id, a.id]);
}

#[tokio::test]
async fn update_missing_returns_none() {
  let s = store().await;
  let result = s
    .update_fields(Uuid::new_v4(), CertificateFields::new("X", "Y", "Z"))
    .await
    .unwrap();
  assert!(result.is_none());
}

#[tokio::test]
async fn delete_removes_permanently() {
  let s = store().await;
  let cert = inserted(s.insert(new_cert("Ben", "gone")).await.unwrap());

  assert!(s.delete(cert.id).await.unwrap());
  assert!(s.get(cert.id).await.unwrap().is_none());
  assert!(s.get_by_access_code("gone").await.unwrap().is_none());
  assert!(!s.delete(cert.id).await.unwrap());
}

#[tokio::test]
async fn issue_date_survives_roundtrip_exactly() {
  let s = store().await;
  let cert = inserted(s.insert(new_cert("Ben", "ts")).await.unwrap());
  let fetched = s.get(cert.id).await.unwrap().unwrap();
  assert_eq!(fetched.issue_date, cert.issue_date);
}

// ─── Service over SQLite ─────────────────────────────────────────────────────

#[tokio::test]
async fn create_then_lookup_returns_identical_record() {
  let svc = service().await;
  let actor = Actor::new("admin");

  let issued = svc
    .create(
      Some(&actor),
      CertificateFields::new("Asha Rao", "Backend Intern", "Jun–Aug 2024"),
    )
    .await
    .unwrap();
  assert!(!issued.access_code.as_str().is_empty());

  let cert = svc
    .get_by_access_code(issued.access_code.as_str())
    .await
    .unwrap()
    .expect("issued code resolves");
  assert_eq!(cert.id, issued.id);
  assert_eq!(cert.candidate_name, "Asha Rao");
  assert_eq!(cert.role, "Backend Intern");
  assert_eq!(cert.duration, "Jun–Aug 2024");
  assert_eq!(cert.created_by, actor.id);

  assert!(svc.get_by_access_code("not-a-real-code").await.unwrap().is_none());
}

#[tokio::test]
async fn bulk_create_preserves_order_with_distinct_codes() {
  let svc = service().await;
  let actor = Actor::new("admin");
  let entries: Vec<_> = (0..5)
    .map(|i| CertificateFields::new(format!("Candidate {i}"), "Intern", "6 weeks"))
    .collect();

  let issued = svc.bulk_create(Some(&actor), entries.clone()).await.unwrap();
  assert_eq!(issued.len(), 5);
  for (entry, result) in entries.iter().zip(&issued) {
    assert_eq!(&result.fields, entry);
  }

  let codes: HashSet<_> = issued.iter().map(|b| b.access_code.clone()).collect();
  assert_eq!(codes.len(), 5);
  assert_eq!(svc.list(Some(&actor)).await.unwrap().len(), 5);
}

#[tokio::test]
async fn update_touches_only_mutable_fields() {
  let svc = service().await;
  let creator = Actor::new("creator");
  let editor = Actor::new("editor");

  let issued = svc
    .create(Some(&creator), CertificateFields::new("Ben", "QA", "1 month"))
    .await
    .unwrap();
  let before = svc.get(Some(&creator), issued.id).await.unwrap();

  let after = svc
    .update(
      Some(&editor),
      issued.id,
      CertificateFields::new("Benjamin", "QA Lead", "2 months"),
    )
    .await
    .unwrap();

  assert_eq!(after.candidate_name, "Benjamin");
  assert_eq!(after.role, "QA Lead");
  assert_eq!(after.duration, "2 months");
  assert_eq!(after.id, before.id);
  assert_eq!(after.access_code, before.access_code);
  assert_eq!(after.issue_date, before.issue_date);
  assert_eq!(after.created_by, creator.id);
}

#[tokio::test]
async fn anonymous_caller_is_gated() {
  let svc = service().await;
  let actor = Actor::new("admin");
  let issued = svc
    .create(Some(&actor), CertificateFields::new("Ben", "QA", ""))
    .await
    .unwrap();

  assert!(svc.list(None).await.unwrap().is_empty());
  assert!(matches!(
    svc.delete(None, issued.id).await,
    Err(CoreError::Unauthorized)
  ));
  // Public lookup still works.
  assert!(
    svc
      .get_by_access_code(issued.access_code.as_str())
      .await
      .unwrap()
      .is_some()
  );
}
