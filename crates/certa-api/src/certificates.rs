//! Handlers for `/certificates` and `/codes` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/config` | Public; origin that viewer links are built on |
//! | `GET`    | `/certificates` | Newest first; anonymous callers get `[]` |
//! | `POST`   | `/certificates` | Body: [`CertificateFields`]; returns 201 + [`Issued`] |
//! | `POST`   | `/certificates/bulk` | Body: [`BulkBody`]; returns 201 + `[BulkIssued]` |
//! | `POST`   | `/certificates/import` | Body: raw workbook bytes; returns 201 + `[BulkIssued]` |
//! | `POST`   | `/certificates/export` | Body: [`ExportBody`]; returns the xlsx workbook |
//! | `GET`    | `/certificates/{id}` | Single record |
//! | `PUT`    | `/certificates/{id}` | Body: [`CertificateFields`]; returns the updated record |
//! | `DELETE` | `/certificates/{id}` | 204, also when the id is unknown |
//! | `GET`    | `/codes/{access_code}` | Public lookup |

use axum::{
  Json,
  extract::{Path, State, rejection::BytesRejection},
  http::{StatusCode, header},
  response::IntoResponse,
};
use bytes::Bytes;
use certa_core::{
  certificate::{BulkIssued, Certificate, CertificateFields, Issued},
  store::CertificateStore,
};
use certa_sheet::export::{DEFAULT_WORKBOOK_NAME, build_workbook};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ApiState, auth::MaybeActor, error::ApiError};

pub const XLSX_CONTENT_TYPE: &str =
  "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

// ─── Config ───────────────────────────────────────────────────────────────────

/// Server settings clients need to build the same links the server does.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicConfig {
  pub public_origin: String,
}

/// `GET /config`
pub async fn public_config<S: CertificateStore>(
  State(state): State<ApiState<S>>,
) -> Json<PublicConfig> {
  Json(PublicConfig { public_origin: state.public_origin.to_string() })
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /certificates`
pub async fn list<S: CertificateStore>(
  State(state): State<ApiState<S>>,
  actor: MaybeActor,
) -> Result<Json<Vec<Certificate>>, ApiError> {
  Ok(Json(state.service.list(actor.actor()).await?))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /certificates/{id}`
pub async fn get_one<S: CertificateStore>(
  State(state): State<ApiState<S>>,
  actor: MaybeActor,
  Path(id): Path<Uuid>,
) -> Result<Json<Certificate>, ApiError> {
  Ok(Json(state.service.get(actor.actor(), id).await?))
}

/// `GET /codes/{access_code}`
pub async fn by_code<S: CertificateStore>(
  State(state): State<ApiState<S>>,
  Path(code): Path<String>,
) -> Result<Json<Certificate>, ApiError> {
  state
    .service
    .get_by_access_code(&code)
    .await?
    .map(Json)
    .ok_or_else(|| ApiError::NotFound("no certificate with this access code".into()))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /certificates` — returns 201 + `{id, access_code}`.
pub async fn create<S: CertificateStore>(
  State(state): State<ApiState<S>>,
  actor: MaybeActor,
  Json(body): Json<CertificateFields>,
) -> Result<(StatusCode, Json<Issued>), ApiError> {
  let issued = state.service.create(actor.actor(), body).await?;
  tracing::info!(actor = %actor.require()?.id, id = %issued.id, "certificate issued");
  Ok((StatusCode::CREATED, Json(issued)))
}

#[derive(Debug, Deserialize)]
pub struct BulkBody {
  pub certificates: Vec<CertificateFields>,
}

/// `POST /certificates/bulk`
pub async fn bulk<S: CertificateStore>(
  State(state): State<ApiState<S>>,
  actor: MaybeActor,
  Json(body): Json<BulkBody>,
) -> Result<(StatusCode, Json<Vec<BulkIssued>>), ApiError> {
  let issued = state.service.bulk_create(actor.actor(), body.certificates).await?;
  tracing::info!(actor = %actor.require()?.id, count = issued.len(), "certificates issued in bulk");
  Ok((StatusCode::CREATED, Json(issued)))
}

/// `POST /certificates/import` — body is an `.xlsx`/`.xls` workbook.
pub async fn import<S: CertificateStore>(
  State(state): State<ApiState<S>>,
  actor: MaybeActor,
  body: Result<Bytes, BytesRejection>,
) -> Result<(StatusCode, Json<Vec<BulkIssued>>), ApiError> {
  let who = actor.require()?;
  let body = body?;
  let issued = certa_sheet::import::import_into(&state.service, Some(who), &body).await?;
  tracing::info!(actor = %who.id, count = issued.len(), "certificates imported");
  Ok((StatusCode::CREATED, Json(issued)))
}

// ─── Update / delete ──────────────────────────────────────────────────────────

/// `PUT /certificates/{id}`
pub async fn update<S: CertificateStore>(
  State(state): State<ApiState<S>>,
  actor: MaybeActor,
  Path(id): Path<Uuid>,
  Json(body): Json<CertificateFields>,
) -> Result<Json<Certificate>, ApiError> {
  let cert = state.service.update(actor.actor(), id, body).await?;
  tracing::info!(actor = %actor.require()?.id, %id, "certificate updated");
  Ok(Json(cert))
}

/// `DELETE /certificates/{id}`
pub async fn delete<S: CertificateStore>(
  State(state): State<ApiState<S>>,
  actor: MaybeActor,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  state.service.delete(actor.actor(), id).await?;
  tracing::info!(actor = %actor.require()?.id, %id, "certificate deleted");
  Ok(StatusCode::NO_CONTENT)
}

// ─── Export ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ExportBody {
  pub ids: Vec<Uuid>,
}

/// `POST /certificates/export` — the selection as an xlsx workbook, in the
/// order given.
///
/// QR images are not produced here; clients fetch them per record.
pub async fn export<S: CertificateStore>(
  State(state): State<ApiState<S>>,
  actor: MaybeActor,
  Json(body): Json<ExportBody>,
) -> Result<impl IntoResponse, ApiError> {
  let who = actor.require()?;
  if body.ids.is_empty() {
    return Err(certa_sheet::Error::EmptySelection.into());
  }

  let mut certs = Vec::with_capacity(body.ids.len());
  for id in body.ids {
    certs.push(state.service.get(Some(who), id).await?);
  }
  let workbook = build_workbook(&certs, &state.public_origin)?;
  tracing::info!(actor = %who.id, count = certs.len(), "certificates exported");

  Ok((
    [
      (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_owned()),
      (
        header::CONTENT_DISPOSITION,
        format!("attachment; filename=\"{DEFAULT_WORKBOOK_NAME}\""),
      ),
    ],
    workbook,
  ))
}
