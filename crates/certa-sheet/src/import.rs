//! Bulk import: workbook → certificate fields → bulk create.
//!
//! Only the first sheet is read. Its first row is the header; each later row
//! is one candidate. Header names are matched exactly after trimming.

use std::io::Cursor;

use calamine::{Data, Reader, open_workbook_auto_from_rs};
use certa_core::{
  actor::Actor,
  certificate::{BulkIssued, CertificateFields},
  service::CertificateService,
  store::CertificateStore,
};

use crate::{Error, Result};

/// Header variants per field, in priority order.
pub const NAME_HEADERS: &[&str] = &["Name", "name", "Full Name"];
pub const ROLE_HEADERS: &[&str] = &["Role", "role", "Position"];
pub const DURATION_HEADERS: &[&str] = &["Duration", "duration"];

/// Rows read from a workbook.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportedRows {
  pub rows:    Vec<CertificateFields>,
  /// Non-blank rows dropped for lacking a name or a role.
  pub dropped: usize,
}

/// Read candidate rows from the first sheet of `bytes`.
///
/// The format (`.xlsx`, `.xls`, …) is detected from the content. Returns
/// [`Error::EmptyImport`] when no row has both a name and a role.
pub fn read_rows(bytes: &[u8]) -> Result<ImportedRows> {
  let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
  let range = match workbook.worksheet_range_at(0) {
    Some(range) => range?,
    None => return Err(Error::EmptyImport),
  };

  let mut rows = range.rows();
  let header: Vec<String> = match rows.next() {
    Some(cells) => cells.iter().map(cell_text).collect(),
    None => return Err(Error::EmptyImport),
  };
  let columns = Columns::resolve(&header);

  let mut imported = ImportedRows::default();
  for row in rows {
    if row.iter().all(|c| cell_text(c).is_empty()) {
      continue;
    }
    let name = pick(&columns.name, row);
    let role = pick(&columns.role, row);
    match (name, role) {
      (Some(name), Some(role)) => imported.rows.push(CertificateFields {
        candidate_name: name,
        role,
        duration: pick(&columns.duration, row).unwrap_or_default(),
      }),
      _ => imported.dropped += 1,
    }
  }

  if imported.rows.is_empty() {
    return Err(Error::EmptyImport);
  }
  Ok(imported)
}

/// Read `bytes` and bulk-create every valid row in one call.
///
/// Nothing is written when the workbook has no valid rows.
pub async fn import_into<S: CertificateStore>(
  service: &CertificateService<S>,
  actor: Option<&Actor>,
  bytes: &[u8],
) -> Result<Vec<BulkIssued>> {
  let imported = read_rows(bytes)?;
  if imported.dropped > 0 {
    tracing::info!(dropped = imported.dropped, "skipped rows without a name or role");
  }
  Ok(service.bulk_create(actor, imported.rows).await?)
}

// ─── Header resolution ───────────────────────────────────────────────────────

/// Column indices of each header variant present, in priority order.
struct Columns {
  name:     Vec<usize>,
  role:     Vec<usize>,
  duration: Vec<usize>,
}

impl Columns {
  fn resolve(header: &[String]) -> Self {
    let find = |variants: &[&str]| -> Vec<usize> {
      variants
        .iter()
        .filter_map(|v| header.iter().position(|h| h == v))
        .collect()
    };
    Self {
      name:     find(NAME_HEADERS),
      role:     find(ROLE_HEADERS),
      duration: find(DURATION_HEADERS),
    }
  }
}

/// First non-empty value among `indices`.
fn pick(indices: &[usize], row: &[Data]) -> Option<String> {
  indices
    .iter()
    .filter_map(|&i| row.get(i))
    .map(cell_text)
    .find(|s| !s.is_empty())
}

/// Render a cell as trimmed text. Whole floats lose their `.0`.
fn cell_text(cell: &Data) -> String {
  match cell {
    Data::Empty => String::new(),
    Data::String(s) => s.trim().to_owned(),
    Data::Int(i) => i.to_string(),
    Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
    Data::Float(f) => f.to_string(),
    Data::Bool(b) => b.to_string(),
    other => other.to_string().trim().to_owned(),
  }
}
