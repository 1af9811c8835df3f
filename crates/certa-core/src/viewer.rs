//! Public presentation of a single certificate.
//!
//! The viewer moves from [`ViewerState::Loading`] to either
//! [`ViewerState::NotFound`] or [`ViewerState::Found`] once the lookup by
//! access code resolves. `Loading` and `NotFound` are never conflated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{access_code::AccessCode, certificate::Certificate};

/// Path prefix of the public viewer route.
pub const VIEWER_PATH_PREFIX: &str = "/c/";

/// The shareable link `<origin>/c/<access_code>`.
pub fn viewer_link(origin: &str, code: &AccessCode) -> String {
  format!("{}{VIEWER_PATH_PREFIX}{code}", origin.trim_end_matches('/'))
}

/// Human-readable issue date, e.g. `14 June 2024`.
pub fn format_issue_date(issue_date: DateTime<Utc>) -> String {
  issue_date.format("%-d %B %Y").to_string()
}

/// Everything the viewer shows about a certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateView {
  pub candidate_name: String,
  pub role:           String,
  pub duration:       String,
  pub access_code:    AccessCode,
  /// Already formatted with [`format_issue_date`].
  pub issued:         String,
}

impl From<&Certificate> for CertificateView {
  fn from(cert: &Certificate) -> Self {
    Self {
      candidate_name: cert.candidate_name.clone(),
      role:           cert.role.clone(),
      duration:       cert.duration.clone(),
      access_code:    cert.access_code.clone(),
      issued:         format_issue_date(cert.issue_date),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "certificate", rename_all = "snake_case")]
pub enum ViewerState {
  /// The lookup has not resolved yet.
  Loading,
  NotFound,
  Found(CertificateView),
}

impl ViewerState {
  /// The terminal state for a resolved lookup.
  pub fn resolved(lookup: Option<&Certificate>) -> Self {
    match lookup {
      Some(cert) => Self::Found(cert.into()),
      None => Self::NotFound,
    }
  }

  pub fn is_loading(&self) -> bool { matches!(self, Self::Loading) }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;
  use uuid::Uuid;

  use super::*;
  use crate::actor::ActorId;

  fn cert() -> Certificate {
    Certificate {
      id:             Uuid::nil(),
      candidate_name: "Asha Rao".into(),
      role:           "Backend Intern".into(),
      duration:       "Jun–Aug 2024".into(),
      access_code:    AccessCode::from_raw("k2j4h5g6f7d8s9a0q1w2e3r4t5"),
      issue_date:     Utc.with_ymd_and_hms(2024, 6, 14, 9, 30, 0).unwrap(),
      created_by:     ActorId::new("admin"),
    }
  }

  #[test]
  fn viewer_link_strips_trailing_slash() {
    let code = AccessCode::from_raw("abc");
    assert_eq!(viewer_link("https://certs.example.org/", &code), "https://certs.example.org/c/abc");
    assert_eq!(viewer_link("https://certs.example.org", &code), "https://certs.example.org/c/abc");
  }

  #[test]
  fn resolved_hit_is_found_with_formatted_date() {
    let c = cert();
    let ViewerState::Found(view) = ViewerState::resolved(Some(&c)) else {
      panic!("expected Found");
    };
    assert_eq!(view.candidate_name, "Asha Rao");
    assert_eq!(view.issued, "14 June 2024");
    assert_eq!(view.access_code, c.access_code);
  }

  #[test]
  fn resolved_miss_is_not_found_not_loading() {
    let state = ViewerState::resolved(None);
    assert_eq!(state, ViewerState::NotFound);
    assert!(!state.is_loading());
    assert!(ViewerState::Loading.is_loading());
  }
}
