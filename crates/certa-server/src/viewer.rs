//! Public HTML pages: the certificate viewer at `/c/{access_code}` and the
//! landing page at `/`.
//!
//! Every interpolated value goes through [`quick_xml::escape::escape`].

use axum::{
  extract::{Path, State},
  http::StatusCode,
  response::{Html, IntoResponse, Response},
};
use certa_core::{
  store::CertificateStore,
  viewer::{CertificateView, ViewerState},
};
use quick_xml::escape::escape;

use crate::AppState;

// ─── Handlers ─────────────────────────────────────────────────────────────────

/// `GET /c/{access_code}` — 200 with the certificate, 404 otherwise.
pub async fn certificate_page<S: CertificateStore>(
  State(state): State<AppState<S>>,
  Path(code): Path<String>,
) -> Response {
  let organization = &state.config.organization;
  let lookup = match state.api.service.get_by_access_code(&code).await {
    Ok(found) => found,
    Err(e) => {
      tracing::error!(error = %e, "certificate lookup failed");
      let page = page(organization, "Error", "<h1>Something went wrong</h1>");
      return (StatusCode::INTERNAL_SERVER_ERROR, Html(page)).into_response();
    }
  };

  state_response(&ViewerState::resolved(lookup.as_ref()), organization)
}

/// The page and status for a viewer state.
pub fn state_response(state: &ViewerState, organization: &str) -> Response {
  match state {
    ViewerState::Found(view) => Html(render_found(view, organization)).into_response(),
    ViewerState::NotFound => {
      (StatusCode::NOT_FOUND, Html(render_not_found(organization))).into_response()
    }
    ViewerState::Loading => {
      tracing::error!("viewer state unresolved after lookup");
      let page = page(organization, "Error", "<h1>Something went wrong</h1>");
      (StatusCode::INTERNAL_SERVER_ERROR, Html(page)).into_response()
    }
  }
}

/// `GET /`
pub async fn landing<S: CertificateStore>(State(state): State<AppState<S>>) -> Html<String> {
  Html(render_landing(&state.config.organization))
}

// ─── Rendering ────────────────────────────────────────────────────────────────

pub fn render_found(view: &CertificateView, organization: &str) -> String {
  let duration = if view.duration.trim().is_empty() {
    String::new()
  } else {
    format!("<p class=\"duration\">{}</p>", escape(view.duration.as_str()))
  };
  let body = format!(
    r#"<p class="kicker">Certificate of Completion</p>
<p>This is to certify that</p>
<h1>{name}</h1>
<p>has successfully completed the role of</p>
<h2>{role}</h2>
{duration}
<dl>
  <dt>Issued</dt><dd>{issued}</dd>
  <dt>Certificate ID</dt><dd><code>{code}</code></dd>
</dl>
<p class="verified">Verified by {org}</p>"#,
    name = escape(view.candidate_name.as_str()),
    role = escape(view.role.as_str()),
    issued = escape(view.issued.as_str()),
    code = escape(view.access_code.as_str()),
    org = escape(organization),
  );
  page(organization, &view.candidate_name, &body)
}

pub fn render_not_found(organization: &str) -> String {
  let body = "<h1>Certificate Not Found</h1>\n\
              <p>The certificate you are looking for does not exist or has been removed.</p>";
  page(organization, "Certificate Not Found", body)
}

pub fn render_landing(organization: &str) -> String {
  let body = format!(
    r#"<h1>{org} certificates</h1>
<p>Every certificate issued by {org} carries a private link of the form
<code>/c/&lt;access code&gt;</code>. Open that link to verify it.</p>
<p>Administrators manage certificates through the JSON API under
<code>/api</code> or the <code>certa</code> command-line client.</p>"#,
    org = escape(organization),
  );
  page(organization, "Certificates", &body)
}

/// Wrap `body` (already escaped) in the shared page chrome.
fn page(organization: &str, title: &str, body: &str) -> String {
  format!(
    r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} · {org}</title>
<style>
  body {{ font-family: Georgia, serif; max-width: 40rem; margin: 4rem auto; padding: 0 1rem; text-align: center; color: #222; }}
  .kicker {{ letter-spacing: .2em; text-transform: uppercase; color: #666; }}
  dl {{ display: inline-grid; grid-template-columns: auto auto; gap: .25rem 1rem; text-align: left; }}
  dt {{ color: #666; }}
  .verified {{ margin-top: 3rem; font-size: .9rem; color: #2a7; }}
</style>
</head>
<body>
{body}
</body>
</html>
"#,
    title = escape(title),
    org = escape(organization),
  )
}

#[cfg(test)]
mod tests {
  use certa_core::access_code::AccessCode;

  use super::*;

  fn view(name: &str) -> CertificateView {
    CertificateView {
      candidate_name: name.into(),
      role:           "Backend Intern".into(),
      duration:       "Jun–Aug 2024".into(),
      access_code:    AccessCode::from_raw("abc123"),
      issued:         "14 June 2024".into(),
    }
  }

  #[test]
  fn found_page_shows_every_field() {
    let html = render_found(&view("Asha Rao"), "Acme Labs");
    for needle in [
      "Certificate of Completion",
      "Asha Rao",
      "Backend Intern",
      "Jun–Aug 2024",
      "14 June 2024",
      "abc123",
      "Verified by Acme Labs",
    ] {
      assert!(html.contains(needle), "missing {needle:?}");
    }
  }

  #[test]
  fn values_are_escaped() {
    let html = render_found(&view("<script>alert(1)</script>"), "A & B");
    assert!(!html.contains("<script>"));
    assert!(html.contains("&lt;script&gt;"));
    assert!(html.contains("Verified by A &amp; B"));
  }

  #[test]
  fn empty_duration_is_omitted() {
    let mut v = view("Ben");
    v.duration.clear();
    assert!(!render_found(&v, "Acme").contains("class=\"duration\""));
  }

  #[test]
  fn not_found_page() {
    assert!(render_not_found("Acme").contains("Certificate Not Found"));
  }

  #[test]
  fn each_state_gets_its_own_status() {
    let found = state_response(&ViewerState::Found(view("Ben")), "Acme");
    assert_eq!(found.status(), StatusCode::OK);
    assert_eq!(state_response(&ViewerState::NotFound, "Acme").status(), StatusCode::NOT_FOUND);
    assert_eq!(
      state_response(&ViewerState::Loading, "Acme").status(),
      StatusCode::INTERNAL_SERVER_ERROR
    );
  }
}
