//! Dashboard state machine and event dispatcher.

use std::{collections::HashSet, sync::Arc};

use certa_core::{certificate::Certificate, viewer::ViewerState};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};
use uuid::Uuid;

use crate::{
  client::ApiClient,
  export::{self, Exporter},
};

pub const EMPTY_SELECTION_MSG: &str = "Select at least one certificate to export";

// ─── Screen ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
  /// Focus on the certificate list.
  List,
  /// Focus on the viewer pane.
  Viewer,
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level dashboard state.
pub struct App {
  pub screen: Screen,

  /// All certificates, newest first.
  pub certificates: Vec<Certificate>,

  /// Ids marked for export.
  pub selected: HashSet<Uuid>,

  pub filter:        String,
  pub filter_active: bool,

  /// Cursor position within the *filtered* list.
  pub list_cursor: usize,

  /// Viewer pane state; `None` until a certificate is opened.
  pub viewer: Option<ViewerState>,

  /// Access code whose lookup runs after the next frame is drawn.
  pub pending_lookup: Option<String>,

  /// Certificate awaiting a `y` to confirm deletion.
  pub pending_delete: Option<Uuid>,

  pub status_msg: String,

  pub client:   Arc<ApiClient>,
  pub exporter: Arc<Exporter>,
}

impl App {
  pub fn new(client: ApiClient, exporter: Exporter) -> Self {
    Self {
      screen:         Screen::List,
      certificates:   Vec::new(),
      selected:       HashSet::new(),
      filter:         String::new(),
      filter_active:  false,
      list_cursor:    0,
      viewer:         None,
      pending_lookup: None,
      pending_delete: None,
      status_msg:     String::new(),
      client:         Arc::new(client),
      exporter:       Arc::new(exporter),
    }
  }

  // ── Data loading ──────────────────────────────────────────────────────────

  /// Fetch all certificates. Selections of vanished ids are dropped.
  pub async fn load_certificates(&mut self) -> anyhow::Result<()> {
    self.status_msg = "Loading certificates…".into();
    match self.client.list().await {
      Ok(certs) => {
        self.set_certificates(certs);
        self.status_msg = String::new();
        Ok(())
      }
      Err(e) => {
        self.status_msg = format!("Error: {e}");
        Err(e)
      }
    }
  }

  pub fn set_certificates(&mut self, certs: Vec<Certificate>) {
    let ids: HashSet<Uuid> = certs.iter().map(|c| c.id).collect();
    self.selected.retain(|id| ids.contains(id));
    self.certificates = certs;
    let len = self.filtered_certificates().len();
    self.list_cursor = self.list_cursor.min(len.saturating_sub(1));
  }

  /// Resolve a lookup queued by [`App::open_viewer`].
  pub async fn resolve_pending(&mut self) {
    let Some(code) = self.pending_lookup.take() else {
      return;
    };
    match self.client.by_code(&code).await {
      Ok(found) => self.viewer = Some(ViewerState::resolved(found.as_ref())),
      Err(e) => {
        self.viewer = None;
        self.screen = Screen::List;
        self.status_msg = format!("Error: {e}");
      }
    }
  }

  // ── Filtered list ─────────────────────────────────────────────────────────

  /// Certificates whose name, role or duration match the filter query.
  pub fn filtered_certificates(&self) -> Vec<&Certificate> {
    if self.filter.is_empty() {
      return self.certificates.iter().collect();
    }
    let matcher = SkimMatcherV2::default();
    self
      .certificates
      .iter()
      .filter(|c| {
        [&c.candidate_name, &c.role, &c.duration]
          .iter()
          .any(|text| matcher.fuzzy_match(text, &self.filter).is_some())
      })
      .collect()
  }

  pub fn cursor_certificate(&self) -> Option<&Certificate> {
    self.filtered_certificates().get(self.list_cursor).copied()
  }

  /// Selected certificates in list order.
  pub fn selection(&self) -> Vec<Certificate> {
    self
      .certificates
      .iter()
      .filter(|c| self.selected.contains(&c.id))
      .cloned()
      .collect()
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub async fn handle_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return Ok(false);
    }

    if let Some(id) = self.pending_delete.take() {
      self.confirm_delete(id, key.code == KeyCode::Char('y')).await;
      return Ok(true);
    }

    if self.filter_active {
      self.handle_filter_key(key);
      return Ok(true);
    }

    match self.screen {
      Screen::List => self.handle_list_key(key).await,
      Screen::Viewer => Ok(self.handle_viewer_key(key)),
    }
  }

  fn handle_filter_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Esc => {
        self.filter_active = false;
        self.filter.clear();
        self.list_cursor = 0;
      }
      KeyCode::Enter => {
        self.filter_active = false;
        self.list_cursor = 0;
      }
      KeyCode::Backspace => {
        self.filter.pop();
        self.list_cursor = 0;
      }
      KeyCode::Char(c) => {
        self.filter.push(c);
        self.list_cursor = 0;
      }
      _ => {}
    }
  }

  async fn handle_list_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    match key.code {
      KeyCode::Char('q') => return Ok(false),

      KeyCode::Down | KeyCode::Char('j') => {
        let len = self.filtered_certificates().len();
        if len > 0 && self.list_cursor + 1 < len {
          self.list_cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.list_cursor = self.list_cursor.saturating_sub(1);
      }

      // Selection
      KeyCode::Char(' ') => {
        if let Some(id) = self.cursor_certificate().map(|c| c.id) {
          if !self.selected.remove(&id) {
            self.selected.insert(id);
          }
        }
      }
      KeyCode::Char('a') => {
        let visible: Vec<Uuid> = self.filtered_certificates().iter().map(|c| c.id).collect();
        if visible.iter().all(|id| self.selected.contains(id)) {
          for id in &visible {
            self.selected.remove(id);
          }
        } else {
          self.selected.extend(visible);
        }
      }

      KeyCode::Char('x') => self.export_selected().await,

      KeyCode::Char('d') => {
        if let Some((id, name)) = self.cursor_certificate().map(|c| (c.id, c.candidate_name.clone())) {
          self.status_msg = format!("Delete {name}? [y/N]");
          self.pending_delete = Some(id);
        }
      }

      KeyCode::Char('r') => {
        self.load_certificates().await.ok();
      }

      KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => self.open_viewer(),

      KeyCode::Char('/') => {
        self.filter_active = true;
        self.filter.clear();
        self.list_cursor = 0;
      }

      _ => {}
    }
    Ok(true)
  }

  fn handle_viewer_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      KeyCode::Char('q') => return false,
      KeyCode::Esc | KeyCode::Left | KeyCode::Char('h') => {
        self.screen = Screen::List;
        self.viewer = None;
        self.pending_lookup = None;
      }
      _ => {}
    }
    true
  }

  /// Show the viewer for the cursor certificate in the `Loading` state and
  /// queue its lookup.
  fn open_viewer(&mut self) {
    let Some(code) = self.cursor_certificate().map(|c| c.access_code.as_str().to_owned()) else {
      return;
    };
    self.viewer = Some(ViewerState::Loading);
    self.pending_lookup = Some(code);
    self.screen = Screen::Viewer;
  }

  async fn export_selected(&mut self) {
    let certs = self.selection();
    if certs.is_empty() {
      self.status_msg = EMPTY_SELECTION_MSG.into();
      return;
    }
    self.status_msg = match self.exporter.export(&certs).await {
      Ok(report) => export::summary(&report, &self.exporter),
      Err(e) => format!("Export failed: {e}"),
    };
  }

  async fn confirm_delete(&mut self, id: Uuid, confirmed: bool) {
    if !confirmed {
      self.status_msg = String::new();
      return;
    }
    match self.client.delete(id).await {
      Ok(()) => {
        tracing::info!(%id, "certificate deleted");
        let remaining = self.certificates.iter().filter(|c| c.id != id).cloned().collect();
        self.set_certificates(remaining);
        self.status_msg = "Deleted".into();
      }
      Err(e) => self.status_msg = format!("Error: {e}"),
    }
  }
}
