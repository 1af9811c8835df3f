//! `certa` — command-line client and terminal dashboard for a certa server.
//!
//! # Usage
//!
//! ```text
//! certa --url http://localhost:8080 --user admin --password secret
//! certa issue "Asha Rao" "Backend Intern" "Jun–Aug 2024"
//! certa import roster.xlsx
//! certa export --out ./export
//! certa --config ~/.config/certa/config.toml list
//! ```

mod app;
mod client;
mod export;
mod qr;
mod ui;

use std::{io, path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use app::App;
use certa_core::{
  certificate::{Certificate, CertificateFields},
  viewer::{ViewerState, viewer_link},
};
use certa_sheet::qr::{DEFAULT_QR_ENDPOINT, DEFAULT_QR_SIZE, QrEndpoint};
use clap::{Parser, Subcommand};
use client::{ApiClient, ApiConfig};
use crossterm::{
  event::{self, Event},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use export::Exporter;
use ratatui::{Terminal, backend::CrosstermBackend};
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "certa", about = "Issue, manage and verify certificates")]
struct Args {
  /// Path to a TOML config file (url, username, password, qr_endpoint).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the certa server (default: http://localhost:8080).
  #[arg(long, env = "CERTA_URL")]
  url: Option<String>,

  /// API username.
  #[arg(long, env = "CERTA_USER")]
  user: Option<String>,

  /// API password (plaintext).
  #[arg(long, env = "CERTA_PASSWORD")]
  password: Option<String>,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Interactive dashboard (default).
  Dashboard {
    /// Directory exports are written to.
    #[arg(long, default_value = ".")]
    out: PathBuf,
  },
  /// Print every certificate, newest first.
  List,
  /// Issue a single certificate.
  Issue {
    name:     String,
    role:     String,
    #[arg(default_value = "")]
    duration: String,
  },
  /// Change the name, role or duration of a certificate.
  Edit {
    id:       Uuid,
    #[arg(long)]
    name:     Option<String>,
    #[arg(long)]
    role:     Option<String>,
    #[arg(long)]
    duration: Option<String>,
  },
  /// Permanently delete a certificate.
  Delete { id: Uuid },
  /// Bulk-issue certificates from an .xlsx/.xls workbook.
  Import { file: PathBuf },
  /// Write a workbook and one QR image per certificate.
  Export {
    /// Output directory.
    #[arg(long, default_value = ".")]
    out: PathBuf,
    /// Certificates to export; all when omitted.
    ids: Vec<Uuid>,
  },
  /// Look up a certificate by access code, as the public viewer does.
  View { access_code: String },
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url:         String,
  #[serde(default)]
  username:    String,
  #[serde(default)]
  password:    String,
  #[serde(default)]
  qr_endpoint: Option<String>,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let api_config = ApiConfig {
    base_url: args
      .url
      .or_else(|| (!file_cfg.url.is_empty()).then(|| file_cfg.url.clone()))
      .unwrap_or_else(|| "http://localhost:8080".to_string()),
    username: args
      .user
      .or_else(|| (!file_cfg.username.is_empty()).then(|| file_cfg.username.clone()))
      .unwrap_or_default(),
    password: args
      .password
      .or_else(|| (!file_cfg.password.is_empty()).then(|| file_cfg.password.clone()))
      .unwrap_or_default(),
  };
  let qr_endpoint = QrEndpoint::new(
    file_cfg.qr_endpoint.as_deref().unwrap_or(DEFAULT_QR_ENDPOINT),
    DEFAULT_QR_SIZE,
  )
  .context("invalid qr_endpoint")?;

  let command = args.command.unwrap_or(Command::Dashboard { out: PathBuf::from(".") });

  // The dashboard owns the terminal; everything else logs to stderr.
  if !matches!(command, Command::Dashboard { .. }) {
    tracing_subscriber::fmt()
      .with_writer(io::stderr)
      .with_env_filter(
        EnvFilter::builder()
          .with_default_directive(LevelFilter::WARN.into())
          .from_env_lossy(),
      )
      .init();
  }

  let client = ApiClient::new(api_config)?;

  match command {
    Command::Dashboard { out } => {
      let origin = client.public_origin().await?;
      let exporter = Exporter::new(&client, qr_endpoint, origin, out);
      run_dashboard(App::new(client, exporter)).await
    }
    Command::List => {
      for cert in client.list().await? {
        print_row(&cert);
      }
      Ok(())
    }
    Command::Issue { name, role, duration } => {
      let issued = client.create(&CertificateFields::new(name, role, duration)).await?;
      let origin = client.public_origin().await?;
      println!("{}", issued.id);
      println!("{}", viewer_link(&origin, &issued.access_code));
      Ok(())
    }
    Command::Edit { id, name, role, duration } => {
      let current = client.get(id).await?;
      let fields = CertificateFields {
        candidate_name: name.unwrap_or(current.candidate_name),
        role:           role.unwrap_or(current.role),
        duration:       duration.unwrap_or(current.duration),
      };
      print_row(&client.update(id, &fields).await?);
      Ok(())
    }
    Command::Delete { id } => {
      client.delete(id).await?;
      println!("deleted {id}");
      Ok(())
    }
    Command::Import { file } => {
      let bytes = tokio::fs::read(&file)
        .await
        .with_context(|| format!("reading {}", file.display()))?;
      let issued = client.import(bytes).await?;
      let origin = client.public_origin().await?;
      for entry in &issued {
        println!(
          "{}\t{}\t{}",
          entry.id,
          entry.fields.candidate_name,
          viewer_link(&origin, &entry.access_code)
        );
      }
      println!("imported {} certificates", issued.len());
      Ok(())
    }
    Command::Export { out, ids } => {
      let certs = if ids.is_empty() {
        client.list().await?
      } else {
        let mut certs = Vec::with_capacity(ids.len());
        for id in ids {
          certs.push(client.get(id).await?);
        }
        certs
      };
      let origin = client.public_origin().await?;
      let exporter = Exporter::new(&client, qr_endpoint, origin, out);
      let report = exporter.export(&certs).await?;
      println!("{}", export::summary(&report, &exporter));
      Ok(())
    }
    Command::View { access_code } => {
      let found = client.by_code(&access_code).await?;
      println!("{}", view_text(&ViewerState::resolved(found.as_ref()))?);
      Ok(())
    }
  }
}

/// Plain-text rendering of a resolved viewer state.
fn view_text(state: &ViewerState) -> Result<String> {
  match state {
    ViewerState::Found(view) => {
      let mut lines = vec![
        "Certificate of Completion".to_owned(),
        view.candidate_name.clone(),
        view.role.clone(),
      ];
      if !view.duration.is_empty() {
        lines.push(view.duration.clone());
      }
      lines.push(format!("Issued {}", view.issued));
      Ok(lines.join("\n"))
    }
    ViewerState::NotFound => anyhow::bail!("Certificate Not Found"),
    ViewerState::Loading => anyhow::bail!("certificate lookup did not resolve"),
  }
}

fn print_row(cert: &Certificate) {
  println!(
    "{}\t{}\t{}\t{}\t{}",
    cert.id,
    cert.issue_date.format("%Y-%m-%d"),
    cert.candidate_name,
    cert.role,
    cert.duration
  );
}

// ─── Dashboard ────────────────────────────────────────────────────────────────

async fn run_dashboard(mut app: App) -> Result<()> {
  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  let load_result = app.load_certificates().await;

  // Run the event loop; restore terminal even on error.
  let run_result = if load_result.is_ok() {
    run_event_loop(&mut terminal, &mut app).await
  } else {
    load_result
  };

  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  run_result
}

async fn run_event_loop(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App,
) -> Result<()> {
  loop {
    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    // Lookups queued by the last key run after `Loading` has been drawn.
    if app.pending_lookup.is_some() {
      app.resolve_pending().await;
      continue;
    }

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(50))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    if let Some(Event::Key(key)) = maybe_event {
      if !app.handle_key(key).await? {
        break;
      }
    }
  }

  Ok(())
}
