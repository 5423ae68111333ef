//! # HUD Client
//!
//! Dashboard de telemetria ao vivo. Conecta ao feed WebSocket do host
//! (`/ws`), exibe um grid configurável de cards e lembra quais módulos o
//! usuário quer ver.
//!
//! ## Uso
//! ```bash
//! hud                                   # Janela, origem do config.toml
//! hud --origin https://192.168.1.5:8443 # Sobrescreve a origem
//! hud --headless                        # Sem janela, cards no log
//! ```
//!
//! ## Atalhos
//! - `S`: Escolher módulos
//! - `F` / `F11`: Fullscreen
//! - `T`: Alternar tema
//! - `Q` / `Esc`: Sair

mod dashboard;
mod net_thread;
mod panels;
mod theme_egui;

use clap::Parser;
use crossbeam_channel::Receiver;
use dashboard::HudDashboard;
use hud_core::config::AppConfig;
use hud_core::feed::FeedEvent;
use hud_core::hud::Hud;
use hud_core::prefs::{FileStore, PreferenceStore};
use hud_core::protocol::feed_url;
use hud_core::registry::ModuleRegistry;
use hud_core::render::ViewModel;
use std::path::PathBuf;
use tracing::{error, info, warn};

#[derive(Debug, Parser)]
#[command(version, about = "HUD de telemetria ao vivo")]
struct Args {
    /// Caminho do config.toml (padrão: ao lado do executável)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Origem do host do feed, ex: http://192.168.1.5:8080
    #[arg(long)]
    origin: Option<String>,

    /// Não abre janela; escreve os cards no log a cada frame
    #[arg(long)]
    headless: bool,
}

fn main() -> eframe::Result<()> {
    // ── Logging ──
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();

    // ── Config ──
    let config_path = args.config.unwrap_or_else(AppConfig::default_path);
    let mut config = AppConfig::load(&config_path);

    if !config_path.exists() {
        if let Err(e) = config.save(&config_path) {
            warn!("Não foi possível salvar config padrão: {e}");
        }
    }
    if let Some(origin) = args.origin {
        config.client.origin = origin;
    }
    for problem in config.validate() {
        warn!("Config: {problem}");
    }

    let client = config.client;
    let url = match feed_url(&client.origin) {
        Ok(url) => url,
        Err(e) => {
            error!("Origem do feed inválida '{}': {e}", client.origin);
            std::process::exit(2);
        }
    };

    // ── Core ──
    let prefs_path = client.prefs_path();
    info!("Preferências em {}", prefs_path.display());
    let hud = Hud::new(
        ModuleRegistry::builtin(),
        PreferenceStore::new(FileStore::open(prefs_path)),
        client.render_options(),
    );

    let feed_url = url.to_string();
    let rx = net_thread::spawn_feed_thread(url, client.retry_policy(), client.idle_timeout());

    if args.headless {
        run_headless(hud, &rx);
        return Ok(());
    }

    // ── Janela eframe ──
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_title("⚡ HUD ⚡")
            .with_inner_size([960.0, 540.0])
            .with_min_inner_size([480.0, 320.0]),
        ..Default::default()
    };

    eframe::run_native(
        "HUD",
        options,
        Box::new(move |cc| Ok(Box::new(HudDashboard::new(cc, client, hud, rx, feed_url)))),
    )
}

/// Modo sem janela: aplica cada snapshot e escreve os cards no log.
fn run_headless(mut hud: Hud<FileStore>, rx: &Receiver<FeedEvent>) {
    for event in rx.iter() {
        match event {
            FeedEvent::State(state) => info!("Feed: {state}"),
            FeedEvent::Snapshot(snapshot, arrived) => {
                hud.apply_snapshot_at(&snapshot, arrived);
                info!("{}", summary(hud.view()));
            }
        }
    }
}

fn summary(view: &ViewModel) -> String {
    view.cards
        .iter()
        .map(|c| format!("{} {}{}", c.descriptor.label, c.text, c.descriptor.unit))
        .collect::<Vec<_>>()
        .join(" | ")
}
