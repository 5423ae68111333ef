//! Dashboard principal – App eframe/egui.

use crate::panels;
use crate::theme_egui::{self, EguiTheme};
use crossbeam_channel::Receiver;
use egui::{Color32, RichText};
use hud_core::config::ClientConfig;
use hud_core::connection::ConnectionState;
use hud_core::feed::FeedEvent;
use hud_core::hud::Hud;
use hud_core::prefs::FileStore;
use std::time::Instant;
use tracing::{error, info};

const GRID_COLUMNS: usize = 3;

/// Estado do dashboard.
pub struct HudDashboard {
    config: ClientConfig,
    theme: EguiTheme,
    theme_index: usize,
    all_themes: Vec<EguiTheme>,

    // Dados
    hud: Hud<FileStore>,
    rx: Receiver<FeedEvent>,
    feed_url: String,
    connection: ConnectionState,
    last_frame: Option<Instant>,

    // UI state
    show_settings: bool,
    is_fullscreen: bool,
}

impl HudDashboard {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        config: ClientConfig,
        hud: Hud<FileStore>,
        rx: Receiver<FeedEvent>,
        feed_url: String,
    ) -> Self {
        let all_themes = theme_egui::all_themes();
        let theme_index = theme_egui::theme_index(&all_themes, &config.theme);
        let theme = all_themes[theme_index].clone();

        Self {
            config,
            theme,
            theme_index,
            all_themes,
            hud,
            rx,
            feed_url,
            connection: ConnectionState::Disconnected,
            last_frame: None,
            show_settings: false,
            is_fullscreen: false,
        }
    }

    /// Processa eventos pendentes da thread do feed, na ordem de chegada.
    fn poll_feed(&mut self) {
        while let Ok(event) = self.rx.try_recv() {
            match event {
                FeedEvent::State(state) => self.connection = state,
                FeedEvent::Snapshot(snapshot, arrived) => {
                    // Vários frames podem chegar no mesmo repaint
                    self.hud.apply_snapshot_at(&snapshot, arrived);
                    self.last_frame = Some(arrived);
                }
            }
        }
    }

    /// Valores antigos: sem conexão, ou sem frames há mais de `stale_after_secs`.
    fn is_stale(&self) -> bool {
        self.connection != ConnectionState::Connected
            || self
                .last_frame
                .is_none_or(|t| t.elapsed() > self.config.stale_after())
    }

    fn status_line(&self) -> (String, Color32) {
        let host = self
            .hud
            .host_os()
            .map(|os| format!(" ({os})"))
            .unwrap_or_default();

        match (self.connection, self.last_frame) {
            (ConnectionState::Connected, Some(t)) if !self.is_stale() => (
                format!(
                    "● Conectado a {}{host} | {:.0}ms atrás",
                    self.feed_url,
                    t.elapsed().as_millis()
                ),
                self.theme.ok,
            ),
            (ConnectionState::Connected, _) => (
                format!("◐ Conectado a {}{host} | aguardando dados...", self.feed_url),
                self.theme.critical,
            ),
            (ConnectionState::Connecting, _) => (
                format!("○ Conectando a {}...", self.feed_url),
                self.theme.dim,
            ),
            (ConnectionState::Disconnected, _) => (
                format!("○ Desconectado de {} – tentando novamente...", self.feed_url),
                self.theme.critical,
            ),
        }
    }

    fn apply_toggles(&mut self, toggles: Vec<(&'static str, bool)>) {
        for (key, enabled) in toggles {
            info!("Módulo {key}: {}", if enabled { "ligado" } else { "desligado" });
            if let Err(e) = self.hud.toggle_module(key, enabled) {
                error!("Falha ao salvar preferências: {e}");
            }
        }
    }
}

impl eframe::App for HudDashboard {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ── Poll feed ──
        self.poll_feed();

        // ── Repaint periódico (status "há N ms") ──
        ctx.request_repaint_after(std::time::Duration::from_millis(100));

        // ── Configurar estilo visual baseado no tema ──
        let mut visuals = if self.theme.is_light() {
            egui::Visuals::light()
        } else {
            egui::Visuals::dark()
        };
        visuals.panel_fill = self.theme.bg;
        visuals.window_fill = self.theme.panel;
        visuals.override_text_color = Some(self.theme.text);
        ctx.set_visuals(visuals);

        // ── Atalhos de teclado ──
        let (settings_key, theme_key, quit_key, fullscreen_key) = ctx.input(|i: &egui::InputState| {
            (
                i.key_pressed(egui::Key::S),
                i.key_pressed(egui::Key::T),
                i.key_pressed(egui::Key::Q) || i.key_pressed(egui::Key::Escape),
                i.key_pressed(egui::Key::F) || i.key_pressed(egui::Key::F11),
            )
        });
        if settings_key {
            self.show_settings = !self.show_settings;
        }
        if theme_key {
            self.theme_index = (self.theme_index + 1) % self.all_themes.len();
            self.theme = self.all_themes[self.theme_index].clone();
            info!("Tema: {}", self.theme.name);
        }
        if quit_key {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
        if fullscreen_key {
            self.is_fullscreen = !self.is_fullscreen;
            ctx.send_viewport_cmd(egui::ViewportCommand::Fullscreen(self.is_fullscreen));
        }

        // ── Configurações ──
        let mut toggles = Vec::new();
        let mut show_settings = self.show_settings;
        egui::Window::new("Módulos")
            .open(&mut show_settings)
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui: &mut egui::Ui| {
                toggles = panels::render_settings(
                    ui,
                    self.hud.registry(),
                    self.hud.enabled(),
                    &self.theme,
                );
            });
        self.show_settings = show_settings;
        self.apply_toggles(toggles);

        // ── Painel central ──
        let stale = self.is_stale();
        let (status, status_color) = self.status_line();

        egui::CentralPanel::default().show(ctx, |ui: &mut egui::Ui| {
            // ── Título ──
            ui.vertical_centered(|ui: &mut egui::Ui| {
                ui.label(
                    RichText::new("⚡ HUD ⚡")
                        .color(self.theme.title)
                        .size(22.0)
                        .strong()
                        .monospace(),
                );
                ui.label(RichText::new(status).color(status_color).monospace());
            });

            ui.add_space(8.0);

            let view = self.hud.view();
            if view.is_empty() {
                ui.vertical_centered(|ui: &mut egui::Ui| {
                    ui.label(
                        RichText::new("Nenhum módulo habilitado – [S] para escolher")
                            .color(self.theme.dim)
                            .monospace(),
                    );
                });
            } else {
                panels::render_grid(ui, &view.cards, GRID_COLUMNS, &self.theme, stale);
            }

            // ── Help bar (fundo) ──
            ui.with_layout(egui::Layout::bottom_up(egui::Align::Center), |ui: &mut egui::Ui| {
                ui.label(
                    RichText::new("[S] Módulos | [F] Fullscreen | [T] Tema | [Q/Esc] Sair")
                        .color(self.theme.dim)
                        .monospace()
                        .size(10.0),
                );
            });
        });
    }
}
