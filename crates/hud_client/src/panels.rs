//! Cards do grid e tela de configurações, renderizados com egui.

use crate::theme_egui::{self, EguiTheme};
use egui::{Color32, RichText, Ui};
use hud_core::registry::ModuleRegistry;
use hud_core::render::Card;
use hud_core::types::EnabledModules;

// ──────────────────────────────────────────
// Helpers
// ──────────────────────────────────────────

fn panel_frame(
    ui: &mut Ui,
    title: &str,
    accent: Color32,
    theme: &EguiTheme,
    add_body: impl FnOnce(&mut Ui),
) {
    egui::Frame::new()
        .fill(theme.panel)
        .stroke(egui::Stroke::new(2.0, accent))
        .corner_radius(4.0)
        .inner_margin(8.0)
        .show(ui, |ui: &mut Ui| {
            ui.vertical_centered(|ui: &mut Ui| {
                ui.label(
                    RichText::new(format!("── {title} ──"))
                        .color(accent)
                        .strong()
                        .monospace()
                        .size(13.0),
                );
            });
            ui.add_space(4.0);
            add_body(ui);
        });
}

// ──────────────────────────────────────────
// Card
// ──────────────────────────────────────────

/// Desenha um card: valor, unidade, detalhe e barra (se houver fração).
///
/// `stale` esmaece o valor quando o feed parou de mandar dados.
pub fn render_card(ui: &mut Ui, card: &Card, theme: &EguiTheme, stale: bool) {
    let accent = theme_egui::module_color(&card.descriptor);
    let value_color = if stale { theme.dim } else { theme.text };

    panel_frame(ui, card.descriptor.label, accent, theme, |ui: &mut Ui| {
        ui.horizontal(|ui: &mut Ui| {
            ui.label(
                RichText::new(&card.text)
                    .color(value_color)
                    .monospace()
                    .strong()
                    .size(28.0),
            );
            ui.label(RichText::new(card.descriptor.unit).color(theme.dim).monospace());
        });

        if let Some(detail) = &card.detail {
            ui.label(RichText::new(detail).color(theme.dim).monospace().size(11.0));
        }

        if let Some(fraction) = card.fraction {
            ui.add(
                egui::ProgressBar::new((fraction / 100.0) as f32)
                    .desired_height(6.0)
                    .fill(accent),
            );
        }
    });
}

/// Desenha o grid em linhas de `columns` cards.
pub fn render_grid(ui: &mut Ui, cards: &[Card], columns: usize, theme: &EguiTheme, stale: bool) {
    for row in cards.chunks(columns.max(1)) {
        ui.columns(columns.max(1), |cols| {
            for (col, card) in cols.iter_mut().zip(row) {
                render_card(col, card, theme, stale);
            }
        });
        ui.add_space(6.0);
    }
}

// ──────────────────────────────────────────
// Configurações
// ──────────────────────────────────────────

/// Lista os módulos do catálogo com checkboxes.
///
/// Retorna os toggles feitos neste frame, `(chave, ligado)`.
pub fn render_settings(
    ui: &mut Ui,
    registry: &ModuleRegistry,
    enabled: &EnabledModules,
    theme: &EguiTheme,
) -> Vec<(&'static str, bool)> {
    let mut toggles = Vec::new();

    for module in registry.all() {
        let mut checked = enabled.contains(module.key);
        ui.horizontal(|ui: &mut Ui| {
            if ui.checkbox(&mut checked, "").changed() {
                toggles.push((module.key, checked));
            }
            ui.label(
                RichText::new(module.label)
                    .color(theme_egui::module_color(module))
                    .monospace(),
            );
            ui.label(RichText::new(format!("({})", module.unit)).color(theme.dim).monospace());
        });
    }

    toggles
}
