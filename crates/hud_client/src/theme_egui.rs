//! Conversão de temas e cores de módulo para `egui::Color32`.

use egui::Color32;
use hud_core::theme::{self, Theme};
use hud_core::types::ModuleDescriptor;

/// Tema convertido para tipos egui.
#[derive(Clone)]
pub struct EguiTheme {
    pub name: &'static str,
    pub bg: Color32,
    pub panel: Color32,
    pub text: Color32,
    pub dim: Color32,
    pub title: Color32,
    pub ok: Color32,
    pub critical: Color32,
}

impl EguiTheme {
    /// Converte um [`Theme`] do core para [`EguiTheme`].
    pub fn from_core(t: &Theme) -> Self {
        Self {
            name: t.name,
            bg: hex_color(t.bg),
            panel: hex_color(t.panel),
            text: hex_color(t.text),
            dim: hex_color(t.dim),
            title: hex_color(t.title),
            ok: hex_color(t.ok),
            critical: hex_color(t.critical),
        }
    }

    pub fn is_light(&self) -> bool {
        self.name == theme::LIGHT.name
    }
}

/// Cor de destaque de um módulo.
pub fn module_color(descriptor: &ModuleDescriptor) -> Color32 {
    hex_color(descriptor.color)
}

fn hex_color(hex: &str) -> Color32 {
    let (r, g, b) = theme::hex_to_rgb(hex);
    Color32::from_rgb(r, g, b)
}

/// Carrega todos os temas disponíveis.
pub fn all_themes() -> Vec<EguiTheme> {
    theme::ALL.iter().map(EguiTheme::from_core).collect()
}

/// Posição do tema configurado (nome sem diferenciar maiúsculas; desconhecido = escuro).
pub fn theme_index(themes: &[EguiTheme], name: &str) -> usize {
    let wanted = theme::get_theme(name);
    themes.iter().position(|t| t.name == wanted.name).unwrap_or(0)
}
