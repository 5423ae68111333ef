//! Paletas do shell (fundo, painéis, texto). As cores dos módulos vêm do
//! registro.

/// Cor em formato hex string (ex: "#00ff88").
/// A conversão para `egui::Color32` é feita no cliente.
pub type ColorHex = &'static str;

/// Paleta do shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub name: &'static str,
    pub bg: ColorHex,
    pub panel: ColorHex,
    pub text: ColorHex,
    pub dim: ColorHex,
    pub title: ColorHex,
    /// Status "conectado"
    pub ok: ColorHex,
    /// Status "desconectado"/dados antigos
    pub critical: ColorHex,
}

pub const DARK: Theme = Theme {
    name: "dark",
    bg: "#1a1a1a",
    panel: "#252525",
    text: "#ffffff",
    dim: "#666666",
    title: "#00d9ff",
    ok: "#00ff88",
    critical: "#ff3333",
};

pub const LIGHT: Theme = Theme {
    name: "light",
    bg: "#f5f5f5",
    panel: "#ffffff",
    text: "#333333",
    dim: "#888888",
    title: "#0066cc",
    ok: "#00aa55",
    critical: "#cc2222",
};

/// Todos os temas, na ordem de troca (tecla `T`).
pub const ALL: [Theme; 2] = [DARK, LIGHT];

/// Converte uma string hex "#RRGGBB" para tupla (r, g, b).
pub fn hex_to_rgb(hex: &str) -> (u8, u8, u8) {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return (255, 255, 255); // fallback branco
    }
    let r = u8::from_str_radix(&hex[0..2], 16).unwrap_or(255);
    let g = u8::from_str_radix(&hex[2..4], 16).unwrap_or(255);
    let b = u8::from_str_radix(&hex[4..6], 16).unwrap_or(255);
    (r, g, b)
}

/// Retorna tema pelo nome (desconhecido = escuro).
pub fn get_theme(name: &str) -> Theme {
    ALL.iter()
        .find(|t| t.name.eq_ignore_ascii_case(name))
        .copied()
        .unwrap_or(DARK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_to_rgb_valid() {
        assert_eq!(hex_to_rgb("#ff0000"), (255, 0, 0));
        assert_eq!(hex_to_rgb("#00ff88"), (0, 255, 136));
        assert_eq!(hex_to_rgb("1a1a1a"), (26, 26, 26));
    }

    #[test]
    fn hex_to_rgb_invalid_is_white() {
        assert_eq!(hex_to_rgb("#fff"), (255, 255, 255));
        assert_eq!(hex_to_rgb("#zz0000"), (255, 0, 0));
        assert_eq!(hex_to_rgb("#ééé"), (255, 255, 255));
    }

    #[test]
    fn lookup_by_name() {
        assert_eq!(get_theme("light"), LIGHT);
        assert_eq!(get_theme("LIGHT"), LIGHT);
        assert_eq!(get_theme("nonexistent"), DARK);
    }
}
