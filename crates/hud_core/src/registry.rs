//! Catálogo estático de módulos exibíveis.
//!
//! Adicionar um módulo é uma edição de [`CATALOG`], não uma operação em
//! tempo de execução.

use crate::types::ModuleDescriptor;

pub const CPU: &str = "cpu";
pub const RAM: &str = "ram";
pub const NET: &str = "net";
pub const BATTERY: &str = "battery";
pub const UPTIME: &str = "uptime";

/// Catálogo na ordem em que aparece na tela de configurações.
pub const CATALOG: &[ModuleDescriptor] = &[
    ModuleDescriptor {
        key: CPU,
        label: "CPU Load",
        unit: "%",
        color: "#00d9ff",
    },
    ModuleDescriptor {
        key: RAM,
        label: "RAM Usage",
        unit: "%",
        color: "#bb86fc",
    },
    ModuleDescriptor {
        key: NET,
        label: "Network",
        unit: "KB/s",
        color: "#00ff88",
    },
    ModuleDescriptor {
        key: BATTERY,
        label: "Battery",
        unit: "%",
        color: "#ffaa00",
    },
    ModuleDescriptor {
        key: UPTIME,
        label: "Uptime",
        unit: "hrs",
        color: "#888888",
    },
];

/// Consulta pura sobre o catálogo de módulos.
#[derive(Debug, Clone, Copy)]
pub struct ModuleRegistry {
    modules: &'static [ModuleDescriptor],
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ModuleRegistry {
    /// Registro com o catálogo embutido.
    pub fn builtin() -> Self {
        Self { modules: CATALOG }
    }

    /// Retorna o descritor da chave, ou `None` se ela não existe.
    pub fn describe(&self, key: &str) -> Option<&'static ModuleDescriptor> {
        self.modules.iter().find(|m| m.key == key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.describe(key).is_some()
    }

    /// Todos os módulos, na ordem do catálogo.
    pub fn all(&self) -> impl Iterator<Item = &'static ModuleDescriptor> {
        self.modules.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn catalog_keys_are_unique() {
        let keys: HashSet<_> = CATALOG.iter().map(|m| m.key).collect();
        assert_eq!(keys.len(), CATALOG.len());
    }

    #[test]
    fn describe_known_and_unknown() {
        let registry = ModuleRegistry::builtin();
        let cpu = registry.describe("cpu").unwrap();
        assert_eq!(cpu.label, "CPU Load");
        assert_eq!(cpu.unit, "%");
        assert!(registry.describe("bogus").is_none());
        assert!(registry.describe("").is_none());
    }

    #[test]
    fn all_follows_catalog_order() {
        let keys: Vec<_> = ModuleRegistry::builtin().all().map(|m| m.key).collect();
        assert_eq!(keys, ["cpu", "ram", "net", "battery", "uptime"]);
    }

    #[test]
    fn colors_are_hex() {
        for module in CATALOG {
            assert!(module.color.starts_with('#') && module.color.len() == 7, "{}", module.key);
        }
    }
}
