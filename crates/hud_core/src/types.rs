//! Tipos de dados do HUD: descritores de módulo, snapshots do feed e a
//! lista de módulos habilitados.

use serde::{Deserialize, Serialize};

// ──────────────────────────────────────────────
// Módulos
// ──────────────────────────────────────────────

/// Metadados de apresentação de um módulo (um card do grid).
///
/// Definido uma única vez no catálogo do [`ModuleRegistry`](crate::registry::ModuleRegistry).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleDescriptor {
    /// Chave única (ex: `"cpu"`)
    pub key: &'static str,
    /// Título exibido no card
    pub label: &'static str,
    /// Unidade exibida ao lado do valor
    pub unit: &'static str,
    /// Cor de destaque em hex `#RRGGBB`
    pub color: &'static str,
}

// ──────────────────────────────────────────────
// Snapshot
// ──────────────────────────────────────────────

/// Contadores acumulados de rede (desde o boot do host).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NetworkCounters {
    pub rx_bytes: u64,
    pub tx_bytes: u64,
}

impl NetworkCounters {
    /// Total de bytes trafegados nos dois sentidos.
    pub fn total(&self) -> u64 {
        self.rx_bytes.saturating_add(self.tx_bytes)
    }
}

/// Mensagem decodificada do feed em um instante.
///
/// Todos os campos são opcionais: o host só envia o que consegue medir.
/// Um campo ausente mantém o valor anterior do card correspondente.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricsSnapshot {
    /// Uso total de CPU (0–100%)
    pub cpu_percent: Option<f64>,
    /// Uso de memória (0–100%)
    pub mem_percent: Option<f64>,
    /// Uptime do host (segundos)
    pub uptime_seconds: Option<u64>,
    pub network_counters: Option<NetworkCounters>,
    /// Carga da bateria (0–100%)
    pub battery_percent: Option<f64>,
    /// Sistema operacional do host (ex: `"linux"`)
    pub os: Option<String>,
    pub mem_total_bytes: Option<u64>,
    pub mem_used_bytes: Option<u64>,
}

// ──────────────────────────────────────────────
// Módulos habilitados
// ──────────────────────────────────────────────

/// Chaves que o usuário escolheu exibir, na ordem do grid.
///
/// Não admite duplicatas: na construção, repetições colapsam na primeira
/// ocorrência. Pode conter chaves desconhecidas pelo registro (preferências
/// antigas), que o renderer simplesmente ignora.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EnabledModules(Vec<String>);

impl EnabledModules {
    /// Lista padrão quando não há preferência salva.
    pub const DEFAULT: [&'static str; 3] = ["cpu", "ram", "uptime"];

    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut list = Self(Vec::new());
        for key in keys {
            list.push(key);
        }
        list
    }

    /// Adiciona ao final. Retorna `false` se a chave já estava na lista.
    pub fn push(&mut self, key: impl Into<String>) -> bool {
        let key = key.into();
        if self.contains(&key) {
            return false;
        }
        self.0.push(key);
        true
    }

    /// Remove a chave. Retorna `false` se ela não estava na lista.
    pub fn remove(&mut self, key: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|k| k != key);
        self.0.len() != before
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.iter().any(|k| k == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for EnabledModules {
    /// `[cpu, ram, uptime]`
    fn default() -> Self {
        Self::new(Self::DEFAULT)
    }
}

impl<'de> Deserialize<'de> for EnabledModules {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let keys = Vec::<String>::deserialize(deserializer)?;
        Ok(Self::new(keys))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicates_collapse_to_first_occurrence() {
        let list = EnabledModules::new(["ram", "cpu", "ram", "uptime", "cpu"]);
        assert_eq!(list.iter().collect::<Vec<_>>(), ["ram", "cpu", "uptime"]);
    }

    #[test]
    fn remove_keeps_order_of_the_rest() {
        let mut list = EnabledModules::new(["cpu", "net", "ram"]);
        assert!(list.remove("net"));
        assert!(!list.remove("net"));
        assert_eq!(list.iter().collect::<Vec<_>>(), ["cpu", "ram"]);
    }

    #[test]
    fn deserialize_deduplicates() {
        let list: EnabledModules = serde_json::from_str(r#"["cpu","cpu","net"]"#).unwrap();
        assert_eq!(list, EnabledModules::new(["cpu", "net"]));
    }

    #[test]
    fn network_total_saturates() {
        let counters = NetworkCounters {
            rx_bytes: u64::MAX,
            tx_bytes: 10,
        };
        assert_eq!(counters.total(), u64::MAX);
    }
}
