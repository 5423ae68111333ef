//! Renderer independente de UI.
//!
//! Monta o view model do grid a partir do registro e da lista de módulos
//! habilitados, e aplica cada snapshot do feed ao estado de exibição dos
//! cards (texto + fração da barra). O shell de apresentação só lê o
//! [`ViewModel`].

use crate::registry::{self, ModuleRegistry};
use crate::types::{EnabledModules, MetricsSnapshot, ModuleDescriptor};
use std::time::Instant;
use tracing::{debug, trace};

/// Texto exibido enquanto um card ainda não tem valor.
pub const PLACEHOLDER: &str = "--";

const SECS_PER_HOUR: f64 = 3600.0;
const BYTES_PER_KB: f64 = 1024.0;
const GB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Limita a fração da barra ao domínio 0–100. `NaN` vira 0.
pub fn bar_fraction(percent: f64) -> f64 {
    if percent.is_nan() {
        0.0
    } else {
        percent.clamp(0.0, 100.0)
    }
}

/// Formata com uma casa decimal (o texto não é limitado, só a barra).
pub fn format_value(value: f64) -> String {
    format!("{value:.1}")
}

// ──────────────────────────────────────────────
// View model
// ──────────────────────────────────────────────

/// Estado de exibição de um card.
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub descriptor: ModuleDescriptor,
    /// Valor exibido
    pub text: String,
    /// Preenchimento da barra (0–100), ou `None` quando o módulo não tem barra
    pub fraction: Option<f64>,
    /// Linha secundária opcional (ex: `"12.3 / 32.0 GB"`)
    pub detail: Option<String>,
}

impl Card {
    fn new(descriptor: ModuleDescriptor) -> Self {
        Self {
            descriptor,
            text: PLACEHOLDER.to_string(),
            fraction: None,
            detail: None,
        }
    }

    pub fn key(&self) -> &'static str {
        self.descriptor.key
    }
}

/// Cards do grid, na ordem da lista de módulos habilitados.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewModel {
    pub cards: Vec<Card>,
}

impl ViewModel {
    pub fn get(&self, key: &str) -> Option<&Card> {
        self.cards.iter().find(|c| c.key() == key)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

// ──────────────────────────────────────────────
// Taxa de rede
// ──────────────────────────────────────────────

/// Calcula a vazão de rede a partir do snapshot anterior.
///
/// Guarda só o snapshot anterior e o instante em que chegou. Cada novo
/// snapshot substitui o anterior por inteiro.
#[derive(Debug, Default)]
pub struct NetRate {
    previous: Option<(MetricsSnapshot, Instant)>,
}

impl NetRate {
    /// Registra o snapshot e retorna a vazão em KB/s desde o anterior.
    ///
    /// `None` sem base de comparação: primeiro snapshot, contadores
    /// ausentes em algum dos dois, intervalo zero ou contadores que
    /// voltaram (host reiniciado).
    pub fn update(&mut self, snapshot: &MetricsSnapshot, at: Instant) -> Option<f64> {
        let rate = self.rate_since_previous(snapshot, at);
        self.previous = Some((snapshot.clone(), at));
        rate
    }

    fn rate_since_previous(&self, snapshot: &MetricsSnapshot, at: Instant) -> Option<f64> {
        let (previous, previous_at) = self.previous.as_ref()?;
        let current = snapshot.network_counters?.total();
        let before = previous.network_counters?.total();

        let elapsed = at.saturating_duration_since(*previous_at).as_secs_f64();
        if elapsed <= 0.0 {
            return None;
        }
        if current < before {
            debug!("Contadores de rede voltaram ({before} → {current}), descartando amostra");
            return None;
        }

        Some((current - before) as f64 / elapsed / BYTES_PER_KB)
    }

    pub fn previous(&self) -> Option<&MetricsSnapshot> {
        self.previous.as_ref().map(|(s, _)| s)
    }
}

// ──────────────────────────────────────────────
// Renderer
// ──────────────────────────────────────────────

/// Opções de renderização.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    /// Escala da barra de rede em KB/s. `None` = card de rede sem barra.
    pub net_scale_kbps: Option<f64>,
}

/// Mantém o view model e aplica snapshots a ele.
#[derive(Debug)]
pub struct Renderer {
    registry: ModuleRegistry,
    options: RenderOptions,
    view: ViewModel,
    net_rate: NetRate,
}

impl Renderer {
    pub fn new(registry: ModuleRegistry, options: RenderOptions) -> Self {
        Self {
            registry,
            options,
            view: ViewModel::default(),
            net_rate: NetRate::default(),
        }
    }

    /// Reconstrói o grid inteiro. Chaves desconhecidas são omitidas.
    pub fn build_grid(&mut self, enabled: &EnabledModules) -> &ViewModel {
        let cards = enabled
            .iter()
            .filter_map(|key| {
                let descriptor = self.registry.describe(key);
                if descriptor.is_none() {
                    debug!("Módulo desconhecido ignorado: {key}");
                }
                descriptor
            })
            .map(|descriptor| Card::new(*descriptor))
            .collect();

        self.view = ViewModel { cards };
        &self.view
    }

    pub fn view(&self) -> &ViewModel {
        &self.view
    }

    /// Aplica um snapshot recebido agora.
    pub fn apply_snapshot(&mut self, snapshot: &MetricsSnapshot) {
        self.apply_snapshot_at(snapshot, Instant::now());
    }

    /// Aplica um snapshot recebido em `at`.
    ///
    /// Cards cujo campo não veio no snapshot mantêm o valor anterior.
    pub fn apply_snapshot_at(&mut self, snapshot: &MetricsSnapshot, at: Instant) {
        let net_kbps = self.net_rate.update(snapshot, at);
        let net_scale = self.options.net_scale_kbps.filter(|s| *s > 0.0);

        for card in &mut self.view.cards {
            match card.descriptor.key {
                registry::CPU => {
                    if let Some(cpu) = snapshot.cpu_percent {
                        set_percent(card, cpu);
                    }
                }
                registry::RAM => {
                    if let Some(mem) = snapshot.mem_percent {
                        set_percent(card, mem);
                    }
                    if let (Some(used), Some(total)) =
                        (snapshot.mem_used_bytes, snapshot.mem_total_bytes)
                    {
                        card.detail = Some(format!(
                            "{:.1} / {:.1} GB",
                            used as f64 / GB,
                            total as f64 / GB
                        ));
                    }
                }
                registry::BATTERY => {
                    if let Some(battery) = snapshot.battery_percent {
                        set_percent(card, battery);
                    }
                }
                registry::UPTIME => {
                    if let Some(uptime) = snapshot.uptime_seconds {
                        card.text = format_value(uptime as f64 / SECS_PER_HOUR);
                    }
                }
                registry::NET => {
                    if snapshot.network_counters.is_none() {
                        continue;
                    }
                    match net_kbps {
                        Some(kbps) => {
                            card.text = format_value(kbps);
                            card.fraction =
                                net_scale.map(|scale| bar_fraction(kbps / scale * 100.0));
                        }
                        None => {
                            card.text = PLACEHOLDER.to_string();
                            card.fraction = None;
                        }
                    }
                }
                other => trace!("Sem mapeamento de snapshot para o módulo {other}"),
            }
        }
    }
}

fn set_percent(card: &mut Card, percent: f64) {
    card.text = format_value(percent);
    card.fraction = Some(bar_fraction(percent));
}
