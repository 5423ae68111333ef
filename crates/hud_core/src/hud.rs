//! Fachada usada pelo shell de apresentação.
//!
//! Junta registro, preferências e renderer. O shell chama de volta só
//! duas coisas: [`Hud::rebuild_grid`] e [`Hud::toggle_module`].

use crate::prefs::{KeyValueStore, PreferenceStore, StoreError};
use crate::registry::ModuleRegistry;
use crate::render::{RenderOptions, Renderer, ViewModel};
use crate::types::{EnabledModules, MetricsSnapshot};
use std::time::Instant;
use tracing::{debug, info};

pub struct Hud<S> {
    registry: ModuleRegistry,
    prefs: PreferenceStore<S>,
    renderer: Renderer,
    enabled: EnabledModules,
    host_os: Option<String>,
}

impl<S: KeyValueStore> Hud<S> {
    /// Carrega as preferências e monta o grid inicial.
    pub fn new(
        registry: ModuleRegistry,
        prefs: PreferenceStore<S>,
        options: RenderOptions,
    ) -> Self {
        let mut hud = Self {
            registry,
            prefs,
            renderer: Renderer::new(registry, options),
            enabled: EnabledModules::default(),
            host_os: None,
        };
        hud.rebuild_grid();
        hud
    }

    /// Relê as preferências e reconstrói o grid.
    pub fn rebuild_grid(&mut self) -> &ViewModel {
        self.enabled = self.prefs.load();
        let view = self.renderer.build_grid(&self.enabled);
        info!("Grid montado com {} módulo(s)", view.len());
        view
    }

    /// O usuário ligou ou desligou um módulo na tela de configurações.
    ///
    /// Chaves fora do registro são ignoradas. Grava a nova seleção e
    /// reconstrói o grid.
    pub fn toggle_module(&mut self, key: &str, enabled: bool) -> Result<(), StoreError> {
        if !self.registry.contains(key) {
            debug!("Toggle ignorado para módulo desconhecido: {key}");
            return Ok(());
        }
        self.prefs.set_enabled(key, enabled)?;
        self.rebuild_grid();
        Ok(())
    }

    pub fn apply_snapshot(&mut self, snapshot: &MetricsSnapshot) {
        self.apply_snapshot_at(snapshot, Instant::now());
    }

    pub fn apply_snapshot_at(&mut self, snapshot: &MetricsSnapshot, at: Instant) {
        if let Some(os) = &snapshot.os
            && self.host_os.as_ref() != Some(os)
        {
            info!("Host do feed: {os}");
            self.host_os = Some(os.clone());
        }
        self.renderer.apply_snapshot_at(snapshot, at);
    }

    pub fn view(&self) -> &ViewModel {
        self.renderer.view()
    }

    /// Cópia da seleção atual (pode conter chaves desconhecidas).
    pub fn enabled(&self) -> &EnabledModules {
        &self.enabled
    }

    pub fn is_enabled(&self, key: &str) -> bool {
        self.enabled.contains(key)
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    /// Sistema operacional informado pelo host, se algum frame trouxe.
    pub fn host_os(&self) -> Option<&str> {
        self.host_os.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefs::{MODULES_KEY, MemoryStore};

    fn hud_with(raw: Option<&str>) -> Hud<MemoryStore> {
        let mut store = MemoryStore::default();
        if let Some(raw) = raw {
            store.set(MODULES_KEY, raw).unwrap();
        }
        Hud::new(
            ModuleRegistry::builtin(),
            PreferenceStore::new(store),
            RenderOptions::default(),
        )
    }

    fn keys(hud: &Hud<MemoryStore>) -> Vec<&'static str> {
        hud.view().cards.iter().map(|c| c.key()).collect()
    }

    #[test]
    fn initial_grid_uses_defaults() {
        assert_eq!(keys(&hud_with(None)), ["cpu", "ram", "uptime"]);
        assert_eq!(keys(&hud_with(Some("garbage"))), ["cpu", "ram", "uptime"]);
    }

    #[test]
    fn stale_preferences_with_unknown_keys_are_filtered() {
        let hud = hud_with(Some(r#"["cpu", "bogus", "ram"]"#));
        assert_eq!(keys(&hud), ["cpu", "ram"]);
        assert!(hud.is_enabled("bogus"));
    }

    #[test]
    fn toggle_persists_and_rebuilds() {
        let mut hud = hud_with(None);
        hud.toggle_module("net", true).unwrap();
        assert_eq!(keys(&hud), ["cpu", "ram", "uptime", "net"]);

        hud.toggle_module("cpu", false).unwrap();
        assert_eq!(keys(&hud), ["ram", "uptime", "net"]);

        // A seleção sobrevive a uma nova leitura
        hud.rebuild_grid();
        assert_eq!(keys(&hud), ["ram", "uptime", "net"]);
    }

    #[test]
    fn toggle_of_unknown_key_is_a_no_op() {
        let mut hud = hud_with(None);
        hud.toggle_module("gpu", true).unwrap();
        assert_eq!(keys(&hud), ["cpu", "ram", "uptime"]);
        assert!(!hud.is_enabled("gpu"));
    }

    #[test]
    fn scenario_default_grid_receives_snapshot() {
        let mut hud = hud_with(None);
        hud.apply_snapshot(&MetricsSnapshot {
            cpu_percent: Some(57.34),
            mem_percent: Some(40.0),
            uptime_seconds: Some(7384),
            os: Some("linux".into()),
            ..Default::default()
        });

        let view = hud.view();
        assert_eq!(view.get("cpu").unwrap().text, "57.3");
        assert_eq!(view.get("cpu").unwrap().fraction, Some(57.34));
        assert_eq!(view.get("ram").unwrap().text, "40.0");
        assert_eq!(view.get("uptime").unwrap().text, "2.1");
        assert_eq!(hud.host_os(), Some("linux"));
    }

    #[test]
    fn queued_snapshots_use_their_arrival_time() {
        use crate::types::NetworkCounters;
        use std::time::Duration;

        let mut hud = hud_with(Some(r#"["net"]"#));
        let frame = |rx_bytes: u64, tx_bytes: u64| MetricsSnapshot {
            network_counters: Some(NetworkCounters { rx_bytes, tx_bytes }),
            ..Default::default()
        };
        let t0 = Instant::now();

        // Dois frames com 1s de diferença, aplicados no mesmo repaint
        hud.apply_snapshot_at(&frame(1000, 2000), t0);
        hud.apply_snapshot_at(&frame(2024, 3024), t0 + Duration::from_secs(1));

        assert_eq!(hud.view().get("net").unwrap().text, "2.0");
    }

    #[test]
    fn malformed_frame_leaves_values_untouched() {
        use crate::connection::{ConnectionManager, ConnectionState, RetryPolicy};

        let mut hud = hud_with(None);
        let mut manager = ConnectionManager::new(
            url::Url::parse("ws://127.0.0.1:8080/ws").unwrap(),
            RetryPolicy::default(),
        );
        manager.start();
        manager.on_open();

        for frame in [r#"{"cpu_percent": 12.5}"#, "{\"cpu_percent\": 99", r#"{"mem_percent": 3}"#] {
            if let Some(snapshot) = manager.on_frame(frame) {
                hud.apply_snapshot(&snapshot);
            }
        }

        assert_eq!(manager.state(), ConnectionState::Connected);
        assert_eq!(hud.view().get("cpu").unwrap().text, "12.5");
        assert_eq!(hud.view().get("ram").unwrap().text, "3.0");
    }
}
