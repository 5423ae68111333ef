//! Preferências do usuário: quais módulos aparecem no grid.
//!
//! O armazenamento é uma porta chave-valor ([`KeyValueStore`]) injetada,
//! para que os testes usem [`MemoryStore`] e o cliente use [`FileStore`].

use crate::types::EnabledModules;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Chave da lista de módulos no armazenamento.
pub const MODULES_KEY: &str = "hud_modules";

/// Erros de armazenamento de preferências.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Erro de I/O em {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Erro ao serializar preferências: {0}")]
    Serialize(String),
}

/// Armazenamento chave-valor síncrono.
///
/// `set` sobrescreve o valor anterior; a escrita é atômica por chave.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

// ──────────────────────────────────────────────
// Memória
// ──────────────────────────────────────────────

/// Armazenamento volátil, usado em testes e no modo sem disco.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// ──────────────────────────────────────────────
// Arquivo TOML
// ──────────────────────────────────────────────

/// Armazenamento em arquivo TOML (`chave = "valor"`).
///
/// O arquivo é lido uma vez na abertura e reescrito inteiro a cada `set`.
/// Arquivo ausente ou corrompido vira um armazenamento vazio.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(content) => match toml::from_str::<BTreeMap<String, String>>(&content) {
                Ok(entries) => {
                    debug!("Preferências carregadas de {}", path.display());
                    entries
                }
                Err(e) => {
                    warn!("Arquivo de preferências corrompido ({}): {e}", path.display());
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                warn!("Erro ao ler {}: {e}", path.display());
                BTreeMap::new()
            }
        };

        Self { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Caminho padrão do `prefs.toml` (ao lado do executável).
    pub fn default_path() -> PathBuf {
        crate::config::exe_dir().join("prefs.toml")
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.clone();
        entries.insert(key.to_string(), value.to_string());

        let content =
            toml::to_string_pretty(&entries).map_err(|e| StoreError::Serialize(e.to_string()))?;
        std::fs::write(&self.path, content).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;

        self.entries = entries;
        Ok(())
    }
}

// ──────────────────────────────────────────────
// PreferenceStore
// ──────────────────────────────────────────────

/// Lê e grava a lista de módulos habilitados.
#[derive(Debug, Clone, Default)]
pub struct PreferenceStore<S> {
    store: S,
}

impl<S: KeyValueStore> PreferenceStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Lista salva, ou `[cpu, ram, uptime]` se ausente ou inválida.
    pub fn load(&self) -> EnabledModules {
        let Some(raw) = self.store.get(MODULES_KEY) else {
            debug!("Sem preferência salva, usando módulos padrão");
            return EnabledModules::default();
        };

        match serde_json::from_str::<EnabledModules>(&raw) {
            Ok(list) => list,
            Err(e) => {
                warn!("Preferência '{MODULES_KEY}' inválida ({e}), usando módulos padrão");
                EnabledModules::default()
            }
        }
    }

    /// Grava a lista, sobrescrevendo a anterior.
    pub fn save(&mut self, list: &EnabledModules) -> Result<(), StoreError> {
        let raw = serde_json::to_string(list).map_err(|e| StoreError::Serialize(e.to_string()))?;
        self.store.set(MODULES_KEY, &raw)?;
        info!("Módulos salvos: {raw}");
        Ok(())
    }

    /// Liga ou desliga um módulo e grava a nova lista.
    ///
    /// Ligar acrescenta ao final; desligar remove mantendo a ordem do resto.
    pub fn set_enabled(&mut self, key: &str, enabled: bool) -> Result<EnabledModules, StoreError> {
        let mut list = self.load();
        let changed = if enabled {
            list.push(key)
        } else {
            list.remove(key)
        };

        if changed {
            self.save(&list)?;
        }
        Ok(list)
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
