//! # HUD Core
//!
//! Núcleo do cliente HUD de telemetria: conexão resiliente com o feed de
//! métricas, mapeamento de métricas para cards e seleção de módulos
//! persistida. Não depende de nenhum framework de UI.
//!
//! ## Módulos
//! - [`types`] – Snapshot do feed, descritores e lista de módulos habilitados
//! - [`protocol`] – Decodificação dos frames JSON e endpoint `/ws`
//! - [`registry`] – Catálogo estático de módulos
//! - [`prefs`] – Preferências sobre uma porta chave-valor
//! - [`render`] – View model, frações de barra e taxa de rede
//! - [`connection`] – Máquina de estados com reconexão
//! - [`feed`] – Loop de I/O sobre WebSocket
//! - [`hud`] – Fachada para o shell
//! - [`config`] – Configuração via TOML
//! - [`theme`] – Paletas do shell

pub mod types;
pub mod protocol;
pub mod registry;
pub mod prefs;
pub mod render;
pub mod connection;
pub mod feed;
pub mod hud;
pub mod config;
pub mod theme;

// Re-exports convenientes
pub use types::{EnabledModules, MetricsSnapshot, ModuleDescriptor, NetworkCounters};
pub use protocol::{decode_frame, feed_url};
pub use registry::ModuleRegistry;
pub use prefs::{FileStore, KeyValueStore, MemoryStore, PreferenceStore};
pub use render::{Card, RenderOptions, Renderer, ViewModel};
pub use connection::{ConnectionManager, ConnectionState, RetryPolicy};
pub use feed::{FeedEvent, run_feed};
pub use hud::Hud;
pub use config::{AppConfig, ClientConfig};
