//! Configuração do cliente via TOML (`config.toml` ao lado do executável).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use crate::connection::{DEFAULT_RETRY_DELAY, RetryPolicy};
use crate::feed::DEFAULT_IDLE_TIMEOUT;
use crate::protocol::feed_url;
use crate::render::RenderOptions;

/// Erros ao gravar a configuração.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Erro ao serializar configuração: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Erro ao gravar {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Configuração do cliente HUD.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Origem do host do feed (o esquema define ws/wss)
    pub origin: String,
    /// Atraso entre uma queda e a próxima tentativa (segundos)
    pub retry_delay_secs: f64,
    /// Escala da barra de rede em KB/s (0 = sem barra)
    pub net_scale_kbps: f64,
    /// Sem frames por este tempo, os valores são marcados como antigos (segundos)
    pub stale_after_secs: f64,
    /// Sem nenhum byte do host por este tempo, a conexão é derrubada (segundos)
    pub idle_timeout_secs: f64,
    /// Arquivo de preferências (vazio = `prefs.toml` ao lado do executável)
    pub prefs_file: String,
    /// Tema: "dark" ou "light"
    pub theme: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            origin: "http://127.0.0.1:8080".into(),
            retry_delay_secs: 2.0,
            net_scale_kbps: 0.0,
            stale_after_secs: 5.0,
            idle_timeout_secs: 10.0,
            prefs_file: String::new(),
            theme: "dark".into(),
        }
    }
}

const DEFAULT_STALE_AFTER: Duration = Duration::from_secs(5);

/// Segundos → `Duration`; negativo, NaN, infinito ou grande demais vira `fallback`.
fn secs_or(secs: f64, fallback: Duration) -> Duration {
    Duration::try_from_secs_f64(secs).unwrap_or(fallback)
}

impl ClientConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            delay: secs_or(self.retry_delay_secs, DEFAULT_RETRY_DELAY),
        }
    }

    pub fn render_options(&self) -> RenderOptions {
        let scale = self.net_scale_kbps;
        RenderOptions {
            net_scale_kbps: (scale.is_finite() && scale > 0.0).then_some(scale),
        }
    }

    pub fn stale_after(&self) -> Duration {
        secs_or(self.stale_after_secs, DEFAULT_STALE_AFTER)
    }

    pub fn idle_timeout(&self) -> Duration {
        match secs_or(self.idle_timeout_secs, DEFAULT_IDLE_TIMEOUT) {
            d if d.is_zero() => DEFAULT_IDLE_TIMEOUT,
            d => d,
        }
    }

    /// Caminho do arquivo de preferências.
    pub fn prefs_path(&self) -> PathBuf {
        if self.prefs_file.is_empty() {
            crate::prefs::FileStore::default_path()
        } else {
            PathBuf::from(&self.prefs_file)
        }
    }
}

/// Configuração raiz do aplicativo.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub client: ClientConfig,
}

impl AppConfig {
    /// Carrega configuração de um arquivo TOML.
    pub fn load(path: &Path) -> Self {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(content) => match toml::from_str::<AppConfig>(&content) {
                    Ok(config) => {
                        info!("Configuração carregada de {}", path.display());
                        return config;
                    }
                    Err(e) => {
                        warn!("Erro ao parsear {}: {}", path.display(), e);
                    }
                },
                Err(e) => {
                    warn!("Erro ao ler {}: {}", path.display(), e);
                }
            }
        }

        info!("Usando configuração padrão");
        AppConfig::default()
    }

    /// Salva configuração em arquivo TOML.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Configuração salva em {}", path.display());
        Ok(())
    }

    /// Retorna o caminho padrão do config.toml.
    pub fn default_path() -> PathBuf {
        exe_dir().join("config.toml")
    }

    /// Valida a configuração e retorna lista de erros.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let client = &self.client;

        if let Err(e) = feed_url(&client.origin) {
            errors.push(format!("Origem inválida '{}': {e}", client.origin));
        }
        if !(0.1..=60.0).contains(&client.retry_delay_secs) {
            errors.push(format!(
                "Atraso de reconexão inválido: {} (0.1–60.0)",
                client.retry_delay_secs
            ));
        }
        if !client.net_scale_kbps.is_finite() || client.net_scale_kbps < 0.0 {
            errors.push(format!(
                "Escala de rede inválida: {} (finita, >= 0)",
                client.net_scale_kbps
            ));
        }
        if !(0.5..=3600.0).contains(&client.stale_after_secs) {
            errors.push(format!(
                "Tempo para dados antigos inválido: {} (0.5–3600.0)",
                client.stale_after_secs
            ));
        }
        if !(1.0..=600.0).contains(&client.idle_timeout_secs) {
            errors.push(format!(
                "Timeout de inatividade inválido: {} (1.0–600.0)",
                client.idle_timeout_secs
            ));
        }

        errors
    }
}

/// Diretório do executável (ou `.` se não for possível descobrir).
pub(crate) fn exe_dir() -> PathBuf {
    std::env::current_exe()
        .map(|p| p.parent().unwrap_or(Path::new(".")).to_path_buf())
        .unwrap_or_else(|_| PathBuf::from("."))
}
