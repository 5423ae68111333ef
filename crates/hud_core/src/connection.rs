//! Máquina de estados da conexão com o feed.
//!
//! Não faz I/O: quem dirige a conexão real ([`crate::feed::run_feed`])
//! informa os eventos (`on_open`, `on_frame`, `on_close`) e pergunta
//! quando pode discar de novo (`poll_retry`).
//!
//! ```text
//! Disconnected ──start()──▶ Connecting ──on_open()──▶ Connected
//!       ▲                      │                         │
//!       └───── on_close() ─────┴──────── on_close() ─────┘
//!       │
//!       └── poll_retry(now) após o atraso fixo ──▶ Connecting
//! ```

use crate::protocol::decode_frame;
use crate::types::MetricsSnapshot;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use url::Url;

/// Atraso padrão entre uma queda e a próxima tentativa.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Estado da conexão com o feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Disconnected => "Desconectado",
            Self::Connecting => "Conectando",
            Self::Connected => "Conectado",
        };
        f.write_str(name)
    }
}

/// Política de reconexão: atraso fixo, tentativas ilimitadas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            delay: DEFAULT_RETRY_DELAY,
        }
    }
}

/// Dono da conexão lógica com o feed.
///
/// Criado uma vez na inicialização e vive até o fim do processo.
#[derive(Debug)]
pub struct ConnectionManager {
    url: Url,
    policy: RetryPolicy,
    state: ConnectionState,
    retry_at: Option<Instant>,
    attempts: u64,
}

impl ConnectionManager {
    pub fn new(url: Url, policy: RetryPolicy) -> Self {
        Self {
            url,
            policy,
            state: ConnectionState::Disconnected,
            retry_at: None,
            attempts: 0,
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Instante da próxima tentativa agendada, se houver.
    pub fn retry_deadline(&self) -> Option<Instant> {
        self.retry_at
    }

    /// Tentativas de conexão iniciadas até agora.
    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    /// Inicia a primeira conexão. Retorna `true` se o chamador deve discar.
    ///
    /// Só tem efeito em `Disconnected` sem tentativa pendente.
    pub fn start(&mut self) -> bool {
        if self.state != ConnectionState::Disconnected || self.retry_at.is_some() {
            return false;
        }
        self.begin_attempt();
        true
    }

    /// Handshake concluído.
    pub fn on_open(&mut self) {
        if self.state != ConnectionState::Connecting {
            debug!("on_open ignorado em {}", self.state);
            return;
        }
        self.state = ConnectionState::Connected;
        info!("Conectado ao feed {}", self.url);
    }

    /// Decodifica um frame recebido.
    ///
    /// Frames fora do estado `Connected` ou que não decodificam são
    /// descartados; a conexão continua aberta.
    pub fn on_frame(&mut self, text: &str) -> Option<MetricsSnapshot> {
        if self.state != ConnectionState::Connected {
            debug!("Frame descartado em {}", self.state);
            return None;
        }
        match decode_frame(text) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                debug!("Frame inválido descartado: {e}");
                None
            }
        }
    }

    /// Conexão fechada (normal ou abrupta) ou falha ao conectar.
    ///
    /// Agenda uma única tentativa após o atraso; um fechamento com
    /// tentativa já pendente não agenda outra.
    pub fn on_close(&mut self, now: Instant) {
        self.state = ConnectionState::Disconnected;

        if let Some(at) = self.retry_at {
            debug!(
                "Reconexão já agendada em {:.1}s",
                at.saturating_duration_since(now).as_secs_f64()
            );
            return;
        }

        self.retry_at = Some(now + self.policy.delay);
        warn!(
            "Desconectado de {}. Tentando novamente em {:.1}s...",
            self.url,
            self.policy.delay.as_secs_f64()
        );
    }

    /// Retorna `true` (e passa a `Connecting`) quando a tentativa agendada vence.
    pub fn poll_retry(&mut self, now: Instant) -> bool {
        match self.retry_at {
            Some(at) if now >= at => {
                self.retry_at = None;
                self.begin_attempt();
                true
            }
            _ => false,
        }
    }

    fn begin_attempt(&mut self) {
        self.state = ConnectionState::Connecting;
        self.attempts += 1;
        debug!("Tentativa #{} de conexão a {}", self.attempts, self.url);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> ConnectionManager {
        ConnectionManager::new(
            Url::parse("ws://127.0.0.1:8080/ws").unwrap(),
            RetryPolicy::default(),
        )
    }

    fn connected() -> ConnectionManager {
        let mut m = manager();
        assert!(m.start());
        m.on_open();
        m
    }

    #[test]
    fn start_moves_to_connecting_once() {
        let mut m = manager();
        assert_eq!(m.state(), ConnectionState::Disconnected);
        assert!(m.start());
        assert_eq!(m.state(), ConnectionState::Connecting);
        assert!(!m.start());
        assert_eq!(m.attempts(), 1);
    }

    #[test]
    fn open_moves_to_connected() {
        let m = connected();
        assert_eq!(m.state(), ConnectionState::Connected);
    }

    #[test]
    fn frames_are_decoded_only_when_connected() {
        let mut m = manager();
        assert!(m.on_frame(r#"{"cpu_percent": 1}"#).is_none());

        let mut m = connected();
        let snapshot = m.on_frame(r#"{"cpu_percent": 1}"#).unwrap();
        assert_eq!(snapshot.cpu_percent, Some(1.0));
    }

    #[test]
    fn malformed_frame_keeps_connection() {
        let mut m = connected();
        assert!(m.on_frame("{\"cpu_percent\": ").is_none());
        assert_eq!(m.state(), ConnectionState::Connected);
        assert!(m.retry_deadline().is_none());
        assert!(m.on_frame(r#"{"cpu_percent": 2}"#).is_some());
    }

    #[test]
    fn close_schedules_one_retry_after_fixed_delay() {
        let mut m = connected();
        let t0 = Instant::now();
        m.on_close(t0);

        assert_eq!(m.state(), ConnectionState::Disconnected);
        assert_eq!(m.retry_deadline(), Some(t0 + DEFAULT_RETRY_DELAY));

        assert!(!m.poll_retry(t0));
        assert!(!m.poll_retry(t0 + Duration::from_millis(1999)));
        assert_eq!(m.state(), ConnectionState::Disconnected);

        assert!(m.poll_retry(t0 + DEFAULT_RETRY_DELAY));
        assert_eq!(m.state(), ConnectionState::Connecting);
        assert!(m.retry_deadline().is_none());
        assert!(!m.poll_retry(t0 + Duration::from_secs(10)));
        assert_eq!(m.attempts(), 2);
    }

    #[test]
    fn repeated_closes_do_not_stack_retries() {
        let mut m = connected();
        let t0 = Instant::now();
        m.on_close(t0);
        m.on_close(t0 + Duration::from_millis(500));
        m.on_close(t0 + Duration::from_millis(1500));

        assert_eq!(m.retry_deadline(), Some(t0 + DEFAULT_RETRY_DELAY));
        assert!(m.poll_retry(t0 + DEFAULT_RETRY_DELAY));
        assert!(!m.poll_retry(t0 + DEFAULT_RETRY_DELAY * 2));
    }

    #[test]
    fn failed_attempt_retries_forever() {
        let mut m = manager();
        let mut now = Instant::now();
        assert!(m.start());

        for _ in 0..50 {
            m.on_close(now);
            now += DEFAULT_RETRY_DELAY;
            assert!(m.poll_retry(now));
        }
        assert_eq!(m.attempts(), 51);
    }

    #[test]
    fn start_is_ignored_while_retry_is_pending() {
        let mut m = connected();
        m.on_close(Instant::now());
        assert!(!m.start());
        assert_eq!(m.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn custom_delay_is_honoured() {
        let mut m = ConnectionManager::new(
            Url::parse("wss://hud.local/ws").unwrap(),
            RetryPolicy {
                delay: Duration::from_millis(250),
            },
        );
        let t0 = Instant::now();
        m.start();
        m.on_close(t0);
        assert_eq!(m.retry_deadline(), Some(t0 + Duration::from_millis(250)));
    }
}
