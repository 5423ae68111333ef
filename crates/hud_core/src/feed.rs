//! Loop que dirige o [`ConnectionManager`] sobre um transporte real.
//!
//! Transporte e relógio são injetados para que o loop rode nos testes sem
//! rede e sem esperar de verdade.

use crate::connection::{ConnectionManager, ConnectionState};
use crate::types::MetricsSnapshot;
use std::io;
use std::net::TcpStream;
use std::ops::ControlFlow;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};
use tungstenite::stream::MaybeTlsStream;
use tungstenite::{Message, WebSocket};
use url::Url;

/// Erros do transporte do feed.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Falha ao conectar: {0}")]
    Connect(String),

    #[error("Erro de leitura: {0}")]
    Read(String),
}

/// Abre conexões com o feed.
pub trait Transport {
    type Stream: FrameStream;

    fn dial(&mut self, url: &Url) -> Result<Self::Stream, TransportError>;
}

/// Conexão aberta, de onde se lê frames de texto.
pub trait FrameStream {
    /// Próximo frame de texto. `Ok(None)` quando a conexão foi fechada.
    fn next_frame(&mut self) -> Result<Option<String>, TransportError>;
}

/// Fonte de tempo do loop.
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep_until(&mut self, deadline: Instant);
}

/// Relógio do sistema.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep_until(&mut self, deadline: Instant) {
        let now = Instant::now();
        if deadline > now {
            std::thread::sleep(deadline - now);
        }
    }
}

/// Evento entregue pelo loop do feed.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    State(ConnectionState),
    /// Snapshot e o instante em que o frame chegou.
    Snapshot(MetricsSnapshot, Instant),
}

/// Roda o feed indefinidamente: conecta, repassa snapshots na ordem de
/// chegada e reconecta após cada queda.
///
/// Termina apenas quando `emit` retorna [`ControlFlow::Break`].
pub fn run_feed<T, C, F>(
    manager: &mut ConnectionManager,
    transport: &mut T,
    clock: &mut C,
    mut emit: F,
) where
    T: Transport,
    C: Clock,
    F: FnMut(FeedEvent) -> ControlFlow<()>,
{
    if !manager.start() {
        match manager.retry_deadline() {
            Some(_) => wait_for_retry(manager, clock),
            None => debug!("Conexão já {}, discando agora", manager.state()),
        }
    }

    loop {
        if emit(FeedEvent::State(ConnectionState::Connecting)).is_break() {
            return;
        }

        match transport.dial(manager.url()) {
            Ok(mut stream) => {
                manager.on_open();
                if emit(FeedEvent::State(ConnectionState::Connected)).is_break() {
                    return;
                }

                loop {
                    match stream.next_frame() {
                        Ok(Some(text)) => {
                            let arrived = clock.now();
                            let Some(snapshot) = manager.on_frame(&text) else {
                                continue;
                            };
                            if emit(FeedEvent::Snapshot(snapshot, arrived)).is_break() {
                                return;
                            }
                        }
                        Ok(None) => {
                            info!("Feed fechou a conexão");
                            break;
                        }
                        Err(e) => {
                            warn!("{e}");
                            break;
                        }
                    }
                }
            }
            Err(e) => warn!("{e}"),
        }

        manager.on_close(clock.now());
        if emit(FeedEvent::State(ConnectionState::Disconnected)).is_break() {
            return;
        }

        wait_for_retry(manager, clock);
    }
}

fn wait_for_retry<C: Clock>(manager: &mut ConnectionManager, clock: &mut C) {
    while !manager.poll_retry(clock.now()) {
        match manager.retry_deadline() {
            Some(deadline) => clock.sleep_until(deadline),
            None => {
                // Sem tentativa agendada: estado inconsistente, força uma nova
                manager.on_close(clock.now());
            }
        }
    }
}

// ──────────────────────────────────────────────
// WebSocket
// ──────────────────────────────────────────────

/// Sem nenhum byte do host por este tempo, a conexão é considerada morta.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(10);

/// Transporte WebSocket bloqueante (`ws://` e `wss://`).
#[derive(Debug, Clone, Copy)]
pub struct WsTransport {
    idle_timeout: Duration,
}

impl WsTransport {
    /// `idle_timeout` vira o read timeout do socket; zero usa o padrão.
    pub fn new(idle_timeout: Duration) -> Self {
        let idle_timeout = if idle_timeout.is_zero() {
            DEFAULT_IDLE_TIMEOUT
        } else {
            idle_timeout
        };
        Self { idle_timeout }
    }
}

impl Default for WsTransport {
    fn default() -> Self {
        Self::new(DEFAULT_IDLE_TIMEOUT)
    }
}

fn connect_err(e: impl std::fmt::Display) -> TransportError {
    TransportError::Connect(e.to_string())
}

/// Conexão WebSocket aberta.
pub struct WsStream {
    socket: WebSocket<MaybeTlsStream<TcpStream>>,
    idle_timeout: Duration,
}

impl Transport for WsTransport {
    type Stream = WsStream;

    fn dial(&mut self, url: &Url) -> Result<WsStream, TransportError> {
        debug!("Conectando a {url}");
        let addrs = url.socket_addrs(|| None).map_err(connect_err)?;
        let stream = TcpStream::connect(&*addrs).map_err(connect_err)?;
        // Host que some sem FIN (Wi-Fi caiu) deixaria o read bloqueado para sempre
        stream
            .set_read_timeout(Some(self.idle_timeout))
            .map_err(connect_err)?;

        let (socket, response) =
            tungstenite::client_tls(url.as_str(), stream).map_err(connect_err)?;
        debug!("Handshake concluído: HTTP {}", response.status());
        Ok(WsStream {
            socket,
            idle_timeout: self.idle_timeout,
        })
    }
}

impl FrameStream for WsStream {
    fn next_frame(&mut self) -> Result<Option<String>, TransportError> {
        loop {
            match self.socket.read() {
                Ok(Message::Text(text)) => return Ok(Some(text.as_str().to_owned())),
                Ok(Message::Close(frame)) => {
                    debug!("Close recebido: {frame:?}");
                    return Ok(None);
                }
                Ok(Message::Binary(data)) => {
                    trace!("Frame binário ignorado ({} bytes)", data.len());
                }
                Ok(other) => trace!("Frame de controle ignorado: {other:?}"),
                Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => {
                    return Ok(None);
                }
                Err(tungstenite::Error::Io(e))
                    if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) =>
                {
                    warn!(
                        "Feed sem dados há {:.1}s, derrubando a conexão",
                        self.idle_timeout.as_secs_f64()
                    );
                    return Ok(None);
                }
                Err(e) => return Err(TransportError::Read(e.to_string())),
            }
        }
    }
}
