//! Thread do feed: roda a conexão WebSocket e envia eventos para a UI via channel.

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};
use hud_core::connection::{ConnectionManager, RetryPolicy};
use hud_core::feed::{FeedEvent, SystemClock, WsTransport, run_feed};
use std::ops::ControlFlow;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Inicia a thread do feed. Retorna o receiver do channel.
pub fn spawn_feed_thread(
    url: Url,
    policy: RetryPolicy,
    idle_timeout: Duration,
) -> Receiver<FeedEvent> {
    let (tx, rx) = bounded::<FeedEvent>(64); // Buffer de 64 eventos

    std::thread::Builder::new()
        .name("hud-feed".into())
        .spawn(move || {
            info!("Feed em {url} – reconexão a cada {:.1}s", policy.delay.as_secs_f64());
            let mut manager = ConnectionManager::new(url, policy);
            let mut transport = WsTransport::new(idle_timeout);
            run_feed(&mut manager, &mut transport, &mut SystemClock, |event| {
                forward(&tx, event)
            });
            info!("UI encerrada, thread do feed terminando");
        })
        .expect("Falha ao criar thread do feed");

    rx
}

fn forward(tx: &Sender<FeedEvent>, event: FeedEvent) -> ControlFlow<()> {
    match event {
        // Non-blocking send: se a UI está lenta, descarta snapshots antigos
        FeedEvent::Snapshot(..) => match tx.try_send(event) {
            Ok(()) => ControlFlow::Continue(()),
            Err(TrySendError::Full(_)) => {
                debug!("Channel cheio, descartando snapshot");
                ControlFlow::Continue(())
            }
            Err(TrySendError::Disconnected(_)) => ControlFlow::Break(()),
        },
        // Mudanças de estado nunca são descartadas
        FeedEvent::State(_) => match tx.send(event) {
            Ok(()) => ControlFlow::Continue(()),
            Err(_) => ControlFlow::Break(()),
        },
    }
}
