//! Protocolo do feed de métricas.
//!
//! O host envia frames de texto JSON pelo WebSocket em `/ws`; o cliente não
//! envia nada. Formato do frame (todos os campos são opcionais):
//!
//! ```text
//! { "cpu_percent": 57.3, "mem_percent": 40.0, "uptime": 7384,
//!   "network": { "rx_bytes": 1000, "tx_bytes": 2000 },
//!   "battery_percent": 88.0 }
//! ```
//!
//! Hosts mais antigos enviam os contadores de rede "achatados" em
//! `net_recv`/`net_sent`, junto com `os`, `mem_total` e `mem_used`.
//! Esse formato também é aceito.

use crate::types::{MetricsSnapshot, NetworkCounters};
use serde::Deserialize;
use url::Url;

/// Caminho fixo do feed no host.
pub const FEED_PATH: &str = "/ws";

/// Erros do protocolo.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("Frame JSON inválido: {0}")]
    Json(#[from] serde_json::Error),
}

/// Erros ao derivar o endpoint do feed a partir da origem.
#[derive(Debug, thiserror::Error)]
pub enum EndpointError {
    #[error("URL de origem inválida: {0}")]
    Parse(#[from] url::ParseError),

    #[error("Esquema não suportado: {0} (esperado http, https, ws ou wss)")]
    UnsupportedScheme(String),

    #[error("URL de origem sem host: {0}")]
    MissingHost(String),
}

/// Frame como chega no fio.
#[derive(Debug, Deserialize)]
struct WireFrame {
    cpu_percent: Option<f64>,
    mem_percent: Option<f64>,
    uptime: Option<u64>,
    network: Option<NetworkCounters>,
    battery_percent: Option<f64>,
    os: Option<String>,
    mem_total: Option<u64>,
    mem_used: Option<u64>,
    net_recv: Option<u64>,
    net_sent: Option<u64>,
}

impl From<WireFrame> for MetricsSnapshot {
    fn from(frame: WireFrame) -> Self {
        let network_counters = frame.network.or(match (frame.net_recv, frame.net_sent) {
            (Some(rx_bytes), Some(tx_bytes)) => Some(NetworkCounters { rx_bytes, tx_bytes }),
            _ => None,
        });

        Self {
            cpu_percent: frame.cpu_percent,
            mem_percent: frame.mem_percent,
            uptime_seconds: frame.uptime,
            network_counters,
            battery_percent: frame.battery_percent,
            os: frame.os,
            mem_total_bytes: frame.mem_total,
            mem_used_bytes: frame.mem_used,
        }
    }
}

/// Decodifica um frame de texto recebido do feed.
pub fn decode_frame(text: &str) -> Result<MetricsSnapshot, ProtocolError> {
    let frame: WireFrame = serde_json::from_str(text)?;
    Ok(frame.into())
}

/// Deriva a URL do feed a partir da origem do host.
///
/// O esquema acompanha o nível de segurança da origem (`https` → `wss`,
/// `http` → `ws`); host e porta são mantidos e o caminho vira [`FEED_PATH`].
pub fn feed_url(origin: &str) -> Result<Url, EndpointError> {
    let mut url = Url::parse(origin)?;

    let scheme = match url.scheme() {
        "https" | "wss" => "wss",
        "http" | "ws" => "ws",
        other => return Err(EndpointError::UnsupportedScheme(other.to_string())),
    };
    if url.host_str().is_none() {
        return Err(EndpointError::MissingHost(origin.to_string()));
    }

    url.set_scheme(scheme)
        .map_err(|()| EndpointError::UnsupportedScheme(url.scheme().to_string()))?;
    url.set_path(FEED_PATH);
    url.set_query(None);
    url.set_fragment(None);

    Ok(url)
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_full_frame() {
        let snapshot = decode_frame(
            r#"{"cpu_percent": 57.34, "mem_percent": 40.0, "uptime": 7384,
                "network": {"rx_bytes": 1000, "tx_bytes": 2000},
                "battery_percent": 91.5}"#,
        )
        .unwrap();

        assert_eq!(snapshot.cpu_percent, Some(57.34));
        assert_eq!(snapshot.mem_percent, Some(40.0));
        assert_eq!(snapshot.uptime_seconds, Some(7384));
        assert_eq!(
            snapshot.network_counters,
            Some(NetworkCounters {
                rx_bytes: 1000,
                tx_bytes: 2000
            })
        );
        assert_eq!(snapshot.battery_percent, Some(91.5));
    }

    #[test]
    fn missing_fields_decode_as_absent() {
        let snapshot = decode_frame(r#"{"cpu_percent": 12}"#).unwrap();
        assert_eq!(snapshot.cpu_percent, Some(12.0));
        assert!(snapshot.mem_percent.is_none());
        assert!(snapshot.network_counters.is_none());
        assert!(snapshot.battery_percent.is_none());
    }

    #[test]
    fn accepts_flat_network_counters() {
        let snapshot = decode_frame(
            r#"{"os": "linux", "uptime": 10, "cpu_percent": 1.0, "mem_percent": 2.0,
                "mem_total": 8589934592, "mem_used": 4294967296,
                "net_sent": 300, "net_recv": 700}"#,
        )
        .unwrap();

        assert_eq!(
            snapshot.network_counters,
            Some(NetworkCounters {
                rx_bytes: 700,
                tx_bytes: 300
            })
        );
        assert_eq!(snapshot.os.as_deref(), Some("linux"));
        assert_eq!(snapshot.mem_total_bytes, Some(8_589_934_592));
    }

    #[test]
    fn nested_network_wins_over_flat_counters() {
        let snapshot = decode_frame(
            r#"{"network": {"rx_bytes": 1, "tx_bytes": 2}, "net_recv": 9, "net_sent": 9}"#,
        )
        .unwrap();
        assert_eq!(snapshot.network_counters.unwrap().total(), 3);
    }

    #[test]
    fn unknown_fields_are_ignored() {
        assert!(decode_frame(r#"{"cpu_percent": 1, "gpu_percent": 99}"#).is_ok());
    }

    #[test]
    fn rejects_malformed_frames() {
        assert!(decode_frame("{\"cpu_percent\": 5").is_err());
        assert!(decode_frame("not json").is_err());
        assert!(decode_frame("[1, 2, 3]").is_err());
        assert!(decode_frame(r#"{"cpu_percent": "high"}"#).is_err());
    }

    #[test]
    fn secure_origin_maps_to_wss() {
        let url = feed_url("https://hud.local:8443/index.html?tab=1#top").unwrap();
        assert_eq!(url.as_str(), "wss://hud.local:8443/ws");
    }

    #[test]
    fn insecure_origin_maps_to_ws() {
        let url = feed_url("http://192.168.1.5:8080/").unwrap();
        assert_eq!(url.as_str(), "ws://192.168.1.5:8080/ws");
    }

    #[test]
    fn default_port_is_kept_implicit() {
        assert_eq!(feed_url("http://example.com").unwrap().as_str(), "ws://example.com/ws");
        assert_eq!(feed_url("https://example.com").unwrap().as_str(), "wss://example.com/ws");
    }

    #[test]
    fn rejects_unsupported_scheme() {
        assert!(matches!(
            feed_url("ftp://example.com"),
            Err(EndpointError::UnsupportedScheme(s)) if s == "ftp"
        ));
        assert!(matches!(feed_url("not a url"), Err(EndpointError::Parse(_))));
    }
}
