//! Bench telemetry simulator.
//!
//! Serves randomly generated telemetry over WebSocket so the console can be
//! exercised without a radio. Every connected client gets its own stream of
//! packets, one per interval, until it disconnects.

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use rand::Rng;
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tokio::task::JoinHandle;
use tokio_tungstenite::{accept_async, tungstenite::Message};
use url::Url;

use console_core::telemetry::{OrientationTelemetry, PowerTelemetry, RadioTelemetry};
use console_core::TelemetryPacket;

/// Path the simulator advertises; any request path is accepted.
pub const TELEMETRY_PATH: &str = "/ws/telemetry";

/// Chance that a leaf is present in a [`SimProfile::Partial`] packet.
const PARTIAL_LEAF_PROBABILITY: f64 = 0.4;

/// Shape of the generated packets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SimProfile {
    /// Every leaf, every packet.
    #[default]
    Full,
    /// A random subset of leaves per packet.
    Partial,
}

impl SimProfile {
    /// Unknown names map to `Full`.
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "partial" => SimProfile::Partial,
            _ => SimProfile::Full,
        }
    }
}

// ── Packet generation ─────────────────────────────────────────────────────────

/// Build one fake packet.
pub fn make_fake_telemetry<R: Rng + ?Sized>(
    rng: &mut R,
    profile: SimProfile,
    seq: u64,
) -> TelemetryPacket {
    let timestamp = chrono::Utc::now().timestamp() as f64;

    let power = PowerTelemetry {
        battery_voltage: sample(rng, profile, 7.2, 8.4, 2),
        solar_current: sample(rng, profile, 0.0, 2.5, 2),
        battery_temp_c: sample(rng, profile, 15.0, 35.0, 1),
    };
    let orientation = OrientationTelemetry {
        roll_deg: sample(rng, profile, -10.0, 10.0, 1),
        pitch_deg: sample(rng, profile, -10.0, 10.0, 1),
        yaw_deg: sample(rng, profile, -180.0, 180.0, 1),
    };
    let radio = RadioTelemetry {
        frequency_mhz: sample(rng, profile, 437.0, 437.5, 1),
        rssi_dbm: include_leaf(rng, profile).then(|| f64::from(rng.gen_range(-120..=-60))),
        snr_db: sample(rng, profile, -5.0, 15.0, 1),
    };

    TelemetryPacket {
        power: Some(power),
        orientation: Some(orientation),
        radio: Some(radio),
        timestamp: Some(timestamp),
        mode: Some("downlink".to_string()),
        ground_station: Some("UCI".to_string()),
        seq: Some(seq),
    }
}

/// Serialize a packet as the station backend does, tagged `"type":"telemetry"`.
pub fn encode_packet(packet: &TelemetryPacket) -> serde_json::Result<String> {
    let mut value = serde_json::to_value(packet)?;
    if let Some(object) = value.as_object_mut() {
        object.insert("type".to_string(), serde_json::Value::from("telemetry"));
    }
    serde_json::to_string(&value)
}

fn include_leaf<R: Rng + ?Sized>(rng: &mut R, profile: SimProfile) -> bool {
    match profile {
        SimProfile::Full => true,
        SimProfile::Partial => rng.gen_bool(PARTIAL_LEAF_PROBABILITY),
    }
}

fn sample<R: Rng + ?Sized>(
    rng: &mut R,
    profile: SimProfile,
    low: f64,
    high: f64,
    digits: i32,
) -> Option<f64> {
    if !include_leaf(rng, profile) {
        return None;
    }
    let scale = 10f64.powi(digits);
    Some((rng.gen_range(low..=high) * scale).round() / scale)
}

// ── Server ────────────────────────────────────────────────────────────────────

/// A bound simulator, ready to [`spawn`](TelemetrySimulator::spawn).
pub struct TelemetrySimulator {
    listener: TcpListener,
    interval: Duration,
    profile: SimProfile,
}

impl TelemetrySimulator {
    pub async fn bind<A: ToSocketAddrs>(
        addr: A,
        interval: Duration,
        profile: SimProfile,
    ) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self {
            listener,
            interval,
            profile,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// `ws://` URL clients should connect to.
    pub fn endpoint(&self) -> io::Result<Url> {
        let addr = self.local_addr()?;
        Url::parse(&format!("ws://{addr}{TELEMETRY_PATH}"))
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))
    }

    /// Accept clients in a background task until the handle is aborted.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.serve())
    }

    async fn serve(self) {
        let addr = self.listener.local_addr().ok();
        tracing::info!(addr = ?addr, profile = ?self.profile, "telemetry simulator listening");

        loop {
            match self.listener.accept().await {
                Ok((stream, peer)) => {
                    tokio::spawn(stream_client(stream, peer, self.interval, self.profile));
                }
                Err(e) => {
                    tracing::warn!(error = %e, "simulator accept failed");
                    tokio::time::sleep(Duration::from_millis(100)).await;
                }
            }
        }
    }
}

async fn stream_client(stream: TcpStream, peer: SocketAddr, interval: Duration, profile: SimProfile) {
    let socket = match accept_async(stream).await {
        Ok(socket) => socket,
        Err(e) => {
            tracing::debug!(peer = %peer, error = %e, "simulator handshake failed");
            return;
        }
    };
    tracing::info!(peer = %peer, "simulator client connected");

    let (mut sink, mut incoming) = socket.split();
    let mut ticker = tokio::time::interval(interval);
    let mut seq: u64 = 0;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                seq += 1;
                let packet = make_fake_telemetry(&mut rand::thread_rng(), profile, seq);
                let text = match encode_packet(&packet) {
                    Ok(text) => text,
                    Err(e) => {
                        tracing::warn!(error = %e, "failed to encode simulated packet");
                        continue;
                    }
                };
                if let Err(e) = sink.send(Message::Text(text)).await {
                    tracing::debug!(peer = %peer, error = %e, "simulator send failed");
                    break;
                }
            }
            message = incoming.next() => match message {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::debug!(peer = %peer, error = %e, "simulator client errored");
                    break;
                }
            },
        }
    }

    tracing::info!(peer = %peer, packets = seq, "simulator client disconnected");
}
