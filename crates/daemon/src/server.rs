// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Framed transport server (`/ws`).
//!
//! Long-lived bidirectional connections carrying the wire protocol.
//! The handshake enforces bearer-token auth (header or `?token=`),
//! the origin allow-list, and the per-IP connection cap; the session
//! enforces the payload size cap, the subscription cap, and an idle
//! timeout. Protocol violations answer with an `error` frame without
//! dropping the connection; only oversized payloads and idle silence
//! close it.

use falcon_bus::{BroadcastBus, OutputBus};
use falcon_core::Channel;
use falcon_wire::{
    decode_client_frame, ClientFrame, ProtocolError, ServerFrame, MAX_CONNECTIONS_PER_IP,
    MAX_PAYLOAD_BYTES, MAX_SUBSCRIPTIONS,
};
use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::StatusCode;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Transport configuration.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Bearer token clients must present.
    pub auth_token: String,
    /// Allowed origins; `None` disables the origin check.
    pub allowed_origins: Option<Vec<String>>,
    pub max_connections_per_ip: usize,
    pub max_subscriptions: usize,
    pub max_payload_bytes: usize,
    /// Connections silent for this long are closed.
    pub idle_timeout: Duration,
}

impl TransportConfig {
    pub fn new(auth_token: impl Into<String>) -> Self {
        Self {
            auth_token: auth_token.into(),
            allowed_origins: None,
            max_connections_per_ip: MAX_CONNECTIONS_PER_IP,
            max_subscriptions: MAX_SUBSCRIPTIONS,
            max_payload_bytes: MAX_PAYLOAD_BYTES,
            idle_timeout: Duration::from_secs(120),
        }
    }
}

/// Per-process transport state. Tests inject fresh instances.
#[derive(Default)]
struct TransportState {
    connections_per_ip: Mutex<HashMap<IpAddr, usize>>,
    next_client: Mutex<u64>,
}

/// Decrements the per-IP count when a connection ends.
struct ConnGuard {
    state: Arc<TransportState>,
    ip: IpAddr,
}

impl Drop for ConnGuard {
    fn drop(&mut self) {
        let mut map = self.state.connections_per_ip.lock();
        if let Some(count) = map.get_mut(&self.ip) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                map.remove(&self.ip);
            }
        }
    }
}

/// The `/ws` transport server.
pub struct TransportServer {
    config: TransportConfig,
    state: Arc<TransportState>,
    broadcast: BroadcastBus,
    output: OutputBus,
}

impl TransportServer {
    pub fn new(config: TransportConfig, broadcast: BroadcastBus, output: OutputBus) -> Self {
        Self { config, state: Arc::new(TransportState::default()), broadcast, output }
    }

    /// Accept connections until cancelled.
    pub async fn run(self: Arc<Self>, listener: TcpListener, cancel: CancellationToken) {
        info!("transport listening");
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("transport shutting down");
                    break;
                }
                accepted = listener.accept() => {
                    match accepted {
                        Ok((stream, addr)) => {
                            let server = Arc::clone(&self);
                            tokio::spawn(async move {
                                server.handle_connection(stream, addr.ip()).await;
                            });
                        }
                        Err(e) => warn!("accept error: {}", e),
                    }
                }
            }
        }
    }

    async fn handle_connection(&self, stream: TcpStream, ip: IpAddr) {
        // Per-IP cap first; the guard keeps the count honest on every
        // exit path.
        {
            let mut map = self.state.connections_per_ip.lock();
            let count = map.entry(ip).or_insert(0);
            if *count >= self.config.max_connections_per_ip {
                warn!(%ip, "connection cap exceeded");
                return;
            }
            *count += 1;
        }
        let _guard = ConnGuard { state: Arc::clone(&self.state), ip };

        let mut auth_failure: Option<&'static str> = None;
        let config = self.config.clone();
        let callback = |request: &Request, response: Response| -> Result<Response, ErrorResponse> {
            match check_handshake(&config, request) {
                Ok(()) => Ok(response),
                Err((status, label)) => {
                    auth_failure = Some(label);
                    let mut resp = ErrorResponse::new(None);
                    *resp.status_mut() = status;
                    Err(resp)
                }
            }
        };

        let ws = match tokio_tungstenite::accept_hdr_async(stream, callback).await {
            Ok(ws) => ws,
            Err(e) => {
                debug!(%ip, reason = auth_failure.unwrap_or("handshake"), error = %e, "connection rejected");
                return;
            }
        };

        let client_id = {
            let mut next = self.state.next_client.lock();
            *next += 1;
            format!("client-{}", *next)
        };
        debug!(%ip, %client_id, "connected");
        self.session(ws, client_id).await;
    }

    async fn session(
        &self,
        ws: tokio_tungstenite::WebSocketStream<TcpStream>,
        client_id: String,
    ) {
        let (mut write, mut read) = ws.split();
        let (event_tx, mut event_rx) = mpsc::unbounded_channel::<ServerFrame>();
        // channel string → forwarder task feeding event_tx.
        let mut subscriptions: HashMap<String, tokio::task::JoinHandle<()>> = HashMap::new();

        let connected = ServerFrame::Connected { client_id: client_id.clone() };
        if write.send(Message::text(connected.to_json())).await.is_err() {
            return;
        }

        loop {
            tokio::select! {
                event = event_rx.recv() => {
                    let Some(frame) = event else { break };
                    if write.send(Message::text(frame.to_json())).await.is_err() {
                        break;
                    }
                }
                incoming = tokio::time::timeout(self.config.idle_timeout, read.next()) => {
                    let message = match incoming {
                        Err(_) => {
                            debug!(%client_id, "idle timeout");
                            break;
                        }
                        Ok(None) => break,
                        Ok(Some(Err(_))) => break,
                        Ok(Some(Ok(message))) => message,
                    };
                    match message {
                        Message::Text(raw) => {
                            let keep_open = self
                                .handle_frame(raw.as_str(), &mut subscriptions, &event_tx, &mut write)
                                .await;
                            if !keep_open {
                                break;
                            }
                        }
                        Message::Close(_) => break,
                        // ws-level ping/pong and binary are transport
                        // noise, not protocol frames.
                        _ => {}
                    }
                }
            }
        }

        for (_, task) in subscriptions.drain() {
            task.abort();
        }
        debug!(%client_id, "disconnected");
    }

    /// Handle one inbound frame. Returns false to close the connection.
    async fn handle_frame(
        &self,
        raw: &str,
        subscriptions: &mut HashMap<String, tokio::task::JoinHandle<()>>,
        event_tx: &mpsc::UnboundedSender<ServerFrame>,
        write: &mut (impl SinkExt<Message> + Unpin),
    ) -> bool {
        let reply = match decode_client_frame(raw, self.config.max_payload_bytes) {
            Ok(ClientFrame::Ping) => ServerFrame::Pong,
            Ok(ClientFrame::Subscribe { channel }) => {
                if subscriptions.len() >= self.config.max_subscriptions {
                    ServerFrame::error("subscription limit reached")
                } else {
                    match channel.parse::<Channel>() {
                        Ok(parsed) => {
                            subscriptions.entry(channel.clone()).or_insert_with(|| {
                                self.spawn_forwarder(parsed, channel.clone(), event_tx.clone())
                            });
                            ServerFrame::Subscribed { channel }
                        }
                        Err(e) => ServerFrame::error(e.to_string()),
                    }
                }
            }
            Ok(ClientFrame::Unsubscribe { channel }) => {
                if let Some(task) = subscriptions.remove(&channel) {
                    task.abort();
                }
                ServerFrame::Unsubscribed { channel }
            }
            Err(ProtocolError::PayloadTooLarge { max }) => {
                let _ = write
                    .send(Message::text(
                        ServerFrame::error(format!("payload exceeds {} bytes", max)).to_json(),
                    ))
                    .await;
                return false;
            }
            Err(e) => ServerFrame::error(e.to_string()),
        };
        write.send(Message::text(reply.to_json())).await.is_ok()
    }

    /// Bridge one bus subscription into the session's event queue.
    fn spawn_forwarder(
        &self,
        channel: Channel,
        channel_name: String,
        event_tx: mpsc::UnboundedSender<ServerFrame>,
    ) -> tokio::task::JoinHandle<()> {
        match channel {
            Channel::Run(run_id) => {
                // Lift output lines into agent.output events.
                let mut sub = self.output.subscribe(run_id);
                tokio::spawn(async move {
                    while let Some(line) = sub.recv().await {
                        let frame = ServerFrame::Event {
                            channel: channel_name.clone(),
                            event: "agent.output".to_string(),
                            data: serde_json::to_value(&line).unwrap_or_default(),
                        };
                        if event_tx.send(frame).is_err() {
                            break;
                        }
                    }
                })
            }
            other => {
                let mut sub = self.broadcast.subscribe(other);
                tokio::spawn(async move {
                    while let Some(event) = sub.recv().await {
                        let data = serde_json::to_value(&event).unwrap_or_default();
                        let name = data
                            .get("type")
                            .and_then(serde_json::Value::as_str)
                            .unwrap_or("event")
                            .to_string();
                        let frame = ServerFrame::Event {
                            channel: channel_name.clone(),
                            event: name,
                            data,
                        };
                        if event_tx.send(frame).is_err() {
                            break;
                        }
                    }
                })
            }
        }
    }
}

/// Validate origin and bearer token during the handshake.
fn check_handshake(
    config: &TransportConfig,
    request: &Request,
) -> Result<(), (StatusCode, &'static str)> {
    if let Some(allowed) = &config.allowed_origins {
        let origin = request
            .headers()
            .get("origin")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if !allowed.iter().any(|a| a == origin) {
            return Err((StatusCode::FORBIDDEN, "origin"));
        }
    }

    let header_token = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim);
    let query_token = request.uri().query().and_then(|q| {
        q.split('&')
            .find_map(|pair| pair.strip_prefix("token="))
    });

    match header_token.or(query_token) {
        Some(token) if token == config.auth_token => Ok(()),
        _ => Err((StatusCode::UNAUTHORIZED, "token")),
    }
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
