//! CDP WebSocket connection implementation
//!
//! WebSocket-based JSON-RPC connection to a Chrome DevTools Protocol target.
//! Commands are correlated to responses through a pending-command map; a
//! spawned reader task drains the socket for the connection's lifetime.

use super::traits::{CdpConnection, CdpError as CdpErrorResponse, CdpResponse};
use super::types::{CdpRequest, CdpRpcResponse};
use crate::Error;
use async_trait::async_trait;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;
type WsStream = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

/// Pending command response
#[derive(Debug)]
struct PendingCommand {
    /// Response channel sender
    sender: tokio::sync::oneshot::Sender<CdpResponse>,
    /// Command method (for logging)
    method: String,
}

/// CDP WebSocket connection implementation
#[derive(Debug)]
pub struct CdpWebSocketConnection {
    /// WebSocket URL
    url: String,
    /// Write half of the WebSocket
    sink: Arc<Mutex<WsSink>>,
    /// Next command ID
    next_id: AtomicU64,
    /// Pending commands (ID -> response sender)
    pending_commands: Arc<Mutex<HashMap<u64, PendingCommand>>>,
    /// Is connection active
    is_active: Arc<AtomicBool>,
    /// Per-command response deadline in seconds
    command_timeout_secs: u64,
}

impl CdpWebSocketConnection {
    /// Connect to a CDP target
    ///
    /// # Arguments
    /// * `url` - WebSocket URL (e.g., "ws://127.0.0.1:9222/devtools/page/ABC123")
    pub async fn new<S: Into<String>>(url: S) -> Result<Arc<Self>, Error> {
        let url = url.into();
        info!("Connecting to CDP WebSocket: {}", url);

        let (ws_stream, _) = connect_async(url.as_str())
            .await
            .map_err(|e| Error::websocket(format!("Failed to connect to {}: {}", url, e)))?;

        let (sink, stream) = ws_stream.split();

        let connection = Arc::new(Self {
            url,
            sink: Arc::new(Mutex::new(sink)),
            next_id: AtomicU64::new(1),
            pending_commands: Arc::new(Mutex::new(HashMap::new())),
            is_active: Arc::new(AtomicBool::new(true)),
            command_timeout_secs: 30,
        });

        // Reader task lives until the socket closes or the connection is released
        let pending_commands = Arc::clone(&connection.pending_commands);
        let is_active = Arc::clone(&connection.is_active);
        tokio::spawn(async move {
            Self::message_loop(stream, pending_commands, is_active).await;
            debug!("CDP message loop exited");
        });

        Ok(connection)
    }

    /// Read messages until the socket closes, dispatching responses to waiters
    async fn message_loop(
        mut stream: WsStream,
        pending_commands: Arc<Mutex<HashMap<u64, PendingCommand>>>,
        is_active: Arc<AtomicBool>,
    ) {
        while is_active.load(Ordering::SeqCst) {
            match stream.next().await {
                Some(Ok(Message::Text(text))) => {
                    if let Err(e) = Self::handle_message(&text, &pending_commands).await {
                        error!("Error handling CDP message: {}", e);
                    }
                }
                Some(Ok(Message::Close(_))) => {
                    info!("WebSocket close frame received");
                    break;
                }
                Some(Ok(_)) => {
                    // Binary/ping/pong frames carry nothing for us; tungstenite
                    // answers pings on flush
                }
                Some(Err(e)) => {
                    let msg = e.to_string();
                    if msg.contains("Connection reset") || msg.contains("closed") {
                        warn!("WebSocket connection closed: {}", msg);
                    } else {
                        error!("WebSocket error: {}", msg);
                    }
                    break;
                }
                None => {
                    warn!("WebSocket stream ended");
                    break;
                }
            }
        }

        is_active.store(false, Ordering::SeqCst);

        // Wake every waiter so commands fail fast instead of timing out
        let mut pending = pending_commands.lock().await;
        for (id, cmd) in pending.drain() {
            debug!("Dropping pending command {} ({})", id, cmd.method);
        }
    }

    /// Handle one incoming WebSocket text frame
    async fn handle_message(
        text: &str,
        pending_commands: &Arc<Mutex<HashMap<u64, PendingCommand>>>,
    ) -> Result<(), Error> {
        // Responses carry an id; everything else is an event notification we
        // do not subscribe to (readiness is condition-polled instead)
        if let Ok(response) = serde_json::from_str::<CdpRpcResponse>(text) {
            let mut pending = pending_commands.lock().await;

            if let Some(pending_cmd) = pending.remove(&response.id) {
                debug!(
                    "Received response for command {} ({})",
                    response.id, pending_cmd.method
                );

                let cdp_response = CdpResponse {
                    id: response.id,
                    result: Some(response.result),
                    error: response.error.map(|e| CdpErrorResponse {
                        code: e.code,
                        message: e.message,
                        data: e.data,
                    }),
                };

                let _ = pending_cmd.sender.send(cdp_response);
            } else {
                warn!("Received response for unknown command ID: {}", response.id);
            }

            return Ok(());
        }

        debug!("Ignoring CDP event frame");
        Ok(())
    }

    /// Send a WebSocket text frame
    async fn send_message(&self, json: String) -> Result<(), Error> {
        let mut sink = self.sink.lock().await;
        sink.send(Message::Text(json))
            .await
            .map_err(|e| Error::websocket(format!("Failed to send message: {}", e)))
    }
}

#[async_trait]
impl CdpConnection for CdpWebSocketConnection {
    /// Send a CDP command and wait for response
    async fn send_command(&self, method: &str, params: serde_json::Value) -> Result<CdpResponse, Error> {
        if !self.is_active.load(Ordering::SeqCst) {
            return Err(Error::websocket("Connection is not active"));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);

        let request = CdpRequest {
            id,
            method: method.to_string(),
            params: if params.is_null() { None } else { Some(params) },
            session_id: None,
        };

        let json = serde_json::to_string(&request)
            .map_err(|e| Error::cdp(format!("Failed to serialize request: {}", e)))?;

        debug!("Sending CDP command {}: {}", id, method);

        let (sender, receiver) = tokio::sync::oneshot::channel();

        {
            let mut pending = self.pending_commands.lock().await;
            pending.insert(
                id,
                PendingCommand {
                    sender,
                    method: method.to_string(),
                },
            );
        }

        self.send_message(json).await?;

        let timeout = tokio::time::Duration::from_secs(self.command_timeout_secs);
        match tokio::time::timeout(timeout, receiver).await {
            Ok(Ok(response)) => {
                if let Some(error) = &response.error {
                    return Err(Error::cdp(format!(
                        "{} failed: {} (code {})",
                        method, error.message, error.code
                    )));
                }
                Ok(response)
            }
            Ok(Err(_)) => Err(Error::websocket(format!(
                "Connection closed while waiting for {} ({})",
                method, id
            ))),
            Err(_) => {
                let mut pending = self.pending_commands.lock().await;
                pending.remove(&id);
                Err(Error::timeout(format!("Command {} ({}) timed out", method, id)))
            }
        }
    }

    /// Close the connection
    async fn close(&self) -> Result<(), Error> {
        info!("Closing CDP WebSocket connection to {}", self.url);

        self.is_active.store(false, Ordering::SeqCst);

        let mut sink = self.sink.lock().await;
        sink.send(Message::Close(None)).await.ok();
        sink.close()
            .await
            .map_err(|e| Error::websocket(format!("Failed to close WebSocket: {}", e)))?;

        Ok(())
    }

    /// Check if connection is active
    fn is_active(&self) -> bool {
        self.is_active.load(Ordering::SeqCst)
    }
}
