//! # IPC Server
//!
//! Unix socket server for the daemon to communicate with front-end
//! clients (new-tab page host, popup, TUI).
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.4.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Command processing support for settings and manual triggers
//! - 1.0.0: Initial IPC implementation with Unix socket protocol

use anyhow::Result;
use log::{debug, info, warn};
use std::sync::Arc;
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{broadcast, mpsc, RwLock};

use crate::ipc::protocol::{read_frame, write_frame, ClientCommand, DaemonEvent};

/// Maximum number of connected clients
const MAX_CLIENTS: usize = 10;

/// Broadcast channel capacity for events
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Command channel capacity
const COMMAND_CHANNEL_CAPACITY: usize = 64;

/// IPC server handle for the daemon
pub struct IpcServer {
    /// Broadcast sender for events to all clients
    event_tx: broadcast::Sender<DaemonEvent>,
    /// Receiver for commands from clients, drained by the daemon loop
    command_rx: Arc<RwLock<mpsc::Receiver<ClientCommand>>>,
    /// Sender for commands (used by client handlers)
    command_tx: mpsc::Sender<ClientCommand>,
    /// Connected client count
    client_count: Arc<RwLock<usize>>,
}

impl IpcServer {
    /// Create a new IPC server (does not start listening yet)
    pub fn new() -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);

        IpcServer {
            event_tx,
            command_rx: Arc::new(RwLock::new(command_rx)),
            command_tx,
            client_count: Arc::new(RwLock::new(0)),
        }
    }

    /// Start listening in a background task
    pub async fn start(self: Arc<Self>, socket_path: &str) -> Result<()> {
        // Remove a stale socket file from a previous run
        if std::path::Path::new(socket_path).exists() {
            std::fs::remove_file(socket_path)?;
        }

        let listener = UnixListener::bind(socket_path)?;
        info!("IPC server listening on {socket_path}");

        let server = self.clone();
        tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((stream, _addr)) => {
                        let client_count = *server.client_count.read().await;
                        if client_count >= MAX_CLIENTS {
                            warn!(
                                "Maximum IPC clients reached ({MAX_CLIENTS}), rejecting connection"
                            );
                            continue;
                        }

                        *server.client_count.write().await += 1;
                        info!("IPC client connected (total: {})", client_count + 1);

                        let server_clone = server.clone();
                        tokio::spawn(async move {
                            server_clone.clone().handle_client(stream).await;
                            *server_clone.client_count.write().await -= 1;
                            debug!("IPC client disconnected");
                        });
                    }
                    Err(e) => {
                        warn!("IPC accept failed: {e}");
                    }
                }
            }
        });

        Ok(())
    }

    /// Broadcast an event to all connected clients; returns how many
    /// receivers got it
    pub fn broadcast_event(&self, event: DaemonEvent) -> usize {
        self.event_tx.send(event).unwrap_or(0)
    }

    /// Next command from any client, awaited by the daemon event loop
    pub async fn next_command(&self) -> Option<ClientCommand> {
        self.command_rx.write().await.recv().await
    }

    pub async fn client_count(&self) -> usize {
        *self.client_count.read().await
    }

    /// Per-client loop: forward broadcast events out, feed decoded
    /// commands into the shared command channel
    async fn handle_client(self: Arc<Self>, stream: UnixStream) {
        let (mut reader, mut writer) = stream.into_split();
        let mut event_rx = self.event_tx.subscribe();

        let write_handle = tokio::spawn(async move {
            loop {
                match event_rx.recv().await {
                    Ok(event) => {
                        if let Err(e) = write_frame(&mut writer, &event).await {
                            debug!("IPC write failed, dropping client: {e}");
                            return;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!("IPC client lagged, skipped {skipped} events");
                    }
                    Err(broadcast::error::RecvError::Closed) => return,
                }
            }
        });

        loop {
            match read_frame::<ClientCommand, _>(&mut reader).await {
                Ok(command) => {
                    debug!("IPC command received: {}", command.request_id());
                    if self.command_tx.send(command).await.is_err() {
                        warn!("Command channel closed, dropping client");
                        break;
                    }
                }
                Err(e) => {
                    debug!("IPC read ended: {e}");
                    break;
                }
            }
        }

        write_handle.abort();
    }
}

impl Default for IpcServer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ipc::client::IpcClient;

    #[tokio::test]
    async fn test_event_and_command_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let socket_path = dir.path().join("ipc-test.sock");
        let socket_path = socket_path.to_str().unwrap();

        let server = Arc::new(IpcServer::new());
        server.clone().start(socket_path).await.unwrap();

        let mut client = IpcClient::connect(socket_path).await.unwrap();

        // Give the accept loop a moment to register the subscriber
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert_eq!(server.client_count().await, 1);

        let receivers = server.broadcast_event(DaemonEvent::Heartbeat { timestamp: 7 });
        assert_eq!(receivers, 1);

        match client.next_event().await.unwrap() {
            DaemonEvent::Heartbeat { timestamp } => assert_eq!(timestamp, 7),
            other => panic!("unexpected event: {other:?}"),
        }

        client
            .send_command(ClientCommand::GetSettings {
                request_id: "req-1".to_string(),
            })
            .await
            .unwrap();

        let command = server.next_command().await.unwrap();
        assert_eq!(command.request_id(), "req-1");
    }
}
