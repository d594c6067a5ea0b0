//! # IPC Client
//!
//! Unix socket client for front-end surfaces to talk to the daemon.

use anyhow::{anyhow, Result};
use log::{debug, info, warn};
use std::sync::Arc;
use tokio::net::UnixStream;
use tokio::sync::{mpsc, RwLock};
use tokio::time::{sleep, timeout, Duration};

use crate::ipc::protocol::{read_frame, write_frame, ClientCommand, DaemonEvent};

/// Connection timeout
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Delay between connection attempts
const RETRY_DELAY: Duration = Duration::from_millis(500);

/// IPC client handle for a front-end surface
pub struct IpcClient {
    /// Event receiver channel
    event_rx: mpsc::Receiver<DaemonEvent>,
    /// Command sender channel
    command_tx: mpsc::Sender<ClientCommand>,
    /// Connection status
    connected: Arc<RwLock<bool>>,
}

impl IpcClient {
    /// Connect to the daemon's IPC server
    pub async fn connect(socket_path: &str) -> Result<Self> {
        info!("Connecting to IPC server at {socket_path}");

        let stream = timeout(CONNECT_TIMEOUT, UnixStream::connect(socket_path))
            .await
            .map_err(|_| anyhow!("Connection timeout"))?
            .map_err(|e| anyhow!("Failed to connect: {e}"))?;

        debug!("Connected to IPC server");

        let (event_tx, event_rx) = mpsc::channel(256);
        let (command_tx, command_rx) = mpsc::channel(64);
        let connected = Arc::new(RwLock::new(true));

        let connected_clone = connected.clone();
        tokio::spawn(async move {
            Self::connection_loop(stream, event_tx, command_rx, connected_clone).await;
        });

        Ok(IpcClient {
            event_rx,
            command_tx,
            connected,
        })
    }

    /// Next event from the daemon; `None` once disconnected
    pub async fn next_event(&mut self) -> Option<DaemonEvent> {
        self.event_rx.recv().await
    }

    /// Send a command to the daemon
    pub async fn send_command(&self, command: ClientCommand) -> Result<()> {
        self.command_tx
            .send(command)
            .await
            .map_err(|_| anyhow!("IPC connection closed"))
    }

    pub async fn is_connected(&self) -> bool {
        *self.connected.read().await
    }

    /// Main connection loop: reads events, writes commands
    async fn connection_loop(
        stream: UnixStream,
        event_tx: mpsc::Sender<DaemonEvent>,
        mut command_rx: mpsc::Receiver<ClientCommand>,
        connected: Arc<RwLock<bool>>,
    ) {
        let (mut reader, mut writer) = stream.into_split();

        let write_handle = tokio::spawn(async move {
            while let Some(command) = command_rx.recv().await {
                if let Err(e) = write_frame(&mut writer, &command).await {
                    warn!("Failed to send IPC command: {e}");
                    return;
                }
            }
        });

        loop {
            match read_frame::<DaemonEvent, _>(&mut reader).await {
                Ok(event) => {
                    if event_tx.send(event).await.is_err() {
                        debug!("Event receiver dropped, closing connection");
                        break;
                    }
                }
                Err(e) => {
                    debug!("IPC connection ended: {e}");
                    break;
                }
            }
        }

        write_handle.abort();
        *connected.write().await = false;
    }
}

/// Connect, retrying while the daemon is still coming up
pub async fn connect_with_retry(socket_path: &str, attempts: u32) -> Result<IpcClient> {
    let mut last_err = anyhow!("no connection attempts made");
    for attempt in 1..=attempts {
        match IpcClient::connect(socket_path).await {
            Ok(client) => return Ok(client),
            Err(e) => {
                debug!("IPC connect attempt {attempt}/{attempts} failed: {e}");
                last_err = e;
                sleep(RETRY_DELAY).await;
            }
        }
    }
    Err(last_err)
}
