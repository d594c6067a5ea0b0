//! # IPC Protocol
//!
//! Message types for daemon <-> front-end communication over Unix socket.
//!
//! Uses length-prefixed JSON framing:
//! - 4 bytes: message length (big-endian u32)
//! - N bytes: JSON payload

use anyhow::{anyhow, Result};
use chrono::{DateTime, Local};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::features::corpus::ReminderPayload;
use crate::features::reminders::NotificationSettings;

/// Maximum accepted frame size (1 MB)
const MAX_MESSAGE_SIZE: u32 = 1024 * 1024;

// ============================================================================
// Daemon -> client events
// ============================================================================

/// Events sent from the daemon to connected front-end clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DaemonEvent {
    /// A reminder fired and should be rendered
    ReminderFired {
        payload: ReminderPayload,
        fired_at: DateTime<Local>,
    },
    /// Settings changed (IPC command or external writer)
    SettingsUpdated { settings: NotificationSettings },
    /// Response to a client command
    CommandResponse {
        request_id: String,
        success: bool,
        message: Option<String>,
        data: Option<serde_json::Value>,
    },
    /// Keep-alive
    Heartbeat { timestamp: i64 },
}

// ============================================================================
// Client -> daemon commands
// ============================================================================

/// Commands sent from front-end clients to the daemon
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientCommand {
    /// Fetch the current notification settings
    GetSettings { request_id: String },
    /// Replace the notification settings
    UpdateSettings {
        request_id: String,
        settings: NotificationSettings,
    },
    /// Fetch the last delivered reminder
    GetLastReminder { request_id: String },
    /// Deliver a reminder immediately (bypasses quiet hours)
    TriggerReminder { request_id: String },
}

impl ClientCommand {
    pub fn request_id(&self) -> &str {
        match self {
            ClientCommand::GetSettings { request_id }
            | ClientCommand::UpdateSettings { request_id, .. }
            | ClientCommand::GetLastReminder { request_id }
            | ClientCommand::TriggerReminder { request_id } => request_id,
        }
    }
}

// ============================================================================
// Framing
// ============================================================================

/// Encode a message with its length prefix
pub fn encode_message<T: Serialize>(msg: &T) -> Result<Vec<u8>> {
    let json = serde_json::to_vec(msg)?;
    let len = u32::try_from(json.len()).map_err(|_| anyhow!("message too large"))?;
    if len > MAX_MESSAGE_SIZE {
        return Err(anyhow!("message of {len} bytes exceeds frame limit"));
    }

    let mut framed = Vec::with_capacity(4 + json.len());
    framed.extend_from_slice(&len.to_be_bytes());
    framed.extend_from_slice(&json);
    Ok(framed)
}

/// Read a framed message from a blocking reader
pub fn decode_message<T: DeserializeOwned, R: Read>(reader: &mut R) -> Result<T> {
    let mut len_buf = [0u8; 4];
    reader.read_exact(&mut len_buf)?;
    let len = u32::from_be_bytes(len_buf);
    if len > MAX_MESSAGE_SIZE {
        return Err(anyhow!("frame of {len} bytes exceeds limit"));
    }

    let mut buf = vec![0u8; len as usize];
    reader.read_exact(&mut buf)?;
    Ok(serde_json::from_slice(&buf)?)
}

/// Write a framed message to a blocking writer
pub fn write_message<T: Serialize, W: Write>(writer: &mut W, msg: &T) -> Result<()> {
    let encoded = encode_message(msg)?;
    writer.write_all(&encoded)?;
    writer.flush()?;
    Ok(())
}

/// Read a framed message from an async reader (server/client tasks)
pub async fn read_frame<T, R>(reader: &mut R) -> Result<T>
where
    T: DeserializeOwned,
    R: AsyncRead + Unpin,
{
    let mut len_buf = [0u8; 4];
    reader.read_exact(&mut len_buf).await?;
    let len = u32::from_be_bytes(len_buf);
    if len > MAX_MESSAGE_SIZE {
        return Err(anyhow!("frame of {len} bytes exceeds limit"));
    }

    let mut buf = vec![0u8; len as usize];
    reader.read_exact(&mut buf).await?;
    Ok(serde_json::from_slice(&buf)?)
}

/// Write a framed message to an async writer
pub async fn write_frame<T, W>(writer: &mut W, msg: &T) -> Result<()>
where
    T: Serialize,
    W: AsyncWrite + Unpin,
{
    let encoded = encode_message(msg)?;
    writer.write_all(&encoded).await?;
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_encode_decode_roundtrip() {
        let event = DaemonEvent::Heartbeat { timestamp: 12345 };
        let encoded = encode_message(&event).unwrap();

        let mut cursor = Cursor::new(encoded);
        let decoded: DaemonEvent = decode_message(&mut cursor).unwrap();

        match decoded {
            DaemonEvent::Heartbeat { timestamp } => assert_eq!(timestamp, 12345),
            _ => panic!("Wrong event type"),
        }
    }

    #[test]
    fn test_command_serialization() {
        let cmd = ClientCommand::TriggerReminder {
            request_id: "test-123".to_string(),
        };

        let json = serde_json::to_string(&cmd).unwrap();
        assert!(json.contains("TriggerReminder"));
        assert!(json.contains("test-123"));
        assert_eq!(cmd.request_id(), "test-123");
    }

    #[test]
    fn test_oversized_frame_rejected() {
        let mut frame = Vec::new();
        frame.extend_from_slice(&(MAX_MESSAGE_SIZE + 1).to_be_bytes());
        let mut cursor = Cursor::new(frame);
        assert!(decode_message::<DaemonEvent, _>(&mut cursor).is_err());
    }

    #[tokio::test]
    async fn test_async_frame_roundtrip() {
        let event = DaemonEvent::SettingsUpdated {
            settings: NotificationSettings::default(),
        };
        let mut cursor = Cursor::new(Vec::new());
        write_frame(&mut cursor, &event).await.unwrap();

        let buf = cursor.into_inner();
        let mut reader = buf.as_slice();
        let decoded: DaemonEvent = read_frame(&mut reader).await.unwrap();
        match decoded {
            DaemonEvent::SettingsUpdated { settings } => {
                assert_eq!(settings, NotificationSettings::default())
            }
            _ => panic!("Wrong event type"),
        }
    }
}
