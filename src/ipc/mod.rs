//! # IPC Module
//!
//! Inter-process communication between the daemon and front-end surfaces.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.4.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Settings and manual-trigger commands
//! - 1.0.0: Initial IPC implementation with Unix socket protocol

pub mod client;
pub mod protocol;
pub mod server;

pub use client::{connect_with_retry, IpcClient};
pub use protocol::{
    decode_message, encode_message, read_frame, write_frame, write_message, ClientCommand,
    DaemonEvent,
};
pub use server::IpcServer;
