//! Signaling channel trait definitions

use async_trait::async_trait;
use serde_json::Value;
use std::net::SocketAddr;

use crate::error::Result;

/// Events that can occur on a signaling channel
#[derive(Debug, Clone)]
pub enum ChannelEvent {
    /// Channel established
    Connected,
    /// Channel closed (clean or error)
    Disconnected { reason: Option<String> },
    /// Named event received
    Event { name: String, data: Value },
    /// Error occurred
    Error(String),
}

/// Trait for emitting named events
#[async_trait]
pub trait SignalSender: Send + Sync {
    /// Emit a named event with a JSON payload
    async fn emit(&self, name: &str, data: Value) -> Result<()>;

    /// Check if connected
    fn is_connected(&self) -> bool;

    /// Close the sender
    async fn close(&self) -> Result<()>;
}

/// Trait for receiving channel events
#[async_trait]
pub trait SignalReceiver: Send {
    /// Receive the next event
    async fn recv(&mut self) -> Option<ChannelEvent>;
}

/// Main transport trait for named-event channels
#[async_trait]
pub trait SignalTransport: Send + Sync {
    /// The sender type for this transport
    type Sender: SignalSender;
    /// The receiver type for this transport
    type Receiver: SignalReceiver;

    /// Connect to a remote endpoint
    async fn connect(url: &str) -> Result<(Self::Sender, Self::Receiver)>
    where
        Self: Sized;
}

/// Trait for accepting inbound channels (in-process relays)
#[async_trait]
pub trait SignalListener: Send + Sync {
    /// The sender type for accepted connections
    type Sender: SignalSender;
    /// The receiver type for accepted connections
    type Receiver: SignalReceiver;

    /// Accept a new connection
    async fn accept(&mut self) -> Result<(Self::Sender, Self::Receiver, SocketAddr)>;

    /// Get the local address
    fn local_addr(&self) -> Result<SocketAddr>;
}
