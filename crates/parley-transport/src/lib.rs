//! Parley Transport
//!
//! The signaling channel: a bidirectional named-event connection to a
//! room relay. Events are JSON payloads addressed by name, delivered
//! in order on a single dispatch task.
//!
//! This crate provides:
//! - The channel trait surface ([`SignalTransport`], [`SignalSender`],
//!   [`SignalReceiver`], [`ChannelEvent`])
//! - A WebSocket implementation ([`WebSocketSignalTransport`]) plus the
//!   listener half used by in-process test relays
//! - The room channel adapter ([`SignalChannel`]): join-on-connect,
//!   handler registry, leave-on-disconnect

pub mod channel;
pub mod error;
pub mod traits;
pub mod websocket;

pub use channel::SignalChannel;
pub use error::{Result, TransportError};
pub use traits::{ChannelEvent, SignalListener, SignalReceiver, SignalSender, SignalTransport};
pub use websocket::{
    WebSocketEventListener, WebSocketEventReceiver, WebSocketEventSender, WebSocketSignalTransport,
};
