//! Room signaling channel adapter
//!
//! Owns the event transport for one room attempt: joins the room on
//! connect, dispatches inbound named events to registered handlers on
//! a single pump task, and announces departure on disconnect.
//!
//! Handler registration is idempotent: exactly one handler per event
//! name, and re-registering replaces the previous one. Handlers are
//! invoked on the pump task and must not block.

use dashmap::DashMap;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use parley_core::codec::event;

use crate::error::{Result, TransportError};
use crate::traits::{ChannelEvent, SignalReceiver, SignalSender, SignalTransport};
use crate::websocket::{WebSocketEventSender, WebSocketSignalTransport};

/// Callback invoked with the payload of a registered event
pub type EventHandler = Box<dyn Fn(Value) + Send + Sync>;
/// Callback invoked when the channel closes from the remote side
pub type CloseHandler = Box<dyn Fn(Option<String>) + Send + Sync>;
/// Callback invoked on a transport error
pub type ErrorHandler = Box<dyn Fn(String) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChannelState {
    New,
    Connected,
    Closed,
}

/// The signaling channel adapter
pub struct SignalChannel {
    state: ChannelState,
    room_id: String,
    sender: Option<WebSocketEventSender>,
    handlers: Arc<DashMap<String, EventHandler>>,
    on_close: Arc<Mutex<Option<CloseHandler>>>,
    on_error: Arc<Mutex<Option<ErrorHandler>>>,
    pump: Option<JoinHandle<()>>,
}

impl SignalChannel {
    pub fn new() -> Self {
        Self {
            state: ChannelState::New,
            room_id: String::new(),
            sender: None,
            handlers: Arc::new(DashMap::new()),
            on_close: Arc::new(Mutex::new(None)),
            on_error: Arc::new(Mutex::new(None)),
            pump: None,
        }
    }

    /// Register the handler for a named event. Replaces any handler
    /// previously registered for the same name.
    pub fn register_handler<F>(&self, name: &str, handler: F)
    where
        F: Fn(Value) + Send + Sync + 'static,
    {
        self.handlers.insert(name.to_string(), Box::new(handler));
    }

    /// Register the handler invoked when the remote side closes the
    /// channel. Replaces any previous close handler.
    pub fn register_close_handler<F>(&self, handler: F)
    where
        F: Fn(Option<String>) + Send + Sync + 'static,
    {
        *self.on_close.lock() = Some(Box::new(handler));
    }

    /// Register the handler invoked on transport errors. Replaces any
    /// previous error handler.
    pub fn register_error_handler<F>(&self, handler: F)
    where
        F: Fn(String) + Send + Sync + 'static,
    {
        *self.on_error.lock() = Some(Box::new(handler));
    }

    /// Connect to the relay and join `room_id`. The join notification
    /// is emitted before this returns.
    pub async fn connect(&mut self, room_url: &str, room_id: &str) -> Result<()> {
        if self.state == ChannelState::Connected {
            return Err(TransportError::AlreadyConnected);
        }

        let (sender, receiver) = WebSocketSignalTransport::connect(room_url).await?;

        self.room_id = room_id.to_string();
        self.pump = Some(tokio::spawn(run_dispatch(
            receiver,
            self.handlers.clone(),
            self.on_close.clone(),
            self.on_error.clone(),
        )));

        // Join the room before anything else goes out.
        sender.emit(event::JOIN, json!(room_id)).await?;

        self.sender = Some(sender);
        self.state = ChannelState::Connected;
        info!(room = %room_id, "joined signaling channel");
        Ok(())
    }

    /// Emit a named event. Best-effort: fails with `NotConnected` when
    /// the channel is down; the caller decides whether that is fatal.
    pub async fn emit(&self, name: &str, data: Value) -> Result<()> {
        match &self.sender {
            Some(sender) if self.state == ChannelState::Connected => sender.emit(name, data).await,
            _ => Err(TransportError::NotConnected),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.state == ChannelState::Connected
    }

    /// Leave the room and tear the transport down. If connected, the
    /// `webrtc_leave` notification goes out first. Idempotent: calling
    /// on an already closed channel is a no-op.
    pub async fn disconnect(&mut self) {
        if self.state == ChannelState::Connected {
            if let Some(sender) = &self.sender {
                let _ = sender.emit(event::WEBRTC_LEAVE, json!(self.room_id)).await;
                let _ = sender.close().await;
            }
            info!(room = %self.room_id, "left signaling channel");
        }
        self.state = ChannelState::Closed;
        self.sender = None;
        if let Some(pump) = self.pump.take() {
            pump.abort();
        }
    }
}

impl Default for SignalChannel {
    fn default() -> Self {
        Self::new()
    }
}

/// Pump inbound channel events into the registered handlers. All
/// handlers run here, on one task, in arrival order.
async fn run_dispatch<R: SignalReceiver>(
    mut receiver: R,
    handlers: Arc<DashMap<String, EventHandler>>,
    on_close: Arc<Mutex<Option<CloseHandler>>>,
    on_error: Arc<Mutex<Option<ErrorHandler>>>,
) {
    while let Some(event) = receiver.recv().await {
        match event {
            ChannelEvent::Connected => debug!("signaling channel up"),
            ChannelEvent::Event { name, data } => match handlers.get(&name) {
                Some(handler) => handler(data),
                None => debug!(event = %name, "no handler registered, dropping"),
            },
            ChannelEvent::Error(e) => {
                warn!("channel error: {}", e);
                if let Some(handler) = on_error.lock().as_ref() {
                    handler(e);
                }
            }
            ChannelEvent::Disconnected { reason } => {
                info!(?reason, "signaling channel closed");
                if let Some(handler) = on_close.lock().as_ref() {
                    handler(reason);
                }
                break;
            }
        }
    }
}
