//! WebSocket signaling transport
//!
//! Named events are carried as JSON text frames using the envelope from
//! [`parley_core::codec`]. The client half implements
//! [`SignalTransport`]; the listener half exists for in-process test
//! relays.

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio_tungstenite::{
    accept_async, connect_async, tungstenite::protocol::Message as WsMessage, WebSocketStream,
};
use tracing::{debug, error, info, warn};

use parley_core::codec;

use crate::error::{Result, TransportError};
use crate::traits::{ChannelEvent, SignalListener, SignalReceiver, SignalSender, SignalTransport};

/// WebSocket signaling transport
pub struct WebSocketSignalTransport;

/// Sender half of a WebSocket event channel
pub struct WebSocketEventSender {
    tx: mpsc::Sender<WsMessage>,
    connected: Arc<Mutex<bool>>,
}

#[async_trait]
impl SignalSender for WebSocketEventSender {
    async fn emit(&self, name: &str, data: Value) -> Result<()> {
        if !self.is_connected() {
            return Err(TransportError::NotConnected);
        }

        let frame = codec::encode_event(name, &data);
        self.tx
            .send(WsMessage::Text(frame))
            .await
            .map_err(|e| TransportError::SendFailed(e.to_string()))
    }

    fn is_connected(&self) -> bool {
        *self.connected.lock()
    }

    async fn close(&self) -> Result<()> {
        let _ = self.tx.send(WsMessage::Close(None)).await;
        *self.connected.lock() = false;
        Ok(())
    }
}

/// Receiver half of a WebSocket event channel
pub struct WebSocketEventReceiver {
    rx: mpsc::Receiver<ChannelEvent>,
}

#[async_trait]
impl SignalReceiver for WebSocketEventReceiver {
    async fn recv(&mut self) -> Option<ChannelEvent> {
        self.rx.recv().await
    }
}

/// Split a WebSocket stream into an event sender/receiver pair, with
/// writer and reader tasks pumping both directions.
fn event_channel_pair<S>(ws_stream: WebSocketStream<S>) -> (WebSocketEventSender, WebSocketEventReceiver)
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let (write, read) = ws_stream.split();

    let (send_tx, mut send_rx) = mpsc::channel::<WsMessage>(100);
    let (event_tx, event_rx) = mpsc::channel::<ChannelEvent>(100);

    let connected = Arc::new(Mutex::new(true));
    let connected_write = connected.clone();
    let connected_read = connected.clone();

    // Writer task
    tokio::spawn(async move {
        let mut write = write;
        while let Some(msg) = send_rx.recv().await {
            if let Err(e) = write.send(msg).await {
                error!("WebSocket write error: {}", e);
                break;
            }
        }
        *connected_write.lock() = false;
    });

    // Reader task
    tokio::spawn(async move {
        let mut read = read;

        let _ = event_tx.send(ChannelEvent::Connected).await;

        while let Some(result) = read.next().await {
            match result {
                Ok(msg) => match msg {
                    WsMessage::Text(text) => match codec::decode_event(&text) {
                        Ok((name, data)) => {
                            let _ = event_tx.send(ChannelEvent::Event { name, data }).await;
                        }
                        Err(e) => {
                            // Malformed frame: drop it, keep the channel up.
                            warn!("undecodable event frame: {}", e);
                        }
                    },
                    WsMessage::Binary(_) => {
                        warn!("received binary frame on event channel, dropping");
                    }
                    WsMessage::Ping(_) => {
                        debug!("received ping");
                    }
                    WsMessage::Pong(_) => {
                        debug!("received pong");
                    }
                    WsMessage::Close(frame) => {
                        let reason = frame.map(|f| f.reason.to_string());
                        info!("WebSocket closed: {:?}", reason);
                        let _ = event_tx.send(ChannelEvent::Disconnected { reason }).await;
                        break;
                    }
                    WsMessage::Frame(_) => {
                        // Raw frame, ignore
                    }
                },
                Err(e) => {
                    error!("WebSocket read error: {}", e);
                    let _ = event_tx.send(ChannelEvent::Error(e.to_string())).await;
                    let _ = event_tx
                        .send(ChannelEvent::Disconnected {
                            reason: Some(e.to_string()),
                        })
                        .await;
                    break;
                }
            }
        }

        *connected_read.lock() = false;
    });

    let sender = WebSocketEventSender {
        tx: send_tx,
        connected,
    };
    let receiver = WebSocketEventReceiver { rx: event_rx };

    (sender, receiver)
}

#[async_trait]
impl SignalTransport for WebSocketSignalTransport {
    type Sender = WebSocketEventSender;
    type Receiver = WebSocketEventReceiver;

    async fn connect(url: &str) -> Result<(Self::Sender, Self::Receiver)> {
        let parsed = url::Url::parse(url).map_err(|e| TransportError::InvalidUrl(e.to_string()))?;
        if parsed.scheme() != "ws" && parsed.scheme() != "wss" {
            return Err(TransportError::InvalidUrl(format!(
                "unsupported scheme: {}",
                parsed.scheme()
            )));
        }

        info!("Connecting to signaling channel: {}", url);

        let (ws_stream, response) = connect_async(url)
            .await
            .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;

        debug!("WebSocket connected, response: {:?}", response.status());

        Ok(event_channel_pair(ws_stream))
    }
}

/// WebSocket listener for in-process relays
pub struct WebSocketEventListener {
    listener: tokio::net::TcpListener,
}

impl WebSocketEventListener {
    pub async fn bind(addr: &str) -> Result<Self> {
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;

        info!("Event listener on {}", addr);

        Ok(Self { listener })
    }
}

#[async_trait]
impl SignalListener for WebSocketEventListener {
    type Sender = WebSocketEventSender;
    type Receiver = WebSocketEventReceiver;

    async fn accept(&mut self) -> Result<(Self::Sender, Self::Receiver, SocketAddr)> {
        let (stream, addr) = self
            .listener
            .accept()
            .await
            .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;

        debug!("Accepted TCP connection from {}", addr);

        let ws_stream = accept_async(stream)
            .await
            .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;

        let (sender, receiver) = event_channel_pair(ws_stream);
        Ok((sender, receiver, addr))
    }

    fn local_addr(&self) -> Result<SocketAddr> {
        self.listener.local_addr().map_err(TransportError::Io)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_rejects_bad_url() {
        assert!(matches!(
            WebSocketSignalTransport::connect("not a url").await,
            Err(TransportError::InvalidUrl(_))
        ));
        assert!(matches!(
            WebSocketSignalTransport::connect("http://127.0.0.1:1").await,
            Err(TransportError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_connect_refused() {
        // Port 1 is never listening in the test environment.
        assert!(matches!(
            WebSocketSignalTransport::connect("ws://127.0.0.1:1").await,
            Err(TransportError::ConnectionFailed(_))
        ));
    }
}
