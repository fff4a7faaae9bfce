//! Common test helpers for Parley
//!
//! This crate provides:
//! - An in-process room relay ([`TestRelay`]) speaking the wire
//!   contract the production relay speaks, with RAII cleanup
//! - A recording event sink ([`SinkRecorder`]) with condition-based
//!   waits instead of hardcoded sleeps
//! - Generic wait helpers

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use parley_client::{SignalingEvents, SignalingParameters};
use parley_core::codec::event;
use parley_core::{IceCandidate, SessionDescription};
use parley_transport::{
    ChannelEvent, SignalListener, SignalReceiver, SignalSender, WebSocketEventListener,
    WebSocketEventReceiver, WebSocketEventSender,
};

/// Default test timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default condition check interval
pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_millis(10);

// ============================================================================
// Condition-Based Waiting
// ============================================================================

/// Wait for a condition with timeout - condition-based, not time-based
pub async fn wait_for<F>(check: F, interval: Duration, max_wait: Duration) -> bool
where
    F: Fn() -> bool,
{
    let start = Instant::now();
    while start.elapsed() < max_wait {
        if check() {
            return true;
        }
        tokio::time::sleep(interval).await;
    }
    false
}

/// Wait for an atomic counter to reach a target value
pub async fn wait_for_count(counter: &AtomicU32, target: u32, max_wait: Duration) -> bool {
    wait_for(
        || counter.load(Ordering::SeqCst) >= target,
        DEFAULT_CHECK_INTERVAL,
        max_wait,
    )
    .await
}

/// Wait for a boolean flag to become true
pub async fn wait_for_flag(flag: &AtomicBool, max_wait: Duration) -> bool {
    wait_for(
        || flag.load(Ordering::SeqCst),
        DEFAULT_CHECK_INTERVAL,
        max_wait,
    )
    .await
}

// ============================================================================
// Test Relay - RAII wrapper with proper cleanup
// ============================================================================

struct RelayPeer {
    id: String,
    tx: Arc<WebSocketEventSender>,
}

type RoomMap = DashMap<String, Vec<RelayPeer>>;

/// An in-process room relay that automatically cleans up on drop.
///
/// Speaks the room contract: the first `join` is answered with
/// `room_created`, the second with `room_joined`, the third with
/// `full_room`; everything else is forwarded to the other member of
/// the room.
pub struct TestRelay {
    port: u16,
    handle: Option<JoinHandle<()>>,
    rooms: Arc<RoomMap>,
}

impl TestRelay {
    /// Bind on an ephemeral port and start accepting
    pub async fn start() -> Self {
        let mut listener = WebSocketEventListener::bind("127.0.0.1:0")
            .await
            .expect("bind test relay");
        let port = listener.local_addr().expect("relay local addr").port();

        let rooms: Arc<RoomMap> = Arc::new(DashMap::new());
        let accept_rooms = rooms.clone();

        let handle = tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((sender, receiver, addr)) => {
                        debug!("relay accepted {}", addr);
                        tokio::spawn(relay_peer(
                            Arc::new(sender),
                            receiver,
                            accept_rooms.clone(),
                        ));
                    }
                    Err(e) => {
                        warn!("relay accept error: {}", e);
                        break;
                    }
                }
            }
        });

        Self {
            port,
            handle: Some(handle),
            rooms,
        }
    }

    /// The relay URL clients dial
    pub fn url(&self) -> String {
        format!("ws://127.0.0.1:{}", self.port)
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Current member count of a room
    pub fn members(&self, room_id: &str) -> usize {
        self.rooms.get(room_id).map(|m| m.len()).unwrap_or(0)
    }

    /// Wait until a room has at least `count` members
    pub async fn wait_for_members(&self, room_id: &str, count: usize, max_wait: Duration) -> bool {
        wait_for(
            || self.members(room_id) >= count,
            DEFAULT_CHECK_INTERVAL,
            max_wait,
        )
        .await
    }

    /// Stop the relay explicitly (also happens on drop)
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for TestRelay {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Per-connection relay loop
async fn relay_peer(
    sender: Arc<WebSocketEventSender>,
    mut receiver: WebSocketEventReceiver,
    rooms: Arc<RoomMap>,
) {
    let peer_id = uuid::Uuid::new_v4().to_string();
    let mut joined: Option<String> = None;

    while let Some(channel_event) = receiver.recv().await {
        match channel_event {
            ChannelEvent::Event { name, data } => match name.as_str() {
                event::JOIN => {
                    let room_id = data.as_str().unwrap_or_default().to_string();
                    enum Outcome {
                        Created,
                        Joined,
                        Full,
                    }
                    let outcome = {
                        let mut members = rooms.entry(room_id.clone()).or_default();
                        if members.len() >= 2 {
                            Outcome::Full
                        } else {
                            members.push(RelayPeer {
                                id: peer_id.clone(),
                                tx: sender.clone(),
                            });
                            if members.len() == 1 {
                                Outcome::Created
                            } else {
                                Outcome::Joined
                            }
                        }
                    };
                    match outcome {
                        Outcome::Created => {
                            joined = Some(room_id.clone());
                            let _ = sender.emit(event::ROOM_CREATED, json!(room_id)).await;
                        }
                        Outcome::Joined => {
                            joined = Some(room_id.clone());
                            let _ = sender.emit(event::ROOM_JOINED, json!(peer_id)).await;
                        }
                        Outcome::Full => {
                            let _ = sender.emit(event::FULL_ROOM, json!("room is full")).await;
                        }
                    }
                }
                event::WEBRTC_LEAVE => {
                    forward(&rooms, joined.as_deref(), &peer_id, &name, data).await;
                    leave_room(&rooms, joined.take(), &peer_id);
                }
                _ => {
                    forward(&rooms, joined.as_deref(), &peer_id, &name, data).await;
                }
            },
            ChannelEvent::Disconnected { .. } => {
                leave_room(&rooms, joined.take(), &peer_id);
                break;
            }
            _ => {}
        }
    }
}

/// Forward an event to the other member of the room
async fn forward(rooms: &RoomMap, room_id: Option<&str>, from: &str, name: &str, data: Value) {
    let Some(room_id) = room_id else {
        return;
    };
    let target = rooms.get(room_id).and_then(|members| {
        members
            .iter()
            .find(|peer| peer.id != from)
            .map(|peer| peer.tx.clone())
    });
    if let Some(tx) = target {
        let _ = tx.emit(name, data).await;
    }
}

fn leave_room(rooms: &RoomMap, room_id: Option<String>, peer_id: &str) {
    if let Some(room_id) = room_id {
        if let Some(mut members) = rooms.get_mut(&room_id) {
            members.retain(|peer| peer.id != peer_id);
        }
        rooms.remove_if(&room_id, |_, members| members.is_empty());
    }
}

// ============================================================================
// Sink Recorder - for verifying event sink callbacks
// ============================================================================

#[derive(Default)]
struct RecorderInner {
    connected: Mutex<Option<SignalingParameters>>,
    descriptions: Mutex<Vec<SessionDescription>>,
    candidates: Mutex<Vec<IceCandidate>>,
    removals: Mutex<Vec<Vec<IceCandidate>>>,
    errors: Mutex<Vec<String>>,
    closed: AtomicBool,
    callback_count: AtomicU32,
}

/// A [`SignalingEvents`] implementation that records every callback
/// with thread-safe access and condition-based waits
#[derive(Clone, Default)]
pub struct SinkRecorder {
    inner: Arc<RecorderInner>,
}

impl SinkRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of callbacks observed so far
    pub fn callback_count(&self) -> u32 {
        self.inner.callback_count.load(Ordering::SeqCst)
    }

    pub fn connected_params(&self) -> Option<SignalingParameters> {
        self.inner.connected.lock().clone()
    }

    pub fn descriptions(&self) -> Vec<SessionDescription> {
        self.inner.descriptions.lock().clone()
    }

    pub fn candidates(&self) -> Vec<IceCandidate> {
        self.inner.candidates.lock().clone()
    }

    pub fn removals(&self) -> Vec<Vec<IceCandidate>> {
        self.inner.removals.lock().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.inner.errors.lock().clone()
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    pub async fn wait_connected(&self, max_wait: Duration) -> bool {
        wait_for(
            || self.inner.connected.lock().is_some(),
            DEFAULT_CHECK_INTERVAL,
            max_wait,
        )
        .await
    }

    pub async fn wait_description_count(&self, count: usize, max_wait: Duration) -> bool {
        wait_for(
            || self.inner.descriptions.lock().len() >= count,
            DEFAULT_CHECK_INTERVAL,
            max_wait,
        )
        .await
    }

    pub async fn wait_candidate_count(&self, count: usize, max_wait: Duration) -> bool {
        wait_for(
            || self.inner.candidates.lock().len() >= count,
            DEFAULT_CHECK_INTERVAL,
            max_wait,
        )
        .await
    }

    pub async fn wait_removal_count(&self, count: usize, max_wait: Duration) -> bool {
        wait_for(
            || self.inner.removals.lock().len() >= count,
            DEFAULT_CHECK_INTERVAL,
            max_wait,
        )
        .await
    }

    pub async fn wait_error(&self, max_wait: Duration) -> bool {
        wait_for(
            || !self.inner.errors.lock().is_empty(),
            DEFAULT_CHECK_INTERVAL,
            max_wait,
        )
        .await
    }

    pub async fn wait_closed(&self, max_wait: Duration) -> bool {
        wait_for_flag(&self.inner.closed, max_wait).await
    }
}

impl SignalingEvents for SinkRecorder {
    fn on_connected_to_room(&self, params: SignalingParameters, _pending: Option<Value>) {
        *self.inner.connected.lock() = Some(params);
        self.inner.callback_count.fetch_add(1, Ordering::SeqCst);
    }

    fn on_remote_description(&self, sdp: SessionDescription) {
        self.inner.descriptions.lock().push(sdp);
        self.inner.callback_count.fetch_add(1, Ordering::SeqCst);
    }

    fn on_remote_ice_candidate(&self, candidate: IceCandidate) {
        self.inner.candidates.lock().push(candidate);
        self.inner.callback_count.fetch_add(1, Ordering::SeqCst);
    }

    fn on_remote_ice_candidates_removed(&self, candidates: Vec<IceCandidate>) {
        self.inner.removals.lock().push(candidates);
        self.inner.callback_count.fetch_add(1, Ordering::SeqCst);
    }

    fn on_channel_error(&self, message: String) {
        self.inner.errors.lock().push(message);
        self.inner.callback_count.fetch_add(1, Ordering::SeqCst);
    }

    fn on_channel_close(&self) {
        self.inner.closed.store(true, Ordering::SeqCst);
        self.inner.callback_count.fetch_add(1, Ordering::SeqCst);
    }
}
