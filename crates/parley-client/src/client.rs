//! Room client: the public signaling contract
//!
//! Every public operation is an asynchronous hand-off: the caller
//! enqueues onto a single dispatch queue and returns immediately. One
//! tokio task owns the session state and the channel handle; inbound
//! events (forwarded by the adapter's handlers) and local commands
//! interleave on the same queue in arrival order, so no session field
//! is ever touched from two tasks.
//!
//! `disconnect_from_room` is the only cancellation primitive: the
//! dispatch task runs the teardown and then stops, so anything queued
//! after it is dropped with the queue (drain-then-stop).

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use parley_core::codec::event;
use parley_core::{ConnectionState, IceCandidate, SessionDescription};
use parley_transport::SignalChannel;

use crate::error::Result;
use crate::events::SignalingEvents;
use crate::machine::{self, Effect, SignalEvent};
use crate::params::RoomConnectionParameters;
use crate::session::RoomSession;

/// One unit of work on the dispatch queue
enum DispatchTask {
    Connect(RoomConnectionParameters),
    Disconnect,
    SendOffer(SessionDescription),
    SendAnswer(SessionDescription),
    SendCandidate(IceCandidate),
    SendCandidateRemovals(Vec<IceCandidate>),
    Inbound { name: String, data: Value },
    ChannelClosed { reason: Option<String> },
    ChannelError(String),
}

/// Handle to the signaling dispatch task.
///
/// Cheap to construct; spawns its dispatch task on creation and keeps
/// it alive until `disconnect_from_room`.
pub struct RoomClient {
    queue: mpsc::UnboundedSender<DispatchTask>,
}

impl RoomClient {
    /// Create a client reporting to `events`
    pub fn new(events: Arc<dyn SignalingEvents>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let dispatch = Dispatch {
            queue: tx.clone(),
            events,
            session: RoomSession::detached(),
            channel: SignalChannel::new(),
        };
        tokio::spawn(dispatch.run(rx));
        Self { queue: tx }
    }

    /// Connect to the room described by `params`. Progress and failure
    /// are reported through the event sink.
    pub fn connect_to_room(&self, params: RoomConnectionParameters) {
        self.enqueue(DispatchTask::Connect(params));
    }

    /// Leave the room and stop the dispatch task. Operations enqueued
    /// after this are dropped.
    pub fn disconnect_from_room(&self) {
        self.enqueue(DispatchTask::Disconnect);
    }

    /// Send the local offer SDP to the other participant
    pub fn send_offer_sdp(&self, sdp: SessionDescription) {
        self.enqueue(DispatchTask::SendOffer(sdp));
    }

    /// Send the local answer SDP to the other participant
    pub fn send_answer_sdp(&self, sdp: SessionDescription) {
        self.enqueue(DispatchTask::SendAnswer(sdp));
    }

    /// Send one local ICE candidate to the other participant
    pub fn send_local_ice_candidate(&self, candidate: IceCandidate) {
        self.enqueue(DispatchTask::SendCandidate(candidate));
    }

    /// Withdraw local ICE candidates as one batch
    pub fn send_local_ice_candidate_removals(&self, candidates: Vec<IceCandidate>) {
        self.enqueue(DispatchTask::SendCandidateRemovals(candidates));
    }

    fn enqueue(&self, task: DispatchTask) {
        if self.queue.send(task).is_err() {
            debug!("dispatch task stopped, dropping operation");
        }
    }
}

/// The dispatch task: sole owner of session state and channel handle
struct Dispatch {
    queue: mpsc::UnboundedSender<DispatchTask>,
    events: Arc<dyn SignalingEvents>,
    session: RoomSession,
    channel: SignalChannel,
}

impl Dispatch {
    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<DispatchTask>) {
        while let Some(task) = rx.recv().await {
            match task {
                DispatchTask::Connect(params) => {
                    if let Err(e) = self.connect(&params).await {
                        warn!("room connect failed: {}", e);
                        self.report_error(e.to_string());
                    }
                }
                DispatchTask::Disconnect => {
                    self.teardown().await;
                    break;
                }
                DispatchTask::SendOffer(sdp) => {
                    let effects = machine::send_offer(&self.session, sdp);
                    self.apply(effects).await;
                }
                DispatchTask::SendAnswer(sdp) => {
                    let effects = machine::send_answer(&self.session, sdp);
                    self.apply(effects).await;
                }
                DispatchTask::SendCandidate(candidate) => {
                    let effects = machine::send_candidate(&self.session, candidate);
                    self.apply(effects).await;
                }
                DispatchTask::SendCandidateRemovals(candidates) => {
                    let effects = machine::send_candidate_removals(&self.session, candidates);
                    self.apply(effects).await;
                }
                DispatchTask::Inbound { name, data } => {
                    self.inbound(&name, data).await;
                }
                DispatchTask::ChannelClosed { reason } => {
                    debug!(?reason, "channel closed");
                    if self.session.state != ConnectionState::Closed {
                        if self.session.state != ConnectionState::Error {
                            self.session.state = ConnectionState::Closed;
                        }
                        self.events.on_channel_close();
                    }
                }
                DispatchTask::ChannelError(message) => {
                    self.report_error(message);
                }
            }
        }
        debug!("dispatch queue closed");
    }

    /// Dial the relay and join the room. Runs on the dispatch task.
    async fn connect(&mut self, params: &RoomConnectionParameters) -> Result<()> {
        info!(room = %params.room_id, "connecting to room");
        self.session = RoomSession::new(&params.room_id, params.loopback);
        self.register_handlers();
        self.channel
            .connect(&params.connect_url(), &params.room_id)
            .await?;
        Ok(())
    }

    /// Point the adapter's handlers at the dispatch queue. Replace
    /// semantics make re-registration on reconnect harmless.
    fn register_handlers(&self) {
        const FORWARDED: [&str; 8] = [
            event::ROOM_CREATED,
            event::ROOM_JOINED,
            event::FULL_ROOM,
            event::START_CALL,
            event::WEBRTC_OFFER,
            event::WEBRTC_ANSWER,
            event::WEBRTC_ICE_CANDIDATE,
            event::WEBRTC_LEAVE,
        ];
        for name in FORWARDED {
            let queue = self.queue.clone();
            self.channel.register_handler(name, move |data| {
                let _ = queue.send(DispatchTask::Inbound {
                    name: name.to_string(),
                    data,
                });
            });
        }
        let queue = self.queue.clone();
        self.channel.register_close_handler(move |reason| {
            let _ = queue.send(DispatchTask::ChannelClosed { reason });
        });
        let queue = self.queue.clone();
        self.channel.register_error_handler(move |message| {
            let _ = queue.send(DispatchTask::ChannelError(message));
        });
    }

    async fn inbound(&mut self, name: &str, data: Value) {
        let Some(event) = SignalEvent::from_wire(name, data) else {
            debug!(event = %name, "unhandled event");
            return;
        };
        let effects = machine::dispatch(&mut self.session, event);
        self.apply(effects).await;
    }

    async fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Emit { name, data } => {
                    if let Err(e) = self.channel.emit(name, data).await {
                        self.report_error(format!("emit {} failed: {}", name, e));
                    }
                }
                Effect::ConnectedToRoom { params, pending } => {
                    self.events.on_connected_to_room(params, pending);
                }
                Effect::RemoteDescription(sdp) => self.events.on_remote_description(sdp),
                Effect::RemoteCandidate(candidate) => {
                    self.events.on_remote_ice_candidate(candidate);
                }
                Effect::RemoteCandidatesRemoved(candidates) => {
                    self.events.on_remote_ice_candidates_removed(candidates);
                }
                Effect::ReportError(error) => self.report_error(error.to_string()),
                Effect::Notice(message) => info!("room notice: {}", message),
                Effect::Teardown => {
                    // Peer left: close this attempt, keep the task
                    // alive for a fresh connect.
                    if self.teardown().await {
                        self.events.on_channel_close();
                    }
                }
            }
        }
    }

    /// Close the current attempt. Returns whether anything was open.
    async fn teardown(&mut self) -> bool {
        if self.session.state == ConnectionState::Closed {
            debug!("already closed");
            return false;
        }
        info!(room = %self.session.room_id, state = ?self.session.state, "disconnecting from room");
        self.session.state = ConnectionState::Closed;
        self.channel.disconnect().await;
        true
    }

    /// Report a channel error exactly once per transition into the
    /// error state; repeats while already failed are suppressed.
    fn report_error(&mut self, message: String) {
        warn!("{}", message);
        if self.session.state == ConnectionState::Error {
            debug!("already in error state, suppressing report");
            return;
        }
        self.session.state = ConnectionState::Error;
        self.events.on_channel_error(message);
    }
}

// Tear the session down when the handle goes away so the dispatch
// task does not outlive its owner.
impl Drop for RoomClient {
    fn drop(&mut self) {
        let _ = self.queue.send(DispatchTask::Disconnect);
    }
}
