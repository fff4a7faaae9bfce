//! Event sink for negotiation callbacks

use serde_json::Value;

use parley_core::{IceCandidate, SessionDescription};

use crate::params::SignalingParameters;

/// Callbacks fired by the negotiation state machine.
///
/// Implemented by the surrounding application; typically the media
/// engine reacts by creating an offer or answer and feeding candidates
/// back through the client's send operations. All callbacks are
/// invoked from the client's dispatch task and must not block.
pub trait SignalingEvents: Send + Sync {
    /// Room membership resolved and the negotiation can begin. For the
    /// initiator `params.offer_sdp` is `None` and the engine creates
    /// the offer; for the joiner it carries the remote offer and the
    /// engine creates the answer. `pending` is the pre-addressed room
    /// envelope the engine may complete for its first send.
    fn on_connected_to_room(&self, params: SignalingParameters, pending: Option<Value>);

    /// Remote session description received (the answer, on the
    /// initiator side).
    fn on_remote_description(&self, sdp: SessionDescription);

    /// Remote ICE candidate received
    fn on_remote_ice_candidate(&self, candidate: IceCandidate);

    /// Remote candidates withdrawn by the peer
    fn on_remote_ice_candidates_removed(&self, candidates: Vec<IceCandidate>);

    /// Unrecoverable channel error for this attempt. Fired at most
    /// once per attempt.
    fn on_channel_error(&self, message: String);

    /// The channel closed from the remote side (peer left or transport
    /// dropped). Not fired for a locally requested disconnect.
    fn on_channel_close(&self);
}
