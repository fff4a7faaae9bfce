//! Negotiation state machine
//!
//! Pure transition logic: given the current session state and one
//! inbound event or local send request, mutate the session and produce
//! the list of effects for the dispatch task to run. No I/O happens
//! here, which keeps the whole protocol table testable without a
//! relay.
//!
//! Malformed or out-of-order input never escapes as an error: the
//! offending event is dropped, the session stays where it was, and the
//! dispatch loop lives on.

use serde_json::{json, Value};
use tracing::{debug, warn};

use parley_core::codec::{self, event};
use parley_core::{ConnectionState, IceCandidate, Role, SdpType, SessionDescription};

use crate::error::ClientError;
use crate::params::SignalingParameters;
use crate::session::RoomSession;

/// Inbound room events, mapped from wire event names
#[derive(Debug, Clone)]
pub enum SignalEvent {
    RoomCreated,
    RoomJoined(String),
    FullRoom(String),
    StartCall(String),
    Offer(Value),
    Answer(Value),
    Ice(Value),
    Leave,
}

impl SignalEvent {
    /// Map a wire event name and payload onto a protocol event.
    /// Returns `None` for events this protocol does not speak.
    pub fn from_wire(name: &str, data: Value) -> Option<Self> {
        match name {
            event::ROOM_CREATED => Some(SignalEvent::RoomCreated),
            event::ROOM_JOINED => Some(SignalEvent::RoomJoined(string_payload(&data))),
            event::FULL_ROOM => Some(SignalEvent::FullRoom(string_payload(&data))),
            event::START_CALL => Some(SignalEvent::StartCall(string_payload(&data))),
            event::WEBRTC_OFFER => Some(SignalEvent::Offer(data)),
            event::WEBRTC_ANSWER => Some(SignalEvent::Answer(data)),
            event::WEBRTC_ICE_CANDIDATE => Some(SignalEvent::Ice(data)),
            event::WEBRTC_LEAVE => Some(SignalEvent::Leave),
            _ => None,
        }
    }
}

fn string_payload(data: &Value) -> String {
    data.as_str().unwrap_or_default().to_string()
}

/// Actions produced by a transition, run by the dispatch task
#[derive(Debug)]
pub enum Effect {
    /// Emit a named event on the signaling channel
    Emit { name: &'static str, data: Value },
    /// Hand room parameters to the event sink
    ConnectedToRoom {
        params: SignalingParameters,
        pending: Option<Value>,
    },
    /// Deliver a remote session description
    RemoteDescription(SessionDescription),
    /// Deliver a remote candidate
    RemoteCandidate(IceCandidate),
    /// Deliver a remote removal batch
    RemoteCandidatesRemoved(Vec<IceCandidate>),
    /// Report a channel error through the sink (once per attempt)
    ReportError(ClientError),
    /// Application-level notice, no state change
    Notice(String),
    /// Run the local disconnect sequence (peer left)
    Teardown,
}

// ============================================================================
// Inbound transitions
// ============================================================================

/// Process one inbound room event
pub fn dispatch(session: &mut RoomSession, event: SignalEvent) -> Vec<Effect> {
    match event {
        SignalEvent::RoomCreated => on_room_created(session),
        SignalEvent::RoomJoined(peer) => on_room_joined(session, peer),
        SignalEvent::FullRoom(message) => vec![Effect::Notice(message)],
        SignalEvent::StartCall(_) => on_start_call(session),
        SignalEvent::Offer(data) => on_offer(session, &data),
        SignalEvent::Answer(data) => on_answer(session, &data),
        SignalEvent::Ice(data) => on_ice(session, &data),
        SignalEvent::Leave => vec![Effect::Teardown],
    }
}

fn on_room_created(session: &mut RoomSession) -> Vec<Effect> {
    if session.state != ConnectionState::New {
        debug!("room_created outside New state, dropping");
        return vec![];
    }
    if !session.assign_role(Role::Initiator) {
        debug!("role already resolved, ignoring room_created");
    }
    vec![]
}

fn on_room_joined(session: &mut RoomSession, peer: String) -> Vec<Effect> {
    if session.state != ConnectionState::New {
        debug!("room_joined outside New state, dropping");
        return vec![];
    }
    if !session.assign_role(Role::Joiner) {
        debug!("role already resolved, ignoring room_joined");
        return vec![];
    }
    // Tell the creator both parties are present.
    vec![Effect::Emit {
        name: event::START_CALL,
        data: Value::String(peer),
    }]
}

fn on_start_call(session: &mut RoomSession) -> Vec<Effect> {
    if !session.is_initiator() {
        debug!("start_call ignored for non-initiator");
        return vec![];
    }
    if session.state != ConnectionState::New {
        debug!("start_call outside New state, dropping");
        return vec![];
    }
    session.state = ConnectionState::Connected;
    let params = SignalingParameters::for_initiator(session.drain_pending());
    let pending = Some(json!({ "roomId": session.room_id, "type": "offer" }));
    vec![Effect::ConnectedToRoom { params, pending }]
}

fn on_offer(session: &mut RoomSession, data: &Value) -> Vec<Effect> {
    // The offer event historically carried inline candidates too.
    if data.get("type").and_then(Value::as_str) == Some(codec::PAYLOAD_CANDIDATE) {
        match codec::decode_candidate(data) {
            Ok(candidate) => session.push_pending(candidate),
            Err(e) => warn!("malformed candidate on offer event: {}", e),
        }
        return vec![];
    }

    let desc = match codec::decode_description(data) {
        Ok(desc) => desc,
        Err(e) => {
            warn!("malformed offer payload: {}", e);
            return vec![];
        }
    };
    if desc.kind != SdpType::Offer {
        warn!("unexpected {} on offer event, dropping", desc.kind.canonical());
        return vec![];
    }
    if session.role != Some(Role::Joiner) {
        debug!("offer ignored outside joiner role");
        return vec![];
    }
    if session.state != ConnectionState::New {
        debug!("offer outside New state, dropping");
        return vec![];
    }

    session.state = ConnectionState::Connected;
    let params = SignalingParameters::for_joiner(desc, session.drain_pending());
    let pending = Some(json!({ "roomId": session.room_id, "type": "answer" }));
    vec![Effect::ConnectedToRoom { params, pending }]
}

fn on_answer(session: &mut RoomSession, data: &Value) -> Vec<Effect> {
    let desc = match codec::decode_description(data) {
        Ok(desc) => desc,
        Err(e) => {
            warn!("malformed answer payload: {}", e);
            return vec![];
        }
    };
    if desc.kind != SdpType::Answer {
        warn!("unexpected {} on answer event, dropping", desc.kind.canonical());
        return vec![];
    }
    if !session.is_initiator() {
        debug!("answer ignored outside initiator role");
        return vec![];
    }
    if session.state != ConnectionState::Connected {
        debug!("answer outside Connected state, dropping");
        return vec![];
    }
    vec![Effect::RemoteDescription(desc)]
}

fn on_ice(session: &mut RoomSession, data: &Value) -> Vec<Effect> {
    if data.get("candidate").is_some() {
        if session.state != ConnectionState::Connected {
            debug!("candidate before connect, dropping");
            return vec![];
        }
        match codec::decode_candidate(data) {
            Ok(candidate) => {
                // Fingerprints are recorded for bookkeeping; delivery
                // stays unconditional, duplicates included.
                session.observe_remote(&candidate);
                vec![Effect::RemoteCandidate(candidate)]
            }
            Err(e) => {
                warn!("malformed candidate payload: {}", e);
                vec![]
            }
        }
    } else if data.get("type").and_then(Value::as_str) == Some(codec::PAYLOAD_REMOVE_CANDIDATES) {
        match codec::decode_removal_payload(data) {
            Ok(candidates) => vec![Effect::RemoteCandidatesRemoved(candidates)],
            Err(e) => {
                warn!("malformed removal payload: {}", e);
                vec![]
            }
        }
    } else {
        warn!("unrecognized ice payload, dropping");
        vec![]
    }
}

// ============================================================================
// Outbound operations
// ============================================================================

/// Send the local offer to the peer. In loopback mode the offer is
/// additionally renamed to an answer and routed straight back.
pub fn send_offer(session: &RoomSession, sdp: SessionDescription) -> Vec<Effect> {
    if session.state != ConnectionState::Connected {
        return vec![Effect::ReportError(ClientError::StateViolation(
            "Sending offer SDP in non connected state.",
        ))];
    }
    let mut effects = vec![Effect::Emit {
        name: event::WEBRTC_OFFER,
        data: codec::encode_description_payload(&sdp, &session.room_id),
    }];
    if session.loopback {
        effects.push(Effect::RemoteDescription(SessionDescription::answer(sdp.sdp)));
    }
    effects
}

/// Send the local answer to the peer. Not valid in loopback mode,
/// where the offer path already produced the local answer.
pub fn send_answer(session: &RoomSession, sdp: SessionDescription) -> Vec<Effect> {
    if session.loopback {
        warn!("sending answer SDP in loopback mode, dropping");
        return vec![];
    }
    if session.state != ConnectionState::Connected {
        return vec![Effect::ReportError(ClientError::StateViolation(
            "Sending answer SDP in non connected state.",
        ))];
    }
    vec![Effect::Emit {
        name: event::WEBRTC_ANSWER,
        data: codec::encode_description_payload(&sdp, &session.room_id),
    }]
}

/// Send one local candidate. The initiator path is guarded by the
/// connected state and loops back locally in loopback mode; the joiner
/// path sends unconditionally. The asymmetry is deliberate: it is the
/// behavior peers observe from the existing client.
pub fn send_candidate(session: &RoomSession, candidate: IceCandidate) -> Vec<Effect> {
    let data = codec::encode_candidate_payload(&candidate, &session.room_id);
    if session.is_initiator() {
        if session.state != ConnectionState::Connected {
            return vec![Effect::ReportError(ClientError::StateViolation(
                "Sending ICE candidate in non connected state.",
            ))];
        }
        let mut effects = vec![Effect::Emit {
            name: event::WEBRTC_ICE_CANDIDATE,
            data,
        }];
        if session.loopback {
            effects.push(Effect::RemoteCandidate(candidate));
        }
        effects
    } else {
        vec![Effect::Emit {
            name: event::WEBRTC_ICE_CANDIDATE,
            data,
        }]
    }
}

/// Withdraw local candidates as one batch. Same role asymmetry as
/// [`send_candidate`].
pub fn send_candidate_removals(
    session: &RoomSession,
    candidates: Vec<IceCandidate>,
) -> Vec<Effect> {
    let data = codec::encode_removal_payload(&candidates);
    if session.is_initiator() {
        if session.state != ConnectionState::Connected {
            return vec![Effect::ReportError(ClientError::StateViolation(
                "Sending ICE candidate removals in non connected state.",
            ))];
        }
        let mut effects = vec![Effect::Emit {
            name: event::WEBRTC_ICE_CANDIDATE,
            data,
        }];
        if session.loopback {
            effects.push(Effect::RemoteCandidatesRemoved(candidates));
        }
        effects
    } else {
        vec![Effect::Emit {
            name: event::WEBRTC_ICE_CANDIDATE,
            data,
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> RoomSession {
        RoomSession::new("room-7", false)
    }

    fn connected_initiator() -> RoomSession {
        let mut s = session();
        s.assign_role(Role::Initiator);
        s.state = ConnectionState::Connected;
        s
    }

    fn connected_joiner() -> RoomSession {
        let mut s = session();
        s.assign_role(Role::Joiner);
        s.state = ConnectionState::Connected;
        s
    }

    fn host_candidate() -> IceCandidate {
        IceCandidate::new(
            "audio",
            0,
            "candidate:1 1 UDP 2122260223 10.0.0.1 5000 typ host",
        )
    }

    fn offer_payload(sdp: &str) -> Value {
        json!({ "sdp": sdp, "type": "offer" })
    }

    fn answer_payload(sdp: &str) -> Value {
        json!({ "sdp": sdp, "type": "answer" })
    }

    // ------------------------------------------------------------------
    // Role resolution
    // ------------------------------------------------------------------

    #[test]
    fn test_room_created_makes_initiator() {
        let mut s = session();
        let effects = dispatch(&mut s, SignalEvent::RoomCreated);
        assert!(effects.is_empty());
        assert_eq!(s.role, Some(Role::Initiator));
        assert_eq!(s.state, ConnectionState::New);
    }

    #[test]
    fn test_room_joined_makes_joiner_and_starts_call() {
        let mut s = session();
        let effects = dispatch(&mut s, SignalEvent::RoomJoined("peer-1".to_string()));
        assert_eq!(s.role, Some(Role::Joiner));
        assert_eq!(s.state, ConnectionState::New);
        assert!(matches!(
            &effects[..],
            [Effect::Emit { name, data }]
                if *name == event::START_CALL && data == &json!("peer-1")
        ));
    }

    #[test]
    fn test_role_resolution_is_exclusive() {
        // Initiator first: the later room_joined must not flip the
        // role or echo start_call.
        let mut s = session();
        dispatch(&mut s, SignalEvent::RoomCreated);
        let effects = dispatch(&mut s, SignalEvent::RoomJoined("peer-1".to_string()));
        assert!(effects.is_empty());
        assert_eq!(s.role, Some(Role::Initiator));

        // Joiner first: the later room_created must not flip it back.
        let mut s = session();
        dispatch(&mut s, SignalEvent::RoomJoined("peer-1".to_string()));
        dispatch(&mut s, SignalEvent::RoomCreated);
        assert_eq!(s.role, Some(Role::Joiner));
    }

    #[test]
    fn test_full_room_is_a_notice_only() {
        let mut s = session();
        let effects = dispatch(&mut s, SignalEvent::FullRoom("room is full".to_string()));
        assert!(matches!(&effects[..], [Effect::Notice(m)] if m == "room is full"));
        assert_eq!(s.state, ConnectionState::New);
        assert_eq!(s.role, None);
    }

    // ------------------------------------------------------------------
    // Connecting
    // ------------------------------------------------------------------

    #[test]
    fn test_start_call_connects_initiator() {
        let mut s = session();
        dispatch(&mut s, SignalEvent::RoomCreated);
        let effects = dispatch(&mut s, SignalEvent::StartCall("peer-1".to_string()));
        assert_eq!(s.state, ConnectionState::Connected);
        match &effects[..] {
            [Effect::ConnectedToRoom { params, pending }] => {
                assert!(params.is_initiator);
                assert!(params.offer_sdp.is_none());
                assert!(!params.ice_servers.is_empty());
                assert_eq!(pending.as_ref().unwrap()["roomId"], "room-7");
            }
            other => panic!("unexpected effects: {:?}", other),
        }
    }

    #[test]
    fn test_start_call_fires_once() {
        let mut s = session();
        dispatch(&mut s, SignalEvent::RoomCreated);
        dispatch(&mut s, SignalEvent::StartCall("peer-1".to_string()));
        let effects = dispatch(&mut s, SignalEvent::StartCall("peer-1".to_string()));
        assert!(effects.is_empty());
    }

    #[test]
    fn test_start_call_ignored_for_joiner() {
        let mut s = session();
        dispatch(&mut s, SignalEvent::RoomJoined("peer-1".to_string()));
        let effects = dispatch(&mut s, SignalEvent::StartCall("peer-1".to_string()));
        assert!(effects.is_empty());
        assert_eq!(s.state, ConnectionState::New);
    }

    #[test]
    fn test_offer_connects_joiner() {
        let mut s = session();
        dispatch(&mut s, SignalEvent::RoomJoined("peer-1".to_string()));
        let effects = dispatch(&mut s, SignalEvent::Offer(offer_payload("v=0 offer")));
        assert_eq!(s.state, ConnectionState::Connected);
        match &effects[..] {
            [Effect::ConnectedToRoom { params, .. }] => {
                assert!(!params.is_initiator);
                assert_eq!(
                    params.offer_sdp,
                    Some(SessionDescription::offer("v=0 offer"))
                );
            }
            other => panic!("unexpected effects: {:?}", other),
        }
    }

    #[test]
    fn test_offer_nested_envelope_shape() {
        let mut s = session();
        dispatch(&mut s, SignalEvent::RoomJoined("peer-1".to_string()));
        let payload = codec::encode_description_payload(
            &SessionDescription::offer("v=0 nested"),
            "room-7",
        );
        let effects = dispatch(&mut s, SignalEvent::Offer(payload));
        assert_eq!(effects.len(), 1);
        assert_eq!(s.state, ConnectionState::Connected);
    }

    #[test]
    fn test_offer_ignored_for_initiator() {
        let mut s = session();
        dispatch(&mut s, SignalEvent::RoomCreated);
        let effects = dispatch(&mut s, SignalEvent::Offer(offer_payload("v=0")));
        assert!(effects.is_empty());
        assert_eq!(s.state, ConnectionState::New);
    }

    #[test]
    fn test_offer_ignored_before_role_resolution() {
        let mut s = session();
        let effects = dispatch(&mut s, SignalEvent::Offer(offer_payload("v=0")));
        assert!(effects.is_empty());
        assert_eq!(s.state, ConnectionState::New);
    }

    #[test]
    fn test_legacy_candidate_on_offer_path_queues_for_params() {
        let mut s = session();
        dispatch(&mut s, SignalEvent::RoomJoined("peer-1".to_string()));

        let inline = json!({
            "type": "candidate",
            "label": 0,
            "id": "audio",
            "candidate": "candidate:9 1 UDP 1 10.0.0.9 9000 typ host",
        });
        assert!(dispatch(&mut s, SignalEvent::Offer(inline)).is_empty());

        let effects = dispatch(&mut s, SignalEvent::Offer(offer_payload("v=0")));
        match &effects[..] {
            [Effect::ConnectedToRoom { params, .. }] => {
                assert_eq!(params.initial_candidates.len(), 1);
                assert_eq!(params.initial_candidates[0].sdp_mid, "audio");
            }
            other => panic!("unexpected effects: {:?}", other),
        }
    }

    // ------------------------------------------------------------------
    // Answer
    // ------------------------------------------------------------------

    #[test]
    fn test_answer_delivered_to_connected_initiator() {
        let mut s = connected_initiator();
        let effects = dispatch(&mut s, SignalEvent::Answer(answer_payload("v=0 answer")));
        assert!(matches!(
            &effects[..],
            [Effect::RemoteDescription(d)] if d.sdp == "v=0 answer" && d.kind == SdpType::Answer
        ));
    }

    #[test]
    fn test_answer_ignored_for_joiner() {
        let mut s = connected_joiner();
        let effects = dispatch(&mut s, SignalEvent::Answer(answer_payload("v=0")));
        assert!(effects.is_empty());
    }

    #[test]
    fn test_answer_ignored_when_not_connected() {
        let mut s = session();
        s.assign_role(Role::Initiator);
        let effects = dispatch(&mut s, SignalEvent::Answer(answer_payload("v=0")));
        assert!(effects.is_empty());
    }

    #[test]
    fn test_answer_with_offer_tag_dropped() {
        let mut s = connected_initiator();
        let effects = dispatch(&mut s, SignalEvent::Answer(offer_payload("v=0")));
        assert!(effects.is_empty());
    }

    // ------------------------------------------------------------------
    // Candidates
    // ------------------------------------------------------------------

    #[test]
    fn test_candidate_delivered_and_fingerprint_recorded() {
        let mut s = connected_joiner();
        let payload = codec::encode_candidate_payload(&host_candidate(), "room-7");
        let effects = dispatch(&mut s, SignalEvent::Ice(payload));
        match &effects[..] {
            [Effect::RemoteCandidate(c)] => assert_eq!(c.sdp, host_candidate().sdp),
            other => panic!("unexpected effects: {:?}", other),
        }
        assert_eq!(s.seen_remote_count(), 1);
    }

    #[test]
    fn test_duplicate_candidate_observed_not_deduplicated() {
        let mut s = connected_joiner();
        let payload = codec::encode_candidate_payload(&host_candidate(), "room-7");
        let first = dispatch(&mut s, SignalEvent::Ice(payload.clone()));
        let second = dispatch(&mut s, SignalEvent::Ice(payload));
        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
        assert_eq!(s.seen_remote_count(), 1);
    }

    #[test]
    fn test_candidate_dropped_before_connected() {
        let mut s = session();
        let payload = codec::encode_candidate_payload(&host_candidate(), "room-7");
        assert!(dispatch(&mut s, SignalEvent::Ice(payload)).is_empty());
        assert_eq!(s.seen_remote_count(), 0);
    }

    #[test]
    fn test_removal_batch_delivered() {
        let mut s = connected_initiator();
        let batch = vec![host_candidate()];
        let payload = codec::encode_removal_payload(&batch);
        let effects = dispatch(&mut s, SignalEvent::Ice(payload));
        assert!(matches!(
            &effects[..],
            [Effect::RemoteCandidatesRemoved(cs)] if cs.len() == 1
        ));
    }

    #[test]
    fn test_malformed_ice_payload_dropped() {
        let mut s = connected_joiner();
        assert!(dispatch(&mut s, SignalEvent::Ice(json!({ "candidate": 42 }))).is_empty());
        assert!(dispatch(&mut s, SignalEvent::Ice(json!({ "nothing": true }))).is_empty());
        assert_eq!(s.state, ConnectionState::Connected);
    }

    #[test]
    fn test_malformed_offer_and_answer_dropped() {
        let mut s = session();
        dispatch(&mut s, SignalEvent::RoomJoined("peer-1".to_string()));
        assert!(dispatch(&mut s, SignalEvent::Offer(json!({ "sdp": 7 }))).is_empty());
        assert_eq!(s.state, ConnectionState::New);

        let mut s = connected_initiator();
        assert!(dispatch(&mut s, SignalEvent::Answer(json!("garbage"))).is_empty());
        assert_eq!(s.state, ConnectionState::Connected);
    }

    #[test]
    fn test_leave_requests_teardown() {
        let mut s = connected_joiner();
        let effects = dispatch(&mut s, SignalEvent::Leave);
        assert!(matches!(&effects[..], [Effect::Teardown]));
    }

    #[test]
    fn test_unknown_event_maps_to_none() {
        assert!(SignalEvent::from_wire("made_up_event", Value::Null).is_none());
    }

    // ------------------------------------------------------------------
    // Outbound: offers and answers
    // ------------------------------------------------------------------

    #[test]
    fn test_send_offer_requires_connected_state() {
        let s = session();
        let effects = send_offer(&s, SessionDescription::offer("v=0"));
        assert!(matches!(
            &effects[..],
            [Effect::ReportError(ClientError::StateViolation(m))]
                if m.contains("offer")
        ));
    }

    #[test]
    fn test_send_offer_wraps_room_envelope() {
        let s = connected_initiator();
        let effects = send_offer(&s, SessionDescription::offer("v=0 offer"));
        match &effects[..] {
            [Effect::Emit { name, data }] => {
                assert_eq!(*name, event::WEBRTC_OFFER);
                assert_eq!(data["roomId"], "room-7");
                assert_eq!(data["sdp"]["type"], "offer");
                assert_eq!(data["sdp"]["sdp"], "v=0 offer");
            }
            other => panic!("unexpected effects: {:?}", other),
        }
    }

    #[test]
    fn test_send_offer_loopback_echoes_answer() {
        let mut s = connected_initiator();
        s.loopback = true;
        let effects = send_offer(&s, SessionDescription::offer("v=0 body"));
        assert_eq!(effects.len(), 2);
        assert!(matches!(
            &effects[1],
            Effect::RemoteDescription(d)
                if d.kind == SdpType::Answer && d.sdp == "v=0 body"
        ));
    }

    #[test]
    fn test_send_answer_rejected_in_loopback() {
        let mut s = connected_joiner();
        s.loopback = true;
        assert!(send_answer(&s, SessionDescription::answer("v=0")).is_empty());
    }

    #[test]
    fn test_send_answer_wraps_room_envelope() {
        let s = connected_joiner();
        let effects = send_answer(&s, SessionDescription::answer("v=0 answer"));
        match &effects[..] {
            [Effect::Emit { name, data }] => {
                assert_eq!(*name, event::WEBRTC_ANSWER);
                assert_eq!(data["sdp"]["type"], "answer");
            }
            other => panic!("unexpected effects: {:?}", other),
        }
    }

    // ------------------------------------------------------------------
    // Outbound: candidates
    // ------------------------------------------------------------------

    #[test]
    fn test_send_candidate_initiator_guarded() {
        let mut s = session();
        s.assign_role(Role::Initiator);
        let effects = send_candidate(&s, host_candidate());
        assert!(matches!(
            &effects[..],
            [Effect::ReportError(ClientError::StateViolation(_))]
        ));
    }

    #[test]
    fn test_send_candidate_joiner_unguarded() {
        // The joiner path deliberately skips the state check.
        let mut s = session();
        s.assign_role(Role::Joiner);
        let effects = send_candidate(&s, host_candidate());
        assert!(matches!(&effects[..], [Effect::Emit { name, .. }]
            if *name == event::WEBRTC_ICE_CANDIDATE));
    }

    #[test]
    fn test_send_candidate_loopback_echoes() {
        let mut s = connected_initiator();
        s.loopback = true;
        let effects = send_candidate(&s, host_candidate());
        assert_eq!(effects.len(), 2);
        assert!(matches!(&effects[1], Effect::RemoteCandidate(_)));
    }

    #[test]
    fn test_send_candidate_payload_shape() {
        let s = connected_initiator();
        let effects = send_candidate(&s, host_candidate());
        match &effects[..] {
            [Effect::Emit { data, .. }] => {
                assert_eq!(data["type"], "candidate");
                assert_eq!(data["label"], 0);
                assert_eq!(data["id"], "audio");
                assert_eq!(data["roomId"], "room-7");
            }
            other => panic!("unexpected effects: {:?}", other),
        }
    }

    #[test]
    fn test_send_removals_initiator_guarded_joiner_not() {
        let mut s = session();
        s.assign_role(Role::Initiator);
        assert!(matches!(
            &send_candidate_removals(&s, vec![host_candidate()])[..],
            [Effect::ReportError(ClientError::StateViolation(_))]
        ));

        let mut s = session();
        s.assign_role(Role::Joiner);
        assert!(matches!(
            &send_candidate_removals(&s, vec![host_candidate()])[..],
            [Effect::Emit { .. }]
        ));
    }

    #[test]
    fn test_send_removals_loopback_echoes() {
        let mut s = connected_initiator();
        s.loopback = true;
        let effects = send_candidate_removals(&s, vec![host_candidate()]);
        assert_eq!(effects.len(), 2);
        assert!(matches!(
            &effects[1],
            Effect::RemoteCandidatesRemoved(cs) if cs.len() == 1
        ));
    }
}
