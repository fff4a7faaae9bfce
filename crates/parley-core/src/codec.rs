//! Wire codec for the signaling channel
//!
//! Everything on the wire is JSON text. Named events travel as
//! `{"event": <name>, "data": <payload>}` frames; candidate payloads
//! use the relay server's field names (`label`, `id`, `candidate`).
//!
//! The codec is pure and stateless. Decode failures are reported as
//! [`Error`] values and never panic, so a malformed peer message stays
//! contained at the handler boundary.

use serde_json::{json, Value};

use crate::error::{Error, Result};
use crate::types::{IceCandidate, SdpType, SessionDescription};

/// Wire event names
pub mod event {
    pub const JOIN: &str = "join";
    pub const ROOM_CREATED: &str = "room_created";
    pub const ROOM_JOINED: &str = "room_joined";
    pub const FULL_ROOM: &str = "full_room";
    pub const START_CALL: &str = "start_call";
    pub const WEBRTC_OFFER: &str = "webrtc_offer";
    pub const WEBRTC_ANSWER: &str = "webrtc_answer";
    pub const WEBRTC_ICE_CANDIDATE: &str = "webrtc_ice_candidate";
    pub const WEBRTC_LEAVE: &str = "webrtc_leave";
}

/// Type tag of a single-candidate payload
pub const PAYLOAD_CANDIDATE: &str = "candidate";

/// Type tag of a candidate removal batch
pub const PAYLOAD_REMOVE_CANDIDATES: &str = "remove-candidates";

/// Placeholder mid assigned when a message shape does not carry one
pub const FALLBACK_MID: &str = "0";

// ============================================================================
// Event envelope
// ============================================================================

/// Encode a named event and its payload into one wire frame
pub fn encode_event(name: &str, data: &Value) -> String {
    json!({ "event": name, "data": data }).to_string()
}

/// Decode one wire frame into its event name and payload.
/// A missing `data` field decodes as `Null`.
pub fn decode_event(frame: &str) -> Result<(String, Value)> {
    let value: Value = serde_json::from_str(frame)?;
    let name = value
        .get("event")
        .ok_or(Error::MissingField("event"))?
        .as_str()
        .ok_or(Error::FieldType {
            field: "event",
            expected: "string",
        })?
        .to_string();
    let data = value.get("data").cloned().unwrap_or(Value::Null);
    Ok((name, data))
}

// ============================================================================
// Candidates
// ============================================================================

/// Encode a candidate into its wire object:
/// `{label: mline index, id: mid, candidate: attribute}`
pub fn encode_candidate(candidate: &IceCandidate) -> Value {
    json!({
        "label": candidate.sdp_mline_index,
        "id": candidate.sdp_mid,
        "candidate": candidate.sdp,
    })
}

/// Decode a candidate from its wire object.
///
/// `label` and `candidate` are required; `id` falls back to
/// [`FALLBACK_MID`] when absent, since not every message shape carries
/// the mid. The mline index and attribute always round-trip; the mid
/// only does when the sender included it.
pub fn decode_candidate(value: &Value) -> Result<IceCandidate> {
    let label = value
        .get("label")
        .ok_or(Error::MissingField("label"))?
        .as_u64()
        .ok_or(Error::FieldType {
            field: "label",
            expected: "integer",
        })? as u32;
    let sdp = value
        .get("candidate")
        .ok_or(Error::MissingField("candidate"))?
        .as_str()
        .ok_or(Error::FieldType {
            field: "candidate",
            expected: "string",
        })?;
    let mid = value.get("id").and_then(Value::as_str).unwrap_or(FALLBACK_MID);
    Ok(IceCandidate::new(mid, label, sdp))
}

/// Outbound single-candidate payload for `webrtc_ice_candidate`
pub fn encode_candidate_payload(candidate: &IceCandidate, room_id: &str) -> Value {
    json!({
        "type": PAYLOAD_CANDIDATE,
        "label": candidate.sdp_mline_index,
        "id": candidate.sdp_mid,
        "candidate": candidate.sdp,
        "roomId": room_id,
    })
}

/// Outbound removal batch: `{type: "remove-candidates", candidates: [...]}`
pub fn encode_removal_payload(candidates: &[IceCandidate]) -> Value {
    json!({
        "type": PAYLOAD_REMOVE_CANDIDATES,
        "candidates": candidates.iter().map(encode_candidate).collect::<Vec<_>>(),
    })
}

/// Decode an inbound removal batch
pub fn decode_removal_payload(value: &Value) -> Result<Vec<IceCandidate>> {
    let entries = value
        .get("candidates")
        .ok_or(Error::MissingField("candidates"))?
        .as_array()
        .ok_or(Error::FieldType {
            field: "candidates",
            expected: "array",
        })?;
    entries.iter().map(decode_candidate).collect()
}

// ============================================================================
// Session descriptions
// ============================================================================

/// Encode a description into the flat wire object `{sdp, type}`
pub fn encode_description(desc: &SessionDescription) -> Value {
    json!({
        "sdp": desc.sdp,
        "type": desc.kind.canonical(),
    })
}

/// Outbound payload: the description nested under the room envelope
/// `{sdp: {sdp, type}, roomId}`
pub fn encode_description_payload(desc: &SessionDescription, room_id: &str) -> Value {
    json!({
        "sdp": encode_description(desc),
        "roomId": room_id,
    })
}

/// Decode a description from either wire shape: flat `{sdp, type}` or
/// the room envelope `{roomId, sdp: {sdp, type}}`.
pub fn decode_description(value: &Value) -> Result<SessionDescription> {
    let flat = if value.get("type").is_some() {
        value
    } else {
        value.get("sdp").ok_or(Error::MissingField("sdp"))?
    };
    let kind_str = flat
        .get("type")
        .ok_or(Error::MissingField("type"))?
        .as_str()
        .ok_or(Error::FieldType {
            field: "type",
            expected: "string",
        })?;
    let kind = SdpType::from_canonical(kind_str)
        .ok_or_else(|| Error::UnknownSdpType(kind_str.to_string()))?;
    let sdp = flat
        .get("sdp")
        .ok_or(Error::MissingField("sdp"))?
        .as_str()
        .ok_or(Error::FieldType {
            field: "sdp",
            expected: "string",
        })?;
    Ok(SessionDescription::new(kind, sdp))
}
