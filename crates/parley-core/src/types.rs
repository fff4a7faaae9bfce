//! Signaling value types
//!
//! The immutable vocabulary exchanged during one negotiation attempt:
//! session descriptions, ICE candidates, and the static ICE server
//! configuration handed to the media engine.

use serde::{Deserialize, Serialize};

/// Kind of a session description
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SdpType {
    Offer,
    Answer,
}

impl SdpType {
    /// Parse the canonical wire form ("offer" / "answer")
    pub fn from_canonical(s: &str) -> Option<Self> {
        match s {
            "offer" => Some(SdpType::Offer),
            "answer" => Some(SdpType::Answer),
            _ => None,
        }
    }

    /// Canonical wire form
    pub fn canonical(&self) -> &'static str {
        match self {
            SdpType::Offer => "offer",
            SdpType::Answer => "answer",
        }
    }
}

/// A session description (offer or answer), as produced and consumed
/// by the media engine. Immutable value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDescription {
    #[serde(rename = "type")]
    pub kind: SdpType,
    pub sdp: String,
}

impl SessionDescription {
    pub fn new(kind: SdpType, sdp: impl Into<String>) -> Self {
        Self {
            kind,
            sdp: sdp.into(),
        }
    }

    pub fn offer(sdp: impl Into<String>) -> Self {
        Self::new(SdpType::Offer, sdp)
    }

    pub fn answer(sdp: impl Into<String>) -> Self {
        Self::new(SdpType::Answer, sdp)
    }
}

/// One potential network path a peer can be reached on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IceCandidate {
    /// Media stream identification tag
    pub sdp_mid: String,
    /// Index of the media description this candidate belongs to
    pub sdp_mline_index: u32,
    /// The `candidate:...` attribute string
    pub sdp: String,
}

impl IceCandidate {
    pub fn new(sdp_mid: impl Into<String>, sdp_mline_index: u32, sdp: impl Into<String>) -> Self {
        Self {
            sdp_mid: sdp_mid.into(),
            sdp_mline_index,
            sdp: sdp.into(),
        }
    }

    /// Dedup key for remote-candidate bookkeeping: the first
    /// whitespace-delimited token of the attribute string (the
    /// `candidate:<foundation>` prefix), not the full value.
    pub fn fingerprint(&self) -> &str {
        self.sdp.split_whitespace().next().unwrap_or("")
    }
}

/// Connection phase of one room attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    New,
    Connected,
    Closed,
    Error,
}

/// Which side of the negotiation this client is on. Resolved once per
/// attempt by the first room membership event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Creates the offer
    Initiator,
    /// Creates the answer
    Joiner,
}

/// TLS certificate verification policy for an ICE server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TlsCertPolicy {
    #[default]
    Secure,
    InsecureNoCheck,
}

/// One STUN/TURN server entry, supplied as static configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IceServer {
    pub url: String,
    pub username: String,
    pub password: String,
    pub tls_cert_policy: TlsCertPolicy,
}

impl IceServer {
    /// A credential-less STUN entry
    pub fn stun(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            username: String::new(),
            password: String::new(),
            tls_cert_policy: TlsCertPolicy::InsecureNoCheck,
        }
    }
}

/// Static STUN configuration used when the application supplies none
pub fn default_ice_servers() -> Vec<IceServer> {
    vec![IceServer::stun("stun:stun.l.google.com:19302")]
}
