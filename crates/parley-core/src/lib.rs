//! Parley Core
//!
//! Core types and wire encoding for the Parley signaling protocol:
//! the message vocabulary a client exchanges with a room relay while
//! negotiating a two-party real-time session.
//!
//! This crate provides:
//! - Signaling value types ([`SessionDescription`], [`IceCandidate`])
//! - The JSON wire codec and event envelope ([`codec`])
//! - ICE server configuration ([`IceServer`], [`default_ice_servers`])
//!
//! Everything here is pure and transport-free; the channel adapter and
//! the negotiation state machine live in their own crates.

pub mod codec;
pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{
    default_ice_servers, ConnectionState, IceCandidate, IceServer, Role, SdpType,
    SessionDescription, TlsCertPolicy,
};
