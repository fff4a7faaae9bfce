//! Parley Client Library
//!
//! Client-side signaling for a two-party real-time session negotiated
//! through a room relay. The client joins a room, resolves its role
//! (initiator or joiner), exchanges session descriptions and ICE
//! candidates with the peer, and reports progress to an application
//! supplied [`SignalingEvents`] sink.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use parley_client::{RoomClient, RoomConnectionParameters, SignalingEvents};
//!
//! let client = RoomClient::new(Arc::new(MySink::default()));
//! client.connect_to_room(RoomConnectionParameters::new(
//!     "ws://relay.example:8089",
//!     "room-7",
//! ));
//! // ... the sink's on_connected_to_room fires once the peer arrives;
//! // the media engine then drives send_offer_sdp / send_answer_sdp.
//! client.disconnect_from_room();
//! ```
//!
//! All public operations are asynchronous hand-offs onto one dispatch
//! task; failures surface exclusively through the sink's error and
//! close callbacks.

pub mod client;
pub mod error;
pub mod events;
pub mod machine;
pub mod params;
pub mod session;

pub use client::RoomClient;
pub use error::{ClientError, Result};
pub use events::SignalingEvents;
pub use params::{RoomConnectionParameters, SignalingParameters};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::client::RoomClient;
    pub use crate::error::{ClientError, Result};
    pub use crate::events::SignalingEvents;
    pub use crate::params::{RoomConnectionParameters, SignalingParameters};
    pub use parley_core::{IceCandidate, SdpType, SessionDescription};
}
