//! Connection and signaling parameters

use parley_core::{default_ice_servers, IceCandidate, IceServer, SessionDescription};

/// Parameters identifying the room to join. Immutable once supplied to
/// [`connect_to_room`](crate::RoomClient::connect_to_room).
#[derive(Debug, Clone)]
pub struct RoomConnectionParameters {
    /// Relay endpoint, e.g. `ws://relay.example:8089`
    pub room_url: String,
    /// Room identifier shared by both parties
    pub room_id: String,
    /// Route the local offer back as the local answer (self-test mode)
    pub loopback: bool,
    /// Extra query parameters appended to the room URL
    pub url_parameters: Option<String>,
}

impl RoomConnectionParameters {
    pub fn new(room_url: impl Into<String>, room_id: impl Into<String>) -> Self {
        Self {
            room_url: room_url.into(),
            room_id: room_id.into(),
            loopback: false,
            url_parameters: None,
        }
    }

    pub fn loopback(mut self, enabled: bool) -> Self {
        self.loopback = enabled;
        self
    }

    pub fn url_parameters(mut self, params: impl Into<String>) -> Self {
        self.url_parameters = Some(params.into());
        self
    }

    /// The URL actually dialed, with any extra query parameters
    pub(crate) fn connect_url(&self) -> String {
        match &self.url_parameters {
            Some(query) if self.room_url.contains('?') => {
                format!("{}&{}", self.room_url, query)
            }
            Some(query) => format!("{}?{}", self.room_url, query),
            None => self.room_url.clone(),
        }
    }
}

/// Everything the media engine needs to start one negotiation attempt.
/// Constructed once per attempt, handed to the event sink, then
/// discarded.
#[derive(Debug, Clone)]
pub struct SignalingParameters {
    pub ice_servers: Vec<IceServer>,
    pub is_initiator: bool,
    pub client_id: String,
    /// The remote offer, present on the joiner side only
    pub offer_sdp: Option<SessionDescription>,
    /// Candidates that arrived before the attempt connected
    pub initial_candidates: Vec<IceCandidate>,
}

impl SignalingParameters {
    pub(crate) fn for_initiator(initial_candidates: Vec<IceCandidate>) -> Self {
        Self {
            ice_servers: default_ice_servers(),
            is_initiator: true,
            client_id: String::new(),
            offer_sdp: None,
            initial_candidates,
        }
    }

    pub(crate) fn for_joiner(
        offer: SessionDescription,
        initial_candidates: Vec<IceCandidate>,
    ) -> Self {
        Self {
            ice_servers: default_ice_servers(),
            is_initiator: false,
            client_id: String::new(),
            offer_sdp: Some(offer),
            initial_candidates,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_url_plain() {
        let params = RoomConnectionParameters::new("ws://relay:8089", "room-7");
        assert_eq!(params.connect_url(), "ws://relay:8089");
    }

    #[test]
    fn test_connect_url_with_query() {
        let params =
            RoomConnectionParameters::new("ws://relay:8089", "room-7").url_parameters("debug=1");
        assert_eq!(params.connect_url(), "ws://relay:8089?debug=1");
    }

    #[test]
    fn test_connect_url_appends_to_existing_query() {
        let params = RoomConnectionParameters::new("ws://relay:8089?v=2", "room-7")
            .url_parameters("debug=1");
        assert_eq!(params.connect_url(), "ws://relay:8089?v=2&debug=1");
    }
}
