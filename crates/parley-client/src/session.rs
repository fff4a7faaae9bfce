//! Room session state
//!
//! Mutable state of one room attempt. Owned exclusively by the
//! client's dispatch task; nothing here is synchronized because
//! nothing else may touch it.

use std::collections::HashSet;

use parley_core::{ConnectionState, IceCandidate, Role};

#[derive(Debug)]
pub struct RoomSession {
    pub state: ConnectionState,
    /// Resolved by the first room membership event, write-once
    pub role: Option<Role>,
    pub room_id: String,
    pub loopback: bool,
    pending_candidates: Vec<IceCandidate>,
    seen_remote: HashSet<String>,
}

impl RoomSession {
    pub fn new(room_id: &str, loopback: bool) -> Self {
        Self {
            state: ConnectionState::New,
            role: None,
            room_id: room_id.to_string(),
            loopback,
            pending_candidates: Vec::new(),
            seen_remote: HashSet::new(),
        }
    }

    /// State before any room was dialed
    pub fn detached() -> Self {
        Self::new("", false)
    }

    /// Resolve the role for this attempt. Write-once: returns false
    /// and leaves the existing role in place when already resolved.
    pub fn assign_role(&mut self, role: Role) -> bool {
        if self.role.is_some() {
            return false;
        }
        self.role = Some(role);
        true
    }

    pub fn is_initiator(&self) -> bool {
        self.role == Some(Role::Initiator)
    }

    /// Queue a candidate delivered on the legacy offer path
    pub fn push_pending(&mut self, candidate: IceCandidate) {
        self.pending_candidates.push(candidate);
    }

    /// Take the queued candidates for the signaling parameters
    pub fn drain_pending(&mut self) -> Vec<IceCandidate> {
        std::mem::take(&mut self.pending_candidates)
    }

    /// Record a remote candidate fingerprint. Returns whether it was
    /// new. Recording does not gate delivery: duplicates are observed,
    /// not filtered.
    pub fn observe_remote(&mut self, candidate: &IceCandidate) -> bool {
        self.seen_remote.insert(candidate.fingerprint().to_string())
    }

    pub fn seen_remote_count(&self) -> usize {
        self.seen_remote.len()
    }
}
