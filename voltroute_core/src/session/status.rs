use serde::{Deserialize, Serialize};

/// Lifecycle of a live navigation session. Transitions are guarded in
/// `NavigationSession`; terminal states accept no further updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    OnTrack,
    Deviated,
    Rerouting,
    Arrived,
    Aborted,
}

impl SessionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionStatus::Arrived | SessionStatus::Aborted)
    }
}
