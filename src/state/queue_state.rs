//! Work queue state definitions
//!
//! A work queue is in exactly one of these states at any time. The queue
//! directory keeps a separate index for READY, SNOOZED, INACTIVE and RETIRED
//! queues; EMPTY and IN_PROCESS queues live only in the queue map.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents the current scheduling state of a work queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueState {
    /// Not yet considered for dispatch
    Inactive,

    /// Has at least one eligible URI and may be dispatched
    Ready,

    /// No eligible URI right now
    Empty,

    /// Exactly one URI has been dispatched and is awaiting completion
    InProcess,

    /// Politeness (or retry backoff) delay is running
    Snoozed,

    /// Budget exhausted or retired by an operator
    Retired,
}

impl QueueState {
    /// Returns true if the transition `self -> to` is part of the queue lifecycle
    ///
    /// Same-state moves are not transitions and are rejected.
    pub fn can_transition_to(&self, to: QueueState) -> bool {
        use QueueState::*;

        match (self, to) {
            (Inactive, Ready | Empty | Snoozed | Retired) => true,
            (Ready, InProcess | Empty | Retired) => true,
            (Empty, Ready | Retired) => true,
            // Held queues rotate back to INACTIVE once their session balance is spent
            (InProcess, Ready | Empty | Snoozed | Retired | Inactive) => true,
            (Snoozed, Ready | Empty | Retired | Inactive) => true,
            (Retired, Inactive) => true,
            _ => false,
        }
    }

    /// Returns true if the queue still counts toward frontier liveness
    ///
    /// RETIRED and EMPTY queues never produce work on their own, so a frontier
    /// holding only those is exhausted.
    pub fn is_live(&self) -> bool {
        matches!(
            self,
            Self::Inactive | Self::Ready | Self::InProcess | Self::Snoozed
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inactive => "inactive",
            Self::Ready => "ready",
            Self::Empty => "empty",
            Self::InProcess => "in_process",
            Self::Snoozed => "snoozed",
            Self::Retired => "retired",
        }
    }

    /// Returns all possible queue states
    pub fn all_states() -> [Self; 6] {
        [
            Self::Inactive,
            Self::Ready,
            Self::Empty,
            Self::InProcess,
            Self::Snoozed,
            Self::Retired,
        ]
    }
}

impl fmt::Display for QueueState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use QueueState::*;

    #[test]
    fn test_lifecycle_transitions_allowed() {
        assert!(Inactive.can_transition_to(Ready));
        assert!(Inactive.can_transition_to(Empty));
        assert!(Ready.can_transition_to(InProcess));
        assert!(Empty.can_transition_to(Ready));
        assert!(InProcess.can_transition_to(Ready));
        assert!(InProcess.can_transition_to(Empty));
        assert!(InProcess.can_transition_to(Snoozed));
        assert!(InProcess.can_transition_to(Retired));
        assert!(Snoozed.can_transition_to(Ready));
        assert!(Retired.can_transition_to(Inactive));
    }

    #[test]
    fn test_rotation_transitions_allowed() {
        assert!(InProcess.can_transition_to(Inactive));
        assert!(Snoozed.can_transition_to(Inactive));
        assert!(!Ready.can_transition_to(Inactive));
        assert!(!Empty.can_transition_to(Inactive));
    }

    #[test]
    fn test_shortcuts_rejected() {
        // Dispatch only ever happens from READY
        assert!(!Empty.can_transition_to(InProcess));
        assert!(!Snoozed.can_transition_to(InProcess));
        assert!(!Inactive.can_transition_to(InProcess));
        assert!(!Retired.can_transition_to(InProcess));

        // Retired queues come back only through INACTIVE
        assert!(!Retired.can_transition_to(Ready));
        assert!(!Retired.can_transition_to(Empty));

        // Snoozing only follows a completed fetch
        assert!(!Ready.can_transition_to(Snoozed));
        assert!(!Empty.can_transition_to(Snoozed));
    }

    #[test]
    fn test_self_transitions_rejected() {
        for state in QueueState::all_states() {
            assert!(!state.can_transition_to(state), "{} -> {}", state, state);
        }
    }

    #[test]
    fn test_is_live() {
        assert!(Inactive.is_live());
        assert!(Ready.is_live());
        assert!(InProcess.is_live());
        assert!(Snoozed.is_live());

        assert!(!Empty.is_live());
        assert!(!Retired.is_live());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", InProcess), "in_process");
        assert_eq!(format!("{}", Snoozed), "snoozed");
    }

    #[test]
    fn test_serde_names_match_display() {
        for state in QueueState::all_states() {
            let json = serde_json::to_string(&state).unwrap();
            assert_eq!(json, format!("\"{}\"", state));
        }
    }
}
