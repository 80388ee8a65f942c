//! Advice-related type definitions
//!
//! Supporting types shared by the advice player and anything observing it.

use serde::{Deserialize, Serialize};

/// Priority of a voice advice
///
/// Lower value means higher priority. Ordering is numeric, so
/// `AdvicePriority::USER < AdvicePriority::SPEED_WARNING`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdvicePriority(pub u8);

impl AdvicePriority {
    /// Advice explicitly requested by the user
    pub const USER: AdvicePriority = AdvicePriority(0);
    /// Turn-by-turn navigation advice
    pub const NAVIGATION: AdvicePriority = AdvicePriority(1);
    /// Speed limit warnings
    pub const SPEED_WARNING: AdvicePriority = AdvicePriority(2);

    /// Raw numeric value
    pub fn value(self) -> u8 {
        self.0
    }

    /// True if an advice with this priority may take the place of one with `other`
    ///
    /// Ties favor the newcomer.
    pub fn replaces(self, other: AdvicePriority) -> bool {
        self.0 <= other.0
    }
}

impl From<u8> for AdvicePriority {
    fn from(value: u8) -> Self {
        AdvicePriority(value)
    }
}

impl std::fmt::Display for AdvicePriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            AdvicePriority::USER => write!(f, "user"),
            AdvicePriority::NAVIGATION => write!(f, "navigation"),
            AdvicePriority::SPEED_WARNING => write!(f, "speed-warning"),
            AdvicePriority(other) => write!(f, "priority-{}", other),
        }
    }
}

/// Why an advice request did not play
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// Player is muted
    Muted,
    /// Request contained no clip names
    Empty,
    /// None of the clips could be read
    NoValidClips,
    /// A pending request with better priority is already waiting
    Outranked,
    /// Scratch file could not be written or the backend refused it
    HandoffFailed,
}

impl std::fmt::Display for DropReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DropReason::Muted => write!(f, "muted"),
            DropReason::Empty => write!(f, "empty"),
            DropReason::NoValidClips => write!(f, "no_valid_clips"),
            DropReason::Outranked => write!(f, "outranked"),
            DropReason::HandoffFailed => write!(f, "handoff_failed"),
        }
    }
}

/// Advice player state
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlayerState {
    /// Nothing playing
    #[default]
    Idle,
    /// Exactly one advice is playing
    Busy,
}

impl std::fmt::Display for PlayerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlayerState::Idle => write!(f, "idle"),
            PlayerState::Busy => write!(f, "busy"),
        }
    }
}
