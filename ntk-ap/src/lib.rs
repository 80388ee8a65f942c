//! # NTK Advice Player Library (ntk-ap)
//!
//! Plays turn-by-turn voice advice assembled from short sound clips.
//!
//! **Purpose:** Resolve clip names to sound files for the selected voice
//! language, concatenate them into one scratch file, hand it to a playback
//! backend, and arbitrate between overlapping requests by priority.
//!
//! **Architecture:**
//! - [`sequencer::AdviceSequencer`]: synchronous Idle/Busy state machine with a one-deep pending slot
//! - [`player::AdvicePlayer`]: async task owning the sequencer, fed by command and backend-event channels
//! - [`backend::PlaybackBackend`]: seam to the audio engine (symphonia + cpal behind `audio-output`)

pub mod audio;
pub mod backend;
pub mod clips;
pub mod config;
pub mod error;
pub mod player;
pub mod request;
pub mod sequencer;

pub use error::{Error, Result};
pub use ntk_common::events::{AdvicePriority, DropReason, PlayerState};
pub use player::{AdvicePlayer, AdvicePlayerHandle};
pub use request::AdviceRequest;
pub use sequencer::{AdviceSequencer, SubmitOutcome};
