//! Error types for ntk-ap
//!
//! None of these cross the sequencer boundary: clip, handoff and engine
//! failures are logged and turned into a [`crate::SubmitOutcome`].

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for ntk-ap
#[derive(Error, Debug)]
pub enum Error {
    /// One clip could not be read (the clip is skipped)
    #[error("Failed to read clip '{clip}' from {}: {source}", .path.display())]
    ClipRead {
        clip: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No clip of the advice could be read (the advice is dropped)
    #[error("No valid clips in advice")]
    NoValidClips,

    /// Scratch file could not be written
    #[error("Failed to write scratch file {}: {source}", .path.display())]
    ScratchWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Backend refused the scratch file
    #[error("Playback handoff failed: {0}")]
    Handoff(String),

    /// Backend reported an error while playing
    #[error("Playback engine error (code {0})")]
    Engine(i32),

    /// Audio decoding errors
    #[error("Audio decode error: {0}")]
    Decode(String),

    /// Audio output device errors
    #[error("Audio output error: {0}")]
    AudioOutput(String),

    /// Configuration file loading errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Player task is no longer running
    #[error("Advice player stopped")]
    PlayerClosed,

    /// Errors from ntk-common
    #[error(transparent)]
    Common(#[from] ntk_common::Error),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type using ntk-ap Error
pub type Result<T> = std::result::Result<T, Error>;
