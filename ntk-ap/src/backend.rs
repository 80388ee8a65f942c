//! Playback backend seam
//!
//! The backend mirrors a classic media-player lifecycle
//! (reset, set source, prepare, start, stop). Completion and errors are
//! reported asynchronously on a channel, tagged with the session the
//! sequencer handed to [`PlaybackBackend::start`], so a late report for a
//! stopped advice can be recognised and ignored.

use crate::error::Result;
use std::path::Path;
use tokio::sync::mpsc;

/// Identifies one `start` of the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct PlaybackSession(pub u64);

impl PlaybackSession {
    pub fn next(self) -> Self {
        PlaybackSession(self.0.wrapping_add(1))
    }
}

impl std::fmt::Display for PlaybackSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Notifications from the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendEvent {
    /// The source played to the end
    Completed { session: PlaybackSession },

    /// Playback failed; `code` is backend specific
    Failed { session: PlaybackSession, code: i32 },
}

impl BackendEvent {
    pub fn session(&self) -> PlaybackSession {
        match self {
            BackendEvent::Completed { session } | BackendEvent::Failed { session, .. } => *session,
        }
    }
}

/// Sending half handed to backends
///
/// Unbounded so audio callback threads never block on it.
pub type BackendEventSender = mpsc::UnboundedSender<BackendEvent>;

/// Receiving half consumed by the advice player task
pub type BackendEventReceiver = mpsc::UnboundedReceiver<BackendEvent>;

/// Create the channel connecting a backend to the advice player
pub fn backend_channel() -> (BackendEventSender, BackendEventReceiver) {
    mpsc::unbounded_channel()
}

/// Audio engine driven by the sequencer
pub trait PlaybackBackend {
    /// Return to the uninitialised state, releasing any source
    fn reset(&mut self);

    /// Select the file to play
    ///
    /// Fails with [`crate::Error::Handoff`] if the engine is still holding
    /// a previous source.
    fn set_source(&mut self, path: &Path) -> Result<()>;

    /// Load and decode the selected source
    fn prepare(&mut self) -> Result<()>;

    /// Begin playback; completion or failure is reported for `session`
    fn start(&mut self, session: PlaybackSession) -> Result<()>;

    /// Halt playback without reporting completion
    fn stop(&mut self);
}

impl<T: PlaybackBackend + ?Sized> PlaybackBackend for Box<T> {
    fn reset(&mut self) {
        (**self).reset()
    }

    fn set_source(&mut self, path: &Path) -> Result<()> {
        (**self).set_source(path)
    }

    fn prepare(&mut self) -> Result<()> {
        (**self).prepare()
    }

    fn start(&mut self, session: PlaybackSession) -> Result<()> {
        (**self).start(session)
    }

    fn stop(&mut self) {
        (**self).stop()
    }
}
