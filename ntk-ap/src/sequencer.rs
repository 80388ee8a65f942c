//! Advice sequencer
//!
//! Idle/Busy state machine deciding what the single playback backend plays.
//!
//! # Rules
//!
//! - Muted or empty requests are discarded without touching any state.
//! - While Busy, a request goes to the one-deep pending slot if the slot is
//!   empty or the request's priority is numerically lower or equal to the
//!   pending one (newest wins ties). Otherwise it is dropped. The playing
//!   advice is never interrupted.
//! - While Idle, the clips are read and concatenated in order, written to
//!   the scratch file and handed to the backend. Unreadable clips are
//!   skipped; if none can be read the request is dropped and the sequencer
//!   stays Idle.
//! - Completion (or a backend error) releases the backend, deletes the
//!   scratch file and plays the pending request, if any.
//! - `stop()` returns to Idle without promoting the pending request.
//!
//! At most one advice is audible at any instant.

use crate::backend::{PlaybackBackend, PlaybackSession};
use crate::clips::ClipSource;
use crate::error::{Error, Result};
use crate::request::AdviceRequest;
use ntk_common::events::{DropReason, PlayerState};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// What happened to a submitted request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Handed to the backend and now playing
    Started {
        advice_id: Uuid,
        session: PlaybackSession,
        /// Clips that were read successfully
        resolved_clips: usize,
    },

    /// Stored in the pending slot
    Queued {
        advice_id: Uuid,
        /// Previously pending request that was overwritten
        replaced: Option<Uuid>,
    },

    /// Discarded
    Dropped { advice_id: Uuid, reason: DropReason },
}

impl SubmitOutcome {
    pub fn advice_id(&self) -> Uuid {
        match self {
            SubmitOutcome::Started { advice_id, .. }
            | SubmitOutcome::Queued { advice_id, .. }
            | SubmitOutcome::Dropped { advice_id, .. } => *advice_id,
        }
    }
}

/// Result of a completion or error notification for the active session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// The advice that just finished
    pub finished: AdviceRequest,
    /// Outcome of promoting the pending request, if there was one
    pub next: Option<SubmitOutcome>,
}

/// Owns the playback backend and arbitrates advice requests
pub struct AdviceSequencer<C, B> {
    clips: C,
    backend: B,
    state: PlayerState,
    active: Option<AdviceRequest>,
    pending: Option<AdviceRequest>,
    /// Scratch file written for the active advice
    scratch: Option<PathBuf>,
    muted: bool,
    /// Last session handed to the backend
    session: PlaybackSession,
}

impl<C: ClipSource, B: PlaybackBackend> AdviceSequencer<C, B> {
    pub fn new(clips: C, backend: B) -> Self {
        Self {
            clips,
            backend,
            state: PlayerState::Idle,
            active: None,
            pending: None,
            scratch: None,
            muted: false,
            session: PlaybackSession::default(),
        }
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn is_busy(&self) -> bool {
        self.state == PlayerState::Busy
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Advice currently playing
    pub fn active(&self) -> Option<&AdviceRequest> {
        self.active.as_ref()
    }

    /// Advice waiting for the active one to finish
    pub fn pending(&self) -> Option<&AdviceRequest> {
        self.pending.as_ref()
    }

    /// Session of the advice currently playing
    pub fn current_session(&self) -> Option<PlaybackSession> {
        self.is_busy().then_some(self.session)
    }

    pub fn clips(&self) -> &C {
        &self.clips
    }

    pub fn clips_mut(&mut self) -> &mut C {
        &mut self.clips
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Discard all further requests until [`Self::unmute`]
    ///
    /// The playing advice and the pending slot are left alone.
    pub fn mute(&mut self) {
        self.muted = true;
    }

    pub fn unmute(&mut self) {
        self.muted = false;
    }

    /// Submit an advice
    pub fn submit(&mut self, request: AdviceRequest) -> SubmitOutcome {
        let advice_id = request.id;

        if self.muted {
            debug!("Muted, discarding advice {}", advice_id);
            return SubmitOutcome::Dropped {
                advice_id,
                reason: DropReason::Muted,
            };
        }

        if request.is_empty() {
            debug!("Discarding empty advice {}", advice_id);
            return SubmitOutcome::Dropped {
                advice_id,
                reason: DropReason::Empty,
            };
        }

        match self.state {
            PlayerState::Busy => self.enqueue(request),
            PlayerState::Idle => self.play(request),
        }
    }

    /// Backend finished the advice of `session`
    ///
    /// Returns `None` for stale sessions or when nothing is playing.
    pub fn on_playback_complete(&mut self, session: PlaybackSession) -> Option<Completion> {
        if !self.is_current(session) {
            debug!("Ignoring completion for stale session {}", session);
            return None;
        }

        let finished = self.release()?;
        debug!("Advice {} finished", finished.id);

        let next = self.pending.take().map(|request| {
            debug!("Promoting pending advice {}", request.id);
            self.submit(request)
        });

        Some(Completion { finished, next })
    }

    /// Backend failed while playing the advice of `session`
    ///
    /// Logged, then handled exactly like a completion.
    pub fn on_playback_error(&mut self, session: PlaybackSession, code: i32) -> Option<Completion> {
        if !self.is_current(session) {
            debug!("Ignoring error {} for stale session {}", code, session);
            return None;
        }

        if let Some(active) = &self.active {
            error!("Advice {}: {}", active.id, Error::Engine(code));
        }

        self.on_playback_complete(session)
    }

    /// Halt playback and return to Idle
    ///
    /// The pending request stays queued and is not promoted.
    pub fn stop(&mut self) -> Option<AdviceRequest> {
        self.backend.stop();
        self.state = PlayerState::Idle;
        self.remove_scratch();

        let stopped = self.active.take();
        if let Some(request) = &stopped {
            info!("Stopped advice {}", request.id);
        }
        stopped
    }

    fn is_current(&self, session: PlaybackSession) -> bool {
        self.is_busy() && session == self.session
    }

    fn enqueue(&mut self, request: AdviceRequest) -> SubmitOutcome {
        let advice_id = request.id;

        if let Some(pending) = &self.pending {
            if !request.priority.replaces(pending.priority) {
                debug!(
                    "Dropping advice {} ({}): pending {} has priority {}",
                    advice_id, request.priority, pending.id, pending.priority
                );
                return SubmitOutcome::Dropped {
                    advice_id,
                    reason: DropReason::Outranked,
                };
            }
        }

        debug!("Queued advice {} ({})", advice_id, request.priority);
        let replaced = self.pending.replace(request).map(|previous| previous.id);
        SubmitOutcome::Queued { advice_id, replaced }
    }

    fn play(&mut self, request: AdviceRequest) -> SubmitOutcome {
        let advice_id = request.id;

        let mut payload = Vec::new();
        let mut resolved_clips = 0;
        for clip in &request.clips {
            match self.clips.load_clip(clip) {
                Ok(bytes) => {
                    payload.extend_from_slice(&bytes);
                    resolved_clips += 1;
                }
                Err(e) => warn!("Skipping clip: {}", e),
            }
        }

        if resolved_clips == 0 {
            warn!("Advice {}: {}", advice_id, Error::NoValidClips);
            return SubmitOutcome::Dropped {
                advice_id,
                reason: DropReason::NoValidClips,
            };
        }

        let session = self.session.next();
        self.session = session;
        self.state = PlayerState::Busy;
        self.active = Some(request);

        let scratch = self.clips.scratch_path();
        self.scratch = Some(scratch.clone());
        if let Err(e) = write_scratch(&scratch, &payload).and_then(|_| self.hand_off(&scratch, session)) {
            error!("Advice {} not played: {}", advice_id, e);
            self.release();
            return SubmitOutcome::Dropped {
                advice_id,
                reason: DropReason::HandoffFailed,
            };
        }

        info!(
            "Playing advice {} ({} of {} clips, session {})",
            advice_id,
            resolved_clips,
            self.active.as_ref().map_or(0, |r| r.clips.len()),
            session
        );

        SubmitOutcome::Started {
            advice_id,
            session,
            resolved_clips,
        }
    }

    /// Reset, set source (retrying once after a reset), prepare, start
    fn hand_off(&mut self, scratch: &Path, session: PlaybackSession) -> Result<()> {
        self.backend.reset();

        if let Err(e) = self.backend.set_source(scratch) {
            warn!("Backend refused source ({}), resetting and retrying", e);
            self.backend.reset();
            self.backend.set_source(scratch)?;
        }

        self.backend.prepare()?;
        self.backend.start(session)
    }

    /// Release the backend, delete the scratch file, go Idle
    fn release(&mut self) -> Option<AdviceRequest> {
        self.backend.reset();
        self.remove_scratch();
        self.state = PlayerState::Idle;
        self.active.take()
    }

    /// Delete the file written by `play`, wherever the clip source points now
    fn remove_scratch(&mut self) {
        let Some(scratch) = self.scratch.take() else {
            return;
        };
        match std::fs::remove_file(&scratch) {
            Ok(()) => debug!("Removed scratch file {}", scratch.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove scratch file {}: {}", scratch.display(), e),
        }
    }
}

fn write_scratch(path: &Path, payload: &[u8]) -> Result<()> {
    std::fs::write(path, payload).map_err(|source| Error::ScratchWrite {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ntk_common::events::AdvicePriority;
    use crate::clips::SoundFileStore;
    use proptest::prelude::*;
    use std::collections::HashMap;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Reset,
        SetSource(Vec<u8>),
        SetSourceRefused,
        Prepare,
        Start(PlaybackSession),
        Stop,
    }

    #[derive(Default)]
    struct MockBackend {
        calls: Vec<Call>,
        refuse_set_source: usize,
        fail_prepare: bool,
    }

    impl MockBackend {
        fn last_source(&self) -> Option<&[u8]> {
            self.calls.iter().rev().find_map(|call| match call {
                Call::SetSource(bytes) => Some(bytes.as_slice()),
                _ => None,
            })
        }

        fn starts(&self) -> usize {
            self.calls.iter().filter(|c| matches!(c, Call::Start(_))).count()
        }
    }

    impl PlaybackBackend for MockBackend {
        fn reset(&mut self) {
            self.calls.push(Call::Reset);
        }

        fn set_source(&mut self, path: &Path) -> Result<()> {
            if self.refuse_set_source > 0 {
                self.refuse_set_source -= 1;
                self.calls.push(Call::SetSourceRefused);
                return Err(Error::Handoff("player busy".to_string()));
            }
            let bytes = std::fs::read(path)?;
            self.calls.push(Call::SetSource(bytes));
            Ok(())
        }

        fn prepare(&mut self) -> Result<()> {
            if self.fail_prepare {
                return Err(Error::Handoff("prepare failed".to_string()));
            }
            self.calls.push(Call::Prepare);
            Ok(())
        }

        fn start(&mut self, session: PlaybackSession) -> Result<()> {
            self.calls.push(Call::Start(session));
            Ok(())
        }

        fn stop(&mut self) {
            self.calls.push(Call::Stop);
        }
    }

    struct MemoryClips {
        clips: HashMap<String, Vec<u8>>,
        scratch: PathBuf,
    }

    impl ClipSource for MemoryClips {
        fn load_clip(&self, name: &str) -> Result<Vec<u8>> {
            self.clips.get(name).cloned().ok_or_else(|| Error::ClipRead {
                clip: name.to_string(),
                path: PathBuf::from(name),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            })
        }

        fn scratch_path(&self) -> PathBuf {
            self.scratch.clone()
        }
    }

    fn sequencer() -> (tempfile::TempDir, AdviceSequencer<MemoryClips, MockBackend>) {
        let dir = tempfile::tempdir().unwrap();
        let clips = [
            ("turn", "TURN"),
            ("left", "LEFT"),
            ("right", "RIGHT"),
            ("mute-test", "MUTE"),
            ("urgent", "URGENT"),
        ]
        .into_iter()
        .map(|(name, bytes)| (name.to_string(), bytes.as_bytes().to_vec()))
        .collect();

        let source = MemoryClips {
            clips,
            scratch: dir.path().join("temp.mp3"),
        };
        (dir, AdviceSequencer::new(source, MockBackend::default()))
    }

    fn started_session(outcome: &SubmitOutcome) -> PlaybackSession {
        match outcome {
            SubmitOutcome::Started { session, .. } => *session,
            other => panic!("Expected Started, got {:?}", other),
        }
    }

    #[test]
    fn test_priority_preemption_scenario() {
        let (_dir, mut seq) = sequencer();

        let first = AdviceRequest::new(["turn", "left"], AdvicePriority::NAVIGATION);
        let outcome = seq.submit(first.clone());
        let session = started_session(&outcome);
        assert!(matches!(outcome, SubmitOutcome::Started { resolved_clips: 2, .. }));
        assert_eq!(seq.state(), PlayerState::Busy);
        assert_eq!(seq.backend().last_source(), Some(&b"TURNLEFT"[..]));

        // Empty slot accepts any priority
        let second = AdviceRequest::new(["mute-test"], AdvicePriority::SPEED_WARNING);
        assert_eq!(
            seq.submit(second.clone()),
            SubmitOutcome::Queued {
                advice_id: second.id,
                replaced: None
            }
        );

        // Better priority replaces the pending advice
        let third = AdviceRequest::new(["urgent"], AdvicePriority::USER);
        assert_eq!(
            seq.submit(third.clone()),
            SubmitOutcome::Queued {
                advice_id: third.id,
                replaced: Some(second.id)
            }
        );

        // The playing advice was never touched
        assert_eq!(seq.backend().starts(), 1);

        let completion = seq.on_playback_complete(session).unwrap();
        assert_eq!(completion.finished, first);
        assert!(matches!(completion.next, Some(SubmitOutcome::Started { advice_id, .. }) if advice_id == third.id));
        assert_eq!(seq.state(), PlayerState::Busy);
        assert_eq!(seq.active(), Some(&third));
        assert!(seq.pending().is_none());
        assert_eq!(seq.backend().last_source(), Some(&b"URGENT"[..]));
    }

    proptest! {
        #[test]
        fn test_pending_keeps_lowest_priority_newest_on_ties(
            priorities in prop::collection::vec(0u8..=4, 1..24)
        ) {
            let (_dir, mut seq) = sequencer();
            seq.submit(AdviceRequest::new(["turn"], AdvicePriority::NAVIGATION));

            let requests: Vec<AdviceRequest> = priorities
                .iter()
                .map(|&p| AdviceRequest::new(["left"], AdvicePriority::from(p)))
                .collect();
            for request in &requests {
                seq.submit(request.clone());
            }

            let best = *priorities.iter().min().unwrap();
            let expected = requests.iter().rev().find(|r| r.priority.value() == best).unwrap();
            prop_assert_eq!(seq.pending(), Some(expected));
            prop_assert_eq!(seq.state(), PlayerState::Busy);
            prop_assert_eq!(seq.backend().starts(), 1);
        }
    }

    #[test]
    fn test_worse_priority_is_dropped_when_pending() {
        let (_dir, mut seq) = sequencer();
        seq.submit(AdviceRequest::new(["turn"], AdvicePriority::NAVIGATION));
        seq.submit(AdviceRequest::new(["left"], AdvicePriority::NAVIGATION));

        let worse = AdviceRequest::new(["right"], AdvicePriority::SPEED_WARNING);
        assert_eq!(
            seq.submit(worse.clone()),
            SubmitOutcome::Dropped {
                advice_id: worse.id,
                reason: DropReason::Outranked
            }
        );
        assert_eq!(seq.pending().unwrap().clips, vec!["left"]);
    }

    #[test]
    fn test_empty_and_muted_requests_change_nothing() {
        let (_dir, mut seq) = sequencer();

        let empty = AdviceRequest::new(Vec::<String>::new(), AdvicePriority::USER);
        assert!(matches!(
            seq.submit(empty),
            SubmitOutcome::Dropped { reason: DropReason::Empty, .. }
        ));
        assert_eq!(seq.state(), PlayerState::Idle);
        assert!(seq.backend().calls.is_empty());

        seq.submit(AdviceRequest::new(["turn"], AdvicePriority::NAVIGATION));
        seq.submit(AdviceRequest::new(["left"], AdvicePriority::SPEED_WARNING));
        let pending = seq.pending().cloned();

        seq.mute();
        assert!(matches!(
            seq.submit(AdviceRequest::new(["urgent"], AdvicePriority::USER)),
            SubmitOutcome::Dropped { reason: DropReason::Muted, .. }
        ));
        assert!(matches!(
            seq.submit(AdviceRequest::new(Vec::<String>::new(), AdvicePriority::USER)),
            SubmitOutcome::Dropped { reason: DropReason::Muted, .. }
        ));

        // Mute affects neither the playing advice nor the pending slot
        assert_eq!(seq.state(), PlayerState::Busy);
        assert_eq!(seq.pending().cloned(), pending);
        assert_eq!(seq.backend().starts(), 1);

        seq.unmute();
        assert!(!seq.is_muted());
    }

    #[test]
    fn test_completion_without_pending_goes_idle_and_removes_scratch() {
        let (dir, mut seq) = sequencer();
        let scratch = dir.path().join("temp.mp3");

        let session = started_session(&seq.submit(AdviceRequest::new(["turn"], AdvicePriority::NAVIGATION)));
        assert!(scratch.exists());

        let completion = seq.on_playback_complete(session).unwrap();
        assert!(completion.next.is_none());
        assert_eq!(seq.state(), PlayerState::Idle);
        assert!(seq.active().is_none());
        assert!(!scratch.exists());
        assert_eq!(seq.backend().calls.last(), Some(&Call::Reset));
    }

    fn store_sequencer() -> (tempfile::TempDir, AdviceSequencer<SoundFileStore, MockBackend>) {
        let dir = tempfile::tempdir().unwrap();
        let store = SoundFileStore::new(dir.path(), "en_us");
        for language in ["en_us", "de_de"] {
            let folder = dir.path().join(language).join("sound_files");
            std::fs::create_dir_all(&folder).unwrap();
            std::fs::write(folder.join("turn.mp3"), language.as_bytes()).unwrap();
        }
        (dir, AdviceSequencer::new(store, MockBackend::default()))
    }

    #[test]
    fn test_language_switch_while_busy_removes_written_scratch_on_completion() {
        let (dir, mut seq) = store_sequencer();
        let en_scratch = dir.path().join("en_us/sound_files/temp.mp3");
        let de_scratch = dir.path().join("de_de/sound_files/temp.mp3");

        let session = started_session(&seq.submit(AdviceRequest::new(["turn"], AdvicePriority::NAVIGATION)));
        assert!(en_scratch.exists());

        seq.clips_mut().set_language("de_de");
        assert!(seq.on_playback_complete(session).is_some());
        assert_eq!(seq.state(), PlayerState::Idle);
        assert!(!en_scratch.exists());

        // Next advice is written to the new language folder
        let session = started_session(&seq.submit(AdviceRequest::new(["turn"], AdvicePriority::NAVIGATION)));
        assert_eq!(seq.backend().last_source(), Some(&b"de_de"[..]));
        assert!(de_scratch.exists());
        seq.on_playback_complete(session);
        assert!(!de_scratch.exists());
    }

    #[test]
    fn test_language_switch_while_busy_removes_written_scratch_on_stop() {
        let (dir, mut seq) = store_sequencer();
        let en_scratch = dir.path().join("en_us/sound_files/temp.mp3");

        seq.submit(AdviceRequest::new(["turn"], AdvicePriority::NAVIGATION));
        assert!(en_scratch.exists());

        seq.clips_mut().set_language("de_de");
        assert!(seq.stop().is_some());
        assert!(!en_scratch.exists());
        assert!(!dir.path().join("de_de/sound_files/temp.mp3").exists());
    }

    #[test]
    fn test_stop_preserves_pending_without_promotion() {
        let (dir, mut seq) = sequencer();
        let first = AdviceRequest::new(["turn"], AdvicePriority::NAVIGATION);
        let session = started_session(&seq.submit(first.clone()));
        let queued = AdviceRequest::new(["left"], AdvicePriority::USER);
        seq.submit(queued.clone());

        assert_eq!(seq.stop(), Some(first));
        assert_eq!(seq.state(), PlayerState::Idle);
        assert_eq!(seq.pending(), Some(&queued));
        assert_eq!(seq.backend().calls.last(), Some(&Call::Stop));
        assert_eq!(seq.backend().starts(), 1);
        assert!(!dir.path().join("temp.mp3").exists());

        // A late completion for the stopped advice is ignored
        assert!(seq.on_playback_complete(session).is_none());
        assert_eq!(seq.state(), PlayerState::Idle);
        assert_eq!(seq.pending(), Some(&queued));

        // Stopping while idle is harmless
        assert!(seq.stop().is_none());
        assert_eq!(seq.state(), PlayerState::Idle);
    }

    #[test]
    fn test_stale_session_ignored_while_busy() {
        let (_dir, mut seq) = sequencer();
        let old = started_session(&seq.submit(AdviceRequest::new(["turn"], AdvicePriority::NAVIGATION)));
        seq.stop();

        let current = started_session(&seq.submit(AdviceRequest::new(["left"], AdvicePriority::NAVIGATION)));
        assert_ne!(old, current);

        assert!(seq.on_playback_complete(old).is_none());
        assert!(seq.on_playback_error(old, 1).is_none());
        assert_eq!(seq.state(), PlayerState::Busy);
        assert_eq!(seq.current_session(), Some(current));
    }

    #[test]
    fn test_no_valid_clips_stays_idle_without_scratch() {
        let (dir, mut seq) = sequencer();

        let request = AdviceRequest::new(["missing", "also-missing"], AdvicePriority::USER);
        assert_eq!(
            seq.submit(request.clone()),
            SubmitOutcome::Dropped {
                advice_id: request.id,
                reason: DropReason::NoValidClips
            }
        );
        assert_eq!(seq.state(), PlayerState::Idle);
        assert!(seq.backend().calls.is_empty());
        assert!(!dir.path().join("temp.mp3").exists());
    }

    #[test]
    fn test_unreadable_clips_are_skipped() {
        let (_dir, mut seq) = sequencer();

        let outcome = seq.submit(AdviceRequest::new(["turn", "missing", "right"], AdvicePriority::NAVIGATION));
        assert!(matches!(outcome, SubmitOutcome::Started { resolved_clips: 2, .. }));
        assert_eq!(seq.backend().last_source(), Some(&b"TURNRIGHT"[..]));
    }

    #[test]
    fn test_handoff_retried_once_after_reset() {
        let (_dir, mut seq) = sequencer();
        seq.backend_mut().refuse_set_source = 1;

        let outcome = seq.submit(AdviceRequest::new(["turn"], AdvicePriority::NAVIGATION));
        let session = started_session(&outcome);
        assert_eq!(
            seq.backend().calls,
            vec![
                Call::Reset,
                Call::SetSourceRefused,
                Call::Reset,
                Call::SetSource(b"TURN".to_vec()),
                Call::Prepare,
                Call::Start(session),
            ]
        );
        assert_eq!(seq.state(), PlayerState::Busy);
    }

    #[test]
    fn test_handoff_failure_returns_to_idle() {
        let (dir, mut seq) = sequencer();
        seq.backend_mut().refuse_set_source = 2;

        let request = AdviceRequest::new(["turn"], AdvicePriority::NAVIGATION);
        assert_eq!(
            seq.submit(request.clone()),
            SubmitOutcome::Dropped {
                advice_id: request.id,
                reason: DropReason::HandoffFailed
            }
        );
        assert_eq!(seq.state(), PlayerState::Idle);
        assert!(seq.active().is_none());
        assert!(!dir.path().join("temp.mp3").exists());

        // Prepare failures are fatal too
        seq.backend_mut().fail_prepare = true;
        assert!(matches!(
            seq.submit(AdviceRequest::new(["turn"], AdvicePriority::NAVIGATION)),
            SubmitOutcome::Dropped { reason: DropReason::HandoffFailed, .. }
        ));
        assert_eq!(seq.state(), PlayerState::Idle);

        // And the sequencer recovers once the backend behaves
        seq.backend_mut().fail_prepare = false;
        assert!(matches!(
            seq.submit(AdviceRequest::new(["turn"], AdvicePriority::NAVIGATION)),
            SubmitOutcome::Started { .. }
        ));
    }

    #[test]
    fn test_playback_error_treated_as_completion() {
        let (_dir, mut seq) = sequencer();
        let session = started_session(&seq.submit(AdviceRequest::new(["turn"], AdvicePriority::NAVIGATION)));
        let queued = AdviceRequest::new(["left"], AdvicePriority::SPEED_WARNING);
        seq.submit(queued.clone());

        let completion = seq.on_playback_error(session, -38).unwrap();
        assert_eq!(completion.finished.clips, vec!["turn"]);
        assert!(matches!(completion.next, Some(SubmitOutcome::Started { .. })));
        assert_eq!(seq.active(), Some(&queued));
        assert!(seq.pending().is_none());
    }

    #[test]
    fn test_promotion_while_muted_discards_pending() {
        let (_dir, mut seq) = sequencer();
        let session = started_session(&seq.submit(AdviceRequest::new(["turn"], AdvicePriority::NAVIGATION)));
        seq.submit(AdviceRequest::new(["left"], AdvicePriority::NAVIGATION));
        seq.mute();

        let completion = seq.on_playback_complete(session).unwrap();
        assert!(matches!(
            completion.next,
            Some(SubmitOutcome::Dropped { reason: DropReason::Muted, .. })
        ));
        assert_eq!(seq.state(), PlayerState::Idle);
        assert!(seq.pending().is_none());
    }
}
