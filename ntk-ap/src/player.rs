//! Advice player task
//!
//! Single owner of the [`AdviceSequencer`]. Commands from any number of
//! [`AdvicePlayerHandle`]s and notifications from the playback backend
//! arrive on channels and are applied one at a time, so the sequencer never
//! sees concurrent calls. Every transition is broadcast as an [`NtkEvent`].
//!
//! The task is a plain future ([`AdvicePlayer::run`]) so backends that are
//! not `Send` (audio streams on some platforms) can run it on the current
//! task; [`AdvicePlayer::spawn`] is the shortcut for `Send` backends.

use crate::backend::{BackendEvent, BackendEventReceiver, PlaybackBackend};
use crate::clips::ClipSource;
use crate::error::{Error, Result};
use crate::request::AdviceRequest;
use crate::sequencer::{AdviceSequencer, Completion, SubmitOutcome};
use chrono::Utc;
use ntk_common::events::{AdvicePriority, DropReason, EventBus, NtkEvent, PlayerState};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

/// Commands accepted by the player task
#[derive(Debug)]
pub enum AdviceCommand {
    Play(AdviceRequest),
    Stop,
    Mute,
    Unmute,
    SetLanguage(String),
    Status(oneshot::Sender<PlayerStatus>),
    Shutdown,
}

/// Snapshot of the player
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerStatus {
    pub state: PlayerState,
    pub muted: bool,
    /// Advice currently playing
    pub active: Option<Uuid>,
    /// Advice waiting in the pending slot, with its priority
    pub pending: Option<(Uuid, AdvicePriority)>,
}

/// Cloneable handle used to drive the player task
#[derive(Debug, Clone)]
pub struct AdvicePlayerHandle {
    tx: mpsc::UnboundedSender<AdviceCommand>,
}

impl AdvicePlayerHandle {
    /// Submit an advice; returns immediately with the advice id
    ///
    /// The outcome is reported on the event bus.
    pub fn play_advice<I, S>(&self, clips: I, priority: impl Into<AdvicePriority>) -> Result<Uuid>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.submit(AdviceRequest::new(clips, priority))
    }

    /// Submit a prepared request
    pub fn submit(&self, request: AdviceRequest) -> Result<Uuid> {
        let id = request.id;
        self.send(AdviceCommand::Play(request))?;
        Ok(id)
    }

    pub fn stop(&self) -> Result<()> {
        self.send(AdviceCommand::Stop)
    }

    pub fn mute(&self) -> Result<()> {
        self.send(AdviceCommand::Mute)
    }

    pub fn unmute(&self) -> Result<()> {
        self.send(AdviceCommand::Unmute)
    }

    /// Switch the voice language for subsequent advices
    pub fn set_language(&self, language: impl Into<String>) -> Result<()> {
        self.send(AdviceCommand::SetLanguage(language.into()))
    }

    pub async fn status(&self) -> Result<PlayerStatus> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(AdviceCommand::Status(reply_tx))?;
        reply_rx.await.map_err(|_| Error::PlayerClosed)
    }

    /// Stop playback and end the player task
    pub fn shutdown(&self) -> Result<()> {
        self.send(AdviceCommand::Shutdown)
    }

    fn send(&self, command: AdviceCommand) -> Result<()> {
        self.tx.send(command).map_err(|_| Error::PlayerClosed)
    }
}

/// Player task state
pub struct AdvicePlayer<C, B> {
    sequencer: AdviceSequencer<C, B>,
    commands: mpsc::UnboundedReceiver<AdviceCommand>,
    backend_events: BackendEventReceiver,
    event_bus: Arc<EventBus>,
}

impl<C: ClipSource, B: PlaybackBackend> AdvicePlayer<C, B> {
    pub fn new(
        sequencer: AdviceSequencer<C, B>,
        backend_events: BackendEventReceiver,
        event_bus: Arc<EventBus>,
    ) -> (Self, AdvicePlayerHandle) {
        let (tx, commands) = mpsc::unbounded_channel();
        let player = Self {
            sequencer,
            commands,
            backend_events,
            event_bus,
        };
        (player, AdvicePlayerHandle { tx })
    }

    /// Process commands and backend events until shutdown
    ///
    /// Ends on [`AdvicePlayerHandle::shutdown`] or when every handle is dropped.
    pub async fn run(mut self) {
        info!("Advice player started");

        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(AdviceCommand::Shutdown) | None => break,
                    Some(command) => self.handle_command(command),
                },
                Some(event) = self.backend_events.recv() => self.handle_backend_event(event),
            }
        }

        if self.sequencer.is_busy() {
            self.stop();
        }
        info!("Advice player stopped");
    }

    fn handle_command(&mut self, command: AdviceCommand) {
        match command {
            AdviceCommand::Play(request) => {
                let outcome = self.sequencer.submit(request);
                self.publish_outcome(outcome);
            }
            AdviceCommand::Stop => self.stop(),
            AdviceCommand::Mute => self.set_muted(true),
            AdviceCommand::Unmute => self.set_muted(false),
            AdviceCommand::SetLanguage(language) => {
                self.sequencer.clips_mut().set_language(&language);
            }
            AdviceCommand::Status(reply) => {
                let _ = reply.send(self.status());
            }
            // Handled by the run loop
            AdviceCommand::Shutdown => {}
        }
    }

    fn handle_backend_event(&mut self, event: BackendEvent) {
        debug!("Backend event: {:?}", event);

        let completion = match event {
            BackendEvent::Completed { session } => self.sequencer.on_playback_complete(session),
            BackendEvent::Failed { session, code } => {
                if let Some(active) = self.sequencer.active() {
                    if self.sequencer.current_session() == Some(session) {
                        self.event_bus.emit_lossy(NtkEvent::AdvicePlaybackFailed {
                            advice_id: active.id,
                            code,
                            timestamp: Utc::now(),
                        });
                    }
                }
                self.sequencer.on_playback_error(session, code)
            }
        };

        if let Some(Completion { finished, next }) = completion {
            self.event_bus.emit_lossy(NtkEvent::AdviceFinished {
                advice_id: finished.id,
                completed: matches!(event, BackendEvent::Completed { .. }),
                timestamp: Utc::now(),
            });
            if let Some(outcome) = next {
                self.publish_outcome(outcome);
            }
        }
    }

    fn stop(&mut self) {
        let stopped = self.sequencer.stop();
        self.event_bus.emit_lossy(NtkEvent::AdviceStopped {
            advice_id: stopped.map(|request| request.id),
            timestamp: Utc::now(),
        });
    }

    fn set_muted(&mut self, muted: bool) {
        if muted == self.sequencer.is_muted() {
            return;
        }
        if muted {
            self.sequencer.mute();
        } else {
            self.sequencer.unmute();
        }
        info!("Advice player {}", if muted { "muted" } else { "unmuted" });
        self.event_bus.emit_lossy(NtkEvent::MuteChanged {
            muted,
            timestamp: Utc::now(),
        });
    }

    fn status(&self) -> PlayerStatus {
        PlayerStatus {
            state: self.sequencer.state(),
            muted: self.sequencer.is_muted(),
            active: self.sequencer.active().map(|request| request.id),
            pending: self
                .sequencer
                .pending()
                .map(|request| (request.id, request.priority)),
        }
    }

    fn publish_outcome(&self, outcome: SubmitOutcome) {
        let timestamp = Utc::now();

        match outcome {
            SubmitOutcome::Started {
                advice_id,
                resolved_clips,
                ..
            } => {
                let (clips, priority) = self
                    .sequencer
                    .active()
                    .map(|request| (request.clips.clone(), request.priority))
                    .unwrap_or((Vec::new(), AdvicePriority::NAVIGATION));
                self.event_bus.emit_lossy(NtkEvent::AdviceStarted {
                    advice_id,
                    clips,
                    priority,
                    resolved_clips,
                    timestamp,
                });
            }
            SubmitOutcome::Queued {
                advice_id,
                replaced,
            } => {
                if let Some(replaced) = replaced {
                    self.event_bus.emit_lossy(NtkEvent::AdviceDropped {
                        advice_id: replaced,
                        reason: DropReason::Outranked,
                        timestamp,
                    });
                }
                let priority = self
                    .sequencer
                    .pending()
                    .map(|request| request.priority)
                    .unwrap_or(AdvicePriority::NAVIGATION);
                self.event_bus.emit_lossy(NtkEvent::AdviceQueued {
                    advice_id,
                    priority,
                    replaced,
                    timestamp,
                });
            }
            SubmitOutcome::Dropped { advice_id, reason } => {
                self.event_bus.emit_lossy(NtkEvent::AdviceDropped {
                    advice_id,
                    reason,
                    timestamp,
                });
            }
        }
    }
}

impl<C, B> AdvicePlayer<C, B>
where
    C: ClipSource + Send + 'static,
    B: PlaybackBackend + Send + 'static,
{
    /// Run the player on the tokio runtime
    pub fn spawn(
        sequencer: AdviceSequencer<C, B>,
        backend_events: BackendEventReceiver,
        event_bus: Arc<EventBus>,
    ) -> (AdvicePlayerHandle, JoinHandle<()>) {
        let (player, handle) = Self::new(sequencer, backend_events, event_bus);
        (handle, tokio::spawn(player.run()))
    }
}
