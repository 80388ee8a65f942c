//! Advice requests

use ntk_common::events::AdvicePriority;
use uuid::Uuid;

/// One utterance: clip names in playback order plus a priority
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdviceRequest {
    /// Correlates events for this advice
    pub id: Uuid,
    /// Clip names, resolved by the clip source (e.g. `["turn", "left"]`)
    pub clips: Vec<String>,
    pub priority: AdvicePriority,
}

impl AdviceRequest {
    pub fn new<I, S>(clips: I, priority: impl Into<AdvicePriority>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: Uuid::new_v4(),
            clips: clips.into_iter().map(Into::into).collect(),
            priority: priority.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }
}
