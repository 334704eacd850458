use serde::{Deserialize, Serialize};

use crate::evidence::evidence_model::EvidenceEvent;

/// Lifecycle of a capture session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    Recording,
    Stopped,
}

/// Status reported back to the capture UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecorderStatus {
    pub is_recording: bool,
    pub count: usize,
}

/// An explicit recording session owned by the capture layer.
///
/// Events are only accepted while recording. Stopping keeps the buffer so it
/// can be exported; `clear` empties it without touching the lifecycle state.
#[derive(Debug, Clone)]
pub struct RecordingSession {
    state: SessionState,
    events: Vec<EvidenceEvent>,
}

impl Default for RecordingSession {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingSession {
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
            events: Vec::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn start(&mut self) -> RecorderStatus {
        self.state = SessionState::Recording;
        self.status()
    }

    pub fn stop(&mut self) -> RecorderStatus {
        if self.state == SessionState::Recording {
            self.state = SessionState::Stopped;
        }
        self.status()
    }

    pub fn clear(&mut self) -> RecorderStatus {
        self.events.clear();
        self.status()
    }

    /// Append an event. Returns whether it was accepted.
    pub fn record(&mut self, event: EvidenceEvent) -> bool {
        if self.state != SessionState::Recording {
            return false;
        }
        self.events.push(event);
        true
    }

    pub fn status(&self) -> RecorderStatus {
        RecorderStatus {
            is_recording: self.state == SessionState::Recording,
            count: self.events.len(),
        }
    }

    /// The finished, ordered event list handed to the compiler.
    pub fn export(&self) -> Vec<EvidenceEvent> {
        self.events.clone()
    }
}
