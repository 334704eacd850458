use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::{evidence::evidence_model::EventType, flow::flow_model::Step};

/// One segmentation decision, written as a JSONL record.
#[derive(Debug, Serialize)]
pub struct TraceEvent {
    pub timestamp_ms: u128,
    pub event_index: usize,
    pub event_type: String,

    pub field_key: Option<String>,
    pub decision: Option<String>,

    pub step_id: Option<String>,
    pub step_type: Option<String>,
}

impl TraceEvent {
    pub fn now(event_index: usize, event_type: EventType) -> Self {
        Self {
            timestamp_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or_default(),
            event_index,
            event_type: event_type.as_str().to_string(),
            field_key: None,
            decision: None,
            step_id: None,
            step_type: None,
        }
    }

    pub fn with_field(mut self, key: &str) -> Self {
        self.field_key = Some(key.to_string());
        self
    }

    pub fn with_decision(mut self, decision: impl ToString) -> Self {
        self.decision = Some(decision.to_string());
        self
    }

    pub fn with_step(mut self, step: &Step) -> Self {
        self.step_id = Some(step.id.clone());
        self.step_type = Some(step.step_type.to_string());
        self
    }
}
