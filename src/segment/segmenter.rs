use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::evidence::evidence_model::{EventType, EvidenceEvent, present};
use crate::flow::flow_model::{
    ParamValue, Params, SelectorBundle, Step, StepEffect, StepPrecondition, StepType,
};
use crate::segment::classify::{InputWindow, classify_click};
use crate::selector::synthesizer::build_selector_bundle;
use crate::trace::logger::TraceLogger;
use crate::trace::trace::TraceEvent;

/// Tuning for the segmentation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmenterConfig {
    /// Upgrade steps to LOGIN / FILL_FORM / CLICK_SLOT / DISMISS_POPUP
    #[serde(default = "default_true")]
    pub classify: bool,

    /// How many recent input/change events feed terminal classification
    #[serde(default = "default_window")]
    pub window_size: usize,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            classify: true,
            window_size: default_window(),
        }
    }
}

fn default_true() -> bool { true }
fn default_window() -> usize { 10 }

/// Collapse an ordered event stream into replayable steps.
pub fn segment_events(events: &[EvidenceEvent], config: &SegmenterConfig) -> Vec<Step> {
    Segmenter::new(config, None).run(events)
}

/// Same as [`segment_events`], recording each decision to a trace file.
pub fn segment_events_traced(
    events: &[EvidenceEvent],
    config: &SegmenterConfig,
    tracer: &TraceLogger,
) -> Vec<Step> {
    Segmenter::new(config, Some(tracer)).run(events)
}

/// Field identity used to merge repeated edits: name, else id, else
/// placeholder, else tag name.
pub fn field_key(event: &EvidenceEvent) -> Option<&str> {
    let target = event.target.as_ref()?;
    present(&target.name)
        .or_else(|| present(&target.id))
        .or_else(|| present(&target.placeholder))
        .or_else(|| present(&target.tag_name))
}

// ============================================================================
// Single left-to-right pass
// ============================================================================

struct Segmenter<'a> {
    config: &'a SegmenterConfig,
    tracer: Option<&'a TraceLogger>,
    steps: Vec<Step>,
    /// Last input per field, most recently touched last
    pending: IndexMap<String, EvidenceEvent>,
    window: InputWindow,
}

impl<'a> Segmenter<'a> {
    fn new(config: &'a SegmenterConfig, tracer: Option<&'a TraceLogger>) -> Self {
        Self {
            config,
            tracer,
            steps: Vec::new(),
            pending: IndexMap::new(),
            window: InputWindow::new(config.window_size),
        }
    }

    fn run(mut self, events: &[EvidenceEvent]) -> Vec<Step> {
        for (index, event) in events.iter().enumerate() {
            self.process(index, event);
        }
        self.flush(events.len());

        debug!(
            events = events.len(),
            steps = self.steps.len(),
            "segmentation complete"
        );
        self.steps
    }

    fn process(&mut self, index: usize, event: &EvidenceEvent) {
        let key = field_key(event).map(str::to_string);

        if let (true, Some(key)) = (event.event_type.is_text_entry(), key.as_deref()) {
            let is_password = event.target.as_ref().is_some_and(|t| t.is_password());
            self.window.push(key, is_password);
        }

        let mut step_type = self.base_type(event);

        if event.event_type.is_terminal() {
            if self.config.classify {
                step_type = self.window.classify_terminal(step_type);
            }
            self.flush(index);
            self.window.clear();
        }

        match event.event_type {
            EventType::Input => {
                if let Some(key) = key {
                    self.trace(
                        TraceEvent::now(index, event.event_type)
                            .with_field(&key)
                            .with_decision("buffered"),
                    );
                    self.pending.shift_remove(&key);
                    self.pending.insert(key, event.clone());
                }
                return;
            }
            EventType::Change => {
                // A change supersedes a pending input on the same field.
                if let Some(key) = &key {
                    if self.pending.shift_remove(key).is_some() {
                        self.trace(
                            TraceEvent::now(index, event.event_type)
                                .with_field(key)
                                .with_decision("superseded"),
                        );
                    }
                }
            }
            _ => self.flush(index),
        }

        let step = self.emit(event, step_type);
        self.trace(
            TraceEvent::now(index, event.event_type)
                .with_decision("emitted")
                .with_step(&step),
        );
    }

    fn base_type(&self, event: &EvidenceEvent) -> StepType {
        match event.event_type {
            EventType::Click if self.config.classify => classify_click(event),
            EventType::Click => StepType::Click,
            EventType::Input => StepType::Input,
            EventType::Change => StepType::Change,
            EventType::Keydown => StepType::Keydown,
            EventType::Submit => StepType::Submit,
            EventType::Navigate => StepType::Navigate,
            EventType::Focus => StepType::Focus,
        }
    }

    /// Emit every buffered input, oldest-touched first, then empty the buffer.
    fn flush(&mut self, index: usize) {
        let pending = std::mem::take(&mut self.pending);
        for (key, event) in pending {
            let step = self.emit(&event, StepType::Input);
            self.trace(
                TraceEvent::now(index, event.event_type)
                    .with_field(&key)
                    .with_decision("flushed")
                    .with_step(&step),
            );
        }
    }

    fn emit(&mut self, event: &EvidenceEvent, step_type: StepType) -> Step {
        let is_navigation = event.event_type == EventType::Navigate;

        let selectors = if is_navigation {
            SelectorBundle::page()
        } else {
            build_selector_bundle(event)
        };

        let step = Step {
            id: format!("step-{}", self.steps.len() + 1),
            step_type,
            selectors,
            preconditions: event.page_url().map(|url| StepPrecondition {
                url_matches: Some(url.to_string()),
            }),
            effects: if is_navigation {
                event.page_url().map(|url| StepEffect {
                    url_matches: Some(url.to_string()),
                    element_visible: None,
                })
            } else {
                None
            },
            params: build_params(event),
        };

        self.steps.push(step.clone());
        step
    }

    fn trace(&self, event: TraceEvent) {
        if let Some(tracer) = self.tracer {
            tracer.log(&event);
        }
    }
}

fn build_params(event: &EvidenceEvent) -> Option<Params> {
    let mut params = Params::new();
    match event.event_type {
        EventType::Input | EventType::Change => {
            let value = event
                .target
                .as_ref()
                .and_then(|t| t.value.clone())
                .unwrap_or_default();
            params.insert("value".into(), ParamValue::Text(value));
        }
        EventType::Keydown => {
            params.insert("key".into(), ParamValue::from("Enter"));
        }
        _ => return None,
    }
    Some(params)
}
