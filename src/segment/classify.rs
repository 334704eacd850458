use std::collections::{HashSet, VecDeque};
use std::sync::LazyLock;

use regex::Regex;

use crate::evidence::evidence_model::EvidenceEvent;
use crate::flow::flow_model::StepType;
use crate::selector::synthesizer::accessible_name;

static DISMISS_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(close|dismiss|cancel|x)\b").expect("valid regex"));
static TIME_OF_DAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b\d{1,2}:\d{2}\s*(am|pm)?\b").expect("valid regex"));

/// Reclassify a click from the element's accessible text and classes.
pub fn classify_click(event: &EvidenceEvent) -> StepType {
    if let Some(text) = accessible_name(event) {
        if DISMISS_TEXT.is_match(text) {
            return StepType::DismissPopup;
        }
        if TIME_OF_DAY.is_match(text) {
            return StepType::ClickSlot;
        }
    }

    let slot_class = event.target.as_ref().is_some_and(|t| {
        t.class_list
            .iter()
            .any(|c| c.to_lowercase().contains("slot"))
    });
    if slot_class {
        return StepType::ClickSlot;
    }

    StepType::Click
}

/// Bounded window of recent text-entry events, used only for classifying
/// the step that terminates a form interaction.
#[derive(Debug, Clone)]
pub struct InputWindow {
    capacity: usize,
    entries: VecDeque<WindowEntry>,
}

#[derive(Debug, Clone)]
struct WindowEntry {
    field_key: String,
    is_password: bool,
}

impl InputWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: VecDeque::new(),
        }
    }

    pub fn push(&mut self, field_key: &str, is_password: bool) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(WindowEntry {
            field_key: field_key.to_string(),
            is_password,
        });
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn distinct_fields(&self) -> usize {
        self.entries
            .iter()
            .map(|e| e.field_key.as_str())
            .collect::<HashSet<_>>()
            .len()
    }

    /// Upgrade a SUBMIT/KEYDOWN tag once two or more distinct fields were
    /// touched: LOGIN if any was a password field, else FILL_FORM.
    pub fn classify_terminal(&self, base: StepType) -> StepType {
        if self.distinct_fields() < 2 {
            return base;
        }
        if self.entries.iter().any(|e| e.is_password) {
            StepType::Login
        } else {
            StepType::FillForm
        }
    }
}
