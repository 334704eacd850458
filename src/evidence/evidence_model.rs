use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Kind of DOM interaction captured by the recorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Click,
    Input,
    Change,
    Keydown,
    Submit,
    Navigate,
    Focus,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Click => "click",
            EventType::Input => "input",
            EventType::Change => "change",
            EventType::Keydown => "keydown",
            EventType::Submit => "submit",
            EventType::Navigate => "navigate",
            EventType::Focus => "focus",
        }
    }

    /// Text entry events carry a `value` param.
    pub fn is_text_entry(&self) -> bool {
        matches!(self, EventType::Input | EventType::Change)
    }

    /// Events that terminate a form interaction and flush buffered inputs.
    pub fn is_terminal(&self) -> bool {
        matches!(self, EventType::Submit | EventType::Keydown)
    }
}

/// One captured interaction. Produced by the capture layer, read-only here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceEvent {
    pub event_type: EventType,
    pub timestamp: u64,

    /// Page URL at capture time
    #[serde(default)]
    pub url: Option<String>,

    /// Nested-frame location, root first
    #[serde(default)]
    pub frame_path: Vec<String>,

    pub target: Option<TargetFingerprint>,

    #[serde(default)]
    pub context: ContextSnapshot,
}

impl EvidenceEvent {
    /// URL of the event, treating an empty string as absent.
    pub fn page_url(&self) -> Option<&str> {
        self.url.as_deref().filter(|u| !u.is_empty())
    }
}

/// Snapshot of the interacted element. `None` means "not observed".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetFingerprint {
    pub tag_name: Option<String>,
    pub input_type: Option<String>,
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub class_list: Vec<String>,
    #[serde(default)]
    pub data_attributes: BTreeMap<String, String>,
    pub aria_label: Option<String>,
    pub aria_labelledby: Option<String>,
    pub role: Option<String>,
    pub placeholder: Option<String>,
    pub title: Option<String>,
    pub inner_text: Option<String>,
    pub value: Option<String>,
    pub bounding_client_rect: Option<BoundingRect>,
    pub css_path: Option<String>,
    pub xpath: Option<String>,
}

impl TargetFingerprint {
    pub fn data_attribute(&self, key: &str) -> Option<&str> {
        self.data_attributes
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn is_password(&self) -> bool {
        self.input_type.as_deref() == Some("password")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Ancestry and nearby-label evidence for the target.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextSnapshot {
    /// Nearest ancestor first
    #[serde(default)]
    pub parent_chain: Vec<ParentSnapshot>,
    #[serde(default)]
    pub nearby_labels: Vec<String>,
}

impl ContextSnapshot {
    pub fn first_label(&self) -> Option<&str> {
        self.nearby_labels
            .first()
            .map(String::as_str)
            .filter(|l| !l.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentSnapshot {
    pub tag_name: String,
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub class_list: Vec<String>,
    pub role: Option<String>,
    pub text_snippet: Option<String>,
}

/// Borrow an optional string field, treating empty text as not observed.
pub fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}
