use std::fmt;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::error::CompileError;
use crate::selector::locator::Locator;

/// Flow name used when the first event has no URL.
pub const DEFAULT_FLOW_NAME: &str = "workflow";

/// A compiled, named sequence of steps. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flow {
    pub name: String,
    pub steps: Vec<Step>,
}

impl Flow {
    /// Pretty JSON, the persisted `flow.json` shape.
    pub fn to_json(&self) -> Result<String, CompileError> {
        serde_json::to_string_pretty(self).map_err(|e| CompileError::JsonSerialize {
            context: format!("flow '{}'", self.name),
            source: e,
        })
    }

    pub fn from_json(raw: &str) -> Result<Self, CompileError> {
        serde_json::from_str(raw).map_err(|e| CompileError::JsonParse {
            context: "flow".into(),
            source: e,
        })
    }

    /// SHA-1 of the persisted encoding. Equal flows have equal digests.
    pub fn digest(&self) -> Result<String, CompileError> {
        use sha1::{Digest, Sha1};

        let json = self.to_json()?;
        let mut hasher = Sha1::new();
        hasher.update(json.as_bytes());
        Ok(format!("{:x}", hasher.finalize()))
    }
}

/// One replayable action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// `step-N`, assigned in emission order
    pub id: String,

    #[serde(rename = "type")]
    pub step_type: StepType,

    pub selectors: SelectorBundle,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preconditions: Option<StepPrecondition>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effects: Option<StepEffect>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Params>,
}

impl Step {
    pub fn param(&self, key: &str) -> Option<&ParamValue> {
        self.params.as_ref().and_then(|p| p.get(key))
    }

    pub fn precondition_url(&self) -> Option<&str> {
        self.preconditions
            .as_ref()
            .and_then(|p| p.url_matches.as_deref())
    }
}

pub type Params = IndexMap<String, ParamValue>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepPrecondition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_matches: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepEffect {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_matches: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_visible: Option<String>,
}

/// Scalar parameter value: string, number or boolean.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(b) => write!(f, "{}", b),
            ParamValue::Number(n) => write!(f, "{}", n),
            ParamValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

// ============================================================================
// Step type vocabulary
// ============================================================================

/// Step tag. Serialized as the upper-case tag; unknown tags round-trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StepType {
    Navigate,
    Click,
    Input,
    Change,
    Keydown,
    Submit,
    Focus,
    Login,
    FillForm,
    ClickSlot,
    DismissPopup,
    Other(String),
}

impl StepType {
    pub fn as_str(&self) -> &str {
        match self {
            StepType::Navigate => "NAVIGATE",
            StepType::Click => "CLICK",
            StepType::Input => "INPUT",
            StepType::Change => "CHANGE",
            StepType::Keydown => "KEYDOWN",
            StepType::Submit => "SUBMIT",
            StepType::Focus => "FOCUS",
            StepType::Login => "LOGIN",
            StepType::FillForm => "FILL_FORM",
            StepType::ClickSlot => "CLICK_SLOT",
            StepType::DismissPopup => "DISMISS_POPUP",
            StepType::Other(tag) => tag,
        }
    }

    pub fn is_text_entry(&self) -> bool {
        matches!(self, StepType::Input | StepType::Change)
    }
}

impl From<String> for StepType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "NAVIGATE" => StepType::Navigate,
            "CLICK" => StepType::Click,
            "INPUT" => StepType::Input,
            "CHANGE" => StepType::Change,
            "KEYDOWN" => StepType::Keydown,
            "SUBMIT" => StepType::Submit,
            "FOCUS" => StepType::Focus,
            "LOGIN" => StepType::Login,
            "FILL_FORM" => StepType::FillForm,
            "CLICK_SLOT" => StepType::ClickSlot,
            "DISMISS_POPUP" => StepType::DismissPopup,
            _ => StepType::Other(tag),
        }
    }
}

impl From<StepType> for String {
    fn from(step_type: StepType) -> Self {
        step_type.as_str().to_string()
    }
}

impl fmt::Display for StepType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Selector bundle
// ============================================================================

/// Ranked element locators: the primary candidate plus ordered fallbacks.
///
/// Never empty and never contains the same expression twice.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SelectorBundle {
    pub primary: Locator,
    #[serde(default)]
    pub fallbacks: Vec<Locator>,
}

impl SelectorBundle {
    /// Bundle for an elementless event.
    pub fn page() -> Self {
        Self {
            primary: Locator::Page,
            fallbacks: Vec::new(),
        }
    }

    /// Deduplicate by expression, keeping first appearance. The first
    /// survivor becomes primary; an empty list degrades to the page.
    pub fn from_candidates(candidates: Vec<Locator>) -> Self {
        let mut seen: IndexSet<String> = IndexSet::new();
        let mut unique = candidates
            .into_iter()
            .filter(|c| seen.insert(c.to_expression()));

        match unique.next() {
            Some(primary) => Self {
                primary,
                fallbacks: unique.collect(),
            },
            None => Self::page(),
        }
    }

    /// Primary followed by fallbacks, in resolution order.
    pub fn candidates(&self) -> impl Iterator<Item = &Locator> {
        std::iter::once(&self.primary).chain(self.fallbacks.iter())
    }

    pub fn is_page(&self) -> bool {
        self.primary.is_page() && self.fallbacks.is_empty()
    }
}
