use serde::{Deserialize, Serialize};

use crate::flow::flow_model::StepType;
use crate::selector::locator::Locator;

/// When the replay script checks step preconditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum PreconditionMode {
    /// Navigate to the first step's precondition URL once, before the loop
    #[default]
    StartOnly,
    /// Additionally wait for each step's precondition URL before it runs
    PerStep,
}

impl PreconditionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PreconditionMode::StartOnly => "start-only",
            PreconditionMode::PerStep => "per-step",
        }
    }
}

/// Replay runtime settings baked into the generated script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayConfig {
    #[serde(default)]
    pub precondition_mode: PreconditionMode,

    /// Fixed delay after every step
    #[serde(default = "default_step_delay")]
    pub step_delay_ms: u64,

    /// How long each candidate locator may take to become visible
    #[serde(default = "default_locator_timeout")]
    pub locator_timeout_ms: u64,

    /// Override file looked up next to the script
    #[serde(default = "default_data_file")]
    pub data_file: String,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            precondition_mode: PreconditionMode::default(),
            step_delay_ms: default_step_delay(),
            locator_timeout_ms: default_locator_timeout(),
            data_file: default_data_file(),
        }
    }
}

fn default_step_delay() -> u64 { 500 }
fn default_locator_timeout() -> u64 { 8000 }
fn default_data_file() -> String { "data.json".to_string() }

/// What the runtime does with a resolved element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ReplayAction {
    Click,
    /// selectOption on `<select>`, otherwise set the text value
    FillOrSelect { value: String },
    Press { key: String },
    /// Click, then press Enter
    ClickThenEnter,
    /// No element interaction; only wait on effects
    AwaitEffects,
}

impl ReplayAction {
    /// Dispatch table keyed by step type. Unknown types fall back to a click.
    pub fn for_step(step_type: &StepType, value: Option<String>, key: Option<String>) -> Self {
        match step_type {
            StepType::Navigate => ReplayAction::AwaitEffects,
            StepType::Input | StepType::Change => ReplayAction::FillOrSelect {
                value: value.unwrap_or_default(),
            },
            StepType::Keydown => ReplayAction::Press {
                key: key.unwrap_or_else(|| "Enter".to_string()),
            },
            StepType::Submit | StepType::Login | StepType::FillForm => ReplayAction::ClickThenEnter,
            StepType::Click
            | StepType::ClickSlot
            | StepType::DismissPopup
            | StepType::Focus
            | StepType::Other(_) => ReplayAction::Click,
        }
    }

    pub fn needs_element(&self) -> bool {
        !matches!(self, ReplayAction::AwaitEffects)
    }
}

/// One executable entry of a dry-run replay plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedStep {
    pub step_id: String,
    pub step_type: StepType,
    pub action: ReplayAction,

    /// Tried in order; empty for elementless actions
    pub candidates: Vec<Locator>,

    /// URL to wait for before the step (per-step mode only)
    pub wait_for_url_before: Option<String>,

    pub wait_for_visible_after: Option<String>,
    pub wait_for_url_after: Option<String>,

    /// Value came from the override file rather than the recording
    pub overridden: bool,
}

/// Dry-run view of what the generated script will do.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplayPlan {
    pub flow_name: String,
    pub start_url: Option<String>,
    pub precondition_mode: PreconditionMode,
    pub steps: Vec<PlannedStep>,

    /// Step ids removed by the replay-time filter
    pub skipped: Vec<String>,
    pub step_delay_ms: u64,
    pub locator_timeout_ms: u64,
}
