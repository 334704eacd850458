use serde::Serialize;

use crate::error::CompileError;
use crate::flow::flow_model::{Flow, Params, SelectorBundle, Step, StepEffect, StepPrecondition};
use crate::replay::replay_model::ReplayConfig;
use crate::selector::locator::LocatorSpec;

// ============================================================================
// Playwright replay script generation
// ============================================================================

const RUNTIME_TEMPLATE: &str = include_str!("replay_runtime.ts");

/// Step as embedded in the script: the persisted shape plus structured
/// locators, so the runtime never evaluates selector text as code.
#[derive(Debug, Serialize)]
struct RuntimeStep<'a> {
    id: &'a str,
    #[serde(rename = "type")]
    step_type: &'a str,
    selectors: &'a SelectorBundle,
    locators: Vec<LocatorSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    preconditions: Option<&'a StepPrecondition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    effects: Option<&'a StepEffect>,
    #[serde(skip_serializing_if = "Option::is_none")]
    params: Option<&'a Params>,
}

impl<'a> From<&'a Step> for RuntimeStep<'a> {
    fn from(step: &'a Step) -> Self {
        Self {
            id: &step.id,
            step_type: step.step_type.as_str(),
            selectors: &step.selectors,
            locators: step.selectors.candidates().map(|l| l.to_spec()).collect(),
            preconditions: step.preconditions.as_ref(),
            effects: step.effects.as_ref(),
            params: step.params.as_ref(),
        }
    }
}

/// Generate a self-contained Playwright script that replays `flow`.
///
/// The script embeds the steps verbatim together with a fixed runtime:
/// override merge, replay-time filter, candidate-by-candidate locator
/// resolution with a visibility timeout, and step dispatch.
pub fn generate_replay_script(flow: &Flow, config: &ReplayConfig) -> Result<String, CompileError> {
    let runtime_steps: Vec<RuntimeStep> = flow.steps.iter().map(RuntimeStep::from).collect();
    let steps_json =
        serde_json::to_string_pretty(&runtime_steps).map_err(|e| CompileError::JsonSerialize {
            context: format!("steps of flow '{}'", flow.name),
            source: e,
        })?;

    Ok(RUNTIME_TEMPLATE
        .replace("{{FLOW_NAME}}", &js_string(&flow.name))
        .replace("{{STEP_DELAY_MS}}", &config.step_delay_ms.to_string())
        .replace("{{LOCATOR_TIMEOUT_MS}}", &config.locator_timeout_ms.to_string())
        .replace("{{PRECONDITION_MODE}}", &js_string(config.precondition_mode.as_str()))
        .replace("{{DATA_FILE}}", &js_string(&format!("./{}", config.data_file)))
        .replace("{{STEPS}}", &steps_json))
}

fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}
