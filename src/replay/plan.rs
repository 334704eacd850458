use std::collections::HashSet;

use crate::flow::flow_model::Flow;
use crate::flow::input_template::{InputOverrides, apply_overrides};
use crate::replay::replay_filter::filter_replay_steps;
use crate::replay::replay_model::{PlannedStep, PreconditionMode, ReplayAction, ReplayConfig, ReplayPlan};

/// Build the dry-run plan the generated script would execute: overrides
/// merged, redundant steps filtered, each step mapped to its action.
pub fn build_replay_plan(flow: &Flow, overrides: &InputOverrides, config: &ReplayConfig) -> ReplayPlan {
    let merged = apply_overrides(&flow.steps, overrides);
    let to_run = filter_replay_steps(&merged);

    let kept: HashSet<&str> = to_run.iter().map(|s| s.id.as_str()).collect();
    let skipped = merged
        .iter()
        .filter(|s| !kept.contains(s.id.as_str()))
        .map(|s| s.id.clone())
        .collect();

    let steps = to_run
        .iter()
        .map(|step| {
            let overridden = flow
                .steps
                .iter()
                .find(|orig| orig.id == step.id)
                .is_some_and(|orig| orig.param("value") != step.param("value"));

            let action = ReplayAction::for_step(
                &step.step_type,
                step.param("value").map(|v| v.to_string()),
                step.param("key").map(|v| v.to_string()),
            );

            let candidates = if action.needs_element() {
                step.selectors.candidates().cloned().collect()
            } else {
                Vec::new()
            };

            let effects = step.effects.as_ref();
            PlannedStep {
                step_id: step.id.clone(),
                step_type: step.step_type.clone(),
                action,
                candidates,
                wait_for_url_before: match config.precondition_mode {
                    PreconditionMode::PerStep => step.precondition_url().map(str::to_string),
                    PreconditionMode::StartOnly => None,
                },
                wait_for_visible_after: effects.and_then(|e| e.element_visible.clone()),
                wait_for_url_after: effects.and_then(|e| e.url_matches.clone()),
                overridden,
            }
        })
        .collect();

    ReplayPlan {
        flow_name: flow.name.clone(),
        start_url: to_run
            .first()
            .and_then(|s| s.precondition_url())
            .map(str::to_string),
        precondition_mode: config.precondition_mode,
        steps,
        skipped,
        step_delay_ms: config.step_delay_ms,
        locator_timeout_ms: config.locator_timeout_ms,
    }
}
