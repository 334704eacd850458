use crate::replay::replay_model::{PlannedStep, ReplayAction, ReplayPlan};

// ============================================================================
// Console reporter: formatted terminal output for a replay plan
// ============================================================================

/// Format a replay plan for terminal output.
///
/// Produces output like:
/// ```text
/// === Replay Plan: example.com ===
/// Start: https://example.com/login (precondition mode: start-only)
///
/// [step-1] INPUT       fill "a@b.com"
///     -> getByTestId("email")
///     -> locator("#email")
/// [step-3] LOGIN       click + Enter
///
/// Skipped: step-2
/// === 2 steps to run, 1 skipped (locator timeout 8000ms, step delay 500ms) ===
/// ```
pub fn format_replay_plan(plan: &ReplayPlan) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== Replay Plan: {} ===\n", plan.flow_name));
    match &plan.start_url {
        Some(url) => out.push_str(&format!(
            "Start: {} (precondition mode: {})\n\n",
            url,
            plan.precondition_mode.as_str()
        )),
        None => out.push_str(&format!(
            "Start: current page (precondition mode: {})\n\n",
            plan.precondition_mode.as_str()
        )),
    }

    for step in &plan.steps {
        out.push_str(&format_step(step));
    }

    if !plan.skipped.is_empty() {
        out.push_str(&format!("\nSkipped: {}\n", plan.skipped.join(", ")));
    }

    out.push_str(&format!(
        "=== {} steps to run, {} skipped (locator timeout {}ms, step delay {}ms) ===\n",
        plan.steps.len(),
        plan.skipped.len(),
        plan.locator_timeout_ms,
        plan.step_delay_ms
    ));

    out
}

fn format_step(step: &PlannedStep) -> String {
    let mut out = format!(
        "[{}] {:<13} {}{}\n",
        step.step_id,
        step.step_type.as_str(),
        describe_action(&step.action),
        if step.overridden { " (override)" } else { "" }
    );

    if let Some(url) = &step.wait_for_url_before {
        out.push_str(&format!("    requires url {}\n", url));
    }
    for candidate in &step.candidates {
        out.push_str(&format!("    -> {}\n", candidate));
    }
    if let Some(selector) = &step.wait_for_visible_after {
        out.push_str(&format!("    then wait visible {}\n", selector));
    }
    if let Some(url) = &step.wait_for_url_after {
        out.push_str(&format!("    then wait url {}\n", url));
    }

    out
}

fn describe_action(action: &ReplayAction) -> String {
    match action {
        ReplayAction::Click => "click".to_string(),
        ReplayAction::FillOrSelect { value } => format!("fill {:?}", value),
        ReplayAction::Press { key } => format!("press {}", key),
        ReplayAction::ClickThenEnter => "click + Enter".to_string(),
        ReplayAction::AwaitEffects => "await effects".to_string(),
    }
}
