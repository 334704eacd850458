use crate::flow::flow_model::{Step, StepType};

/// Drop steps that are redundant at replay time. The compiled flow itself
/// is left untouched; this returns the subset to execute.
///
/// - FOCUS followed by CLICK/LOGIN on an identical selector bundle
/// - SUBMIT preceded by CLICK on an identical bundle or the same page URL
pub fn filter_replay_steps(steps: &[Step]) -> Vec<&Step> {
    steps
        .iter()
        .enumerate()
        .filter(|(index, step)| {
            let next = steps.get(index + 1);
            let previous = index.checked_sub(1).and_then(|i| steps.get(i));
            !is_redundant_focus(step, next) && !is_redundant_submit(step, previous)
        })
        .map(|(_, step)| step)
        .collect()
}

fn is_redundant_focus(step: &Step, next: Option<&Step>) -> bool {
    if step.step_type != StepType::Focus {
        return false;
    }

    next.is_some_and(|next| {
        matches!(next.step_type, StepType::Click | StepType::Login)
            && next.selectors == step.selectors
    })
}

fn is_redundant_submit(step: &Step, previous: Option<&Step>) -> bool {
    if step.step_type != StepType::Submit {
        return false;
    }

    previous.is_some_and(|previous| {
        previous.step_type == StepType::Click
            && (previous.selectors == step.selectors
                || previous.precondition_url() == step.precondition_url())
    })
}
