use workflow_extractor::{
    evidence::evidence_model::{ContextSnapshot, EventType, EvidenceEvent, TargetFingerprint},
    flow::flow_model::{ParamValue, Params, SelectorBundle, Step, StepPrecondition, StepType},
    selector::locator::Locator,
};

pub const PAGE: &str = "https://example.com/login";

// =========================================================================
// Evidence events
// =========================================================================

pub fn event(event_type: EventType, target: Option<TargetFingerprint>) -> EvidenceEvent {
    EvidenceEvent {
        event_type,
        timestamp: 0,
        url: Some(PAGE.into()),
        frame_path: Vec::new(),
        target,
        context: ContextSnapshot::default(),
    }
}

/// A plain text input identified by its `name` attribute.
pub fn field(name: &str) -> TargetFingerprint {
    TargetFingerprint {
        tag_name: Some("input".into()),
        input_type: Some("text".into()),
        name: Some(name.into()),
        ..Default::default()
    }
}

pub fn with_value(mut target: TargetFingerprint, value: &str) -> TargetFingerprint {
    target.value = Some(value.into());
    target
}

pub fn typed(name: &str, value: &str) -> EvidenceEvent {
    event(EventType::Input, Some(with_value(field(name), value)))
}

pub fn changed(name: &str, value: &str) -> EvidenceEvent {
    event(EventType::Change, Some(with_value(field(name), value)))
}

pub fn password(name: &str, value: &str) -> EvidenceEvent {
    let mut target = with_value(field(name), value);
    target.input_type = Some("password".into());
    event(EventType::Input, Some(target))
}

pub fn button_target(text: &str) -> TargetFingerprint {
    TargetFingerprint {
        tag_name: Some("button".into()),
        inner_text: Some(text.into()),
        ..Default::default()
    }
}

pub fn button(text: &str) -> EvidenceEvent {
    event(EventType::Click, Some(button_target(text)))
}

pub fn focus(text: &str) -> EvidenceEvent {
    event(EventType::Focus, Some(button_target(text)))
}

pub fn submit() -> EvidenceEvent {
    event(
        EventType::Submit,
        Some(TargetFingerprint {
            tag_name: Some("form".into()),
            id: Some("login-form".into()),
            ..Default::default()
        }),
    )
}

pub fn enter(name: &str) -> EvidenceEvent {
    event(EventType::Keydown, Some(field(name)))
}

pub fn navigate(url: &str) -> EvidenceEvent {
    EvidenceEvent {
        url: Some(url.into()),
        ..event(EventType::Navigate, None)
    }
}

pub fn login_events() -> Vec<EvidenceEvent> {
    vec![
        typed("email", "a@b.com"),
        password("password", "secret"),
        submit(),
    ]
}

// =========================================================================
// Steps
// =========================================================================

pub fn step(id: &str, step_type: StepType, primary: Locator) -> Step {
    Step {
        id: id.into(),
        step_type,
        selectors: SelectorBundle {
            primary,
            fallbacks: Vec::new(),
        },
        preconditions: Some(StepPrecondition {
            url_matches: Some(PAGE.into()),
        }),
        effects: None,
        params: None,
    }
}

pub fn input_step(id: &str, primary: Locator, value: &str) -> Step {
    let mut params = Params::new();
    params.insert("value".into(), ParamValue::from(value));
    Step {
        params: Some(params),
        ..step(id, StepType::Input, primary)
    }
}

pub fn on_page(mut step: Step, url: &str) -> Step {
    step.preconditions = Some(StepPrecondition {
        url_matches: Some(url.into()),
    });
    step
}

pub fn types(steps: &[Step]) -> Vec<StepType> {
    steps.iter().map(|s| s.step_type.clone()).collect()
}

pub fn value_of(step: &Step) -> Option<String> {
    step.param("value").map(|v| v.to_string())
}
