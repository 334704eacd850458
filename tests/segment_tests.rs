use workflow_extractor::{
    evidence::evidence_model::{EventType, TargetFingerprint},
    flow::flow_model::{ParamValue, StepType},
    segment::{
        classify::{InputWindow, classify_click},
        segmenter::{SegmenterConfig, field_key, segment_events, segment_events_traced},
    },
    selector::locator::Locator,
    trace::logger::TraceLogger,
};

use crate::common::builders::{
    PAGE, button, button_target, changed, enter, event, field, focus, login_events, navigate,
    password, submit, typed, types, value_of,
};

mod common;

fn no_classify() -> SegmenterConfig {
    SegmenterConfig {
        classify: false,
        ..SegmenterConfig::default()
    }
}

// =========================================================================
// Input buffering
// =========================================================================

#[test]
fn login_sequence_becomes_two_inputs_and_login() {
    let steps = segment_events(&login_events(), &SegmenterConfig::default());

    assert_eq!(
        types(&steps),
        vec![StepType::Input, StepType::Input, StepType::Login]
    );
    assert_eq!(value_of(&steps[0]).as_deref(), Some("a@b.com"));
    assert_eq!(value_of(&steps[1]).as_deref(), Some("secret"));
    assert_eq!(steps[2].selectors.primary, Locator::Id("login-form".into()));
    assert_eq!(steps[2].params, None, "Submit carries no params");
}

#[test]
fn step_ids_are_contiguous_from_one() {
    let events = vec![
        navigate(PAGE),
        typed("email", "a@b.com"),
        button("Next"),
        password("password", "secret"),
        submit(),
        button("Close"),
    ];

    let steps = segment_events(&events, &SegmenterConfig::default());
    let ids: Vec<&str> = steps.iter().map(|s| s.id.as_str()).collect();

    assert_eq!(
        ids,
        vec!["step-1", "step-2", "step-3", "step-4", "step-5", "step-6"]
    );
}

#[test]
fn keyless_input_does_not_count_toward_form_classification() {
    let events = vec![
        event(EventType::Input, None),
        typed("email", "a@b.com"),
        submit(),
    ];

    let steps = segment_events(&events, &SegmenterConfig::default());

    assert_eq!(types(&steps), vec![StepType::Input, StepType::Submit]);
}

#[test]
fn repeated_input_keeps_only_last_value() {
    let events = vec![typed("q", "r"), typed("q", "ru"), typed("q", "rust")];

    let steps = segment_events(&events, &SegmenterConfig::default());

    assert_eq!(steps.len(), 1, "Buffered input flushes once at stream end");
    assert_eq!(steps[0].step_type, StepType::Input);
    assert_eq!(value_of(&steps[0]).as_deref(), Some("rust"));
}

#[test]
fn change_supersedes_pending_input_on_same_field() {
    let events = vec![typed("country", "U"), changed("country", "US")];

    let steps = segment_events(&events, &SegmenterConfig::default());

    assert_eq!(types(&steps), vec![StepType::Change]);
    assert_eq!(value_of(&steps[0]).as_deref(), Some("US"));
}

#[test]
fn change_does_not_flush_other_fields() {
    let events = vec![
        typed("email", "a@b.com"),
        changed("country", "US"),
        button("Next"),
    ];

    let steps = segment_events(&events, &SegmenterConfig::default());

    assert_eq!(
        types(&steps),
        vec![StepType::Change, StepType::Input, StepType::Click],
        "Email stays buffered until the click"
    );
    assert_eq!(value_of(&steps[1]).as_deref(), Some("a@b.com"));
}

#[test]
fn touching_a_field_again_moves_it_to_the_back() {
    let events = vec![
        typed("a", "1"),
        typed("b", "2"),
        typed("a", "3"),
        button("Next"),
    ];

    let steps = segment_events(&events, &SegmenterConfig::default());

    assert_eq!(
        types(&steps),
        vec![StepType::Input, StepType::Input, StepType::Click]
    );
    assert_eq!(steps[0].selectors.primary, Locator::Name("b".into()));
    assert_eq!(value_of(&steps[0]).as_deref(), Some("2"));
    assert_eq!(steps[1].selectors.primary, Locator::Name("a".into()));
    assert_eq!(value_of(&steps[1]).as_deref(), Some("3"));
}

#[test]
fn input_without_observed_value_records_empty_string() {
    let events = vec![event(EventType::Input, Some(field("email")))];

    let steps = segment_events(&events, &SegmenterConfig::default());

    assert_eq!(
        steps[0].param("value"),
        Some(&ParamValue::Text(String::new()))
    );
}

#[test]
fn empty_stream_produces_no_steps() {
    assert!(segment_events(&[], &SegmenterConfig::default()).is_empty());
}

// =========================================================================
// Non-buffered events
// =========================================================================

#[test]
fn navigation_targets_the_page_and_expects_its_url() {
    let url = "https://example.com/home";
    let steps = segment_events(&[navigate(url)], &SegmenterConfig::default());

    let step = &steps[0];
    assert_eq!(step.step_type, StepType::Navigate);
    assert!(step.selectors.is_page());
    assert_eq!(step.precondition_url(), Some(url));
    assert_eq!(
        step.effects.as_ref().and_then(|e| e.url_matches.as_deref()),
        Some(url)
    );
}

#[test]
fn keydown_records_enter_key() {
    let events = vec![typed("q", "rust"), enter("q")];

    let steps = segment_events(&events, &SegmenterConfig::default());

    assert_eq!(types(&steps), vec![StepType::Input, StepType::Keydown]);
    assert_eq!(steps[1].param("key"), Some(&ParamValue::from("Enter")));
}

#[test]
fn focus_is_emitted_as_its_own_step() {
    let events = vec![focus("Sign in"), button("Sign in")];

    let steps = segment_events(&events, &SegmenterConfig::default());

    assert_eq!(types(&steps), vec![StepType::Focus, StepType::Click]);
    assert_eq!(steps[0].selectors, steps[1].selectors);
}

#[test]
fn missing_url_means_no_precondition() {
    let mut click = button("Go");
    click.url = None;

    let steps = segment_events(&[click], &SegmenterConfig::default());

    assert_eq!(steps[0].preconditions, None);
}

// =========================================================================
// Classification
// =========================================================================

#[test]
fn clicks_are_classified_by_text_and_class() {
    let mut slot = button_target("Pick");
    slot.class_list = vec!["btn".into(), "Time-Slot".into()];

    let events = vec![
        button("Close"),
        button("10:30 AM"),
        event(EventType::Click, Some(slot)),
        button("Next"),
        button("x"),
    ];

    let steps = segment_events(&events, &SegmenterConfig::default());

    assert_eq!(
        types(&steps),
        vec![
            StepType::DismissPopup,
            StepType::ClickSlot,
            StepType::ClickSlot,
            StepType::Click,
            StepType::DismissPopup,
        ]
    );
}

#[test]
fn classify_click_ignores_substrings() {
    assert_eq!(classify_click(&button("Closet organizer")), StepType::Click);
    assert_eq!(classify_click(&button("Export")), StepType::Click);
    assert_eq!(classify_click(&button("Book 9:05pm")), StepType::ClickSlot);
}

#[test]
fn multi_field_without_password_is_fill_form() {
    let events = vec![typed("first", "Ada"), typed("last", "Lovelace"), enter("last")];

    let steps = segment_events(&events, &SegmenterConfig::default());

    assert_eq!(
        types(&steps),
        vec![StepType::Input, StepType::Input, StepType::FillForm]
    );
    assert_eq!(steps[2].param("key"), Some(&ParamValue::from("Enter")));
}

#[test]
fn single_field_submit_stays_submit() {
    let events = vec![typed("q", "rust"), submit()];

    let steps = segment_events(&events, &SegmenterConfig::default());

    assert_eq!(types(&steps), vec![StepType::Input, StepType::Submit]);
}

#[test]
fn window_is_cleared_after_each_terminal_event() {
    let mut events = login_events();
    events.push(typed("q", "rust"));
    events.push(submit());

    let steps = segment_events(&events, &SegmenterConfig::default());

    assert_eq!(
        types(&steps),
        vec![
            StepType::Input,
            StepType::Input,
            StepType::Login,
            StepType::Input,
            StepType::Submit,
        ]
    );
}

#[test]
fn disabling_classification_keeps_generic_types() {
    let mut events = login_events();
    events.push(button("Close"));
    events.push(button("9:00"));

    let steps = segment_events(&events, &no_classify());

    assert_eq!(
        types(&steps),
        vec![
            StepType::Input,
            StepType::Input,
            StepType::Submit,
            StepType::Click,
            StepType::Click,
        ]
    );
}

#[test]
fn input_window_evicts_oldest_entries() {
    let mut window = InputWindow::new(2);
    window.push("password", true);
    window.push("first", false);
    window.push("last", false);

    assert_eq!(window.distinct_fields(), 2);
    assert_eq!(
        window.classify_terminal(StepType::Submit),
        StepType::FillForm,
        "Evicted password entry no longer counts"
    );

    window.clear();
    assert_eq!(window.classify_terminal(StepType::Submit), StepType::Submit);
}

// =========================================================================
// Field identity, determinism, tracing
// =========================================================================

#[test]
fn field_key_prefers_name_then_id_then_placeholder_then_tag() {
    let key = |target: TargetFingerprint| {
        let evidence = event(EventType::Input, Some(target));
        field_key(&evidence).map(str::to_string)
    };

    let full = TargetFingerprint {
        tag_name: Some("input".into()),
        name: Some("n".into()),
        id: Some("i".into()),
        placeholder: Some("p".into()),
        ..Default::default()
    };
    assert_eq!(key(full.clone()).as_deref(), Some("n"));

    let no_name = TargetFingerprint {
        name: None,
        ..full.clone()
    };
    assert_eq!(key(no_name.clone()).as_deref(), Some("i"));

    let placeholder_only = TargetFingerprint {
        id: Some(String::new()),
        ..no_name
    };
    assert_eq!(key(placeholder_only).as_deref(), Some("p"));

    let tag_only = TargetFingerprint {
        tag_name: Some("textarea".into()),
        ..Default::default()
    };
    assert_eq!(key(tag_only).as_deref(), Some("textarea"));

    assert_eq!(field_key(&event(EventType::Input, None)), None);
}

#[test]
fn segmentation_is_deterministic() {
    let events = vec![
        navigate(PAGE),
        typed("email", "a@b.com"),
        changed("plan", "pro"),
        password("password", "secret"),
        submit(),
        button("10:30"),
    ];

    let first = segment_events(&events, &SegmenterConfig::default());
    let second = segment_events(&events, &SegmenterConfig::default());

    assert_eq!(first, second);
}

#[test]
fn traced_segmentation_writes_one_record_per_decision() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trace.jsonl");
    let tracer = TraceLogger::new(path.to_str().unwrap());
    assert!(tracer.is_enabled());

    let traced = segment_events_traced(&login_events(), &SegmenterConfig::default(), &tracer);
    assert_eq!(traced, segment_events(&login_events(), &SegmenterConfig::default()));

    let raw = std::fs::read_to_string(&path).unwrap();
    let decisions: Vec<String> = raw
        .lines()
        .map(|line| {
            let record: serde_json::Value = serde_json::from_str(line).unwrap();
            record["decision"].as_str().unwrap().to_string()
        })
        .collect();

    assert_eq!(
        decisions,
        vec!["buffered", "buffered", "flushed", "flushed", "emitted"]
    );
}

#[test]
fn disabled_tracer_changes_nothing() {
    let tracer = TraceLogger::disabled();
    assert!(!tracer.is_enabled());

    let steps = segment_events_traced(&login_events(), &SegmenterConfig::default(), &tracer);
    assert_eq!(types(&steps), vec![StepType::Input, StepType::Input, StepType::Login]);
}
