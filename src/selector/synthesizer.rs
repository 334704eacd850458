use crate::evidence::evidence_model::{EvidenceEvent, TargetFingerprint, present};
use crate::flow::flow_model::SelectorBundle;
use crate::selector::locator::Locator;

/// Build a ranked selector bundle for one event.
///
/// Candidates are gathered in decreasing order of robustness:
/// test attributes, role + accessible name, label, placeholder, id, name,
/// inner text, CSS path, XPath. Later duplicates are dropped. An event
/// without a target resolves to the page itself.
pub fn build_selector_bundle(event: &EvidenceEvent) -> SelectorBundle {
    let target = match &event.target {
        Some(t) => t,
        None => return SelectorBundle::page(),
    };

    let mut candidates = test_attribute_locators(target);

    if let (Some(role), Some(name)) = (resolve_role(target), accessible_name(event)) {
        candidates.push(Locator::Role {
            role: role.to_string(),
            name: name.to_string(),
        });
    }

    if let Some(label) = event.context.first_label() {
        candidates.push(Locator::Label(label.to_string()));
    }
    if let Some(placeholder) = present(&target.placeholder) {
        candidates.push(Locator::Placeholder(placeholder.to_string()));
    }
    if let Some(id) = present(&target.id) {
        candidates.push(Locator::Id(id.to_string()));
    }
    if let Some(name) = present(&target.name) {
        candidates.push(Locator::Name(name.to_string()));
    }
    if let Some(text) = present(&target.inner_text) {
        candidates.push(Locator::Text(text.to_string()));
    }
    if let Some(path) = present(&target.css_path) {
        candidates.push(Locator::css(path));
    }
    if let Some(xpath) = present(&target.xpath) {
        candidates.push(Locator::XPath(xpath.to_string()));
    }

    SelectorBundle::from_candidates(candidates)
}

fn test_attribute_locators(target: &TargetFingerprint) -> Vec<Locator> {
    let mut locators = Vec::new();
    if let Some(v) = target.data_attribute("data-testid") {
        locators.push(Locator::TestId(v.to_string()));
    }
    if let Some(v) = target.data_attribute("data-test") {
        locators.push(Locator::DataTest(v.to_string()));
    }
    if let Some(v) = target.data_attribute("data-cy") {
        locators.push(Locator::DataCy(v.to_string()));
    }
    locators
}

/// Explicit ARIA role, else the implicit role of a few common elements.
pub fn resolve_role(target: &TargetFingerprint) -> Option<&str> {
    if let Some(role) = present(&target.role) {
        return Some(role);
    }

    match present(&target.tag_name)? {
        "button" => Some("button"),
        "a" => Some("link"),
        "input" if target.input_type.as_deref() == Some("checkbox") => Some("checkbox"),
        _ => None,
    }
}

/// aria-label, else inner text, else the first nearby label.
pub fn accessible_name(event: &EvidenceEvent) -> Option<&str> {
    let target = event.target.as_ref();
    target
        .and_then(|t| present(&t.aria_label))
        .or_else(|| target.and_then(|t| present(&t.inner_text)))
        .or_else(|| event.context.first_label())
}
