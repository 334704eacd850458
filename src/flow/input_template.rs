use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::CompileError;
use crate::flow::flow_model::{ParamValue, Params, Step};
use crate::selector::locator::{KeyKind, SemanticKey};

pub type ValueMap = IndexMap<String, ParamValue>;

/// Default input values keyed by what a human can recognise the field by.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputTemplate {
    #[serde(default)]
    pub by_test_id: ValueMap,
    #[serde(default)]
    pub by_name: ValueMap,
    #[serde(default)]
    pub by_id: ValueMap,
    #[serde(default)]
    pub by_label: ValueMap,
    #[serde(default)]
    pub by_placeholder: ValueMap,
}

impl InputTemplate {
    pub fn table(&self, kind: KeyKind) -> &ValueMap {
        match kind {
            KeyKind::TestId => &self.by_test_id,
            KeyKind::Name => &self.by_name,
            KeyKind::Id => &self.by_id,
            KeyKind::Label => &self.by_label,
            KeyKind::Placeholder => &self.by_placeholder,
        }
    }

    fn table_mut(&mut self, kind: KeyKind) -> &mut ValueMap {
        match kind {
            KeyKind::TestId => &mut self.by_test_id,
            KeyKind::Name => &mut self.by_name,
            KeyKind::Id => &mut self.by_id,
            KeyKind::Label => &mut self.by_label,
            KeyKind::Placeholder => &mut self.by_placeholder,
        }
    }

    pub fn is_empty(&self) -> bool {
        KeyKind::PRIORITY.iter().all(|k| self.table(*k).is_empty())
    }

    pub fn to_json(&self) -> Result<String, CompileError> {
        serde_json::to_string_pretty(self).map_err(|e| CompileError::JsonSerialize {
            context: "input template".into(),
            source: e,
        })
    }
}

/// Keys recoverable from a step's selector bundle, in candidate order.
pub fn step_keys(step: &Step) -> Vec<SemanticKey> {
    step.selectors
        .candidates()
        .filter_map(|l| l.semantic_key())
        .collect()
}

/// Derive the override template from compiled steps.
///
/// Only INPUT/CHANGE steps with a `value` param contribute. The first step
/// to mention a key defines its default; later steps never overwrite it.
pub fn build_input_template(steps: &[Step]) -> InputTemplate {
    let mut template = InputTemplate::default();

    for step in steps.iter().filter(|s| s.step_type.is_text_entry()) {
        let value = match step.param("value") {
            Some(v) => v,
            None => continue,
        };

        for key in step_keys(step) {
            template
                .table_mut(key.kind)
                .entry(key.value)
                .or_insert_with(|| value.clone());
        }
    }

    template
}

// ============================================================================
// Overrides
// ============================================================================

/// A human-edited template plus a catch-all `fields` bag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputOverrides {
    #[serde(flatten)]
    pub template: InputTemplate,
    #[serde(default)]
    pub fields: ValueMap,
}

impl InputOverrides {
    /// Resolve an override for a set of keys: typed tables in priority
    /// order, then the `fields` bag against any key.
    pub fn lookup(&self, keys: &[SemanticKey]) -> Option<&ParamValue> {
        let ordered: Vec<&SemanticKey> = KeyKind::PRIORITY
            .into_iter()
            .flat_map(|kind| keys.iter().filter(move |k| k.kind == kind))
            .collect();

        ordered
            .iter()
            .find_map(|key| self.template.table(key.kind).get(&key.value))
            .or_else(|| ordered.iter().find_map(|key| self.fields.get(&key.value)))
    }
}

/// Load an override file. A missing file means no overrides; a malformed
/// one is reported and treated as empty.
pub fn load_overrides(path: &Path) -> InputOverrides {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no override file");
            return InputOverrides::default();
        }
        Err(e) => {
            warn!("could not read override file '{}': {}", path.display(), e);
            return InputOverrides::default();
        }
    };

    match serde_json::from_str(&raw) {
        Ok(overrides) => overrides,
        Err(e) => {
            warn!("ignoring malformed override file '{}': {}", path.display(), e);
            InputOverrides::default()
        }
    }
}

/// Copy of `steps` with override values merged into INPUT/CHANGE steps.
pub fn apply_overrides(steps: &[Step], overrides: &InputOverrides) -> Vec<Step> {
    steps
        .iter()
        .map(|step| {
            if !step.step_type.is_text_entry() {
                return step.clone();
            }

            let keys = step_keys(step);
            match overrides.lookup(&keys) {
                Some(value) => {
                    let mut step = step.clone();
                    step.params
                        .get_or_insert_with(Params::new)
                        .insert("value".into(), value.clone());
                    step
                }
                None => step.clone(),
            }
        })
        .collect()
}
