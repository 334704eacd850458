use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::LocatorParseError;

// ============================================================================
// Locator: tagged variant over the locator expression grammar
// ============================================================================

/// One candidate way of finding an element at replay time.
///
/// In memory a locator is structured; on disk (inside a flow's selector
/// bundle) it is stored as its textual expression, e.g. `getByTestId("save")`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Locator {
    /// The page itself, for events without a target element
    Page,
    TestId(String),
    DataTest(String),
    DataCy(String),
    Role { role: String, name: String },
    Label(String),
    Placeholder(String),
    Id(String),
    Name(String),
    Text(String),
    Css(String),
    XPath(String),
    /// Text outside the grammar, kept verbatim so foreign flows load losslessly
    Unrecognized(String),
}

/// Which override table a semantic key belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyKind {
    TestId,
    Name,
    Id,
    Label,
    Placeholder,
}

impl KeyKind {
    /// Lookup priority used when applying overrides.
    pub const PRIORITY: [KeyKind; 5] = [
        KeyKind::TestId,
        KeyKind::Name,
        KeyKind::Id,
        KeyKind::Label,
        KeyKind::Placeholder,
    ];
}

/// A human-meaningful key recovered from a locator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SemanticKey {
    pub kind: KeyKind,
    pub value: String,
}

/// Locator as handed to the generated replay runtime: a kind tag plus
/// the pieces needed to construct it, never code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocatorSpec {
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Locator {
    /// Build a CSS-path locator. A lone `#...` path with no whitespace,
    /// combinator or quote is the same element reference as an id locator
    /// and is folded into one.
    pub fn css(path: &str) -> Self {
        match SIMPLE_ID.captures(path) {
            Some(caps) => Locator::Id(caps[1].to_string()),
            None => Locator::Css(path.to_string()),
        }
    }

    pub fn is_page(&self) -> bool {
        matches!(self, Locator::Page)
    }

    /// Short kind tag used by the replay runtime's dispatch table.
    pub fn kind(&self) -> &'static str {
        match self {
            Locator::Page => "page",
            Locator::TestId(_) => "testId",
            Locator::DataTest(_) => "dataTest",
            Locator::DataCy(_) => "dataCy",
            Locator::Role { .. } => "role",
            Locator::Label(_) => "label",
            Locator::Placeholder(_) => "placeholder",
            Locator::Id(_) => "id",
            Locator::Name(_) => "name",
            Locator::Text(_) => "text",
            Locator::Css(_) => "css",
            Locator::XPath(_) => "xpath",
            Locator::Unrecognized(_) => "unrecognized",
        }
    }

    /// Render the textual expression stored in flow files.
    pub fn to_expression(&self) -> String {
        match self {
            Locator::Page => "page".to_string(),
            Locator::TestId(v) => format!("getByTestId({})", js_literal(v)),
            Locator::DataTest(v) => {
                format!("locator({})", js_literal(&format!("[data-test=\"{}\"]", v)))
            }
            Locator::DataCy(v) => {
                format!("locator({})", js_literal(&format!("[data-cy=\"{}\"]", v)))
            }
            Locator::Role { role, name } => format!(
                "getByRole({}, {{ name: {} }})",
                js_literal(role),
                js_literal(name)
            ),
            Locator::Label(v) => format!("getByLabel({})", js_literal(v)),
            Locator::Placeholder(v) => format!("getByPlaceholder({})", js_literal(v)),
            Locator::Id(v) if SIMPLE_ID.is_match(&format!("#{}", v)) => {
                format!("locator({})", js_literal(&format!("#{}", v)))
            }
            Locator::Id(v) => {
                format!("locator({})", js_literal(&format!("[id=\"{}\"]", v)))
            }
            Locator::Name(v) => {
                format!("locator({})", js_literal(&format!("[name=\"{}\"]", v)))
            }
            Locator::Text(v) => format!("getByText({})", js_literal(v)),
            Locator::Css(v) => format!("locator({})", js_literal(v)),
            Locator::XPath(v) => format!("locator({})", js_literal(&format!("xpath={}", v))),
            Locator::Unrecognized(text) => text.clone(),
        }
    }

    /// Decode a textual expression.
    ///
    /// Escaped quotes are normalized first, so `\"` and `\\\"` both read as
    /// a plain quote. This keeps expressions decodable after they have been
    /// embedded in generated code one or more times. An even run of
    /// backslashes before a quote is a literal backslash and is kept.
    pub fn parse(expression: &str) -> Result<Self, LocatorParseError> {
        let normalized = normalize_quotes(expression.trim());
        let text = normalized.as_str();

        if text == "page" {
            return Ok(Locator::Page);
        }
        if let Some(caps) = GET_BY_TEST_ID.captures(text) {
            return Ok(Locator::TestId(unescape(&caps[1])));
        }
        if let Some(caps) = GET_BY_ROLE.captures(text) {
            return Ok(Locator::Role {
                role: unescape(&caps[1]),
                name: unescape(&caps[2]),
            });
        }
        if let Some(caps) = GET_BY_LABEL.captures(text) {
            return Ok(Locator::Label(unescape(&caps[1])));
        }
        if let Some(caps) = GET_BY_PLACEHOLDER.captures(text) {
            return Ok(Locator::Placeholder(unescape(&caps[1])));
        }
        if let Some(caps) = GET_BY_TEXT.captures(text) {
            return Ok(Locator::Text(unescape(&caps[1])));
        }
        if let Some(caps) = LOCATOR_CALL.captures(text) {
            return Ok(Self::from_locator_argument(&unescape(&caps[1])));
        }

        Err(LocatorParseError(expression.to_string()))
    }

    /// Decode text, keeping anything outside the grammar as `Unrecognized`.
    pub fn from_expression(expression: &str) -> Self {
        Self::parse(expression).unwrap_or_else(|_| Locator::Unrecognized(expression.to_string()))
    }

    fn from_locator_argument(argument: &str) -> Self {
        if let Some(xpath) = argument.strip_prefix("xpath=") {
            return Locator::XPath(xpath.to_string());
        }
        if let Some(caps) = DATA_TEST_ATTR.captures(argument) {
            return Locator::DataTest(caps[1].to_string());
        }
        if let Some(caps) = DATA_CY_ATTR.captures(argument) {
            return Locator::DataCy(caps[1].to_string());
        }
        if let Some(caps) = ID_ATTR.captures(argument) {
            return Locator::Id(caps[1].to_string());
        }
        if let Some(caps) = NAME_ATTR.captures(argument) {
            return Locator::Name(caps[1].to_string());
        }
        Locator::css(argument)
    }

    /// Keys an override file may use to address the element this locator finds.
    ///
    /// A role locator contributes its accessible name as a label key.
    pub fn semantic_key(&self) -> Option<SemanticKey> {
        let (kind, value) = match self {
            Locator::TestId(v) => (KeyKind::TestId, v),
            Locator::Name(v) => (KeyKind::Name, v),
            Locator::Id(v) => (KeyKind::Id, v),
            Locator::Label(v) => (KeyKind::Label, v),
            Locator::Role { name, .. } => (KeyKind::Label, name),
            Locator::Placeholder(v) => (KeyKind::Placeholder, v),
            _ => return None,
        };

        if value.is_empty() {
            return None;
        }

        Some(SemanticKey {
            kind,
            value: value.clone(),
        })
    }

    pub fn to_spec(&self) -> LocatorSpec {
        let (value, role, name) = match self {
            Locator::Page => (None, None, None),
            Locator::Role { role, name } => (None, Some(role.clone()), Some(name.clone())),
            Locator::TestId(v)
            | Locator::DataTest(v)
            | Locator::DataCy(v)
            | Locator::Label(v)
            | Locator::Placeholder(v)
            | Locator::Id(v)
            | Locator::Name(v)
            | Locator::Text(v)
            | Locator::Css(v)
            | Locator::XPath(v)
            | Locator::Unrecognized(v) => (Some(v.clone()), None, None),
        };

        LocatorSpec {
            kind: self.kind(),
            value,
            role,
            name,
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_expression())
    }
}

impl From<String> for Locator {
    fn from(expression: String) -> Self {
        Locator::from_expression(&expression)
    }
}

impl From<Locator> for String {
    fn from(locator: Locator) -> Self {
        locator.to_expression()
    }
}

// ============================================================================
// Text helpers
// ============================================================================

static SIMPLE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^#([^\s>+~,"']+)$"#).expect("valid regex"));
static ESCAPED_QUOTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\\+(["'])"#).expect("valid regex"));
static GET_BY_TEST_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^getByTestId\(\s*["'](.*)["']\s*\)$"#).expect("valid regex"));
static GET_BY_ROLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^getByRole\(\s*["']([^"']+)["']\s*,\s*\{\s*name:\s*["'](.*)["']\s*\}\s*\)$"#)
        .expect("valid regex")
});
static GET_BY_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^getByLabel\(\s*["'](.*)["']\s*\)$"#).expect("valid regex"));
static GET_BY_PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^getByPlaceholder\(\s*["'](.*)["']\s*\)$"#).expect("valid regex")
});
static GET_BY_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^getByText\(\s*["'](.*)["']\s*\)$"#).expect("valid regex"));
static LOCATOR_CALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^locator\(\s*["'](.*)["']\s*\)$"#).expect("valid regex"));
static DATA_TEST_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\[data-test\s*=\s*["']?(.*?)["']?\]$"#).expect("valid regex")
});
static DATA_CY_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^\[data-cy\s*=\s*["']?(.*?)["']?\]$"#).expect("valid regex"));
static ID_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^\[id\s*=\s*["']?(.*?)["']?\]$"#).expect("valid regex"));
static NAME_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\[name\s*=\s*["']?([^"'\]]+)["']?\]$"#).expect("valid regex")
});

/// Quote a string the way a JavaScript/JSON string literal would.
fn js_literal(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

fn normalize_quotes(text: &str) -> String {
    ESCAPED_QUOTE
        .replace_all(text, |caps: &regex::Captures| {
            let run = caps[0].len() - caps[1].len();
            if run % 2 == 0 {
                caps[0].to_string()
            } else {
                caps[1].to_string()
            }
        })
        .into_owned()
}

/// Undo the remaining literal escapes once quotes have been normalized.
fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
