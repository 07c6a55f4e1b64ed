//! Candidate trait for values that can be offered by a typeahead.

use serde_json::Value;

/// Runtime shape of a candidate.
///
/// The control remembers the kind of the candidates it has seen and uses it
/// to decide whether an assigned model is consistent with them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Bool,
    Number,
    String,
    Array,
    Object,
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Number => "number",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
        };
        f.write_str(name)
    }
}

/// Trait for values that can be offered as typeahead candidates.
///
/// The control never looks inside a candidate except through this trait,
/// and only to resolve its display string.
///
/// # Example
///
/// ```ignore
/// let apple = serde_json::json!({ "name": "Apple" });
/// assert_eq!(apple.kind(), ValueKind::Object);
/// assert_eq!(apple.property("name").and_then(|v| v.as_display_text()), Some("Apple".into()));
/// ```
pub trait Candidate: Clone + PartialEq + Send + Sync + 'static {
    /// Runtime kind of this value.
    fn kind(&self) -> ValueKind;

    /// Looks up a named property (or array index) on this value.
    fn property(&self, name: &str) -> Option<&Self>;

    /// Text form of a scalar value. `None` for containers.
    fn as_display_text(&self) -> Option<String>;
}

impl Candidate for Value {
    fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Number(_) => ValueKind::Number,
            Value::String(_) => ValueKind::String,
            Value::Array(_) => ValueKind::Array,
            Value::Object(_) => ValueKind::Object,
        }
    }

    fn property(&self, name: &str) -> Option<&Self> {
        match self {
            Value::Object(map) => map.get(name),
            Value::Array(items) => name.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        }
    }

    fn as_display_text(&self) -> Option<String> {
        match self {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }
}

impl Candidate for String {
    fn kind(&self) -> ValueKind {
        ValueKind::String
    }

    fn property(&self, _name: &str) -> Option<&Self> {
        None
    }

    fn as_display_text(&self) -> Option<String> {
        Some(self.clone())
    }
}

/// Kind of the first candidate in a list, if any.
pub(crate) fn observed_kind<C: Candidate>(items: &[C]) -> Option<ValueKind> {
    items.first().map(Candidate::kind)
}
