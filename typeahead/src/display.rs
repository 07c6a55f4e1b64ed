//! Display string resolution for candidates.
//!
//! A candidate's display string is what the input shows after selection and
//! what local filtering matches against. It comes from, in priority order:
//!
//! 1. an explicit display function,
//! 2. a template reference (rendered by the presentation layer; the core
//!    falls through to the property path for its own needs),
//! 3. a dotted property path, defaulting to `name`.
//!
//! Property paths are parsed up front into plain segments. Nothing is ever
//! evaluated, so a path from an untrusted source can only read properties.

use std::fmt;
use std::sync::Arc;

use crate::candidate::Candidate;
use crate::error::TypeaheadError;

/// Path used when nothing else is configured.
pub const DEFAULT_DISPLAY_PATH: &str = "name";

/// Leading segment that refers to the candidate itself.
const ROOT_SEGMENT: &str = "item";

/// A restricted dotted property path such as `item.address.city` or `tags.0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyPath {
    raw: String,
    segments: Vec<String>,
}

impl PropertyPath {
    /// Parses a dotted path.
    ///
    /// Segments must be identifiers (`[A-Za-z_$][A-Za-z0-9_$]*`) or array
    /// indices. A leading `item` segment is dropped.
    pub fn parse(path: &str) -> Result<Self, TypeaheadError> {
        let raw = path.trim();
        if raw.is_empty() {
            return Err(TypeaheadError::malformed_path(path, "path is empty"));
        }

        let mut segments = Vec::new();
        for segment in raw.split('.') {
            if segment.is_empty() {
                return Err(TypeaheadError::malformed_path(path, "empty segment"));
            }
            if !is_identifier(segment) && !segment.bytes().all(|b| b.is_ascii_digit()) {
                return Err(TypeaheadError::malformed_path(
                    path,
                    format!("'{}' is not a property name or index", segment),
                ));
            }
            segments.push(segment.to_string());
        }

        if segments.first().map(String::as_str) == Some(ROOT_SEGMENT) {
            segments.remove(0);
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    /// The path as written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Property segments below the candidate root.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Resolves this path against a candidate and renders the leaf as text.
    pub fn resolve<C: Candidate>(&self, candidate: &C) -> Result<String, TypeaheadError> {
        let mut current = candidate;
        for segment in &self.segments {
            current = current.property(segment).ok_or_else(|| {
                TypeaheadError::resolution(
                    &self.raw,
                    format!("{} value has no property '{}'", current.kind(), segment),
                )
            })?;
        }
        current.as_display_text().ok_or_else(|| {
            TypeaheadError::resolution(
                &self.raw,
                format!("resolved to a {} value, not a scalar", current.kind()),
            )
        })
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn is_identifier(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Function mapping a candidate to its display string.
pub type DisplayFn<C> = Arc<dyn Fn(&C) -> String + Send + Sync>;

/// Opaque handle to a presentation-layer template.
///
/// The core never renders it; it is stored so the presentation layer can
/// read it back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateRef(pub String);

/// The configured display strategies for a control.
pub struct DisplayStrategy<C> {
    display_fn: Option<DisplayFn<C>>,
    template: Option<TemplateRef>,
    path: Option<PropertyPath>,
}

impl<C> Default for DisplayStrategy<C> {
    fn default() -> Self {
        Self {
            display_fn: None,
            template: None,
            path: None,
        }
    }
}

impl<C> Clone for DisplayStrategy<C> {
    fn clone(&self) -> Self {
        Self {
            display_fn: self.display_fn.clone(),
            template: self.template.clone(),
            path: self.path.clone(),
        }
    }
}

impl<C> fmt::Debug for DisplayStrategy<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DisplayStrategy")
            .field("display_fn", &self.display_fn.is_some())
            .field("template", &self.template)
            .field("path", &self.path)
            .finish()
    }
}

impl<C: Candidate> DisplayStrategy<C> {
    pub fn set_fn(&mut self, f: Option<DisplayFn<C>>) {
        self.display_fn = f;
    }

    pub fn set_template(&mut self, template: Option<TemplateRef>) {
        self.template = template;
    }

    pub fn set_path(&mut self, path: Option<PropertyPath>) {
        self.path = path;
    }

    pub fn template(&self) -> Option<&TemplateRef> {
        self.template.as_ref()
    }

    /// Whether local filtering has something to match against.
    ///
    /// A template alone is not enough: the core cannot render it.
    pub fn supports_filtering(&self) -> bool {
        self.display_fn.is_some() || self.path.is_some()
    }

    /// Resolves the display string for a candidate.
    pub fn resolve(&self, candidate: &C) -> Result<String, TypeaheadError> {
        if let Some(f) = &self.display_fn {
            return Ok(f(candidate));
        }
        match &self.path {
            Some(path) => path.resolve(candidate),
            None => PropertyPath::parse(DEFAULT_DISPLAY_PATH)?.resolve(candidate),
        }
    }
}
