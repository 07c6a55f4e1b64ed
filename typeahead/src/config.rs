//! Typeahead configuration

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

/// Minimum query length before a dispatch happens, unless forced.
pub const DEFAULT_MIN_CHARS: usize = 2;

/// How overlapping remote fetches are reconciled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FetchOrdering {
    /// Apply every completion as it arrives. A slow, older request can
    /// overwrite a newer one's results.
    #[default]
    ArrivalOrder,
    /// Only the most recently dispatched request may apply its results;
    /// older completions are discarded.
    LatestOnly,
}

/// Data configuration for a typeahead control.
///
/// Behaviour inputs that are not plain data (the source, display function,
/// template handle and result transform) are set on the control itself.
///
/// # Example
///
/// ```
/// use typeahead::{FetchOrdering, TypeaheadConfig};
///
/// let config = TypeaheadConfig::default()
///     .with_min_chars(3)
///     .with_display_item("item.name")
///     .with_fetch_ordering(FetchOrdering::LatestOnly);
/// assert_eq!(config.min_chars, 3);
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TypeaheadConfig {
    /// Minimum number of characters before a query is dispatched.
    ///
    /// Default: 2
    pub min_chars: usize,

    /// Fetch the full candidate set from the remote source once at
    /// initialization, then filter locally.
    pub do_prefetch: bool,

    /// Clear value and model right after a selection.
    pub clear_after_search: bool,

    /// Whether the presentation layer offers a "create new" affordance.
    pub can_create_new: bool,

    /// Label for the "create new" affordance.
    pub add_new_text: Option<String>,

    /// Dotted property path used to derive display strings, e.g. `item.name`.
    pub display_item: Option<String>,

    /// Request focus on initialization.
    pub focus_on: bool,

    /// Base parameters merged into every remote query.
    pub service_params: BTreeMap<String, Value>,

    /// Form control name.
    pub name: Option<String>,

    /// Whether the presentation layer renders a search-trigger button next
    /// to the input. Affects blur handling.
    pub has_search_trigger: bool,

    /// How overlapping remote fetches are reconciled.
    pub fetch_ordering: FetchOrdering,
}

impl Default for TypeaheadConfig {
    fn default() -> Self {
        Self {
            min_chars: DEFAULT_MIN_CHARS,
            do_prefetch: false,
            clear_after_search: false,
            can_create_new: false,
            add_new_text: None,
            display_item: None,
            focus_on: false,
            service_params: BTreeMap::new(),
            name: None,
            has_search_trigger: false,
            fetch_ordering: FetchOrdering::default(),
        }
    }
}

impl TypeaheadConfig {
    /// Creates a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the minimum query length.
    pub fn with_min_chars(mut self, min_chars: usize) -> Self {
        self.min_chars = min_chars;
        self
    }

    /// Enables prefetching.
    pub fn with_prefetch(mut self, do_prefetch: bool) -> Self {
        self.do_prefetch = do_prefetch;
        self
    }

    /// Clears the control after each selection.
    pub fn with_clear_after_search(mut self, clear: bool) -> Self {
        self.clear_after_search = clear;
        self
    }

    /// Enables the "create new" affordance with a label.
    pub fn with_create_new(mut self, add_new_text: impl Into<String>) -> Self {
        self.can_create_new = true;
        self.add_new_text = Some(add_new_text.into());
        self
    }

    /// Sets the display property path.
    pub fn with_display_item(mut self, path: impl Into<String>) -> Self {
        self.display_item = Some(path.into());
        self
    }

    /// Requests focus on initialization.
    pub fn with_focus_on(mut self, focus_on: bool) -> Self {
        self.focus_on = focus_on;
        self
    }

    /// Adds a base service parameter.
    pub fn with_service_param(mut self, key: impl Into<String>, value: Value) -> Self {
        self.service_params.insert(key.into(), value);
        self
    }

    /// Sets the form control name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Declares that a search-trigger button is rendered.
    pub fn with_search_trigger(mut self, present: bool) -> Self {
        self.has_search_trigger = present;
        self
    }

    /// Sets the fetch ordering policy.
    pub fn with_fetch_ordering(mut self, ordering: FetchOrdering) -> Self {
        self.fetch_ordering = ordering;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let config = TypeaheadConfig::default();
        assert_eq!(config.min_chars, 2);
        assert!(!config.do_prefetch);
        assert!(!config.clear_after_search);
        assert_eq!(config.fetch_ordering, FetchOrdering::ArrivalOrder);
    }

    #[test]
    fn test_deserialize_partial_json() {
        let config: TypeaheadConfig = serde_json::from_value(json!({
            "minChars": 1,
            "doPrefetch": true,
            "displayItem": "item.label",
            "serviceParams": { "limit": 20 },
            "fetchOrdering": "latestOnly"
        }))
        .unwrap();

        assert_eq!(config.min_chars, 1);
        assert!(config.do_prefetch);
        assert_eq!(config.display_item.as_deref(), Some("item.label"));
        assert_eq!(config.service_params.get("limit"), Some(&json!(20)));
        assert_eq!(config.fetch_ordering, FetchOrdering::LatestOnly);
        assert!(!config.focus_on);
    }

    #[test]
    fn test_builder() {
        let config = TypeaheadConfig::new()
            .with_create_new("Add fruit")
            .with_service_param("lang", json!("en"))
            .with_name("fruit");
        assert!(config.can_create_new);
        assert_eq!(config.add_new_text.as_deref(), Some("Add fruit"));
        assert_eq!(config.name.as_deref(), Some("fruit"));
        assert_eq!(config.service_params.len(), 1);
    }
}
