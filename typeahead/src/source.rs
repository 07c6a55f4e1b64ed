//! Candidate sources.
//!
//! A typeahead draws candidates either from a remote collaborator, queried
//! per keystroke, or from a local collection it owns and filters itself.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::candidate::{Candidate, ValueKind, observed_kind};
use crate::error::FetchError;

/// Key under which the query text is passed to remote sources.
pub const QUERY_KEY: &str = "query";

/// Parameter bag handed to a remote source.
///
/// Built from the configured service parameters plus the query text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams(BTreeMap<String, Value>);

impl QueryParams {
    /// Creates a bag seeded with base service parameters.
    pub fn from_service_params(base: &BTreeMap<String, Value>) -> Self {
        Self(base.clone())
    }

    /// Adds (or overwrites) the query text.
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.0.insert(QUERY_KEY.to_string(), Value::String(query.into()));
        self
    }

    /// Returns the query text, if present.
    pub fn query(&self) -> Option<&str> {
        self.0.get(QUERY_KEY).and_then(Value::as_str)
    }

    /// Returns a parameter by key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A remote collaborator that looks up candidates.
///
/// Transport, retries and backoff are the implementation's business. The
/// control only awaits the result.
///
/// # Example
///
/// ```ignore
/// struct CountryService { client: reqwest::Client }
///
/// #[async_trait]
/// impl RemoteSource<serde_json::Value> for CountryService {
///     async fn fetch(&self, params: QueryParams) -> Result<Vec<serde_json::Value>, FetchError> {
///         let q = params.query().unwrap_or_default();
///         // ... call the service ...
///     }
/// }
/// ```
#[async_trait]
pub trait RemoteSource<C>: Send + Sync {
    /// Fetches candidates for the given parameters.
    async fn fetch(&self, params: QueryParams) -> Result<Vec<C>, FetchError>;
}

/// The value assigned to a typeahead's `source` input.
pub enum SourceConfig<C> {
    /// Candidates come from a remote collaborator.
    Remote(Arc<dyn RemoteSource<C>>),
    /// Candidates come from a fixed collection.
    Local(Vec<C>),
}

impl<C> SourceConfig<C> {
    /// Wraps a remote collaborator.
    pub fn remote(source: impl RemoteSource<C> + 'static) -> Self {
        Self::Remote(Arc::new(source))
    }

    /// Wraps a local collection.
    pub fn local(items: impl IntoIterator<Item = C>) -> Self {
        Self::Local(items.into_iter().collect())
    }
}

impl<C> fmt::Debug for SourceConfig<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote(_) => f.write_str("SourceConfig::Remote"),
            Self::Local(items) => write!(f, "SourceConfig::Local({} items)", items.len()),
        }
    }
}

/// The active candidate source after resolution.
pub(crate) enum CandidateSource<C> {
    Remote(Arc<dyn RemoteSource<C>>),
    Local,
}

impl<C> Clone for CandidateSource<C> {
    fn clone(&self) -> Self {
        match self {
            Self::Remote(remote) => Self::Remote(Arc::clone(remote)),
            Self::Local => Self::Local,
        }
    }
}

impl<C> fmt::Debug for CandidateSource<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote(_) => f.write_str("Remote"),
            Self::Local => f.write_str("Local"),
        }
    }
}

impl<C> CandidateSource<C> {
    pub(crate) fn remote(&self) -> Option<&Arc<dyn RemoteSource<C>>> {
        match self {
            Self::Remote(remote) => Some(remote),
            Self::Local => None,
        }
    }
}

/// Outcome of resolving a [`SourceConfig`].
pub(crate) struct ResolvedSource<C> {
    pub source: CandidateSource<C>,
    /// Local collection, copied from the configuration.
    pub items: Vec<C>,
    /// Kind of the local items, when there are any.
    pub kind: Option<ValueKind>,
}

/// Decides which source variant is active. Never dispatches.
pub(crate) fn resolve<C: Candidate>(config: SourceConfig<C>) -> ResolvedSource<C> {
    match config {
        SourceConfig::Remote(remote) => {
            log::debug!("typeahead source resolved to remote");
            ResolvedSource {
                source: CandidateSource::Remote(remote),
                items: Vec::new(),
                kind: None,
            }
        }
        SourceConfig::Local(items) => {
            log::debug!("typeahead source resolved to local ({} items)", items.len());
            let kind = observed_kind(&items);
            ResolvedSource {
                source: CandidateSource::Local,
                items,
                kind,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_params_merge() {
        let mut base = BTreeMap::new();
        base.insert("limit".to_string(), json!(10));
        base.insert("query".to_string(), json!("stale"));

        let params = QueryParams::from_service_params(&base).with_query("ap");
        assert_eq!(params.query(), Some("ap"));
        assert_eq!(params.get("limit"), Some(&json!(10)));
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_resolve_local_records_kind() {
        let resolved = resolve(SourceConfig::local([json!({"name": "Apple"})]));
        assert!(resolved.source.remote().is_none());
        assert_eq!(resolved.items.len(), 1);
        assert_eq!(resolved.kind, Some(ValueKind::Object));
    }

    #[test]
    fn test_resolve_empty_local_has_no_kind() {
        let resolved = resolve(SourceConfig::<Value>::local([]));
        assert_eq!(resolved.kind, None);
    }
}
