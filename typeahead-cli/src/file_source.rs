//! Remote source backed by a JSON file.
//!
//! Stands in for a lookup service: every fetch re-reads the file, waits for
//! the configured latency, and answers with the entries whose string fields
//! contain the query.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use typeahead::{FetchError, QueryParams, RemoteSource};

pub struct FileSource {
    path: PathBuf,
    latency: Duration,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>, latency: Duration) -> Self {
        Self {
            path: path.into(),
            latency,
        }
    }
}

fn matches(entry: &Value, needle: &str) -> bool {
    match entry {
        Value::String(s) => s.to_lowercase().contains(needle),
        Value::Object(map) => map.values().any(|v| matches!(v, Value::String(_)) && matches(v, needle)),
        _ => false,
    }
}

#[async_trait]
impl RemoteSource<Value> for FileSource {
    async fn fetch(&self, params: QueryParams) -> Result<Vec<Value>, FetchError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| FetchError::with_source(format!("cannot read {}", self.path.display()), e))?;
        let entries: Vec<Value> = serde_json::from_str(&raw)
            .map_err(|e| FetchError::with_source("candidate file is not a JSON array", e))?;

        let limit = params
            .get("limit")
            .and_then(Value::as_u64)
            .map_or(usize::MAX, |l| usize::try_from(l).unwrap_or(usize::MAX));

        let found: Vec<Value> = match params.query() {
            Some(query) => {
                let needle = query.to_lowercase();
                entries.into_iter().filter(|e| matches(e, &needle)).take(limit).collect()
            }
            None => entries.into_iter().take(limit).collect(),
        };
        log::debug!("file source answered {:?} with {} entries", params.query(), found.len());
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_matches_string_fields_only() {
        let entry = json!({"name": "Apple", "code": 12, "origin": "Belgium"});
        assert!(matches(&entry, "app"));
        assert!(matches(&entry, "belg"));
        assert!(!matches(&entry, "12"));
        assert!(matches(&json!("Banana"), "nan"));
    }

    #[tokio::test]
    async fn test_fetch_applies_query_and_limit() {
        let path = std::env::temp_dir().join(format!("typeahead-cli-{}.json", std::process::id()));
        std::fs::write(&path, r#"[{"name": "Apple"}, {"name": "Apricot"}, {"name": "Banana"}]"#).unwrap();
        let source = FileSource::new(&path, Duration::ZERO);

        let mut base = std::collections::BTreeMap::new();
        base.insert("limit".to_string(), json!(u64::MAX));
        let all = source
            .fetch(QueryParams::from_service_params(&base).with_query("ap"))
            .await
            .unwrap();
        assert_eq!(all.len(), 2);

        base.insert("limit".to_string(), json!(1));
        let one = source
            .fetch(QueryParams::from_service_params(&base).with_query("ap"))
            .await
            .unwrap();
        assert_eq!(one, vec![json!({"name": "Apple"})]);

        std::fs::remove_file(&path).unwrap();
    }
}
