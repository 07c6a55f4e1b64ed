//! Mock remote sources shared by the integration tests.

#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::oneshot;
use typeahead::{FetchError, QueryParams, RemoteSource};

pub type Reply = Result<Vec<Value>, FetchError>;

/// Remote source that answers immediately from a function of the params.
pub struct FnSource<F> {
    respond: F,
    calls: Mutex<Vec<QueryParams>>,
}

impl<F> FnSource<F>
where
    F: Fn(&QueryParams) -> Reply + Send + Sync,
{
    pub fn new(respond: F) -> Self {
        Self {
            respond,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<QueryParams> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl<F> RemoteSource<Value> for FnSource<F>
where
    F: Fn(&QueryParams) -> Reply + Send + Sync,
{
    async fn fetch(&self, params: QueryParams) -> Result<Vec<Value>, FetchError> {
        let reply = (self.respond)(&params);
        self.calls.lock().unwrap().push(params);
        reply
    }
}

/// Remote source whose requests stay pending until the test answers them.
#[derive(Default)]
pub struct GatedSource {
    pending: Mutex<Vec<(QueryParams, oneshot::Sender<Reply>)>>,
}

impl GatedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.lock().unwrap().len()
    }

    /// Yields until at least `n` requests are waiting.
    pub async fn wait_for_calls(&self, n: usize) {
        while self.pending_count() < n {
            tokio::task::yield_now().await;
        }
    }

    /// Answers the pending request for `query`.
    pub fn reply(&self, query: &str, reply: Reply) {
        let mut pending = self.pending.lock().unwrap();
        let index = pending
            .iter()
            .position(|(params, _)| params.query() == Some(query))
            .unwrap_or_else(|| panic!("no pending request for {:?}", query));
        let (_, tx) = pending.remove(index);
        let _ = tx.send(reply);
    }
}

#[async_trait]
impl RemoteSource<Value> for GatedSource {
    async fn fetch(&self, params: QueryParams) -> Result<Vec<Value>, FetchError> {
        let (tx, rx) = oneshot::channel();
        self.pending.lock().unwrap().push((params, tx));
        rx.await
            .unwrap_or_else(|_| Err(FetchError::new("request abandoned")))
    }
}

pub fn names(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .map(|v| v["name"].as_str().unwrap_or_default().to_string())
        .collect()
}
