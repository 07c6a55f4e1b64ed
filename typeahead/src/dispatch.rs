//! Query dispatch: remote fetches, local filtering and prefetch.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::candidate::{Candidate, observed_kind};
use crate::config::FetchOrdering;
use crate::error::{FetchError, TypeaheadError};
use crate::filter::substring_filter;
use crate::source::QueryParams;
use crate::state::{FilterCallback, Typeahead};

/// What a dispatch did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The query was below the minimum length; nothing changed.
    Skipped,
    /// The query was empty; the candidate list was cleared without a request.
    Cleared,
    /// The candidate list (or, for prefetch, the local collection) was
    /// replaced with this many items.
    Applied(usize),
    /// A newer dispatch started while this one was in flight and its result
    /// was discarded.
    Superseded,
}

/// Counts one remote request as in flight until dropped.
///
/// Dropping covers completion, failure, and the host abandoning the future.
struct InFlight {
    counter: Arc<AtomicUsize>,
    dirty: Arc<AtomicBool>,
}

impl InFlight {
    fn begin(counter: &Arc<AtomicUsize>, dirty: &Arc<AtomicBool>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        dirty.store(true, Ordering::SeqCst);
        Self {
            counter: Arc::clone(counter),
            dirty: Arc::clone(dirty),
        }
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::SeqCst);
        self.dirty.store(true, Ordering::SeqCst);
    }
}

fn transform<C>(callback: Option<FilterCallback<C>>, raw: Vec<C>) -> Vec<C> {
    match callback {
        Some(f) => f(raw),
        None => raw,
    }
}

impl<C: Candidate> Typeahead<C> {
    /// Whether keystrokes and focus go to the remote source.
    ///
    /// True only when a remote source is configured and the candidate set is
    /// not (to be) prefetched.
    pub fn search_via_service(&self) -> bool {
        let guard = self.read();
        guard.remote_active() && !guard.config.do_prefetch && !guard.prefetched
    }

    /// Dispatch through whichever path [`search_via_service`](Self::search_via_service) selects.
    ///
    /// `force` bypasses the minimum-length threshold on the remote path.
    pub async fn dispatch(&self, force: bool) -> Result<FetchOutcome, TypeaheadError> {
        if self.search_via_service() {
            self.fetch(force).await
        } else {
            self.filter_stored_items()
        }
    }

    /// Query the remote source with the current input text.
    ///
    /// An empty query clears the list without a request. A query shorter
    /// than `min_chars` is skipped unless `force` is set. Under
    /// [`FetchOrdering::LatestOnly`] either early return still supersedes
    /// the requests in flight.
    pub async fn fetch(&self, force: bool) -> Result<FetchOutcome, TypeaheadError> {
        let (remote, params, seq, ordering) = {
            let mut guard = self.write();
            let remote = guard
                .source
                .as_ref()
                .and_then(|s| s.remote())
                .cloned()
                .ok_or(TypeaheadError::MissingRemoteSource)?;

            // Every dispatch supersedes the requests already in flight, even
            // one that ends up sending nothing.
            let seq = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;

            let query = guard.text.clone();
            if query.is_empty() {
                guard.close_list();
                self.mark_dirty();
                return Ok(FetchOutcome::Cleared);
            }
            if !force && query.chars().count() < guard.config.min_chars {
                log::trace!("typeahead {} skipped short query {:?}", self.id(), query);
                return Ok(FetchOutcome::Skipped);
            }

            let params = QueryParams::from_service_params(&guard.config.service_params).with_query(query);
            guard.has_no_suggestions = false;
            guard.last_error = None;
            (remote, params, seq, guard.config.fetch_ordering)
        };

        let in_flight = InFlight::begin(&self.outstanding, &self.dirty);
        log::debug!(
            "typeahead {} dispatching remote query #{} {:?}",
            self.id(),
            seq,
            params.query()
        );
        let result = remote.fetch(params).await;
        drop(in_flight);

        let is_stale = || {
            ordering == FetchOrdering::LatestOnly && self.sequence.load(Ordering::SeqCst) != seq
        };

        match result {
            Ok(raw) => {
                if is_stale() {
                    log::debug!("typeahead {} discarded superseded query #{}", self.id(), seq);
                    return Ok(FetchOutcome::Superseded);
                }

                let raw_empty = raw.is_empty();
                let callback = self.read().filter_callback.clone();
                let items = transform(callback, raw);
                let count = items.len();

                let mut guard = self.write();
                if let Some(kind) = observed_kind(&items) {
                    guard.observed_kind = Some(kind);
                }
                guard.candidates = Some(items);
                guard.has_no_suggestions = raw_empty;
                guard.highlight = 0;
                self.mark_dirty();
                log::debug!("typeahead {} applied query #{} ({} candidates)", self.id(), seq, count);
                Ok(FetchOutcome::Applied(count))
            }
            Err(err) => {
                if is_stale() {
                    log::debug!("typeahead {} ignored failure of superseded query #{}", self.id(), seq);
                    return Ok(FetchOutcome::Superseded);
                }
                Err(self.record_failure(err))
            }
        }
    }

    /// Filter the local collection by the current input text.
    ///
    /// Requires a display path or display function. A query shorter than
    /// `min_chars` leaves the current list untouched.
    pub fn filter_stored_items(&self) -> Result<FetchOutcome, TypeaheadError> {
        let (query, items, display) = {
            let guard = self.read();
            if !guard.display.supports_filtering() {
                return Err(TypeaheadError::MissingDisplayStrategy);
            }
            let query = guard.text.clone();
            if query.chars().count() < guard.config.min_chars {
                log::trace!("typeahead {} kept list for short query {:?}", self.id(), query);
                return Ok(FetchOutcome::Skipped);
            }
            (query, guard.stored_items.clone(), guard.display.clone())
        };

        let labels = items
            .iter()
            .map(|item| display.resolve(item))
            .collect::<Result<Vec<_>, _>>()?;
        let matches = substring_filter(&query, &labels);
        log::trace!(
            "typeahead {} filtered {} stored items to {} for {:?}",
            self.id(),
            items.len(),
            matches.len(),
            query
        );

        let filtered: Vec<C> = matches.iter().map(|m| items[m.index].clone()).collect();
        let count = filtered.len();

        let mut guard = self.write();
        guard.has_no_suggestions = !query.is_empty() && filtered.is_empty();
        guard.candidates = Some(filtered);
        guard.highlight = 0;
        self.mark_dirty();
        Ok(FetchOutcome::Applied(count))
    }

    /// Fetch the whole candidate set once and keep it as the local collection.
    ///
    /// Only the configured service parameters are sent; there is no query.
    /// Afterwards all dispatches filter locally.
    pub async fn prefetch(&self) -> Result<FetchOutcome, TypeaheadError> {
        let (remote, params) = {
            let mut guard = self.write();
            let remote = guard
                .source
                .as_ref()
                .and_then(|s| s.remote())
                .cloned()
                .ok_or(TypeaheadError::MissingRemoteSource)?;
            guard.last_error = None;
            (remote, QueryParams::from_service_params(&guard.config.service_params))
        };

        let in_flight = InFlight::begin(&self.outstanding, &self.dirty);
        log::debug!("typeahead {} prefetching candidates", self.id());
        let result = remote.fetch(params).await;
        drop(in_flight);

        match result {
            Ok(raw) => {
                let callback = self.read().filter_callback.clone();
                let items = transform(callback, raw);
                let count = items.len();

                let mut guard = self.write();
                if let Some(kind) = observed_kind(&items) {
                    guard.observed_kind = Some(kind);
                }
                guard.stored_items = items;
                guard.prefetched = true;
                self.mark_dirty();
                log::debug!("typeahead {} prefetched {} candidates", self.id(), count);
                Ok(FetchOutcome::Applied(count))
            }
            Err(err) => Err(self.record_failure(err)),
        }
    }

    fn record_failure(&self, err: FetchError) -> TypeaheadError {
        log::warn!("typeahead {} remote fetch failed: {}", self.id(), err);
        self.write().last_error = Some(err.to_string());
        self.mark_dirty();
        TypeaheadError::Fetch(err)
    }
}
