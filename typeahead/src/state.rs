//! Typeahead control state.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::Value;

use crate::candidate::{Candidate, ValueKind};
use crate::config::TypeaheadConfig;
use crate::display::{DisplayFn, DisplayStrategy, PropertyPath, TemplateRef};
use crate::error::TypeaheadError;
use crate::events::TypeaheadEvent;
use crate::source::{self, CandidateSource, SourceConfig};

/// Transform applied to raw remote results before they are shown.
pub type FilterCallback<C> = Arc<dyn Fn(Vec<C>) -> Vec<C> + Send + Sync>;

/// Form-binding change callback, invoked on user-driven value changes.
pub type ChangeCallback<C> = Arc<dyn Fn(Option<C>) + Send + Sync>;

/// Form-binding touched callback, invoked on blur.
pub type TouchedCallback = Arc<dyn Fn() + Send + Sync>;

/// Unique identifier for a Typeahead instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeaheadId(usize);

impl TypeaheadId {
    fn new() -> Self {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        Self(COUNTER.fetch_add(1, Ordering::SeqCst))
    }
}

impl fmt::Display for TypeaheadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "__typeahead_{}", self.0)
    }
}

/// Snapshot of the query side of the control.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryState<C> {
    /// Current input text.
    pub query_text: String,
    /// Candidates currently on offer. `None` when the list is closed.
    pub candidates: Option<Vec<C>>,
    /// Whether any remote request is in flight.
    pub is_loading: bool,
    /// Number of remote requests in flight.
    pub outstanding_requests: usize,
    /// The last completed lookup for a non-empty query found nothing.
    pub has_no_suggestions: bool,
    /// Message of the last failed remote fetch, cleared on the next dispatch.
    pub last_error: Option<String>,
}

pub(crate) struct TypeaheadInner<C> {
    // Configuration
    pub(crate) config: TypeaheadConfig,
    pub(crate) source: Option<CandidateSource<C>>,
    pub(crate) display: DisplayStrategy<C>,
    pub(crate) filter_callback: Option<FilterCallback<C>>,

    // Source data
    /// Local collection (configured, or seeded by prefetch)
    pub(crate) stored_items: Vec<C>,
    /// Kind of the candidates seen so far
    pub(crate) observed_kind: Option<ValueKind>,
    pub(crate) prefetched: bool,
    pub(crate) initialized: bool,

    // Query state
    pub(crate) text: String,
    /// Cursor position in text (byte offset)
    pub(crate) text_cursor: usize,
    pub(crate) candidates: Option<Vec<C>>,
    pub(crate) has_no_suggestions: bool,
    pub(crate) last_error: Option<String>,
    /// Highlighted candidate (index into candidates)
    pub(crate) highlight: usize,

    // Model / form binding
    pub(crate) value: Option<C>,
    pub(crate) model: Option<C>,
    pub(crate) disabled: bool,
    pub(crate) validation_errors: Option<Value>,
    pub(crate) on_change: Option<ChangeCallback<C>>,
    pub(crate) on_touched: Option<TouchedCallback>,

    /// Output events waiting to be drained by the host
    pub(crate) events: Vec<TypeaheadEvent<C>>,
}

impl<C: Candidate> TypeaheadInner<C> {
    /// Stores a new model, queueing a change event if it is type-consistent.
    ///
    /// Returns `true` if an event was queued.
    pub(crate) fn assign_model(&mut self, model: Option<C>) -> bool {
        if self.model == model {
            return false;
        }

        let consistent = match &model {
            None => true,
            Some(m) => Some(m.kind()) == self.observed_kind,
        };
        if !consistent {
            log::warn!(
                "typeahead model of kind {:?} does not match observed kind {:?}; change not emitted",
                model.as_ref().map(Candidate::kind),
                self.observed_kind
            );
        }

        self.model = model.clone();
        if consistent {
            self.events.push(TypeaheadEvent::ModelChange(model));
        }
        consistent
    }

    /// Replaces the input text and moves the cursor to its end.
    pub(crate) fn replace_text(&mut self, text: String) {
        self.text_cursor = text.len();
        self.text = text;
    }

    /// Closes the candidate list.
    pub(crate) fn close_list(&mut self) {
        self.candidates = None;
        self.has_no_suggestions = false;
        self.highlight = 0;
    }

    pub(crate) fn remote_active(&self) -> bool {
        self.source.as_ref().is_some_and(|s| s.remote().is_some())
    }
}

/// A type-ahead input control.
///
/// `Typeahead` owns the query text, the candidate list and the selected
/// model. Candidates come either from a [`RemoteSource`](crate::RemoteSource)
/// queried as the user types, or from a local collection filtered in place.
///
/// The control is a cheap handle: clones share the same state, so several
/// dispatches may be in flight at once.
///
/// # Example
///
/// ```ignore
/// let fruit = Typeahead::new(
///     TypeaheadConfig::default().with_display_item("item.name"),
///     SourceConfig::local([json!({"name": "Apple"}), json!({"name": "Apricot"})]),
/// )?;
///
/// fruit.set_input_text("Ap").await?;
/// assert_eq!(fruit.candidates().map(|c| c.len()), Some(2));
/// ```
pub struct Typeahead<C: Candidate = Value> {
    /// Unique identifier for this typeahead instance
    id: TypeaheadId,
    /// Internal state
    pub(crate) inner: Arc<RwLock<TypeaheadInner<C>>>,
    /// Remote requests in flight
    pub(crate) outstanding: Arc<AtomicUsize>,
    /// Sequence number of the latest remote query dispatch
    pub(crate) sequence: Arc<AtomicU64>,
    /// Dirty flag for re-render
    pub(crate) dirty: Arc<AtomicBool>,
    /// Focus request flag (checked by the host)
    focus_requested: Arc<AtomicBool>,
}

impl<C: Candidate> Typeahead<C> {
    /// Create a new typeahead over the given source.
    ///
    /// Fails if `config.display_item` is not a valid property path.
    /// No candidates are fetched here.
    pub fn new(config: TypeaheadConfig, source: SourceConfig<C>) -> Result<Self, TypeaheadError> {
        let mut display = DisplayStrategy::default();
        if let Some(path) = config.display_item.as_deref() {
            display.set_path(Some(PropertyPath::parse(path)?));
        }

        let resolved = source::resolve(source);
        let inner = TypeaheadInner {
            config,
            source: Some(resolved.source),
            display,
            filter_callback: None,
            stored_items: resolved.items,
            observed_kind: resolved.kind,
            prefetched: false,
            initialized: false,
            text: String::new(),
            text_cursor: 0,
            candidates: None,
            has_no_suggestions: false,
            last_error: None,
            highlight: 0,
            value: None,
            model: None,
            disabled: false,
            validation_errors: None,
            on_change: None,
            on_touched: None,
            events: Vec::new(),
        };

        Ok(Self {
            id: TypeaheadId::new(),
            inner: Arc::new(RwLock::new(inner)),
            outstanding: Arc::new(AtomicUsize::new(0)),
            sequence: Arc::new(AtomicU64::new(0)),
            dirty: Arc::new(AtomicBool::new(false)),
            focus_requested: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Get the unique ID for this typeahead.
    pub fn id(&self) -> TypeaheadId {
        self.id
    }

    /// Get the ID as a string (for node binding).
    pub fn id_string(&self) -> String {
        self.id.to_string()
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, TypeaheadInner<C>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, TypeaheadInner<C>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::SeqCst);
    }

    // -------------------------------------------------------------------------
    // Configuration
    // -------------------------------------------------------------------------

    /// Get a copy of the current configuration.
    pub fn config(&self) -> TypeaheadConfig {
        self.read().config.clone()
    }

    /// Reassign the source. Re-evaluates which variant is active.
    ///
    /// A prefetched collection is discarded; nothing is fetched.
    pub fn set_source(&self, source: SourceConfig<C>) {
        let resolved = source::resolve(source);
        let mut guard = self.write();
        guard.source = Some(resolved.source);
        guard.stored_items = resolved.items;
        guard.prefetched = false;
        if resolved.kind.is_some() {
            guard.observed_kind = resolved.kind;
        }
        self.mark_dirty();
    }

    /// Set the minimum query length.
    pub fn set_min_chars(&self, min_chars: usize) {
        self.write().config.min_chars = min_chars;
    }

    /// Set (or clear) the display property path.
    pub fn set_display_item(&self, path: Option<&str>) -> Result<(), TypeaheadError> {
        let parsed = path.map(PropertyPath::parse).transpose()?;
        let mut guard = self.write();
        guard.config.display_item = parsed.as_ref().map(|p| p.as_str().to_string());
        guard.display.set_path(parsed);
        Ok(())
    }

    /// Set (or clear) the display function. Takes priority over the path.
    pub fn set_display_fn(&self, f: Option<DisplayFn<C>>) {
        self.write().display.set_fn(f);
    }

    /// Set (or clear) the presentation-layer template handle.
    pub fn set_display_template(&self, template: Option<TemplateRef>) {
        self.write().display.set_template(template);
    }

    /// Get the presentation-layer template handle.
    pub fn display_template(&self) -> Option<TemplateRef> {
        self.read().display.template().cloned()
    }

    /// Set (or clear) the transform applied to raw remote results.
    pub fn set_filter_callback(&self, f: Option<FilterCallback<C>>) {
        self.write().filter_callback = f;
    }

    /// Resolve the display string for a candidate.
    pub fn display_string(&self, candidate: &C) -> Result<String, TypeaheadError> {
        let display = self.read().display.clone();
        display.resolve(candidate)
    }

    // -------------------------------------------------------------------------
    // Query state
    // -------------------------------------------------------------------------

    /// Get the current input text.
    pub fn text(&self) -> String {
        self.read().text.clone()
    }

    /// Get the text cursor position (byte offset).
    pub fn text_cursor(&self) -> usize {
        self.read().text_cursor
    }

    /// Get the candidates currently on offer.
    pub fn candidates(&self) -> Option<Vec<C>> {
        self.read().candidates.clone()
    }

    /// Get the local collection (configured or prefetched).
    pub fn stored_items(&self) -> Vec<C> {
        self.read().stored_items.clone()
    }

    /// Number of remote requests in flight.
    pub fn outstanding_requests(&self) -> usize {
        self.outstanding.load(Ordering::SeqCst)
    }

    /// Whether any remote request is in flight.
    pub fn is_loading(&self) -> bool {
        self.outstanding_requests() > 0
    }

    /// Whether the last completed lookup for a non-empty query found nothing.
    pub fn has_no_suggestions(&self) -> bool {
        self.read().has_no_suggestions
    }

    /// Message of the last failed remote fetch.
    pub fn last_error(&self) -> Option<String> {
        self.read().last_error.clone()
    }

    /// Kind of the candidates seen so far.
    pub fn observed_kind(&self) -> Option<ValueKind> {
        self.read().observed_kind
    }

    /// Whether the local collection was seeded by a prefetch.
    pub fn is_prefetched(&self) -> bool {
        self.read().prefetched
    }

    /// Index of the highlighted candidate.
    pub fn highlight(&self) -> usize {
        self.read().highlight
    }

    /// Take a snapshot of the query state.
    pub fn query_state(&self) -> QueryState<C> {
        let guard = self.read();
        let outstanding = self.outstanding_requests();
        QueryState {
            query_text: guard.text.clone(),
            candidates: guard.candidates.clone(),
            is_loading: outstanding > 0,
            outstanding_requests: outstanding,
            has_no_suggestions: guard.has_no_suggestions,
            last_error: guard.last_error.clone(),
        }
    }

    // -------------------------------------------------------------------------
    // Model
    // -------------------------------------------------------------------------

    /// Get the selected model.
    pub fn model(&self) -> Option<C> {
        self.read().model.clone()
    }

    /// Get the form-bound value.
    pub fn value(&self) -> Option<C> {
        self.read().value.clone()
    }

    // -------------------------------------------------------------------------
    // Outputs
    // -------------------------------------------------------------------------

    /// Drain queued output events, oldest first.
    pub fn take_events(&self) -> Vec<TypeaheadEvent<C>> {
        std::mem::take(&mut self.write().events)
    }

    /// Store opaque validation errors for the presentation layer.
    pub fn set_validation_errors(&self, errors: Option<Value>) {
        self.write().validation_errors = errors;
        self.mark_dirty();
    }

    /// Get the stored validation errors.
    pub fn validation_errors(&self) -> Option<Value> {
        self.read().validation_errors.clone()
    }

    // -------------------------------------------------------------------------
    // Focus control
    // -------------------------------------------------------------------------

    /// Request focus for this typeahead.
    pub fn focus(&self) {
        self.focus_requested.store(true, Ordering::SeqCst);
    }

    /// Check and clear the focus request (called by the host).
    pub fn take_focus_request(&self) -> bool {
        self.focus_requested.swap(false, Ordering::SeqCst)
    }

    // -------------------------------------------------------------------------
    // Dirty tracking
    // -------------------------------------------------------------------------

    /// Check if the typeahead state has changed.
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    /// Clear the dirty flag.
    pub fn clear_dirty(&self) {
        self.dirty.store(false, Ordering::SeqCst);
    }
}

impl<C: Candidate> Clone for Typeahead<C> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            inner: Arc::clone(&self.inner),
            outstanding: Arc::clone(&self.outstanding),
            sequence: Arc::clone(&self.sequence),
            dirty: Arc::clone(&self.dirty),
            focus_requested: Arc::clone(&self.focus_requested),
        }
    }
}

impl<C: Candidate> fmt::Debug for Typeahead<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let guard = self.read();
        f.debug_struct("Typeahead")
            .field("id", &self.id)
            .field("source", &guard.source)
            .field("text", &guard.text)
            .field("outstanding", &self.outstanding_requests())
            .field("observed_kind", &guard.observed_kind)
            .finish()
    }
}
