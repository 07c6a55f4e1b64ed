//! Type-ahead input control core.
//!
//! A [`Typeahead`] turns keystrokes into candidate lookups against either a
//! remote source or a local collection, keeps track of in-flight requests,
//! and reports the picked candidate through output events and a generic
//! form-binding protocol ([`FormControl`]).
//!
//! Rendering, focus wiring and styling belong to the host. The host feeds
//! keys, focus and blur into the control, reads [`Typeahead::query_state`]
//! to draw the list, and drains [`Typeahead::take_events`] after each
//! interaction.

pub mod binding;
pub mod candidate;
pub mod config;
pub mod display;
pub mod error;
pub mod events;
pub mod filter;
pub mod keys;
pub mod source;

mod dispatch;
mod handlers;
mod selection;
mod state;

pub use binding::FormControl;
pub use candidate::{Candidate, ValueKind};
pub use config::{DEFAULT_MIN_CHARS, FetchOrdering, TypeaheadConfig};
pub use dispatch::FetchOutcome;
pub use display::{DisplayFn, PropertyPath, TemplateRef};
pub use error::{FetchError, TypeaheadError};
pub use events::{EventResult, TypeaheadEvent};
pub use handlers::BlurTarget;
pub use keys::Key;
pub use source::{QueryParams, RemoteSource, SourceConfig};
pub use state::{
    ChangeCallback, FilterCallback, QueryState, TouchedCallback, Typeahead, TypeaheadId,
};
