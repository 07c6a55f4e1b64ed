//! Output events and key handling results.
//!
//! The control queues output events as they happen. The host drains the
//! queue after each interaction and forwards events to its listeners.

/// An output event emitted by the control.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeaheadEvent<C> {
    /// New model value.
    ModelChange(Option<C>),
    /// The picked candidate.
    OptionSelected(C),
    /// The model at the time "create new" was invoked.
    CreateNew(Option<C>),
}

/// Result of handling an input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventResult {
    /// Event was ignored, try other handlers.
    Ignored,
    /// Event was consumed, stop propagation.
    Consumed,
}
