//! Form-binding protocol.
//!
//! Hosts with a generic form system drive every control through the same
//! read/write/notify contract. `Typeahead` implements it so it can sit in a
//! form exactly like a plain text input.

use crate::candidate::Candidate;
use crate::error::TypeaheadError;
use crate::state::{ChangeCallback, TouchedCallback, Typeahead};

/// Trait for controls that can be bound to a host form.
pub trait FormControl: Send + Sync {
    /// The value type held by the control.
    type Value;

    /// Read the current form value.
    fn form_value(&self) -> Option<Self::Value>;

    /// Write a value from the form. Does not invoke the change callback.
    fn write_value(&self, value: Option<Self::Value>) -> Result<(), TypeaheadError>;

    /// Register the callback for user-driven value changes.
    fn register_on_change(&self, callback: ChangeCallback<Self::Value>);

    /// Register the callback invoked when the control is touched (blurred).
    fn register_on_touched(&self, callback: TouchedCallback);

    /// Enable or disable the control.
    fn set_disabled(&self, disabled: bool);

    /// Check whether the control is disabled.
    fn is_disabled(&self) -> bool;

    /// Clear the value and the visible text.
    fn reset(&self);
}

impl<C: Candidate> FormControl for Typeahead<C> {
    type Value = C;

    fn form_value(&self) -> Option<C> {
        self.value()
    }

    fn write_value(&self, value: Option<C>) -> Result<(), TypeaheadError> {
        let text = match &value {
            Some(v) => self.display_string(v)?,
            None => String::new(),
        };
        let mut guard = self.write();
        guard.replace_text(text);
        guard.value = value.clone();
        guard.assign_model(value);
        self.mark_dirty();
        Ok(())
    }

    fn register_on_change(&self, callback: ChangeCallback<C>) {
        self.write().on_change = Some(callback);
    }

    fn register_on_touched(&self, callback: TouchedCallback) {
        self.write().on_touched = Some(callback);
    }

    fn set_disabled(&self, disabled: bool) {
        self.write().disabled = disabled;
        self.mark_dirty();
    }

    fn is_disabled(&self) -> bool {
        self.read().disabled
    }

    fn reset(&self) {
        let mut guard = self.write();
        guard.replace_text(String::new());
        guard.value = None;
        guard.assign_model(None);
        guard.close_list();
        self.mark_dirty();
    }
}
