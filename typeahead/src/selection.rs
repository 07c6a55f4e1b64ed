//! Selection and model assignment.

use crate::candidate::{Candidate, ValueKind};
use crate::error::TypeaheadError;
use crate::events::TypeaheadEvent;
use crate::state::Typeahead;

impl<C: Candidate> Typeahead<C> {
    /// Assign the model.
    ///
    /// A different value is always stored. A `ModelChange` event is queued
    /// only when the new value is `None` or matches the observed candidate
    /// kind. Returns whether the event was queued.
    pub fn set_model(&self, model: Option<C>) -> bool {
        let emitted = self.write().assign_model(model);
        self.mark_dirty();
        emitted
    }

    /// Select a candidate.
    ///
    /// The input text becomes the candidate's display string, value and
    /// model are set, `OptionSelected` is queued and the form is notified.
    /// With `clear_after_search` the control is cleared right after.
    pub fn select(&self, candidate: C) -> Result<(), TypeaheadError> {
        let label = self.display_string(&candidate)?;
        log::debug!("typeahead {} selected {:?}", self.id(), label);

        let (on_change, clear_after) = {
            let mut guard = self.write();
            guard.replace_text(label);
            guard.value = Some(candidate.clone());
            guard.assign_model(Some(candidate.clone()));
            if candidate.kind() != ValueKind::Null {
                guard.events.push(TypeaheadEvent::OptionSelected(candidate.clone()));
            }
            guard.close_list();
            (guard.on_change.clone(), guard.config.clear_after_search)
        };
        self.mark_dirty();

        if let Some(notify) = on_change {
            notify(Some(candidate));
        }
        if clear_after {
            self.clear();
        }
        Ok(())
    }

    /// Select the highlighted candidate, if the list has one.
    ///
    /// Returns whether a candidate was selected.
    pub fn select_highlighted(&self) -> Result<bool, TypeaheadError> {
        let candidate = {
            let guard = self.read();
            guard
                .candidates
                .as_ref()
                .and_then(|c| c.get(guard.highlight))
                .cloned()
        };
        match candidate {
            Some(candidate) => {
                self.select(candidate)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Move the highlight up.
    pub fn highlight_up(&self) {
        let mut guard = self.write();
        if guard.highlight > 0 {
            guard.highlight -= 1;
            self.mark_dirty();
        }
    }

    /// Move the highlight down.
    pub fn highlight_down(&self) {
        let mut guard = self.write();
        let max = guard.candidates.as_ref().map_or(0, |c| c.len().saturating_sub(1));
        if guard.highlight < max {
            guard.highlight += 1;
            self.mark_dirty();
        }
    }

    /// Clear the control: empty text, no value, no model.
    ///
    /// This is a user-driven change, so the form is notified.
    pub fn clear(&self) {
        let on_change = {
            let mut guard = self.write();
            guard.replace_text(String::new());
            let had_value = guard.value.take().is_some();
            guard.assign_model(None);
            if had_value { guard.on_change.clone() } else { None }
        };
        self.mark_dirty();

        if let Some(notify) = on_change {
            notify(None);
        }
    }

    /// Invoke the "create new" affordance.
    ///
    /// Queues `CreateNew` with the current model. If the model matches the
    /// observed candidate kind, the input text is first rewritten to its
    /// display string.
    pub fn create_new(&self) -> Result<(), TypeaheadError> {
        let (model, consistent) = {
            let guard = self.read();
            let consistent = guard
                .model
                .as_ref()
                .is_some_and(|m| Some(m.kind()) == guard.observed_kind);
            (guard.model.clone(), consistent)
        };

        let label = match (&model, consistent) {
            (Some(m), true) => Some(self.display_string(m)?),
            _ => None,
        };

        let mut guard = self.write();
        if let Some(label) = label {
            guard.replace_text(label);
        }
        log::debug!("typeahead {} create new requested", self.id());
        guard.events.push(TypeaheadEvent::CreateNew(model));
        self.mark_dirty();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use serde_json::{Value, json};

    use super::*;
    use crate::config::TypeaheadConfig;
    use crate::source::SourceConfig;

    fn fruit(config: TypeaheadConfig) -> Typeahead {
        Typeahead::new(
            config.with_display_item("item.name"),
            SourceConfig::local([json!({"name": "Apple"}), json!({"name": "Apricot"})]),
        )
        .unwrap()
    }

    #[test]
    fn test_select_sets_value_model_and_text() {
        let typeahead = fruit(TypeaheadConfig::default());
        let apple = json!({"name": "Apple"});
        typeahead.select(apple.clone()).unwrap();

        assert_eq!(typeahead.model(), Some(apple.clone()));
        assert_eq!(typeahead.value(), Some(apple.clone()));
        assert_eq!(typeahead.text(), "Apple");
        assert_eq!(
            typeahead.take_events(),
            vec![
                TypeaheadEvent::ModelChange(Some(apple.clone())),
                TypeaheadEvent::OptionSelected(apple),
            ]
        );
    }

    #[test]
    fn test_select_with_clear_after_search() {
        let typeahead = fruit(TypeaheadConfig::default().with_clear_after_search(true));
        let seen: Arc<Mutex<Vec<Option<Value>>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        typeahead.write().on_change = Some(Arc::new(move |v| sink.lock().unwrap().push(v)));

        let apple = json!({"name": "Apple"});
        typeahead.select(apple.clone()).unwrap();

        assert_eq!(typeahead.model(), None);
        assert_eq!(typeahead.value(), None);
        assert_eq!(typeahead.text(), "");
        assert_eq!(*seen.lock().unwrap(), vec![Some(apple.clone()), None]);

        let events = typeahead.take_events();
        assert_eq!(events.len(), 3);
        assert_eq!(events[1], TypeaheadEvent::OptionSelected(apple));
        assert_eq!(events[2], TypeaheadEvent::ModelChange(None));
    }

    #[test]
    fn test_null_selection_is_not_announced() {
        let typeahead = fruit(TypeaheadConfig::default());
        typeahead.set_display_fn(Some(Arc::new(|_: &Value| String::new())));
        typeahead.select(Value::Null).unwrap();
        let events = typeahead.take_events();
        assert!(
            events
                .iter()
                .all(|e| !matches!(e, TypeaheadEvent::OptionSelected(_)))
        );
    }

    #[test]
    fn test_select_with_unresolvable_display_changes_nothing() {
        let typeahead = fruit(TypeaheadConfig::default());
        let err = typeahead.select(json!({"title": "Apple"})).unwrap_err();
        assert!(matches!(err, TypeaheadError::DisplayResolution { .. }));
        assert_eq!(typeahead.model(), None);
        assert!(typeahead.take_events().is_empty());
    }

    #[test]
    fn test_create_new_rewrites_text_for_consistent_model() {
        let typeahead = fruit(TypeaheadConfig::default().with_create_new("Add"));
        let apricot = json!({"name": "Apricot"});
        typeahead.set_model(Some(apricot.clone()));
        typeahead.take_events();

        typeahead.create_new().unwrap();
        assert_eq!(typeahead.text(), "Apricot");
        assert_eq!(
            typeahead.take_events(),
            vec![TypeaheadEvent::CreateNew(Some(apricot))]
        );
    }

    #[test]
    fn test_create_new_keeps_text_for_inconsistent_model() {
        let typeahead = fruit(TypeaheadConfig::default());
        typeahead.write().replace_text("Kiwi".into());
        typeahead.set_model(Some(json!("Kiwi")));

        typeahead.create_new().unwrap();
        assert_eq!(typeahead.text(), "Kiwi");
        assert_eq!(
            typeahead.take_events(),
            vec![TypeaheadEvent::CreateNew(Some(json!("Kiwi")))]
        );
    }

    #[test]
    fn test_highlight_bounds() {
        let typeahead = fruit(TypeaheadConfig::default());
        typeahead.highlight_down();
        assert_eq!(typeahead.highlight(), 0);

        typeahead.write().candidates = Some(vec![json!({"name": "Apple"}), json!({"name": "Apricot"})]);
        typeahead.highlight_down();
        typeahead.highlight_down();
        assert_eq!(typeahead.highlight(), 1);
        typeahead.highlight_up();
        typeahead.highlight_up();
        assert_eq!(typeahead.highlight(), 0);

        typeahead.highlight_down();
        assert!(typeahead.select_highlighted().unwrap());
        assert_eq!(typeahead.text(), "Apricot");
        assert!(!typeahead.select_highlighted().unwrap());
    }
}
