//! Input event handling: keys, focus, blur and initialization.

use crate::candidate::Candidate;
use crate::dispatch::FetchOutcome;
use crate::error::TypeaheadError;
use crate::events::EventResult;
use crate::keys::Key;
use crate::state::Typeahead;

/// Where focus went when the input lost it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlurTarget {
    /// The search-trigger button next to the input.
    SearchTrigger,
    /// Anywhere else (or nowhere).
    Elsewhere,
}

impl<C: Candidate> Typeahead<C> {
    /// Run one-time initialization.
    ///
    /// Records a focus request when `focus_on` is set and prefetches when
    /// `do_prefetch` is set and a remote source exists. Later calls do nothing.
    pub async fn initialize(&self) -> Result<(), TypeaheadError> {
        let (focus_on, prefetch) = {
            let mut guard = self.write();
            if guard.initialized {
                return Ok(());
            }
            guard.initialized = true;
            (guard.config.focus_on, guard.config.do_prefetch && guard.remote_active())
        };

        if focus_on {
            self.focus();
        }
        if prefetch {
            self.prefetch().await?;
        }
        Ok(())
    }

    /// Handle a key press while the input has focus.
    ///
    /// Editing keys change the text and dispatch a query. Navigation keys
    /// move the caret or the highlight and never dispatch.
    pub async fn on_key(&self, key: Key) -> Result<EventResult, TypeaheadError> {
        if self.read().disabled {
            return Ok(EventResult::Ignored);
        }

        if key.is_navigation() {
            return self.on_navigation_key(key);
        }

        match key {
            Key::Char(c) => self.insert_char(c),
            Key::Backspace => self.delete_char_before(),
            Key::Delete => self.delete_char_at(),
            _ => return Ok(EventResult::Ignored),
        }
        self.after_edit().await?;
        Ok(EventResult::Consumed)
    }

    fn on_navigation_key(&self, key: Key) -> Result<EventResult, TypeaheadError> {
        match key {
            Key::Left => self.text_cursor_left(),
            Key::Right => self.text_cursor_right(),
            Key::Home => self.text_cursor_home(),
            Key::End => self.text_cursor_end(),
            Key::Up => self.highlight_up(),
            Key::Down => self.highlight_down(),
            Key::Enter => {
                if !self.select_highlighted()? {
                    return Ok(EventResult::Ignored);
                }
            }
            Key::Escape => {
                let mut guard = self.write();
                if guard.candidates.is_none() {
                    return Ok(EventResult::Ignored);
                }
                guard.close_list();
                self.mark_dirty();
            }
            Key::Tab | Key::PageUp | Key::PageDown | Key::Char(_) | Key::Backspace | Key::Delete => {
                return Ok(EventResult::Ignored);
            }
        }
        Ok(EventResult::Consumed)
    }

    /// Replace the whole input text (paste, IME commit) and dispatch.
    pub async fn set_input_text(
        &self,
        text: impl Into<String>,
    ) -> Result<FetchOutcome, TypeaheadError> {
        self.write().replace_text(text.into());
        self.mark_dirty();
        self.after_edit().await
    }

    /// Handle the input gaining focus: dispatch to re-show candidates.
    pub async fn on_focus(&self) -> Result<FetchOutcome, TypeaheadError> {
        if self.read().disabled {
            return Ok(FetchOutcome::Skipped);
        }
        self.dispatch(true).await
    }

    /// Handle the input losing focus.
    ///
    /// Marks the form control as touched. When a search trigger is rendered,
    /// the input is empty and focus did not move to the trigger, the text is
    /// restored from the model so the field never looks blank while a model
    /// is selected.
    pub fn on_blur(&self, target: BlurTarget) -> Result<(), TypeaheadError> {
        let (restore, model, on_touched) = {
            let guard = self.read();
            let restore = guard.config.has_search_trigger
                && guard.text.is_empty()
                && target != BlurTarget::SearchTrigger;
            (restore, guard.model.clone(), guard.on_touched.clone())
        };

        if restore {
            let text = match &model {
                Some(m) => self.display_string(m)?,
                None => String::new(),
            };
            self.write().replace_text(text);
            self.mark_dirty();
        }

        if let Some(touched) = on_touched {
            touched();
        }
        Ok(())
    }

    /// Keystroke handling after the text changed.
    async fn after_edit(&self) -> Result<FetchOutcome, TypeaheadError> {
        let on_change = {
            let mut guard = self.write();
            if guard.text.is_empty() {
                let had_value = guard.value.take().is_some();
                guard.assign_model(None);
                if had_value { guard.on_change.clone() } else { None }
            } else {
                None
            }
        };
        if let Some(notify) = on_change {
            notify(None);
        }

        self.dispatch(false).await
    }

    // -------------------------------------------------------------------------
    // Text manipulation
    // -------------------------------------------------------------------------

    /// Insert a character at the cursor position.
    pub(crate) fn insert_char(&self, c: char) {
        let mut guard = self.write();
        let cursor = guard.text_cursor;
        guard.text.insert(cursor, c);
        guard.text_cursor += c.len_utf8();
        self.mark_dirty();
    }

    /// Delete the character before the cursor (backspace).
    pub(crate) fn delete_char_before(&self) {
        let mut guard = self.write();
        if guard.text_cursor > 0 {
            let prev_cursor = guard.text[..guard.text_cursor]
                .char_indices()
                .last()
                .map(|(i, _)| i)
                .unwrap_or(0);
            guard.text.remove(prev_cursor);
            guard.text_cursor = prev_cursor;
            self.mark_dirty();
        }
    }

    /// Delete the character at the cursor (delete key).
    pub(crate) fn delete_char_at(&self) {
        let mut guard = self.write();
        let cursor = guard.text_cursor;
        if cursor < guard.text.len() {
            guard.text.remove(cursor);
            self.mark_dirty();
        }
    }

    /// Move text cursor left.
    pub(crate) fn text_cursor_left(&self) {
        let mut guard = self.write();
        if guard.text_cursor > 0 {
            guard.text_cursor = guard.text[..guard.text_cursor]
                .char_indices()
                .last()
                .map(|(i, _)| i)
                .unwrap_or(0);
            self.mark_dirty();
        }
    }

    /// Move text cursor right.
    pub(crate) fn text_cursor_right(&self) {
        let mut guard = self.write();
        if guard.text_cursor < guard.text.len() {
            let cursor = guard.text_cursor;
            guard.text_cursor = guard.text[cursor..]
                .char_indices()
                .nth(1)
                .map(|(i, _)| cursor + i)
                .unwrap_or(guard.text.len());
            self.mark_dirty();
        }
    }

    /// Move text cursor to start.
    pub(crate) fn text_cursor_home(&self) {
        let mut guard = self.write();
        if guard.text_cursor != 0 {
            guard.text_cursor = 0;
            self.mark_dirty();
        }
    }

    /// Move text cursor to end.
    pub(crate) fn text_cursor_end(&self) {
        let mut guard = self.write();
        let end = guard.text.len();
        if guard.text_cursor != end {
            guard.text_cursor = end;
            self.mark_dirty();
        }
    }
}
