mod common;

use std::sync::{Arc, Mutex};

use serde_json::{Value, json};
use typeahead::{
    EventResult, FormControl, Key, SourceConfig, Typeahead, TypeaheadConfig, TypeaheadEvent,
};

use common::{FnSource, names};

fn fruit(config: TypeaheadConfig) -> Typeahead {
    Typeahead::new(
        config.with_display_item("item.name"),
        SourceConfig::local([
            json!({"name": "Apple"}),
            json!({"name": "Apricot"}),
            json!({"name": "Banana"}),
        ]),
    )
    .unwrap()
}

async fn type_text(typeahead: &Typeahead, text: &str) {
    for c in text.chars() {
        typeahead.on_key(Key::Char(c)).await.unwrap();
    }
}

#[tokio::test]
async fn test_typing_dispatches_once_threshold_is_met() {
    let typeahead = fruit(TypeaheadConfig::default());

    typeahead.on_key(Key::Char('a')).await.unwrap();
    assert_eq!(typeahead.candidates(), None);

    typeahead.on_key(Key::Char('p')).await.unwrap();
    assert_eq!(names(&typeahead.candidates().unwrap()), ["Apple", "Apricot"]);

    typeahead.on_key(Key::Char('r')).await.unwrap();
    assert_eq!(names(&typeahead.candidates().unwrap()), ["Apricot"]);

    typeahead.on_key(Key::Backspace).await.unwrap();
    assert_eq!(names(&typeahead.candidates().unwrap()), ["Apple", "Apricot"]);
}

#[tokio::test]
async fn test_navigation_keys_never_dispatch() {
    let source = Arc::new(FnSource::new(|_: &typeahead::QueryParams| {
        Ok(vec![json!({"name": "Apple"})])
    }));
    let typeahead: Typeahead =
        Typeahead::new(TypeaheadConfig::default(), SourceConfig::Remote(source.clone())).unwrap();

    type_text(&typeahead, "ap").await;
    assert_eq!(source.call_count(), 1);

    for key in [Key::Left, Key::Right, Key::Home, Key::End, Key::Up, Key::Down, Key::Tab] {
        typeahead.on_key(key).await.unwrap();
    }
    assert_eq!(source.call_count(), 1);
    assert_eq!(typeahead.text(), "ap");
}

#[tokio::test]
async fn test_arrows_and_enter_select_highlighted_candidate() {
    let typeahead = fruit(TypeaheadConfig::default());
    type_text(&typeahead, "ap").await;

    assert_eq!(typeahead.on_key(Key::Down).await.unwrap(), EventResult::Consumed);
    assert_eq!(typeahead.on_key(Key::Enter).await.unwrap(), EventResult::Consumed);

    assert_eq!(typeahead.model(), Some(json!({"name": "Apricot"})));
    assert_eq!(typeahead.text(), "Apricot");
    assert_eq!(typeahead.candidates(), None);

    // Nothing left to pick.
    assert_eq!(typeahead.on_key(Key::Enter).await.unwrap(), EventResult::Ignored);
}

#[tokio::test]
async fn test_escape_closes_the_list() {
    let typeahead = fruit(TypeaheadConfig::default());
    type_text(&typeahead, "ap").await;

    assert_eq!(typeahead.on_key(Key::Escape).await.unwrap(), EventResult::Consumed);
    assert_eq!(typeahead.candidates(), None);
    assert_eq!(typeahead.on_key(Key::Escape).await.unwrap(), EventResult::Ignored);
}

#[tokio::test]
async fn test_emptying_the_input_clears_the_model() {
    let typeahead = fruit(TypeaheadConfig::default());
    let seen: Arc<Mutex<Vec<Option<Value>>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    typeahead.register_on_change(Arc::new(move |v| sink.lock().unwrap().push(v)));

    typeahead.select(json!({"name": "Apple"})).unwrap();
    typeahead.take_events();

    for _ in 0.."Apple".len() {
        typeahead.on_key(Key::Backspace).await.unwrap();
    }

    assert_eq!(typeahead.text(), "");
    assert_eq!(typeahead.model(), None);
    assert_eq!(typeahead.form_value(), None);
    assert_eq!(typeahead.take_events(), vec![TypeaheadEvent::ModelChange(None)]);
    assert_eq!(
        *seen.lock().unwrap(),
        vec![Some(json!({"name": "Apple"})), None]
    );
}

#[tokio::test]
async fn test_disabled_control_ignores_input() {
    let typeahead = fruit(TypeaheadConfig::default());
    typeahead.set_disabled(true);

    assert_eq!(typeahead.on_key(Key::Char('a')).await.unwrap(), EventResult::Ignored);
    assert_eq!(typeahead.text(), "");
    assert_eq!(
        typeahead.on_focus().await.unwrap(),
        typeahead::FetchOutcome::Skipped
    );
}

#[tokio::test]
async fn test_focus_on_requests_focus_at_initialization() {
    let typeahead = fruit(TypeaheadConfig::default().with_focus_on(true));
    assert!(!typeahead.take_focus_request());

    typeahead.initialize().await.unwrap();
    assert!(typeahead.take_focus_request());
}

#[tokio::test]
async fn test_focus_reshows_candidates_for_current_text() {
    let typeahead = fruit(TypeaheadConfig::default());
    type_text(&typeahead, "ban").await;
    typeahead.on_key(Key::Escape).await.unwrap();

    typeahead.on_focus().await.unwrap();
    assert_eq!(names(&typeahead.candidates().unwrap()), ["Banana"]);
}

#[tokio::test]
async fn test_state_changes_mark_dirty() {
    let typeahead = fruit(TypeaheadConfig::default());
    typeahead.clear_dirty();

    typeahead.on_key(Key::Char('a')).await.unwrap();
    assert!(typeahead.is_dirty());

    typeahead.clear_dirty();
    typeahead.on_key(Key::Home).await.unwrap();
    typeahead.on_key(Key::Home).await.unwrap();
    assert!(typeahead.is_dirty());
}
