//! Reducer flows driven through EffectStoreTestHarness
//!
//! Effects are drained and asserted, then the async completion is simulated
//! with `complete_action` the same way the runtime would deliver it.

use pokecards::{
    action::Action,
    api::{Cursor, FetchError, Page},
    effect::Effect,
    pagination::{LoadPhase, PageRequest, LABEL_ALL_LOADED, LABEL_LOAD_MORE},
    reducer::{reducer, MSG_EMPTY_CATALOG, MSG_FIRST_PAGE_FAILED},
    state::{AppState, Item},
};
use pretty_assertions::assert_eq;
use tui_dispatch::testing::*;
use tui_dispatch::EffectStore;

fn item(id: u32, name: &str) -> Item {
    Item {
        id,
        name: name.to_string(),
        image_ref: format!("https://img.example/{id}.png"),
        types: vec!["grass".to_string()],
        abilities: vec!["overgrow".to_string()],
        stats: Vec::new(),
        height: 7,
        weight: 69,
    }
}

fn page(ids: std::ops::Range<u32>, cursor: Cursor) -> Page {
    Page {
        items: ids.map(|id| item(id, &format!("mon-{id}"))).collect(),
        cursor,
    }
}

fn more() -> Cursor {
    Cursor::More("https://pokeapi.co/api/v2/pokemon?offset=20&limit=20".into())
}

fn is_fetch(effect: &Effect, generation: u64, offset: usize) -> bool {
    matches!(
        effect,
        Effect::FetchPage(PageRequest { generation: g, limit: 20, offset: o })
            if *g == generation && *o == offset
    )
}

#[test]
fn test_full_page_with_next_keeps_loading_enabled() {
    let mut harness = EffectStoreTestHarness::new(AppState::default(), reducer);

    harness.dispatch_collect(Action::Init);
    harness.assert_state(|s| s.pagination.is_loading());
    let effects = harness.drain_effects();
    effects.effects_count(1);
    effects.effects_first_matches(|e| is_fetch(e, 0, 0));

    harness.complete_action(Action::PageDidLoad {
        generation: 0,
        page: page(1..21, more()),
    });
    let (changed, total) = harness.process_emitted();
    assert_eq!((changed, total), (1, 1));

    harness.assert_state(|s| s.pagination.phase() == LoadPhase::Loaded);
    harness.assert_state(|s| s.pagination.offset() == 20);
    harness.assert_state(|s| s.store.len() == 20);
    harness.assert_state(|s| s.load_more_button().enabled);
    harness.assert_state(|s| s.load_more_button().label == LABEL_LOAD_MORE);

    harness.dispatch_collect(Action::LoadMore);
    harness.drain_effects().effects_first_matches(|e| is_fetch(e, 0, 20));
}

#[test]
fn test_last_page_exhausts_catalog() {
    let mut harness = EffectStoreTestHarness::new(AppState::default(), reducer);
    harness.dispatch_collect(Action::Init);
    harness.drain_effects().effects_count(1);

    harness.complete_action(Action::PageDidLoad {
        generation: 0,
        page: page(1..21, Cursor::End),
    });
    harness.process_emitted();

    harness.assert_state(|s| s.pagination.phase() == LoadPhase::Exhausted);
    harness.assert_state(|s| !s.load_more_button().enabled);
    harness.assert_state(|s| s.load_more_button().label == LABEL_ALL_LOADED);

    harness.dispatch_collect(Action::LoadMore);
    harness.drain_effects().effects_empty();
}

#[test]
fn test_list_failure_merges_nothing_and_keeps_offset() {
    let mut harness = EffectStoreTestHarness::new(AppState::default(), reducer);
    harness.dispatch_collect(Action::Init);
    harness.drain_effects().effects_count(1);

    harness.complete_action(Action::PageDidLoad {
        generation: 0,
        page: Page::failed(FetchError::Status(500)),
    });
    harness.process_emitted();

    harness.assert_state(|s| s.pagination.phase() == LoadPhase::Error);
    harness.assert_state(|s| s.store.is_empty());
    harness.assert_state(|s| s.pagination.offset() == 0);
    harness.assert_state(|s| s.message.as_deref() == Some(MSG_FIRST_PAGE_FAILED));

    harness.dispatch_collect(Action::LoadMore);
    harness.drain_effects().effects_empty();

    harness.dispatch_collect(Action::LoadRetry);
    harness.drain_effects().effects_first_matches(|e| is_fetch(e, 0, 0));
}

#[test]
fn test_reload_discards_in_flight_page() {
    let mut harness = EffectStoreTestHarness::new(AppState::default(), reducer);
    harness.dispatch_collect(Action::Init);
    harness.drain_effects().effects_first_matches(|e| is_fetch(e, 0, 0));

    harness.dispatch_collect(Action::CatalogReload);
    harness.drain_effects().effects_first_matches(|e| is_fetch(e, 1, 0));

    harness.complete_action(Action::PageDidLoad {
        generation: 0,
        page: page(1..21, more()),
    });
    let (changed, _) = harness.process_emitted();
    assert_eq!(changed, 0);
    harness.assert_state(|s| s.store.is_empty());
    harness.assert_state(|s| s.pagination.is_loading());

    harness.complete_action(Action::PageDidLoad {
        generation: 1,
        page: page(1..4, Cursor::End),
    });
    harness.process_emitted();
    harness.assert_state(|s| s.store.len() == 3);
}

#[test]
fn test_empty_catalog_message() {
    let mut harness = EffectStoreTestHarness::new(AppState::default(), reducer);
    harness.dispatch_collect(Action::Init);
    harness.drain_effects().effects_count(1);

    harness.complete_action(Action::PageDidLoad {
        generation: 0,
        page: page(0..0, Cursor::End),
    });
    harness.process_emitted();

    harness.assert_state(|s| s.message.as_deref() == Some(MSG_EMPTY_CATALOG));
}

#[test]
fn test_overlapping_pages_stay_unique_and_ordered() {
    let mut store = EffectStore::new(AppState::default(), reducer);

    let first = store.dispatch(Action::Init);
    let Some(Effect::FetchPage(request)) = first.effects.first().cloned() else {
        panic!("expected a FetchPage effect");
    };
    store.dispatch(Action::PageDidLoad {
        generation: request.generation,
        page: page(5..10, more()),
    });

    let second = store.dispatch(Action::LoadMore);
    let Some(Effect::FetchPage(request)) = second.effects.first().cloned() else {
        panic!("expected a FetchPage effect");
    };
    store.dispatch(Action::PageDidLoad {
        generation: request.generation,
        page: page(1..7, more()),
    });

    let ids: Vec<u32> = store.state().store.snapshot().iter().map(|item| item.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5, 6, 7, 8, 9]);
}

#[test]
fn test_search_prompts_and_results() {
    let mut state = AppState::default();
    state.store.merge([
        item(1, "bulbasaur"),
        item(2, "ivysaur"),
        item(25, "pikachu"),
    ]);
    let mut harness = EffectStoreTestHarness::new(state, reducer);

    harness.dispatch_collect(Action::SearchStart);
    harness.dispatch_collect(Action::SearchInput('s'));
    harness.dispatch_collect(Action::SearchInput('a'));
    harness.assert_state(|s| s.view().results.is_empty());
    harness.assert_state(|s| !s.load_more_button().visible);

    harness.dispatch_collect(Action::SearchInput('U'));
    harness.assert_state(|s| s.view().ids() == vec![1, 2]);

    harness.dispatch_collect(Action::SearchSubmit);
    harness.assert_state(|s| !s.search.active && s.search.query == "saU");

    harness.dispatch_collect(Action::SearchCancel);
    harness.assert_state(|s| s.view().results.len() == 3);
    harness.assert_state(|s| s.load_more_button().visible);
}

#[test]
fn test_detail_open_absent_id_keeps_selection() {
    let mut state = AppState::default();
    state.store.merge([item(1, "bulbasaur"), item(4, "charmander")]);
    let mut harness = EffectStoreTestHarness::new(state, reducer);

    harness.dispatch_collect(Action::DetailOpen(4));
    harness.dispatch_collect(Action::DetailOpen(150));

    harness.assert_state(|s| s.navigator.selected_id() == Some(4));
    harness.assert_state(|s| s.detail().map(|item| item.name.as_str()) == Some("charmander"));

    harness.dispatch_collect(Action::DetailPrev);
    harness.assert_state(|s| s.navigator.selected_id() == Some(1));
    harness.assert_state(|s| s.cursor == 0);

    harness.dispatch_collect(Action::DetailPrev);
    harness.assert_state(|s| s.navigator.selected_id() == Some(1));

    harness.dispatch_collect(Action::DetailClose);
    harness.assert_state(|s| !s.navigator.is_open());
}

#[test]
fn test_detail_follows_grid_cursor() {
    let mut state = AppState::default();
    state.store.merge((1..=6).map(|id| item(id, &format!("mon-{id}"))));
    let mut harness = EffectStoreTestHarness::new(state, reducer);

    harness.dispatch_collect(Action::CursorMove(4));
    harness.dispatch_collect(Action::DetailOpenSelected);
    harness.assert_state(|s| s.navigator.selected_id() == Some(5));

    harness.dispatch_collect(Action::DetailNext);
    harness.dispatch_collect(Action::DetailNext);
    harness.assert_state(|s| s.navigator.selected_id() == Some(6));
    harness.assert_state(|s| s.cursor == 5);
}
