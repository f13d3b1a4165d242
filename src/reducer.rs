use tui_dispatch::DispatchResult;
use tracing::warn;

use crate::action::Action;
use crate::effect::Effect;
use crate::pagination::LoadOutcome;
use crate::state::AppState;

pub const MSG_FIRST_PAGE_FAILED: &str = "Error loading Pokémon. Please try again later.";
pub const MSG_EMPTY_CATALOG: &str = "No Pokémon available.";

pub fn reducer(state: &mut AppState, action: Action) -> DispatchResult<Effect> {
    match action {
        Action::Init => {
            let resumed = state.pagination.resume_interrupted();
            if !state.store.is_empty() {
                return if resumed {
                    DispatchResult::changed()
                } else {
                    DispatchResult::unchanged()
                };
            }
            start_load(state)
        }

        Action::PageDidLoad { generation, page } => {
            let had_items = !state.store.is_empty();
            match state.pagination.complete(generation, page, &mut state.store) {
                LoadOutcome::Stale => return DispatchResult::unchanged(),
                LoadOutcome::Merged { .. } => {
                    state.message = None;
                }
                LoadOutcome::Exhausted => {
                    state.message = (!had_items).then(|| MSG_EMPTY_CATALOG.to_string());
                }
                LoadOutcome::Failed(error) => {
                    state.message = Some(if had_items {
                        format!("Could not load more Pokémon: {error}")
                    } else {
                        MSG_FIRST_PAGE_FAILED.to_string()
                    });
                }
            }
            state.clamp_cursor();
            DispatchResult::changed()
        }

        Action::LoadMore => {
            if state.search_active() {
                return DispatchResult::unchanged();
            }
            start_load(state)
        }

        Action::LoadRetry => {
            if state.search_active() {
                return DispatchResult::unchanged();
            }
            let Some(request) = state.pagination.retry() else {
                return DispatchResult::unchanged();
            };
            state.message = None;
            DispatchResult::changed_with(Effect::FetchPage(request))
        }

        Action::CatalogReload => {
            state.store.reset();
            state.pagination.reset();
            state.navigator.close();
            state.search.active = false;
            state.search.query.clear();
            state.cursor = 0;
            state.message = None;
            match state.pagination.begin_load() {
                Some(request) => DispatchResult::changed_with(Effect::FetchPage(request)),
                None => DispatchResult::changed(),
            }
        }

        Action::CursorMove(delta) => {
            let target = (state.cursor as i64 + delta as i64).max(0) as usize;
            if !state.set_cursor(target) {
                return DispatchResult::unchanged();
            }
            DispatchResult::changed()
        }

        Action::CursorSet(index) => {
            if !state.set_cursor(index) {
                return DispatchResult::unchanged();
            }
            DispatchResult::changed()
        }

        Action::SearchStart => {
            state.search.active = true;
            state.search.query.clear();
            state.cursor = 0;
            DispatchResult::changed()
        }

        Action::SearchCancel => {
            if !state.search.active && state.search.query.is_empty() {
                return DispatchResult::unchanged();
            }
            state.search.active = false;
            state.search.query.clear();
            state.cursor = 0;
            DispatchResult::changed()
        }

        Action::SearchSubmit => {
            state.search.active = false;
            state.clamp_cursor();
            DispatchResult::changed()
        }

        Action::SearchInput(ch) => {
            state.search.query.push(ch);
            state.cursor = 0;
            DispatchResult::changed()
        }

        Action::SearchBackspace => {
            if state.search.query.pop().is_none() {
                return DispatchResult::unchanged();
            }
            state.cursor = 0;
            DispatchResult::changed()
        }

        Action::DetailOpen(id) => open_detail(state, id),

        Action::DetailOpenSelected => {
            let Some(id) = state.selected_card().map(|item| item.id) else {
                return DispatchResult::unchanged();
            };
            open_detail(state, id)
        }

        Action::DetailNext => step_detail(state, 1),
        Action::DetailPrev => step_detail(state, -1),

        Action::DetailClose => {
            if !state.navigator.is_open() {
                return DispatchResult::unchanged();
            }
            state.navigator.close();
            DispatchResult::changed()
        }

        Action::UiTerminalResize(width, height) => {
            if state.terminal_size != (width, height) {
                state.terminal_size = (width, height);
                DispatchResult::changed()
            } else {
                DispatchResult::unchanged()
            }
        }

        Action::Tick => {
            if !state.pagination.is_loading() {
                return DispatchResult::unchanged();
            }
            state.tick = state.tick.wrapping_add(1);
            DispatchResult::changed()
        }

        Action::Quit => DispatchResult::unchanged(),
    }
}

fn start_load(state: &mut AppState) -> DispatchResult<Effect> {
    let Some(request) = state.pagination.begin_load() else {
        return DispatchResult::unchanged();
    };
    state.message = None;
    DispatchResult::changed_with(Effect::FetchPage(request))
}

fn open_detail(state: &mut AppState, id: u32) -> DispatchResult<Effect> {
    match state.navigator.open(&state.store, id) {
        Ok(()) => {
            state.message = None;
            DispatchResult::changed()
        }
        Err(err) => {
            warn!(id, "detail requested for unloaded item");
            state.message = Some(format!("Cannot open detail: {err}"));
            DispatchResult::changed()
        }
    }
}

fn step_detail(state: &mut AppState, direction: i32) -> DispatchResult<Effect> {
    if !state.navigator.step(&state.store, direction) {
        return DispatchResult::unchanged();
    }
    if let Some(id) = state.navigator.selected_id() {
        state.sync_cursor_to(id);
    }
    DispatchResult::changed()
}
