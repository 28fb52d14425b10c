//! Reducer - pure function: (state, action) -> DispatchResult

use tui_dispatch::DispatchResult;

use crate::action::Action;
use crate::effect::Effect;
use crate::state::{AppState, Focus};

/// The reducer handles all state transitions
pub fn reducer(state: &mut AppState, action: Action) -> DispatchResult<Effect> {
    match action {
        // ===== Page actions =====
        Action::PageFetch => fetch_current_page(state),

        Action::PageRequestNext => {
            if !state.can_request_more() {
                return DispatchResult::unchanged();
            }
            state.cursor += 1;
            fetch_current_page(state)
        }

        Action::PageDidLoad { page, records } => {
            // Completions for anything but the outstanding page are stale.
            if state.in_flight != Some(page) {
                tracing::debug!(page, in_flight = ?state.in_flight, "dropping stale page");
                return DispatchResult::unchanged();
            }
            state.in_flight = None;
            if records.is_empty() {
                state.end_of_data = true;
            } else {
                state.cities.extend(records);
                state.rebuild_filtered();
            }
            DispatchResult::changed()
        }

        Action::PageDidError { page, .. } => {
            if state.in_flight != Some(page) {
                tracing::debug!(page, in_flight = ?state.in_flight, "dropping stale page error");
                return DispatchResult::unchanged();
            }
            state.in_flight = None;
            DispatchResult::changed()
        }

        // ===== Search actions =====
        Action::SearchFocus => {
            if state.focus == Focus::Search {
                return DispatchResult::unchanged();
            }
            state.focus = Focus::Search;
            DispatchResult::changed()
        }

        Action::SearchBlur => {
            if state.focus == Focus::Table {
                return DispatchResult::unchanged();
            }
            state.focus = Focus::Table;
            DispatchResult::changed()
        }

        Action::SearchQueryChange(query) => {
            if query == state.query {
                return DispatchResult::unchanged();
            }
            state.query = query;
            state.selected = 0;
            state.rebuild_filtered();
            DispatchResult::changed()
        }

        Action::SearchClear => {
            if state.query.is_empty() && state.focus == Focus::Table {
                return DispatchResult::unchanged();
            }
            state.query.clear();
            state.focus = Focus::Table;
            state.selected = 0;
            state.rebuild_filtered();
            DispatchResult::changed()
        }

        // ===== Sort actions =====
        Action::SortBy(column) => {
            state.sort_by(column);
            DispatchResult::changed()
        }

        // ===== Selection actions =====
        Action::SelectionMove(delta) => {
            let target = state.selection_target(delta);
            selection_result(state.set_selected(target))
        }

        Action::SelectionSet(index) => selection_result(state.set_selected(index)),

        Action::SelectionJumpTop => selection_result(state.set_selected(0)),

        Action::SelectionJumpBottom => {
            let last = state.visible_len().saturating_sub(1);
            selection_result(state.set_selected(last))
        }

        // ===== City actions =====
        Action::CityOpen => {
            let Some(route) = state.selected_city().map(|city| city.route()) else {
                return DispatchResult::unchanged();
            };
            state.route = Some(route.clone());
            DispatchResult::changed_with(Effect::OpenRoute { route })
        }

        // ===== Global actions =====
        Action::Render => DispatchResult::changed(),

        Action::Tick => {
            if state.is_loading() {
                state.tick_count = state.tick_count.wrapping_add(1);
                DispatchResult::changed()
            } else {
                DispatchResult::unchanged()
            }
        }

        Action::Quit => DispatchResult::unchanged(),
    }
}

/// Issue the fetch for `state.cursor` unless the data ran out or a page is
/// already outstanding.
fn fetch_current_page(state: &mut AppState) -> DispatchResult<Effect> {
    if !state.can_request_more() {
        return DispatchResult::unchanged();
    }
    let page = state.cursor;
    state.in_flight = Some(page);
    state.tick_count = 0;
    DispatchResult::changed_with(Effect::FetchPage {
        page,
        start: state.page_start(page),
        rows: state.page_size,
    })
}

fn selection_result(moved: bool) -> DispatchResult<Effect> {
    if moved {
        DispatchResult::changed()
    } else {
        DispatchResult::unchanged()
    }
}
