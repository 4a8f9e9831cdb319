//! Reducer for the list state machine.

use std::collections::{BTreeMap, HashSet};

use crate::filter::{AndFilter, OrFilter, Query};
use crate::mvi::Reducer;
use crate::schema::Record;

use super::intent::ListIntent;
use super::state::ListState;

/// Pure list transitions. Fetch I/O is driven by the controller around the
/// dispatch call.
pub struct ListReducer;

impl Reducer for ListReducer {
    type State = ListState;
    type Intent = ListIntent;

    fn reduce(mut state: Self::State, intent: Self::Intent) -> Self::State {
        match intent {
            ListIntent::PageArrived { records } => {
                let received = records.len();
                if state.cursor == 0 {
                    state.window = dedup(Vec::new(), records);
                } else {
                    state.window = dedup(std::mem::take(&mut state.window), records);
                }
                state.in_flight = false;
                state.last_error = None;
                // A short page is the end-of-data signal.
                if received < state.page_size {
                    state.reached_end = true;
                }
                state
            }

            ListIntent::AdvancePage => {
                if state.in_flight || state.reached_end {
                    return state;
                }
                // The page at `cursor` never arrived: request it again.
                if state.last_error.is_some() {
                    state.in_flight = true;
                    return state;
                }
                state.cursor += state.page_size;
                state.in_flight = true;
                state
            }

            ListIntent::AddSort { path } => {
                let Some(entry) = state.catalog.entry(&path) else {
                    return state;
                };
                let ascending = !state.sort_policy.descending_for(entry.field_type());
                edit_catalog(state, |catalog| catalog.add_sort(&path, ascending))
            }
            ListIntent::RemoveSort { path } => {
                edit_catalog(state, |catalog| catalog.remove_sort(&path))
            }
            ListIntent::MoveSort { path, direction } => {
                edit_catalog(state, |catalog| catalog.move_sort(&path, direction))
            }
            ListIntent::ToggleSortDirection { path } => {
                edit_catalog(state, |catalog| catalog.toggle_sort_direction(&path))
            }

            ListIntent::UpsertGroup { group } => {
                let affecting = touches_active(state.query.group(group.index), &group);
                let query = state.query.clone().upsert_group(group);
                edit_query(state, query, affecting)
            }
            ListIntent::RemoveGroup { group } => {
                let affecting = state
                    .query
                    .group(group.index)
                    .is_some_and(AndFilter::is_predicate_active);
                let query = state.query.clone().remove_group(&group);
                edit_query(state, query, affecting)
            }
            ListIntent::UpsertFilter { group, filter } => {
                let existing = state.query.group(group);
                let updated = existing
                    .cloned()
                    .unwrap_or_else(|| AndFilter::new(group))
                    .upsert_filter(filter);
                let affecting = touches_active(existing, &updated);
                let query = state.query.clone().upsert_group(updated);
                edit_query(state, query, affecting)
            }
            ListIntent::RemoveFilter { group, index } => {
                let Some(existing) = state.query.group(group).cloned() else {
                    return state;
                };
                let affecting = existing
                    .filters
                    .get(&index)
                    .is_some_and(|f| f.is_predicate_active());
                let query = state
                    .query
                    .clone()
                    .upsert_group(existing.remove_filter(index));
                edit_query(state, query, affecting)
            }

            ListIntent::SetPageSize { page_size } => {
                if page_size == 0 || page_size == state.page_size {
                    return state;
                }
                state.page_size = page_size;
                state.reset_window();
                state
            }

            ListIntent::Reload => {
                state.reload_epoch += 1;
                state.reset_window();
                state.in_flight = true;
                state.last_error = None;
                state
            }

            ListIntent::ExternalRemove { ids } => {
                let ids: HashSet<u64> = ids.into_iter().collect();
                let before = state.window.len();
                state.window.retain(|record| !ids.contains(&record.id));
                if state.window.len() == before {
                    return state;
                }
                // Re-anchor so the next fetch continues right after the window.
                state.cursor = state.window.len();
                state
            }

            ListIntent::SetLayout { name } => {
                state.layout = name;
                state
            }

            ListIntent::FetchStarted => {
                state.in_flight = true;
                state
            }

            ListIntent::FetchFailed { error } => {
                state.in_flight = false;
                state.last_error = Some(error);
                state
            }
        }
    }
}

/// Append records whose id is not already present, keeping fetch order.
fn dedup(mut window: Vec<Record>, incoming: Vec<Record>) -> Vec<Record> {
    let mut seen: HashSet<u64> = window.iter().map(|r| r.id).collect();
    window.extend(incoming.into_iter().filter(|r| seen.insert(r.id)));
    window
}

/// Apply a sort edit; an edit that changed the catalog invalidates the window.
fn edit_catalog(
    mut state: ListState,
    edit: impl FnOnce(OrFilter) -> OrFilter,
) -> ListState {
    let catalog = edit(state.catalog.clone());
    if catalog != state.catalog {
        state.catalog = catalog;
        state.reset_window();
    }
    state
}

/// Whether replacing `old` with `new` adds, changes or drops a
/// predicate-active filter.
fn touches_active(old: Option<&AndFilter>, new: &AndFilter) -> bool {
    let empty = BTreeMap::new();
    let before = old.map_or(&empty, |group| &group.filters);
    before.keys().chain(new.filters.keys()).any(|index| {
        let (was, now) = (before.get(index), new.filters.get(index));
        was != now
            && (was.is_some_and(OrFilter::is_predicate_active)
                || now.is_some_and(OrFilter::is_predicate_active))
    })
}

/// Install `query`; reset only when the touched filter carries an active
/// predicate and the query actually changed.
fn edit_query(mut state: ListState, query: Query, affecting: bool) -> ListState {
    let changed = query != state.query;
    state.query = query;
    if affecting && changed {
        state.reset_window();
    }
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterPath;
    use crate::schema::{FieldType, Path};
    use chrono::Utc;

    fn record(id: u64) -> Record {
        Record::new(id, Utc::now())
    }

    fn state_with_window(ids: &[u64], cursor: usize) -> ListState {
        let catalog = OrFilter::new(0)
            .with_filter_path(FilterPath::new("Title", Path::field("title"), FieldType::Str));
        let mut state = ListState::new("book".into(), catalog, 2);
        state.window = ids.iter().copied().map(record).collect();
        state.cursor = cursor;
        state
    }

    fn ids(state: &ListState) -> Vec<u64> {
        state.window.iter().map(|r| r.id).collect()
    }

    #[test]
    fn first_page_replaces_window() {
        let state = state_with_window(&[9], 0);
        let state = ListReducer::reduce(
            state,
            ListIntent::PageArrived {
                records: vec![record(1), record(2)],
            },
        );
        assert_eq!(ids(&state), vec![1, 2]);
        assert!(!state.reached_end);
    }

    #[test]
    fn later_page_appends_without_duplicates() {
        let state = state_with_window(&[1, 2], 2);
        let state = ListReducer::reduce(
            state,
            ListIntent::PageArrived {
                records: vec![record(2), record(3)],
            },
        );
        assert_eq!(ids(&state), vec![1, 2, 3]);
    }

    #[test]
    fn short_page_marks_end() {
        let mut state = state_with_window(&[1, 2], 2);
        state.in_flight = true;
        let state = ListReducer::reduce(
            state,
            ListIntent::PageArrived {
                records: vec![record(3)],
            },
        );
        assert!(state.reached_end);
        assert!(!state.in_flight);

        let advanced = ListReducer::reduce(state.clone(), ListIntent::AdvancePage);
        assert_eq!(advanced, state);
    }

    #[test]
    fn advance_is_noop_while_fetching() {
        let mut state = state_with_window(&[1, 2], 0);
        state.in_flight = true;
        let advanced = ListReducer::reduce(state.clone(), ListIntent::AdvancePage);
        assert_eq!(advanced, state);
    }

    #[test]
    fn advance_moves_cursor_by_page_size() {
        let state = state_with_window(&[1, 2], 0);
        let state = ListReducer::reduce(state, ListIntent::AdvancePage);
        assert_eq!(state.cursor, 2);
        assert!(state.in_flight);
    }

    #[test]
    fn external_remove_reanchors_cursor() {
        let state = state_with_window(&[0, 1, 2, 3], 4);
        let state = ListReducer::reduce(state, ListIntent::ExternalRemove { ids: vec![1] });
        assert_eq!(ids(&state), vec![0, 2, 3]);
        assert_eq!(state.cursor, 3);
    }

    #[test]
    fn external_remove_of_unseen_ids_is_noop() {
        let state = state_with_window(&[0, 1], 0);
        let after = ListReducer::reduce(state.clone(), ListIntent::ExternalRemove { ids: vec![7] });
        assert_eq!(after, state);
    }

    #[test]
    fn reload_bumps_epoch_and_clears() {
        let state = state_with_window(&[1, 2], 2);
        let state = ListReducer::reduce(state, ListIntent::Reload);
        assert_eq!(state.reload_epoch, 1);
        assert!(state.window.is_empty());
        assert_eq!(state.cursor, 0);
        assert!(state.in_flight);
    }

    #[test]
    fn sort_edit_resets_window() {
        let state = state_with_window(&[1, 2], 2);
        let state = ListReducer::reduce(
            state,
            ListIntent::AddSort {
                path: Path::field("title"),
            },
        );
        assert!(state.window.is_empty());
        assert_eq!(state.cursor, 0);
        // Text fields default to ascending.
        assert!(!state.catalog.sort_spec()[0].descending);
    }

    #[test]
    fn ineffective_sort_edit_keeps_window() {
        let state = state_with_window(&[1, 2], 2);
        let after = ListReducer::reduce(
            state.clone(),
            ListIntent::ToggleSortDirection {
                path: Path::field("title"),
            },
        );
        assert_eq!(after, state);
    }

    #[test]
    fn failure_keeps_window_and_clears_in_flight() {
        let mut state = state_with_window(&[1, 2], 2);
        state.in_flight = true;
        let error = crate::source::SourceError::UnknownEntity {
            entity: "book".into(),
        };
        let after = ListReducer::reduce(state.clone(), ListIntent::FetchFailed { error });
        assert_eq!(after.window, state.window);
        assert_eq!(after.cursor, 2);
        assert!(!after.in_flight);
        assert!(after.last_error.is_some());
    }

    #[test]
    fn advance_after_failure_keeps_cursor() {
        let mut state = state_with_window(&[1, 2], 2);
        state.last_error = Some(crate::source::SourceError::UnknownEntity {
            entity: "book".into(),
        });
        let after = ListReducer::reduce(state, ListIntent::AdvancePage);
        assert_eq!(after.cursor, 2);
        assert!(after.in_flight);
    }

    #[test]
    fn layout_switch_touches_nothing_else() {
        let state = state_with_window(&[1, 2], 2);
        let after = ListReducer::reduce(
            state.clone(),
            ListIntent::SetLayout {
                name: "cards".to_string(),
            },
        );
        assert_eq!(after.layout, "cards");
        assert_eq!(after.window, state.window);
        assert_eq!(after.cursor, state.cursor);
    }
}
