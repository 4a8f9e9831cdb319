//! Intents for the list state machine.

use crate::filter::{AndFilter, MoveDirection, OrFilter};
use crate::mvi::Intent;
use crate::schema::{Path, Record};
use crate::source::SourceError;

#[derive(Debug, Clone)]
pub enum ListIntent {
    /// A fetched page for the current inputs.
    PageArrived { records: Vec<Record> },

    /// Request the next page ("load more"). No-op while fetching or exhausted.
    AdvancePage,

    AddSort { path: Path },
    RemoveSort { path: Path },
    MoveSort { path: Path, direction: MoveDirection },
    ToggleSortDirection { path: Path },

    /// Add a group or replace the one with the same index.
    UpsertGroup { group: AndFilter },
    RemoveGroup { group: AndFilter },
    /// Add a filter to group `group` (creating the group if needed) or replace
    /// the filter with the same index.
    UpsertFilter { group: u32, filter: OrFilter },
    RemoveFilter { group: u32, index: u32 },

    SetPageSize { page_size: usize },

    /// Pull-to-refresh, and the reaction to create/update notices.
    Reload,

    /// Records deleted elsewhere.
    ExternalRemove { ids: Vec<u64> },

    /// Display variant only.
    SetLayout { name: String },

    /// The orchestrator issued a fetch for the current inputs.
    FetchStarted,

    /// The current fetch failed. Window and cursor stay as they are.
    FetchFailed { error: SourceError },
}

impl Intent for ListIntent {}
