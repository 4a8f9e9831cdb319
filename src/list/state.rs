//! State for one record browser view.

use crate::filter::{OrFilter, Query, SortColumn, SortPolicy};
use crate::mvi::ViewState;
use crate::schema::{EntityType, Record};
use crate::source::{FetchRequest, SourceError};

pub const DEFAULT_LAYOUT: &str = "table";

/// Accumulated result window plus the query that produced it.
///
/// Modes are implicit in the flags: idle (`!in_flight`), fetching
/// (`in_flight`) and exhausted (`reached_end`). `cursor` is the offset of the
/// most recent page request; `external_remove` re-anchors it to the window
/// length.
#[derive(Debug, Clone, PartialEq)]
pub struct ListState {
    pub struct_id: EntityType,
    /// Every filterable field; its `ordering` entries are the sort spec.
    pub catalog: OrFilter,
    pub query: Query,
    pub page_size: usize,
    pub cursor: usize,
    /// Fetch order, unique by record id.
    pub window: Vec<Record>,
    pub reached_end: bool,
    pub in_flight: bool,
    pub layout: String,
    /// Bumped by every reload so an unchanged query still refetches.
    pub reload_epoch: u64,
    pub sort_policy: SortPolicy,
    /// Most recent fetch failure, cleared by the next applied page or reload.
    pub last_error: Option<SourceError>,
}

impl ViewState for ListState {}

/// Inputs whose change requires a new fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchTrigger {
    query: Query,
    sort: Vec<SortColumn>,
    page_size: usize,
    cursor: usize,
    reload_epoch: u64,
}

impl ListState {
    pub fn new(struct_id: EntityType, catalog: OrFilter, page_size: usize) -> Self {
        Self {
            struct_id,
            catalog,
            query: Query::new(),
            page_size,
            cursor: 0,
            window: Vec::new(),
            reached_end: false,
            in_flight: false,
            layout: DEFAULT_LAYOUT.to_string(),
            reload_epoch: 0,
            sort_policy: SortPolicy::default(),
            last_error: None,
        }
    }

    pub fn with_sort_policy(mut self, policy: SortPolicy) -> Self {
        self.sort_policy = policy;
        self
    }

    pub fn with_layout(mut self, layout: impl Into<String>) -> Self {
        self.layout = layout.into();
        self
    }

    pub fn is_idle(&self) -> bool {
        !self.in_flight
    }

    pub fn is_exhausted(&self) -> bool {
        self.reached_end
    }

    pub fn trigger(&self) -> FetchTrigger {
        FetchTrigger {
            query: self.query.clone(),
            sort: self.catalog.sort_spec(),
            page_size: self.page_size,
            cursor: self.cursor,
            reload_epoch: self.reload_epoch,
        }
    }

    /// The page request the current inputs call for.
    pub fn request(&self) -> FetchRequest {
        FetchRequest {
            entity: self.struct_id.clone(),
            query: self.query.clone(),
            sort: self.catalog.sort_spec(),
            limit: self.page_size,
            offset: self.cursor,
        }
    }

    /// Drop fetched data after a query-affecting edit.
    pub(super) fn reset_window(&mut self) {
        self.cursor = 0;
        self.window.clear();
        self.reached_end = false;
    }
}
