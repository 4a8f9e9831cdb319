//! Paginated, filterable record list.
//!
//! `ListReducer` owns every state transition; `ListController` wraps it with
//! the fetch loop, stale-response suppression and change-broker wiring.

mod controller;
mod intent;
mod reducer;
mod state;

pub use controller::{FetchOutcome, ListController, PendingFetch};
pub use intent::ListIntent;
pub use reducer::ListReducer;
pub use state::{FetchTrigger, ListState, DEFAULT_LAYOUT};
