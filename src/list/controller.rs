//! Fetch orchestration around the list reducer.
//!
//! The controller issues exactly one request per change of the fetch inputs
//! (query, sort, page size, cursor, reload epoch) and drops any response whose
//! inputs have moved on by the time it resolves. Dropping the response is the
//! only cancellation; the underlying I/O is never aborted.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::broker::{BrokerError, ChangeBatch, ChangeBroker, Subscription};
use crate::mvi::Reducer;
use crate::schema::Record;
use crate::source::{FetchRequest, RecordSource, SourceError};

use super::intent::ListIntent;
use super::reducer::ListReducer;
use super::state::{FetchTrigger, ListState};

/// A request issued for a specific set of fetch inputs.
#[derive(Debug, Clone)]
pub struct PendingFetch {
    pub request: FetchRequest,
    trigger: FetchTrigger,
}

/// What happened to a fetch result.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Applied { received: usize },
    /// The inputs changed while the request was in flight.
    Discarded,
    Failed(SourceError),
}

pub struct ListController {
    state: Arc<Mutex<ListState>>,
    /// Inputs of the most recently issued request.
    issued: Mutex<Option<FetchTrigger>>,
    source: Arc<dyn RecordSource>,
    subscription: Option<Subscription>,
}

impl ListController {
    pub fn new(state: ListState, source: Arc<dyn RecordSource>) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
            issued: Mutex::new(None),
            source,
            subscription: None,
        }
    }

    /// Follow change notices for this list's entity.
    ///
    /// Creates and updates trigger a reload; removals splice the window.
    pub fn attach(mut self, broker: &ChangeBroker) -> Result<Self, BrokerError> {
        let entity = self.state.lock().struct_id.clone();
        let state = Arc::clone(&self.state);
        let subscription = broker.subscribe(
            &entity,
            Arc::new(move |batch: &ChangeBatch| react(&state, batch)),
        )?;
        self.subscription = Some(subscription);
        Ok(self)
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> ListState {
        self.state.lock().clone()
    }

    pub fn window(&self) -> Vec<Record> {
        self.state.lock().window.clone()
    }

    pub fn dispatch(&self, intent: ListIntent) {
        let mut guard = self.state.lock();
        let current = guard.clone();
        *guard = ListReducer::reduce(current, intent);
    }

    /// Issue a request if the fetch inputs changed since the last one.
    pub fn next_request(&self) -> Option<PendingFetch> {
        let mut guard = self.state.lock();
        let trigger = guard.trigger();
        let mut issued = self.issued.lock();
        if issued.as_ref() == Some(&trigger) {
            return None;
        }
        *issued = Some(trigger.clone());

        let request = guard.request();
        let current = guard.clone();
        *guard = ListReducer::reduce(current, ListIntent::FetchStarted);

        tracing::debug!(
            entity = %request.entity,
            offset = request.offset,
            limit = request.limit,
            "Fetch issued"
        );
        Some(PendingFetch { request, trigger })
    }

    /// Route a fetch result into the state, unless it is stale.
    pub fn complete(
        &self,
        pending: PendingFetch,
        result: Result<Vec<Record>, SourceError>,
    ) -> FetchOutcome {
        let mut guard = self.state.lock();
        if guard.trigger() != pending.trigger {
            tracing::debug!(
                entity = %pending.request.entity,
                offset = pending.request.offset,
                "Discarding stale fetch response"
            );
            return FetchOutcome::Discarded;
        }

        let current = guard.clone();
        match result {
            Ok(records) => {
                let received = records.len();
                *guard = ListReducer::reduce(current, ListIntent::PageArrived { records });
                tracing::debug!(
                    entity = %pending.request.entity,
                    received,
                    window = guard.window.len(),
                    reached_end = guard.reached_end,
                    "Page applied"
                );
                FetchOutcome::Applied { received }
            }
            Err(error) => {
                // Forget the trigger so the same page is requested again.
                *self.issued.lock() = None;
                tracing::warn!(
                    entity = %pending.request.entity,
                    offset = pending.request.offset,
                    error = %error,
                    "Fetch failed"
                );
                *guard = ListReducer::reduce(
                    current,
                    ListIntent::FetchFailed {
                        error: error.clone(),
                    },
                );
                FetchOutcome::Failed(error)
            }
        }
    }

    /// Run one issued request against the source.
    pub async fn execute(&self, pending: PendingFetch) -> FetchOutcome {
        let result = self.source.fetch_page(&pending.request).await;
        self.complete(pending, result)
    }

    /// Fetch until the inputs settle. Stops at the first failure.
    pub async fn sync(&self) -> Result<(), SourceError> {
        while let Some(pending) = self.next_request() {
            if let FetchOutcome::Failed(error) = self.execute(pending).await {
                return Err(error);
            }
        }
        Ok(())
    }

    /// Advance one page and fetch it, or retry the page that failed last.
    /// Returns whether anything was requested.
    pub async fn load_more(&self) -> Result<bool, SourceError> {
        let (before, retrying) = {
            let state = self.state.lock();
            (state.cursor, state.last_error.is_some() && !state.in_flight)
        };
        self.dispatch(ListIntent::AdvancePage);
        let advanced = self.state.lock().cursor != before;
        self.sync().await?;
        Ok(advanced || retrying)
    }

    pub async fn reload(&self) -> Result<(), SourceError> {
        self.dispatch(ListIntent::Reload);
        self.sync().await
    }

    pub async fn fetch_one(&self, id: u64) -> Result<Record, SourceError> {
        let entity = self.state.lock().struct_id.clone();
        self.source.fetch_one(&entity, id).await
    }
}

fn react(state: &Mutex<ListState>, batch: &ChangeBatch) {
    let mut guard = state.lock();
    if !batch.remove.is_empty() {
        tracing::debug!(entity = %guard.struct_id, removed = batch.remove.len(), "Splicing removed records");
        let current = guard.clone();
        *guard = ListReducer::reduce(
            current,
            ListIntent::ExternalRemove {
                ids: batch.remove.clone(),
            },
        );
    }
    if !batch.create.is_empty() || !batch.update.is_empty() {
        tracing::debug!(
            entity = %guard.struct_id,
            created = batch.create.len(),
            updated = batch.update.len(),
            "Reloading after remote change"
        );
        let current = guard.clone();
        *guard = ListReducer::reduce(current, ListIntent::Reload);
    }
}
