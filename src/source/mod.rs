//! Remote record sources.
//!
//! The list controller only sees the [`RecordSource`] trait. A source must
//! return records ordered by the requested sort and at most `limit` of them;
//! a shorter page is the authoritative end-of-data signal.

mod dataset;
mod error;
mod memory;

use async_trait::async_trait;

use crate::filter::{Query, SortColumn};
use crate::schema::{EntityType, Record};

pub use dataset::{Dataset, DatasetError};
pub use error::SourceError;
pub use memory::MemorySource;

/// One page request.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub entity: EntityType,
    pub query: Query,
    pub sort: Vec<SortColumn>,
    pub limit: usize,
    pub offset: usize,
}

#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Fetch up to `request.limit` matching records starting at `request.offset`.
    async fn fetch_page(&self, request: &FetchRequest) -> Result<Vec<Record>, SourceError>;

    /// Fetch a single record by identity.
    async fn fetch_one(&self, entity: &EntityType, id: u64) -> Result<Record, SourceError>;
}
