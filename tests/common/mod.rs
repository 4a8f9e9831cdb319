//! Shared fixtures: a two-entity library schema and a seeded in-memory
//! source.

#![allow(dead_code, unused_imports)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use parking_lot::Mutex;
use record_browser::broker::ChangeBroker;
use record_browser::filter::{FilterPath, OrFilter};
use record_browser::list::{ListController, ListState};
use record_browser::schema::{EntityDef, EntityType, FieldDef, FieldType, Path, Record, Schema, Value};
use record_browser::source::{FetchRequest, MemorySource, RecordSource, SourceError};
use rust_decimal::Decimal;

pub fn book() -> EntityType {
    EntityType::new("book")
}

pub fn author() -> EntityType {
    EntityType::new("author")
}

pub fn path(dotted: &str) -> Path {
    Path::parse(dotted).expect("valid path")
}

/// `book -> author` library schema.
pub fn library_schema() -> Schema {
    Schema::new()
        .with_entity(
            EntityDef::new("author")
                .with_field(FieldDef::new("name", FieldType::Str).labeled("Name"))
                .with_field(FieldDef::new("country", FieldType::Str).labeled("Country"))
                .with_field(FieldDef::new("born", FieldType::I32).labeled("Born")),
        )
        .with_entity(
            EntityDef::new("book")
                .with_field(FieldDef::new("title", FieldType::Str).labeled("Title"))
                .with_field(FieldDef::new("price", FieldType::UDecimal).labeled("Price"))
                .with_field(FieldDef::new("pages", FieldType::U32).labeled("Pages"))
                .with_field(FieldDef::new("published", FieldType::Date).labeled("Published"))
                .with_field(FieldDef::new("in_print", FieldType::Bool).labeled("In print"))
                .with_field(
                    FieldDef::new("author", FieldType::Other(author())).labeled("Author"),
                ),
        )
}

fn stamp(day: u32) -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, day, 12, 0, 0).unwrap()
}

pub fn authors() -> Vec<Record> {
    vec![
        Record::new(1, stamp(1))
            .with("name", Value::text("Ursula"))
            .with("country", Value::text("US"))
            .with("born", Value::Int(1929)),
        Record::new(2, stamp(1))
            .with("name", Value::text("Stanislaw"))
            .with("country", Value::text("PL"))
            .with("born", Value::Int(1921)),
        Record::new(3, stamp(1))
            .with("name", Value::text("Octavia"))
            .with("country", Value::text("US"))
            .with("born", Value::Int(1947)),
    ]
}

/// Ten books, ids 1..=10. Odd ids are by author 1, even ids by author 2,
/// except book 10 which is by author 3. Book 7 has no price.
pub fn books() -> Vec<Record> {
    (1..=10u64)
        .map(|id| {
            let author_id = match id {
                10 => 3,
                id if id % 2 == 1 => 1,
                _ => 2,
            };
            let mut record = Record::new(id, stamp(id as u32))
                .with("title", Value::text(format!("Book {:02}", id)))
                .with("pages", Value::UInt(100 + id * 10))
                .with(
                    "published",
                    Value::Date(NaiveDate::from_ymd_opt(2000 + id as i32, 6, 1).unwrap()),
                )
                .with("in_print", Value::Bool(id <= 5))
                .with("author", Value::Ref(author_id));
            if id != 7 {
                record = record.with("price", Value::Decimal(Decimal::new(id as i64 * 500, 2)));
            }
            record
        })
        .collect()
}

pub fn seeded_source() -> (Arc<MemorySource>, ChangeBroker) {
    let broker = ChangeBroker::new();
    let source = MemorySource::new(library_schema(), broker.clone());
    source.seed(&author(), authors()).expect("seed authors");
    source.seed(&book(), books()).expect("seed books");
    (Arc::new(source), broker)
}

pub fn book_catalog() -> OrFilter {
    OrFilter::catalog(&library_schema(), &book(), 1).expect("catalog")
}

pub fn book_state(page_size: usize) -> ListState {
    ListState::new(book(), book_catalog(), page_size)
}

pub fn ids(records: &[Record]) -> Vec<u64> {
    records.iter().map(|r| r.id).collect()
}

pub fn catalog_entry(state: &ListState, dotted: &str) -> FilterPath {
    state
        .catalog
        .entry(&path(dotted))
        .cloned()
        .expect("path in catalog")
}

/// Source whose every call fails as unavailable.
pub struct FailingSource;

#[async_trait]
impl RecordSource for FailingSource {
    async fn fetch_page(&self, request: &FetchRequest) -> Result<Vec<Record>, SourceError> {
        Err(SourceError::Unavailable {
            entity: request.entity.clone(),
            reason: "connection refused".to_string(),
        })
    }

    async fn fetch_one(&self, entity: &EntityType, _id: u64) -> Result<Record, SourceError> {
        Err(SourceError::Unavailable {
            entity: entity.clone(),
            reason: "connection refused".to_string(),
        })
    }
}

/// Wraps a source and fails the next `failures` page fetches.
pub struct FlakySource {
    pub inner: Arc<dyn RecordSource>,
    failures: AtomicUsize,
}

impl FlakySource {
    pub fn new(inner: Arc<dyn RecordSource>) -> Self {
        Self {
            inner,
            failures: AtomicUsize::new(0),
        }
    }

    pub fn fail_next(&self, count: usize) {
        self.failures.store(count, Ordering::SeqCst);
    }
}

#[async_trait]
impl RecordSource for FlakySource {
    async fn fetch_page(&self, request: &FetchRequest) -> Result<Vec<Record>, SourceError> {
        let armed = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if armed {
            return Err(SourceError::Unavailable {
                entity: request.entity.clone(),
                reason: "connection reset".to_string(),
            });
        }
        self.inner.fetch_page(request).await
    }

    async fn fetch_one(&self, entity: &EntityType, id: u64) -> Result<Record, SourceError> {
        self.inner.fetch_one(entity, id).await
    }
}

/// Wraps a source and records every request it serves.
pub struct RecordingSource {
    pub inner: Arc<dyn RecordSource>,
    pub requests: Mutex<Vec<FetchRequest>>,
}

impl RecordingSource {
    pub fn new(inner: Arc<dyn RecordSource>) -> Self {
        Self {
            inner,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn offsets(&self) -> Vec<usize> {
        self.requests.lock().iter().map(|r| r.offset).collect()
    }
}

#[async_trait]
impl RecordSource for RecordingSource {
    async fn fetch_page(&self, request: &FetchRequest) -> Result<Vec<Record>, SourceError> {
        self.requests.lock().push(request.clone());
        self.inner.fetch_page(request).await
    }

    async fn fetch_one(&self, entity: &EntityType, id: u64) -> Result<Record, SourceError> {
        self.inner.fetch_one(entity, id).await
    }
}

pub fn fields(pairs: &[(&str, Value)]) -> BTreeMap<String, Value> {
    pairs
        .iter()
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect()
}
