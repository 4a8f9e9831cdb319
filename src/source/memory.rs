use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use crate::broker::{ChangeBatch, ChangeBroker};
use crate::filter::{FieldResolver, SortColumn};
use crate::schema::{EntityType, Path, Record, Schema, Value};

use super::dataset::Dataset;
use super::error::SourceError;
use super::{FetchRequest, RecordSource};

type Tables = HashMap<EntityType, BTreeMap<u64, Record>>;

/// In-memory record store implementing the full query semantics.
///
/// Writes go through [`insert`](Self::insert), [`update`](Self::update) and
/// [`remove`](Self::remove), each of which publishes its id batch to the
/// broker once the table lock is released.
pub struct MemorySource {
    schema: Schema,
    tables: RwLock<Tables>,
    next_id: AtomicU64,
    broker: ChangeBroker,
}

impl MemorySource {
    pub fn new(schema: Schema, broker: ChangeBroker) -> Self {
        let tables = schema
            .entity_types()
            .map(|entity| (entity.clone(), BTreeMap::new()))
            .collect();
        for entity in schema.entity_types() {
            broker.register(entity.clone());
        }
        Self {
            schema,
            tables: RwLock::new(tables),
            next_id: AtomicU64::new(1),
            broker,
        }
    }

    /// Build a source preloaded with a dataset. Seeding does not publish.
    pub fn from_dataset(dataset: Dataset, broker: ChangeBroker) -> Result<Self, SourceError> {
        let source = Self::new(dataset.schema, broker);
        for (entity, records) in dataset.records {
            source.seed(&entity, records)?;
        }
        Ok(source)
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn broker(&self) -> &ChangeBroker {
        &self.broker
    }

    /// Load records verbatim, keeping their ids and timestamps.
    pub fn seed(&self, entity: &EntityType, records: Vec<Record>) -> Result<(), SourceError> {
        let mut tables = self.tables.write();
        let table = table_mut(&mut tables, entity)?;
        for record in records {
            self.next_id
                .fetch_max(record.id.saturating_add(1), AtomicOrdering::Relaxed);
            table.insert(record.id, record);
        }
        Ok(())
    }

    pub fn insert(
        &self,
        entity: &EntityType,
        fields: BTreeMap<String, Value>,
    ) -> Result<Record, SourceError> {
        let record = {
            let mut tables = self.tables.write();
            let table = table_mut(&mut tables, entity)?;
            let id = self
                .next_id
                .fetch_update(AtomicOrdering::Relaxed, AtomicOrdering::Relaxed, |id| {
                    id.checked_add(1)
                })
                .map_err(|_| SourceError::IdsExhausted {
                    entity: entity.clone(),
                })?;
            let record = Record {
                fields,
                ..Record::new(id, Utc::now())
            };
            table.insert(id, record.clone());
            record
        };
        self.broker
            .publish(entity, ChangeBatch::created([record.id]))?;
        Ok(record)
    }

    /// Merge `fields` into an existing record and bump `updated_at`.
    pub fn update(
        &self,
        entity: &EntityType,
        id: u64,
        fields: BTreeMap<String, Value>,
    ) -> Result<Record, SourceError> {
        let record = {
            let mut tables = self.tables.write();
            let table = table_mut(&mut tables, entity)?;
            let record = table
                .get_mut(&id)
                .ok_or_else(|| SourceError::RecordNotFound {
                    entity: entity.clone(),
                    id,
                })?;
            record.fields.extend(fields);
            record.updated_at = Utc::now();
            record.clone()
        };
        self.broker.publish(entity, ChangeBatch::updated([id]))?;
        Ok(record)
    }

    /// Delete records, returning the ids that existed.
    pub fn remove(&self, entity: &EntityType, ids: &[u64]) -> Result<Vec<u64>, SourceError> {
        let removed: Vec<u64> = {
            let mut tables = self.tables.write();
            let table = table_mut(&mut tables, entity)?;
            ids.iter()
                .copied()
                .filter(|id| table.remove(id).is_some())
                .collect()
        };
        if !removed.is_empty() {
            self.broker
                .publish(entity, ChangeBatch::removed(removed.iter().copied()))?;
        }
        Ok(removed)
    }

    pub fn len(&self, entity: &EntityType) -> usize {
        self.tables.read().get(entity).map_or(0, BTreeMap::len)
    }
}

fn table_mut<'a>(
    tables: &'a mut Tables,
    entity: &EntityType,
) -> Result<&'a mut BTreeMap<u64, Record>, SourceError> {
    tables
        .get_mut(entity)
        .ok_or_else(|| SourceError::UnknownEntity {
            entity: entity.clone(),
        })
}

/// Resolves paths across the tables, following foreign references.
struct TableView<'a> {
    schema: &'a Schema,
    tables: &'a Tables,
    root: &'a EntityType,
}

impl FieldResolver for TableView<'_> {
    fn resolve(&self, record: &Record, path: &Path) -> Option<Value> {
        let mut entity = self.root;
        let mut current = record;
        for hop in path.hops() {
            let target = self.schema.entity(entity)?.field(hop)?.field_type.target()?;
            let id = match current.get(hop)? {
                Value::Ref(id) | Value::UInt(id) => *id,
                _ => return None,
            };
            current = self.tables.get(target)?.get(&id)?;
            entity = target;
        }
        current.get(path.field_name()).cloned()
    }
}

impl TableView<'_> {
    /// Sort-column comparison with missing values last in either direction,
    /// ties broken by ascending id.
    fn compare(&self, a: &Record, b: &Record, sort: &[SortColumn]) -> Ordering {
        for column in sort {
            let left = self.resolve(a, &column.path);
            let right = self.resolve(b, &column.path);
            let ordering = match (&left, &right) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => return Ordering::Greater,
                (Some(_), None) => return Ordering::Less,
                (Some(l), Some(r)) => l.compare(r).unwrap_or(Ordering::Equal),
            };
            let ordering = if column.descending {
                ordering.reverse()
            } else {
                ordering
            };
            if ordering.is_ne() {
                return ordering;
            }
        }
        a.id.cmp(&b.id)
    }
}

#[async_trait]
impl RecordSource for MemorySource {
    async fn fetch_page(&self, request: &FetchRequest) -> Result<Vec<Record>, SourceError> {
        let tables = self.tables.read();
        let table = tables
            .get(&request.entity)
            .ok_or_else(|| SourceError::UnknownEntity {
                entity: request.entity.clone(),
            })?;
        let view = TableView {
            schema: &self.schema,
            tables: &tables,
            root: &request.entity,
        };

        let mut matching: Vec<&Record> = table
            .values()
            .filter(|record| request.query.matches(record, &view))
            .collect();
        matching.sort_by(|a, b| view.compare(a, b, &request.sort));

        Ok(matching
            .into_iter()
            .skip(request.offset)
            .take(request.limit)
            .cloned()
            .collect())
    }

    async fn fetch_one(&self, entity: &EntityType, id: u64) -> Result<Record, SourceError> {
        let tables = self.tables.read();
        let table = tables
            .get(entity)
            .ok_or_else(|| SourceError::UnknownEntity {
                entity: entity.clone(),
            })?;
        table
            .get(&id)
            .cloned()
            .ok_or_else(|| SourceError::RecordNotFound {
                entity: entity.clone(),
                id,
            })
    }
}
