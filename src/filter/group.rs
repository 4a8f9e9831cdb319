//! The three-level query: a conjunction of OR-groups of AND-filters.
//!
//! Naming follows the record browser's vocabulary, where the *inner* group is
//! an [`OrFilter`] (despite conjoining its predicates) and the *outer* group is
//! an [`AndFilter`] (despite disjoining its filters). A [`Query`] conjoins its
//! groups, giving AND over groups, OR over filters, AND over predicates.

use std::collections::BTreeMap;

use crate::schema::{FieldType, Path};

use super::error::ValidationError;
use super::filter_path::FilterPath;
use super::operator::Condition;

/// Built-in record columns every entity carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetaField {
    Id,
    CreatedAt,
    UpdatedAt,
}

impl MetaField {
    pub fn field_type(self) -> FieldType {
        match self {
            Self::Id => FieldType::U64,
            Self::CreatedAt | Self::UpdatedAt => FieldType::Timestamp,
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "id" => Some(Self::Id),
            "created_at" => Some(Self::CreatedAt),
            "updated_at" => Some(Self::UpdatedAt),
            _ => None,
        }
    }
}

/// Predicate on a built-in column: an active flag plus an optional condition.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MetaPredicate {
    pub active: bool,
    condition: Option<Condition>,
}

impl MetaPredicate {
    pub fn condition(&self) -> Option<&Condition> {
        self.condition.as_ref()
    }
}

/// Something that lives in a keyed sibling set.
pub trait Indexed {
    fn index(&self) -> u32;
}

/// Next free index among `existing`: one past the highest present index.
///
/// Indices of removed siblings may be handed out again.
pub fn new_group_index<'a, T>(existing: impl IntoIterator<Item = &'a T>) -> u32
where
    T: Indexed + 'a,
{
    existing
        .into_iter()
        .map(Indexed::index)
        .max()
        .map_or(0, |max| max + 1)
}

/// Conjunction of field predicates plus id/created/updated predicates.
///
/// The entity catalog is also an `OrFilter`: every field as an inactive
/// entry, with the sort specification in the entries' `ordering`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OrFilter {
    pub index: u32,
    pub id: MetaPredicate,
    pub created_at: MetaPredicate,
    pub updated_at: MetaPredicate,
    pub filter_paths: Vec<FilterPath>,
}

impl Indexed for OrFilter {
    fn index(&self) -> u32 {
        self.index
    }
}

impl OrFilter {
    pub fn new(index: u32) -> Self {
        Self {
            index,
            ..Self::default()
        }
    }

    pub fn meta(&self, field: MetaField) -> &MetaPredicate {
        match field {
            MetaField::Id => &self.id,
            MetaField::CreatedAt => &self.created_at,
            MetaField::UpdatedAt => &self.updated_at,
        }
    }

    /// Replace the predicate on a built-in column.
    pub fn with_meta(
        mut self,
        field: MetaField,
        active: bool,
        condition: Option<Condition>,
    ) -> Result<Self, ValidationError> {
        if let Some(condition) = &condition {
            condition.check(&field.field_type())?;
        }
        let slot = match field {
            MetaField::Id => &mut self.id,
            MetaField::CreatedAt => &mut self.created_at,
            MetaField::UpdatedAt => &mut self.updated_at,
        };
        *slot = MetaPredicate { active, condition };
        Ok(self)
    }

    pub fn entry(&self, path: &Path) -> Option<&FilterPath> {
        self.filter_paths.iter().find(|fp| &fp.path == path)
    }

    /// Insert `filter_path`, replacing any entry on the same path.
    pub fn with_filter_path(mut self, filter_path: FilterPath) -> Self {
        match self
            .filter_paths
            .iter_mut()
            .find(|fp| fp.path == filter_path.path)
        {
            Some(existing) => *existing = filter_path,
            None => self.filter_paths.push(filter_path),
        }
        self
    }

    /// Whether any member predicate is switched on.
    ///
    /// This decides whether editing the filter invalidates fetched pages.
    pub fn is_predicate_active(&self) -> bool {
        self.id.active
            || self.created_at.active
            || self.updated_at.active
            || self.filter_paths.iter().any(|fp| fp.active)
    }
}

/// Disjunction of [`OrFilter`]s, keyed by their index.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AndFilter {
    pub index: u32,
    pub filters: BTreeMap<u32, OrFilter>,
}

impl Indexed for AndFilter {
    fn index(&self) -> u32 {
        self.index
    }
}

impl AndFilter {
    pub fn new(index: u32) -> Self {
        Self {
            index,
            filters: BTreeMap::new(),
        }
    }

    /// Replace the filter with the same index, or add it.
    pub fn upsert_filter(mut self, filter: OrFilter) -> Self {
        self.filters.insert(filter.index, filter);
        self
    }

    pub fn remove_filter(mut self, index: u32) -> Self {
        self.filters.remove(&index);
        self
    }

    pub fn new_filter_index(&self) -> u32 {
        new_group_index(self.filters.values())
    }

    pub fn is_predicate_active(&self) -> bool {
        self.filters.values().any(OrFilter::is_predicate_active)
    }
}

/// Top-level conjunction of [`AndFilter`] groups.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Query {
    groups: BTreeMap<u32, AndFilter>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the group with the same index, or add it.
    pub fn upsert_group(mut self, group: AndFilter) -> Self {
        self.groups.insert(group.index, group);
        self
    }

    pub fn remove_group(mut self, group: &AndFilter) -> Self {
        self.groups.remove(&group.index);
        self
    }

    pub fn group(&self, index: u32) -> Option<&AndFilter> {
        self.groups.get(&index)
    }

    pub fn groups(&self) -> impl Iterator<Item = &AndFilter> {
        self.groups.values()
    }

    pub fn new_group_index(&self) -> u32 {
        new_group_index(self.groups.values())
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Operator;
    use crate::schema::Value;

    #[test]
    fn new_group_index_starts_at_zero() {
        let empty: Vec<AndFilter> = Vec::new();
        assert_eq!(new_group_index(&empty), 0);
    }

    #[test]
    fn new_group_index_reuses_after_removal() {
        let query = Query::new()
            .upsert_group(AndFilter::new(0))
            .upsert_group(AndFilter::new(1));
        assert_eq!(query.new_group_index(), 2);

        let query = query.remove_group(&AndFilter::new(1));
        assert_eq!(query.new_group_index(), 1);
    }

    #[test]
    fn upsert_group_replaces_by_index() {
        let query = Query::new().upsert_group(AndFilter::new(3));
        let replaced = AndFilter::new(3).upsert_filter(OrFilter::new(0));
        let query = query.upsert_group(replaced.clone());

        assert_eq!(query.groups().count(), 1);
        assert_eq!(query.group(3), Some(&replaced));
    }

    #[test]
    fn meta_predicate_counts_as_active() {
        let filter = OrFilter::new(0)
            .with_meta(
                MetaField::Id,
                true,
                Some(Condition::literal(Operator::Gt, Value::UInt(10)).unwrap()),
            )
            .unwrap();
        assert!(filter.is_predicate_active());
        assert!(filter.meta(MetaField::Id).active);
        assert!(!filter.meta(MetaField::CreatedAt).active);
        assert!(!OrFilter::new(1).is_predicate_active());
    }

    #[test]
    fn meta_predicate_rejects_like_on_timestamp() {
        let result = OrFilter::new(0).with_meta(
            MetaField::CreatedAt,
            true,
            Some(Condition::literal(Operator::Like, Value::text("2024")).unwrap()),
        );
        assert!(matches!(result, Err(ValidationError::OperatorNotAllowed { .. })));
    }

    #[test]
    fn with_filter_path_replaces_same_path() {
        let title = FilterPath::new("Title", Path::field("title"), FieldType::Str);
        let filter = OrFilter::new(0)
            .with_filter_path(title.clone())
            .with_filter_path(title.activated(true));

        assert_eq!(filter.filter_paths.len(), 1);
        assert!(filter.is_predicate_active());
    }
}
