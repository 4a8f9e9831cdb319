use crate::schema::{FieldType, Path};

use super::error::ValidationError;
use super::operator::Condition;

/// Sort position of a catalog entry. Lower ranks sort first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SortKey {
    pub rank: u32,
    pub descending: bool,
}

/// A typed field predicate, optionally carrying sort metadata.
///
/// `ordering` is independent of `condition` and `active`: a field may be
/// sorted on without being filtered, and vice versa.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterPath {
    pub label: String,
    pub path: Path,
    field_type: FieldType,
    condition: Option<Condition>,
    pub ordering: Option<SortKey>,
    pub active: bool,
}

impl FilterPath {
    /// An inactive entry with no condition and no ordering.
    pub fn new(label: impl Into<String>, path: Path, field_type: FieldType) -> Self {
        Self {
            label: label.into(),
            path,
            field_type,
            condition: None,
            ordering: None,
            active: false,
        }
    }

    /// Attach `condition`, rejecting operators or literals the field type does
    /// not support.
    pub fn with_condition(mut self, condition: Condition) -> Result<Self, ValidationError> {
        condition.check(&self.field_type)?;
        self.condition = Some(condition);
        Ok(self)
    }

    pub fn activated(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Declared type; fixed at construction so attached conditions stay valid.
    pub fn field_type(&self) -> &FieldType {
        &self.field_type
    }

    pub fn condition(&self) -> Option<&Condition> {
        self.condition.as_ref()
    }
}
