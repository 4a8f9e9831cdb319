//! Evaluation of a query against a record.
//!
//! Remote sources are free to translate the query however they like; this is
//! the reference semantics the in-memory source uses.

use std::cmp::Ordering;

use crate::schema::{Path, Record, Value};

use super::filter_path::FilterPath;
use super::group::{AndFilter, MetaPredicate, OrFilter, Query};
use super::operator::{Condition, Operand, Operator};

/// Looks up the value at a path, following foreign hops as needed.
pub trait FieldResolver {
    fn resolve(&self, record: &Record, path: &Path) -> Option<Value>;
}

/// Resolves direct fields only; any path with hops is absent.
pub struct LocalFields;

impl FieldResolver for LocalFields {
    fn resolve(&self, record: &Record, path: &Path) -> Option<Value> {
        if !path.is_direct() {
            return None;
        }
        record.get(path.field_name()).cloned()
    }
}

impl Query {
    /// AND over groups. An empty query matches everything.
    pub fn matches(&self, record: &Record, resolver: &dyn FieldResolver) -> bool {
        self.groups().all(|group| group.matches(record, resolver))
    }
}

impl AndFilter {
    /// OR over the filters that have an active predicate. A group without any
    /// imposes no constraint, so adding an empty filter never changes results.
    pub fn matches(&self, record: &Record, resolver: &dyn FieldResolver) -> bool {
        let mut active = self
            .filters
            .values()
            .filter(|f| f.is_predicate_active())
            .peekable();
        if active.peek().is_none() {
            return true;
        }
        active.any(|f| f.matches(record, resolver))
    }
}

impl OrFilter {
    /// AND over the active predicates.
    pub fn matches(&self, record: &Record, resolver: &dyn FieldResolver) -> bool {
        let id = Value::UInt(record.id);
        let created = Value::Timestamp(record.created_at);
        let updated = Value::Timestamp(record.updated_at);

        meta_holds(&self.id, Some(&id), record, resolver)
            && meta_holds(&self.created_at, Some(&created), record, resolver)
            && meta_holds(&self.updated_at, Some(&updated), record, resolver)
            && self
                .filter_paths
                .iter()
                .all(|fp| fp.matches(record, resolver))
    }
}

impl FilterPath {
    /// Inactive entries and active entries without a condition always hold.
    pub fn matches(&self, record: &Record, resolver: &dyn FieldResolver) -> bool {
        if !self.active {
            return true;
        }
        let Some(condition) = self.condition() else {
            return true;
        };
        let subject = resolver.resolve(record, &self.path);
        condition.holds(subject.as_ref(), record, resolver)
    }
}

fn meta_holds(
    predicate: &MetaPredicate,
    subject: Option<&Value>,
    record: &Record,
    resolver: &dyn FieldResolver,
) -> bool {
    match (predicate.active, predicate.condition()) {
        (true, Some(condition)) => condition.holds(subject, record, resolver),
        _ => true,
    }
}

impl Condition {
    /// Whether `subject` satisfies this condition. Absent subjects or operands,
    /// and incomparable values, never match.
    pub fn holds(
        &self,
        subject: Option<&Value>,
        record: &Record,
        resolver: &dyn FieldResolver,
    ) -> bool {
        let Some(subject) = subject else {
            return false;
        };
        let operands: Option<Vec<Value>> = self
            .operands()
            .iter()
            .map(|operand| match operand {
                Operand::Literal(value) => Some(value.clone()).filter(|v| !v.is_null()),
                Operand::FieldRef(path) => resolver.resolve(record, path),
            })
            .collect();
        let Some(operands) = operands else {
            return false;
        };

        match (self.operator(), operands.as_slice()) {
            (Operator::Eq, [rhs]) => subject.compare(rhs) == Some(Ordering::Equal),
            (Operator::Ne, [rhs]) => subject.compare(rhs).is_some_and(Ordering::is_ne),
            (Operator::Ge, [rhs]) => subject.compare(rhs).is_some_and(Ordering::is_ge),
            (Operator::Le, [rhs]) => subject.compare(rhs).is_some_and(Ordering::is_le),
            (Operator::Gt, [rhs]) => subject.compare(rhs).is_some_and(Ordering::is_gt),
            (Operator::Lt, [rhs]) => subject.compare(rhs).is_some_and(Ordering::is_lt),
            (Operator::Like, [rhs]) => match (subject.as_text(), rhs.as_text()) {
                (Some(text), Some(pattern)) => like(text, pattern),
                _ => false,
            },
            (Operator::Glob, [rhs]) => match (subject.as_text(), rhs.as_text()) {
                (Some(text), Some(pattern)) => glob(text, pattern),
                _ => false,
            },
            (Operator::Between, [low, high]) => within(subject, low, high) == Some(true),
            (Operator::NotBetween, [low, high]) => within(subject, low, high) == Some(false),
            _ => false,
        }
    }
}

fn within(subject: &Value, low: &Value, high: &Value) -> Option<bool> {
    let above = subject.compare(low)?.is_ge();
    let below = subject.compare(high)?.is_le();
    Some(above && below)
}

/// Case-insensitive match. `%` spans any run and `_` one character; a pattern
/// with neither matches as a substring.
fn like(text: &str, pattern: &str) -> bool {
    let text = text.to_lowercase();
    let pattern = pattern.to_lowercase();
    if !pattern.contains(['%', '_']) {
        return text.contains(&pattern);
    }
    wildcard(&text, &pattern, '%', '_')
}

/// Case-sensitive match. `*` spans any run and `?` one character.
fn glob(text: &str, pattern: &str) -> bool {
    wildcard(text, pattern, '*', '?')
}

fn wildcard(text: &str, pattern: &str, many: char, one: char) -> bool {
    let text: Vec<char> = text.chars().collect();
    let pattern: Vec<char> = pattern.chars().collect();
    let (mut t, mut p) = (0, 0);
    // Last `many` seen in the pattern and the text position it resumes from.
    let mut resume: Option<(usize, usize)> = None;

    while t < text.len() {
        if p < pattern.len() && pattern[p] == many {
            resume = Some((p, t));
            p += 1;
        } else if p < pattern.len() && (pattern[p] == one || pattern[p] == text[t]) {
            t += 1;
            p += 1;
        } else if let Some((star, from)) = resume {
            p = star + 1;
            t = from + 1;
            resume = Some((star, from + 1));
        } else {
            return false;
        }
    }
    pattern[p..].iter().all(|&c| c == many)
}
