use std::fmt;

use serde::{Deserialize, Serialize};

/// Location of one scalar field, reached from a root entity through zero or
/// more foreign-key hops.
///
/// Two paths are equal iff their hop sequences and final field match.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Path {
    hops: Vec<String>,
    field: String,
}

impl Path {
    pub fn new(hops: Vec<String>, field: impl Into<String>) -> Self {
        Self {
            hops,
            field: field.into(),
        }
    }

    /// Path to a field directly on the root entity.
    pub fn field(field: impl Into<String>) -> Self {
        Self::new(Vec::new(), field)
    }

    /// Parse the dotted form produced by `Display` (`author.country.name`).
    ///
    /// Returns `None` for empty input or empty segments.
    pub fn parse(dotted: &str) -> Option<Self> {
        let mut segments: Vec<String> = dotted.split('.').map(str::to_string).collect();
        if segments.iter().any(String::is_empty) {
            return None;
        }
        let field = segments.pop()?;
        Some(Self::new(segments, field))
    }

    /// Prefix this path with one more foreign hop.
    pub fn behind(mut self, hop: impl Into<String>) -> Self {
        self.hops.insert(0, hop.into());
        self
    }

    pub fn hops(&self) -> &[String] {
        &self.hops
    }

    pub fn field_name(&self) -> &str {
        &self.field
    }

    pub fn is_direct(&self) -> bool {
        self.hops.is_empty()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for hop in &self.hops {
            write!(f, "{}.", hop)?;
        }
        write!(f, "{}", self.field)
    }
}
