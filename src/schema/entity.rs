use std::fmt;

use serde::{Deserialize, Serialize};

use super::path::Path;

/// Name of a record type ("struct") known to the schema.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityType(String);

impl EntityType {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityType {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Declared type of a field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Str,
    LongStr,
    Clob,
    I32,
    U32,
    I64,
    U64,
    IDouble,
    UDouble,
    IDecimal,
    UDecimal,
    Bool,
    Date,
    Time,
    Timestamp,
    /// Foreign reference, compared by the target's numeric identity.
    Other(EntityType),
}

impl FieldType {
    pub fn is_text(&self) -> bool {
        matches!(self, Self::Str | Self::LongStr | Self::Clob)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Self::I32
                | Self::U32
                | Self::I64
                | Self::U64
                | Self::IDouble
                | Self::UDouble
                | Self::IDecimal
                | Self::UDecimal
        )
    }

    pub fn is_unsigned(&self) -> bool {
        matches!(self, Self::U32 | Self::U64 | Self::UDouble | Self::UDecimal)
    }

    pub fn is_temporal(&self) -> bool {
        matches!(self, Self::Date | Self::Time | Self::Timestamp)
    }

    /// Target entity of a foreign reference.
    pub fn target(&self) -> Option<&EntityType> {
        match self {
            Self::Other(target) => Some(target),
            _ => None,
        }
    }
}

/// One field of an entity definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    /// Display label; falls back to `name` when absent.
    #[serde(default)]
    pub label: Option<String>,
    pub field_type: FieldType,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            label: None,
            field_type,
        }
    }

    pub fn labeled(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }
}

/// A named record type with a fixed set of typed fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDef {
    pub name: EntityType,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

impl EntityDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: EntityType::new(name),
            fields: Vec::new(),
        }
    }

    pub fn with_field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Set of entity definitions a browser session can reach.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Schema {
    #[serde(default)]
    pub entities: Vec<EntityDef>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entity(mut self, entity: EntityDef) -> Self {
        self.entities.retain(|e| e.name != entity.name);
        self.entities.push(entity);
        self
    }

    pub fn entity(&self, name: &EntityType) -> Option<&EntityDef> {
        self.entities.iter().find(|e| &e.name == name)
    }

    pub fn entity_types(&self) -> impl Iterator<Item = &EntityType> {
        self.entities.iter().map(|e| &e.name)
    }

    /// Resolve the declared type of `path` starting from `root`.
    ///
    /// Every hop must be an `Other` reference; the final field may be any type.
    pub fn field_type(&self, root: &EntityType, path: &Path) -> Option<FieldType> {
        let mut current = self.entity(root)?;
        for hop in path.hops() {
            let target = current.field(hop)?.field_type.target()?;
            current = self.entity(target)?;
        }
        current
            .field(path.field_name())
            .map(|f| f.field_type.clone())
    }
}
