//! Entity schema, field paths and record values.
//!
//! These are the leaves every other module builds on: a [`Path`] names one
//! scalar field, [`FieldType`] decides which operators apply to it, and
//! [`Value`] carries both literals and record data.

mod entity;
mod path;
mod record;
mod value;

pub use entity::{EntityDef, EntityType, FieldDef, FieldType, Schema};
pub use path::Path;
pub use record::Record;
pub use value::Value;
