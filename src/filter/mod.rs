//! Typed filter and sort algebra.
//!
//! Every edit is a pure function: it consumes a value and returns the edited
//! value, so the list reducer can swap snapshots without partial updates.
//!
//! - `operator.rs` - operators, operands and validated conditions
//! - `filter_path.rs` - one field predicate with optional sort metadata
//! - `group.rs` - the AND-OR-AND query structure
//! - `sort.rs` - sort edits on the catalog
//! - `catalog.rs` - catalog construction from a schema
//! - `eval.rs` - reference evaluation against records

mod catalog;
mod error;
mod eval;
mod filter_path;
mod group;
mod operator;
mod sort;

pub use error::ValidationError;
pub use eval::{FieldResolver, LocalFields};
pub use filter_path::{FilterPath, SortKey};
pub use group::{new_group_index, AndFilter, Indexed, MetaField, MetaPredicate, OrFilter, Query};
pub use operator::{Condition, Operand, Operator};
pub use sort::{MoveDirection, SortColumn, SortPolicy};
