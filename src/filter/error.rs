use thiserror::Error;

use crate::schema::{EntityType, FieldType, Path, Value};

use super::operator::Operator;

/// A predicate that can never enter a query.
///
/// Raised at construction time so evaluation never sees an operator the
/// field's type does not support.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Operator '{operator}' is not allowed on {field_type:?} fields")]
    OperatorNotAllowed {
        operator: Operator,
        field_type: FieldType,
    },

    #[error("Operator '{operator}' takes {expected} operand(s), got {got}")]
    Arity {
        operator: Operator,
        expected: usize,
        got: usize,
    },

    #[error("Literal {value} does not fit a {field_type:?} field")]
    LiteralMismatch { value: Value, field_type: FieldType },

    #[error("Entity '{entity}' is not part of the schema")]
    UnknownEntity { entity: EntityType },

    #[error("Path '{path}' does not resolve on entity '{entity}'")]
    UnknownPath { entity: EntityType, path: Path },
}
