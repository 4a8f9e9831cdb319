//! Comparison operators and the conditions built from them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::schema::{FieldType, Path, Value};

use super::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Eq,
    Ne,
    Ge,
    Le,
    Gt,
    Lt,
    /// Case-insensitive substring or `%`/`_` pattern match.
    Like,
    /// Case-sensitive `*`/`?` pattern match.
    Glob,
    Between,
    NotBetween,
}

const TEXT_OPERATORS: &[Operator] = &[
    Operator::Eq,
    Operator::Ne,
    Operator::Ge,
    Operator::Le,
    Operator::Gt,
    Operator::Lt,
    Operator::Like,
    Operator::Glob,
    Operator::Between,
    Operator::NotBetween,
];

const ORDERED_OPERATORS: &[Operator] = &[
    Operator::Eq,
    Operator::Ne,
    Operator::Ge,
    Operator::Le,
    Operator::Gt,
    Operator::Lt,
    Operator::Between,
    Operator::NotBetween,
];

const EQUALITY_OPERATORS: &[Operator] = &[Operator::Eq, Operator::Ne];

impl Operator {
    /// Operators a field of `field_type` accepts.
    pub fn allowed_for(field_type: &FieldType) -> &'static [Operator] {
        if field_type.is_text() {
            TEXT_OPERATORS
        } else if field_type.is_numeric() || field_type.is_temporal() {
            ORDERED_OPERATORS
        } else {
            EQUALITY_OPERATORS
        }
    }

    pub fn is_range(self) -> bool {
        matches!(self, Self::Between | Self::NotBetween)
    }

    fn arity(self) -> usize {
        if self.is_range() {
            2
        } else {
            1
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Ge => "ge",
            Self::Le => "le",
            Self::Gt => "gt",
            Self::Lt => "lt",
            Self::Like => "like",
            Self::Glob => "glob",
            Self::Between => "between",
            Self::NotBetween => "not_between",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let op = match s {
            "eq" | "=" | "==" => Self::Eq,
            "ne" | "!=" => Self::Ne,
            "ge" | ">=" => Self::Ge,
            "le" | "<=" => Self::Le,
            "gt" | ">" => Self::Gt,
            "lt" | "<" => Self::Lt,
            "like" => Self::Like,
            "glob" => Self::Glob,
            "between" => Self::Between,
            "not_between" => Self::NotBetween,
            _ => return None,
        };
        Some(op)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Right-hand side of a condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Literal(Value),
    /// Compare against another field of the same record.
    FieldRef(Path),
}

/// An operator applied to one operand, or to a `(low, high)` pair for the
/// range operators.
///
/// Arity is checked by the constructors; the operator set and literal kinds
/// are checked against a field type by [`Condition::check`].
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    operator: Operator,
    operands: Vec<Operand>,
}

impl Condition {
    pub fn new(operator: Operator, operand: Operand) -> Result<Self, ValidationError> {
        Self::with_operands(operator, vec![operand])
    }

    pub fn range(operator: Operator, low: Operand, high: Operand) -> Result<Self, ValidationError> {
        Self::with_operands(operator, vec![low, high])
    }

    pub fn literal(operator: Operator, value: Value) -> Result<Self, ValidationError> {
        Self::new(operator, Operand::Literal(value))
    }

    pub fn between(low: Value, high: Value) -> Self {
        Self {
            operator: Operator::Between,
            operands: vec![Operand::Literal(low), Operand::Literal(high)],
        }
    }

    fn with_operands(operator: Operator, operands: Vec<Operand>) -> Result<Self, ValidationError> {
        if operands.len() != operator.arity() {
            return Err(ValidationError::Arity {
                operator,
                expected: operator.arity(),
                got: operands.len(),
            });
        }
        Ok(Self { operator, operands })
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn operands(&self) -> &[Operand] {
        &self.operands
    }

    /// Reject this condition for a field of `field_type`.
    ///
    /// `FieldRef` operands are not type-checked here; a reference that does not
    /// resolve at evaluation time never matches.
    pub fn check(&self, field_type: &FieldType) -> Result<(), ValidationError> {
        if !Operator::allowed_for(field_type).contains(&self.operator) {
            return Err(ValidationError::OperatorNotAllowed {
                operator: self.operator,
                field_type: field_type.clone(),
            });
        }
        for operand in &self.operands {
            if let Operand::Literal(value) = operand {
                if !value.fits(field_type) {
                    return Err(ValidationError::LiteralMismatch {
                        value: value.clone(),
                        field_type: field_type.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}
