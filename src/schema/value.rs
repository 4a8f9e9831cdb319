use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::entity::FieldType;

/// A scalar carried by a record field or a literal operand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    Null,
    Text(String),
    Int(i64),
    UInt(u64),
    Double(f64),
    Decimal(Decimal),
    Bool(bool),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(DateTime<Utc>),
    /// Identity of a record in another entity.
    Ref(u64),
}

impl Value {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Whether this value is an acceptable literal for a field of `field_type`.
    pub fn fits(&self, field_type: &FieldType) -> bool {
        match (self, field_type) {
            (Self::Text(_), t) => t.is_text(),
            (Self::Int(v), FieldType::I32) => i32::try_from(*v).is_ok(),
            (Self::Int(v), FieldType::U32) => u32::try_from(*v).is_ok(),
            (Self::Int(_), FieldType::I64) => true,
            (Self::Int(v), FieldType::U64) => *v >= 0,
            (Self::UInt(v), FieldType::I32) => i32::try_from(*v).is_ok(),
            (Self::UInt(v), FieldType::U32) => u32::try_from(*v).is_ok(),
            (Self::UInt(v), FieldType::I64) => i64::try_from(*v).is_ok(),
            (Self::UInt(_), FieldType::U64) => true,
            (Self::Double(v), FieldType::IDouble) => v.is_finite(),
            (Self::Double(v), FieldType::UDouble) => v.is_finite() && *v >= 0.0,
            (Self::Int(_) | Self::UInt(_), FieldType::IDouble | FieldType::IDecimal) => true,
            (Self::Int(v), FieldType::UDouble | FieldType::UDecimal) => *v >= 0,
            (Self::UInt(_), FieldType::UDouble | FieldType::UDecimal) => true,
            (Self::Decimal(_), FieldType::IDecimal) => true,
            (Self::Decimal(v), FieldType::UDecimal) => !v.is_sign_negative(),
            (Self::Bool(_), FieldType::Bool) => true,
            (Self::Date(_), FieldType::Date) => true,
            (Self::Time(_), FieldType::Time) => true,
            (Self::Timestamp(_), FieldType::Timestamp) => true,
            (Self::Ref(_) | Self::UInt(_), FieldType::Other(_)) => true,
            _ => false,
        }
    }

    /// Ordering between two values, `None` when they are not comparable.
    ///
    /// Integers and decimals compare exactly; any pairing with a double
    /// compares as `f64`. A reference compares with an unsigned integer by id.
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Null, _) | (_, Self::Null) => None,
            (Self::Text(a), Self::Text(b)) => Some(a.cmp(b)),
            (Self::Bool(a), Self::Bool(b)) => Some(a.cmp(b)),
            (Self::Date(a), Self::Date(b)) => Some(a.cmp(b)),
            (Self::Time(a), Self::Time(b)) => Some(a.cmp(b)),
            (Self::Timestamp(a), Self::Timestamp(b)) => Some(a.cmp(b)),
            (Self::Ref(a) | Self::UInt(a), Self::Ref(b)) | (Self::Ref(a), Self::UInt(b)) => {
                Some(a.cmp(b))
            }
            (a, b) => match (a.as_decimal(), b.as_decimal()) {
                (Some(a), Some(b)) => Some(a.cmp(&b)),
                _ => a.as_f64()?.partial_cmp(&b.as_f64()?),
            },
        }
    }

    /// String form used by text operators (`like`, `glob`).
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Self::Int(v) => Some(Decimal::from(*v)),
            Self::UInt(v) => Some(Decimal::from(*v)),
            Self::Decimal(v) => Some(*v),
            _ => None,
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::UInt(v) => Some(*v as f64),
            Self::Double(v) => Some(*v),
            Self::Decimal(v) => v.to_f64(),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Text(s) => write!(f, "{:?}", s),
            Self::Int(v) => write!(f, "{}", v),
            Self::UInt(v) => write!(f, "{}", v),
            Self::Double(v) => write!(f, "{}", v),
            Self::Decimal(v) => write!(f, "{}", v),
            Self::Bool(v) => write!(f, "{}", v),
            Self::Date(v) => write!(f, "{}", v),
            Self::Time(v) => write!(f, "{}", v),
            Self::Timestamp(v) => write!(f, "{}", v.to_rfc3339()),
            Self::Ref(v) => write!(f, "#{}", v),
        }
    }
}
