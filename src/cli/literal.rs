use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;

use crate::error::{Error, Result};
use crate::filter::Operand;
use crate::schema::{FieldType, Path, Value};

/// Turn command-line text into an operand for a field of `field_type`.
///
/// `@path` is a reference to another field; anything else is parsed as a
/// literal of the field's type. Range and sign checks happen later, when the
/// condition is attached to its field.
pub fn parse_operand(raw: &str, field_type: &FieldType) -> Result<Operand> {
    if let Some(path) = raw.strip_prefix('@') {
        return Path::parse(path)
            .map(Operand::FieldRef)
            .ok_or_else(|| Error::InvalidArgument(format!("invalid field path '{}'", path)));
    }
    parse_literal(raw, field_type).map(Operand::Literal)
}

pub fn parse_literal(raw: &str, field_type: &FieldType) -> Result<Value> {
    let invalid = || Error::InvalidArgument(format!("'{}' is not a valid {:?} value", raw, field_type));

    let value = match field_type {
        FieldType::Str | FieldType::LongStr | FieldType::Clob => Value::text(raw),
        FieldType::I32 | FieldType::I64 => Value::Int(raw.parse().map_err(|_| invalid())?),
        FieldType::U32 | FieldType::U64 => match raw.parse::<u64>() {
            Ok(v) => Value::UInt(v),
            // Keep negatives so validation reports the sign mismatch.
            Err(_) => Value::Int(raw.parse().map_err(|_| invalid())?),
        },
        FieldType::IDouble | FieldType::UDouble => {
            Value::Double(raw.parse().map_err(|_| invalid())?)
        }
        FieldType::IDecimal | FieldType::UDecimal => {
            Value::Decimal(Decimal::from_str(raw).map_err(|_| invalid())?)
        }
        FieldType::Bool => Value::Bool(raw.parse().map_err(|_| invalid())?),
        FieldType::Date => {
            Value::Date(NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| invalid())?)
        }
        FieldType::Time => {
            Value::Time(NaiveTime::parse_from_str(raw, "%H:%M:%S").map_err(|_| invalid())?)
        }
        FieldType::Timestamp => Value::Timestamp(
            DateTime::parse_from_rfc3339(raw)
                .map_err(|_| invalid())?
                .with_timezone(&Utc),
        ),
        FieldType::Other(_) => Value::Ref(raw.parse().map_err(|_| invalid())?),
    };
    Ok(value)
}
