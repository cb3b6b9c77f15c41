use crate::core::data_type::DataType;
use bigdecimal::{BigDecimal, ToPrimitive};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Value {
    Int(i64),
    Uint(u64),
    Float(f64),
    Decimal(BigDecimal),
    String(String),
    Boolean(bool),
    Json(serde_json::Value),
    Uuid(Uuid),
    Bytes(Vec<u8>),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(DateTime<Utc>),
    Enum(String, String),
    StringArray(Vec<String>),
    Null,
    /// A non-null cell the driver could not decode; carries the engine's type name.
    Unsupported(String),
}

impl Value {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::Uint(v) => i64::try_from(*v).ok(),
            Value::Float(v) if v.is_finite() && v.fract() == 0.0 => Some(*v as i64),
            Value::Decimal(v) if v.is_integer() => v.to_i64(),
            Value::String(v) => v.trim().parse::<i64>().ok(),
            Value::Boolean(v) => Some(i64::from(*v)),
            Value::Json(v) => v.as_i64(),
            _ => None,
        }
    }

    /// Interprets the value as a row count: a non-negative integer, however
    /// the engine chose to type it (`COUNT(*)` is BIGINT on Postgres and may
    /// come back as DECIMAL from `SUM`-style aggregates on MySQL).
    pub fn as_count(&self) -> Option<u64> {
        match self {
            Value::Uint(v) => Some(*v),
            Value::Decimal(v) if v.is_integer() => v.to_u64(),
            Value::String(v) => v.trim().parse::<u64>().ok(),
            Value::Json(v) => v.as_u64(),
            other => other.as_i64().and_then(|v| u64::try_from(v).ok()),
        }
    }

    pub fn data_type(&self) -> DataType {
        match self {
            Value::Int(_) => DataType::Long,
            Value::Uint(_) => DataType::LongUnsigned,
            Value::Float(_) => DataType::Double,
            Value::Decimal(_) => DataType::Decimal,
            Value::String(_) => DataType::String,
            Value::Boolean(_) => DataType::Boolean,
            Value::Json(_) => DataType::Json,
            Value::Uuid(_) => DataType::Uuid,
            Value::Bytes(_) => DataType::Bytes,
            Value::Date(_) => DataType::Date,
            Value::Time(_) => DataType::Time,
            Value::Timestamp(_) => DataType::Timestamp,
            Value::Enum(_, _) => DataType::Enum,
            Value::StringArray(_) => DataType::Array(None),
            Value::Null => DataType::Null,
            Value::Unsupported(name) => DataType::Custom(name.clone()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldValue {
    pub name: String,
    pub value: Value,
    pub data_type: DataType,
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Uint(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Decimal(v) => write!(f, "{v}"),
            Value::String(v) => write!(f, "'{v}'"),
            Value::Boolean(v) => write!(f, "{v}"),
            Value::Json(v) => write!(f, "{v}"),
            Value::Uuid(v) => write!(f, "{v}"),
            Value::Bytes(v) => write!(f, "<{} bytes>", v.len()),
            Value::Date(v) => write!(f, "{v}"),
            Value::Time(v) => write!(f, "{v}"),
            Value::Timestamp(v) => write!(f, "{}", v.to_rfc3339()),
            Value::Enum(_, v) => write!(f, "'{v}'"),
            Value::StringArray(v) => write!(f, "{v:?}"),
            Value::Null => write!(f, "NULL"),
            Value::Unsupported(name) => write!(f, "<unsupported {name}>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn count_accepts_engine_specific_integer_types() {
        assert_eq!(Value::Int(1000).as_count(), Some(1000));
        assert_eq!(Value::Uint(998).as_count(), Some(998));
        assert_eq!(
            Value::Decimal(BigDecimal::from_str("42.000").unwrap()).as_count(),
            Some(42)
        );
        assert_eq!(Value::String(" 7 ".into()).as_count(), Some(7));
    }

    #[test]
    fn count_rejects_negative_and_fractional_values() {
        assert_eq!(Value::Int(-1).as_count(), None);
        assert_eq!(Value::Float(1.5).as_count(), None);
        assert_eq!(
            Value::Decimal(BigDecimal::from_str("3.25").unwrap()).as_count(),
            None
        );
        assert_eq!(Value::Null.as_count(), None);
        assert_eq!(Value::String("many".into()).as_count(), None);
    }
}
