use crate::sql::mysql::data_type::mysql_column_type;
use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use core::fmt;
use model::{
    core::{
        data_type::DataType,
        value::{FieldValue, Value},
    },
    records::row::RowData,
};
use mysql_async::{Row as MySqlRow, Value as MySqlValue, from_value_opt, prelude::FromValue};
use std::{error::Error, fmt::Formatter, str::FromStr};
use tokio_postgres::{
    Row as PgRow,
    types::{FromSql, Kind, Type},
};
use tracing::warn;

pub enum DbRow<'a> {
    MySqlRow(&'a MySqlRow),
    PostgresRow(&'a PgRow),
}

/// Outer `None`: the driver could not decode the cell as the requested type.
/// Inner `None`: SQL NULL.
type Cell<T> = Option<Option<T>>;

impl DbRow<'_> {
    pub fn to_row_data(&self) -> RowData {
        let fields = (0..self.len())
            .map(|idx| {
                let (name, data_type) = self.column(idx);
                let value = self.get_value(idx, &data_type);
                if let Value::Unsupported(type_name) = &value {
                    warn!(column = %name, %type_name, "Could not decode column value");
                }
                FieldValue {
                    name,
                    value,
                    data_type,
                }
            })
            .collect();

        RowData::new(fields)
    }

    pub fn len(&self) -> usize {
        match self {
            DbRow::MySqlRow(row) => row.len(),
            DbRow::PostgresRow(row) => row.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn column(&self, idx: usize) -> (String, DataType) {
        match self {
            DbRow::MySqlRow(row) => {
                let col = &row.columns_ref()[idx];
                (col.name_str().into_owned(), mysql_column_type(col))
            }
            DbRow::PostgresRow(row) => {
                let col = &row.columns()[idx];
                let data_type = match col.type_().kind() {
                    Kind::Enum(_) => DataType::Enum,
                    _ => DataType::from_postgres_type(col.type_().name())
                        .unwrap_or_else(|_| DataType::Custom(col.type_().name().to_string())),
                };
                (col.name().to_string(), data_type)
            }
        }
    }

    pub fn get_value(&self, idx: usize, data_type: &DataType) -> Value {
        let cell = match self {
            DbRow::MySqlRow(row) => mysql_value(row, idx, data_type),
            DbRow::PostgresRow(row) => pg_value(row, idx),
        };

        match cell {
            Some(Some(value)) => value,
            Some(None) => Value::Null,
            None => Value::Unsupported(data_type.name().to_string()),
        }
    }
}

fn mysql_get<T: FromValue>(value: MySqlValue) -> Cell<T> {
    from_value_opt::<Option<T>>(value).ok()
}

fn mysql_value(row: &MySqlRow, idx: usize, data_type: &DataType) -> Cell<Value> {
    mysql_decode(row.as_ref(idx)?.clone(), data_type)
}

/// TINYINT(1) reports as BOOLEAN but stores any value in -128..=127, so it
/// is read as an integer.
fn mysql_decode(value: MySqlValue, data_type: &DataType) -> Cell<Value> {
    let value = match data_type {
        DataType::Short | DataType::Int | DataType::Long | DataType::Year | DataType::Boolean => {
            mysql_get::<i64>(value)?.map(Value::Int)
        }
        DataType::ShortUnsigned | DataType::IntUnsigned | DataType::LongUnsigned => {
            mysql_get::<u64>(value)?.map(Value::Uint)
        }
        DataType::Float | DataType::Double => mysql_get::<f64>(value)?.map(Value::Float),
        DataType::Decimal => mysql_get::<BigDecimal>(value)?.map(Value::Decimal),
        DataType::Char | DataType::VarChar | DataType::String => {
            mysql_get::<String>(value)?.map(Value::String)
        }
        DataType::Enum | DataType::Set => mysql_get::<String>(value)?.map(Value::String),
        DataType::Json => mysql_get::<serde_json::Value>(value)?.map(Value::Json),
        DataType::Bytes | DataType::Bit => mysql_get::<Vec<u8>>(value)?.map(Value::Bytes),
        DataType::Date => mysql_get::<NaiveDate>(value)?.map(Value::Date),
        DataType::Time => mysql_get::<NaiveTime>(value)?.map(Value::Time),
        DataType::Timestamp | DataType::TimestampTz => mysql_get::<NaiveDateTime>(value)?
            .map(|naive| Value::Timestamp(DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc))),
        DataType::Null => None,
        _ => return None,
    };
    Some(value)
}

fn pg_get<'r, T: FromSql<'r>>(row: &'r PgRow, idx: usize) -> Cell<T> {
    row.try_get::<_, Option<T>>(idx).ok()
}

fn pg_value(row: &PgRow, idx: usize) -> Cell<Value> {
    let ty = row.columns()[idx].type_().clone();

    let value = match ty {
        Type::BOOL => pg_get::<bool>(row, idx)?.map(Value::Boolean),
        Type::INT2 => pg_get::<i16>(row, idx)?.map(|v| Value::Int(v.into())),
        Type::INT4 => pg_get::<i32>(row, idx)?.map(|v| Value::Int(v.into())),
        Type::INT8 => pg_get::<i64>(row, idx)?.map(Value::Int),
        Type::OID => pg_get::<u32>(row, idx)?.map(|v| Value::Uint(v.into())),
        Type::FLOAT4 => pg_get::<f32>(row, idx)?.map(|v| Value::Float(widen_f32(v))),
        Type::FLOAT8 => pg_get::<f64>(row, idx)?.map(Value::Float),
        Type::NUMERIC => pg_get::<PgNumeric>(row, idx)?.map(|n| Value::Decimal(n.0)),
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME | Type::UNKNOWN => {
            pg_get::<String>(row, idx)?.map(Value::String)
        }
        Type::JSON | Type::JSONB => pg_get::<serde_json::Value>(row, idx)?.map(Value::Json),
        Type::UUID => pg_get::<uuid::Uuid>(row, idx)?.map(Value::Uuid),
        Type::BYTEA => pg_get::<Vec<u8>>(row, idx)?.map(Value::Bytes),
        Type::DATE => pg_get::<NaiveDate>(row, idx)?.map(Value::Date),
        Type::TIME => pg_get::<NaiveTime>(row, idx)?.map(Value::Time),
        Type::TIMESTAMP => pg_get::<NaiveDateTime>(row, idx)?
            .map(|naive| Value::Timestamp(DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc))),
        Type::TIMESTAMPTZ => pg_get::<DateTime<Utc>>(row, idx)?.map(Value::Timestamp),
        Type::TEXT_ARRAY | Type::VARCHAR_ARRAY => {
            pg_get::<Vec<String>>(row, idx)?.map(Value::StringArray)
        }
        _ if matches!(ty.kind(), Kind::Enum(_)) => {
            pg_get::<RawText>(row, idx)?.map(|text| Value::String(text.0))
        }
        _ => return None,
    };
    Some(value)
}

/// `f32 -> f64` widening exposes binary noise (`1.1` becomes
/// `1.100000023841858`); go through the shortest `f32` text instead.
fn widen_f32(value: f32) -> f64 {
    let mut buffer = ryu::Buffer::new();
    if value.is_finite() {
        f64::from_str(buffer.format_finite(value)).unwrap_or(value as f64)
    } else {
        value as f64
    }
}

/// Reads the wire text of types the driver has no native mapping for
/// (user-defined enums).
struct RawText(String);

impl<'a> FromSql<'a> for RawText {
    fn from_sql(_ty: &Type, raw: &'a [u8]) -> Result<Self, Box<dyn Error + Sync + Send>> {
        Ok(RawText(std::str::from_utf8(raw)?.to_string()))
    }

    fn accepts(ty: &Type) -> bool {
        matches!(ty.kind(), Kind::Enum(_))
    }
}

const NUMERIC_POS: u16 = 0x0000;
const NUMERIC_NEG: u16 = 0x4000;

/// Exact decoding of the binary NUMERIC format: a header of ndigits,
/// weight, sign and dscale followed by base-10000 digits, the first one
/// weighted `10000^weight`. NaN and the infinities are rejected.
struct PgNumeric(BigDecimal);

impl<'a> FromSql<'a> for PgNumeric {
    fn from_sql(_ty: &Type, raw: &'a [u8]) -> Result<Self, Box<dyn Error + Sync + Send>> {
        let word = |at: usize| -> Result<u16, Box<dyn Error + Sync + Send>> {
            raw.get(at..at + 2)
                .map(|b| u16::from_be_bytes([b[0], b[1]]))
                .ok_or_else(|| "truncated NUMERIC value".into())
        };

        let ndigits = usize::from(word(0)?);
        let weight = i64::from(word(2)? as i16);
        let sign = match word(4)? {
            NUMERIC_POS => "",
            NUMERIC_NEG => "-",
            other => return Err(format!("NUMERIC special value 0x{other:04x}").into()),
        };
        let dscale = i64::from(word(6)?);

        if ndigits == 0 {
            return Ok(PgNumeric(BigDecimal::zero().with_scale(dscale)));
        }

        let mut digits = String::with_capacity(ndigits * 4 + 1);
        digits.push_str(sign);
        for i in 0..ndigits {
            let digit = word(8 + i * 2)?;
            if digit > 9999 {
                return Err(format!("invalid NUMERIC digit {digit}").into());
            }
            digits.push_str(&format!("{digit:04}"));
        }
        let exponent = 4 * (weight - ndigits as i64 + 1);

        let value = BigDecimal::from_str(&format!("{digits}e{exponent}"))?;
        Ok(PgNumeric(value.with_scale(dscale)))
    }

    fn accepts(ty: &Type) -> bool {
        *ty == Type::NUMERIC
    }
}

impl fmt::Debug for DbRow<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            DbRow::MySqlRow(row) => write!(f, "{row:?}"),
            DbRow::PostgresRow(row) => write!(f, "{row:?}"),
        }
    }
}
