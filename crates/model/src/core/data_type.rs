use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt};

/// Engine-neutral column type of a result column. MySQL columns are typed
/// from their wire metadata; Postgres columns from the reported type name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum DataType {
    Boolean,
    Short,
    ShortUnsigned,
    Int,
    IntUnsigned,
    Long,
    LongUnsigned,
    Float,
    Double,
    Decimal,
    Char,
    VarChar,
    String,
    Json,
    Uuid,
    Bytes,
    Bit,
    Year,
    Date,
    Time,
    Timestamp,
    TimestampTz,
    Enum,
    Set,
    Array(Option<String>),
    Null,
    Custom(String),
}

lazy_static! {
    static ref POSTGRES_TYPE_MAP: HashMap<&'static str, DataType> = build_postgres_type_map();
}

impl DataType {
    pub fn from_postgres_type(type_name: &str) -> Result<Self, String> {
        if let Some(array_name) = Self::normalize_postgres_array_type(type_name) {
            return Ok(DataType::Array(Some(array_name)));
        }

        let normalized = Self::normalize_type_name(type_name);
        POSTGRES_TYPE_MAP
            .get(normalized.as_str())
            .cloned()
            .ok_or_else(|| format!("Unknown Postgres column type: {type_name}"))
    }

    pub fn name(&self) -> &str {
        match self {
            DataType::Boolean => "BOOLEAN",
            DataType::Short => "SMALLINT",
            DataType::ShortUnsigned => "SMALLINT UNSIGNED",
            DataType::Int => "INT",
            DataType::IntUnsigned => "INT UNSIGNED",
            DataType::Long => "BIGINT",
            DataType::LongUnsigned => "BIGINT UNSIGNED",
            DataType::Float => "REAL",
            DataType::Double => "DOUBLE PRECISION",
            DataType::Decimal => "DECIMAL",
            DataType::Char => "CHAR",
            DataType::VarChar => "VARCHAR",
            DataType::String => "TEXT",
            DataType::Json => "JSON",
            DataType::Uuid => "UUID",
            DataType::Bytes => "BYTES",
            DataType::Bit => "BIT",
            DataType::Year => "YEAR",
            DataType::Date => "DATE",
            DataType::Time => "TIME",
            DataType::Timestamp => "TIMESTAMP",
            DataType::TimestampTz => "TIMESTAMPTZ",
            DataType::Enum => "ENUM",
            DataType::Set => "SET",
            DataType::Array(Some(name)) => name,
            DataType::Array(None) => "ARRAY",
            DataType::Null => "NULL",
            DataType::Custom(name) => name,
        }
    }

    fn normalize_type_name(type_name: &str) -> String {
        type_name.trim().to_uppercase()
    }

    fn normalize_postgres_array_type(type_name: &str) -> Option<String> {
        let trimmed = type_name.trim();
        let base = if let Some(base) = trimmed.strip_prefix('_') {
            base
        } else if let Some(base) = trimmed.strip_suffix("[]") {
            base
        } else {
            return None;
        };

        let base = base.trim();
        if base.is_empty() {
            None
        } else {
            Some(format!("{}[]", Self::normalize_type_name(base)))
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn build_postgres_type_map() -> HashMap<&'static str, DataType> {
    use DataType::*;

    let entries = [
        ("BOOLEAN", Boolean),
        ("BOOL", Boolean),
        ("SMALLINT", Short),
        ("INT2", Short),
        ("INTEGER", Int),
        ("INT", Int),
        ("INT4", Int),
        ("OID", IntUnsigned),
        ("INT8", Long),
        ("BIGINT", Long),
        ("FLOAT4", Float),
        ("REAL", Float),
        ("FLOAT8", Double),
        ("DOUBLE PRECISION", Double),
        ("NUMERIC", Decimal),
        ("DECIMAL", Decimal),
        ("JSONB", Json),
        ("JSON", Json),
        ("TEXT", String),
        ("NAME", String),
        ("XML", String),
        ("CITEXT", String),
        ("CHARACTER VARYING", VarChar),
        ("VARCHAR", VarChar),
        ("CHARACTER", Char),
        ("CHAR", Char),
        ("BPCHAR", Char),
        ("UUID", Uuid),
        ("BYTEA", Bytes),
        ("BIT", Bit),
        ("VARBIT", Bit),
        ("DATE", Date),
        ("TIME", Time),
        ("TIME WITHOUT TIME ZONE", Time),
        ("TIMESTAMP", Timestamp),
        ("TIMESTAMP WITHOUT TIME ZONE", Timestamp),
        ("TIMESTAMP WITH TIME ZONE", TimestampTz),
        ("TIMESTAMPTZ", TimestampTz),
    ];

    entries.into_iter().collect()
}
