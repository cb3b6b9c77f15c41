//! Canonical, order-independent digests over result sets.
//!
//! Two engines rarely agree on how a value is typed or in which order rows
//! come back, so every cell is first reduced to an engine-neutral encoding:
//!
//! - numbers (integers of any width, booleans, floats, decimals) become a
//!   normalized decimal `mantissa e exponent`, so `1000`, `1000.00` and
//!   `1.0e3` all encode alike while `12.50` and `12.5000001` do not
//! - strings normalize CRLF to LF; fixed-width `CHAR` values drop their
//!   trailing pad; UUIDs and enum labels encode as strings
//! - timestamps encode as UTC RFC 3339 with microsecond precision
//! - JSON encodes with sorted object keys
//!
//! Each row is hashed on its own, the row hashes are sorted and hashed again
//! together with the row count. Permuting rows leaves the digest unchanged,
//! while duplicated or missing rows change it.

use crate::error::ChecksumError;
use bigdecimal::{BigDecimal, Zero};
use chrono::SecondsFormat;
use model::{
    core::{
        data_type::DataType,
        digest::Digest,
        value::{FieldValue, Value},
    },
    records::row::RowData,
};
use std::str::FromStr;

const DOMAIN: &[u8] = b"parity.rows.v1";

const TAG_NULL: u8 = b'N';
const TAG_NUMBER: u8 = b'#';
const TAG_STRING: u8 = b'S';
const TAG_BYTES: u8 = b'B';
const TAG_JSON: u8 = b'J';
const TAG_DATE: u8 = b'D';
const TAG_TIME: u8 = b'T';
const TAG_TIMESTAMP: u8 = b'Z';
const TAG_ARRAY: u8 = b'A';

/// Digest of a result set that does not depend on row order.
pub fn digest_rows(rows: &[RowData]) -> Result<Digest, ChecksumError> {
    let mut row_hashes = rows
        .iter()
        .map(row_hash)
        .collect::<Result<Vec<_>, _>>()?;
    row_hashes.sort_unstable();

    let mut hasher = blake3::Hasher::new();
    hasher.update(DOMAIN);
    hasher.update(&(rows.len() as u64).to_le_bytes());
    for hash in &row_hashes {
        hasher.update(hash);
    }
    Ok(Digest::from_bytes(*hasher.finalize().as_bytes()))
}

fn row_hash(row: &RowData) -> Result<[u8; 32], ChecksumError> {
    let mut buf = Vec::with_capacity(64);
    encode_row(row, &mut buf)?;
    Ok(*blake3::hash(&buf).as_bytes())
}

/// Appends the canonical encoding of `row` to `buf`. Column names are not
/// part of the encoding; engines disagree on their case.
pub fn encode_row(row: &RowData, buf: &mut Vec<u8>) -> Result<(), ChecksumError> {
    buf.extend_from_slice(&(row.len() as u64).to_le_bytes());
    for field in &row.field_values {
        encode_field(field, buf)?;
    }
    Ok(())
}

fn encode_field(field: &FieldValue, buf: &mut Vec<u8>) -> Result<(), ChecksumError> {
    match &field.value {
        Value::Null => push(buf, TAG_NULL, &[]),
        Value::Int(v) => push_number(buf, BigDecimal::from(*v)),
        Value::Uint(v) => push_number(buf, BigDecimal::from(*v)),
        Value::Boolean(v) => push_number(buf, BigDecimal::from(i32::from(*v))),
        Value::Decimal(v) => push_number(buf, v.clone()),
        Value::Float(v) => {
            let number = float_to_decimal(*v).ok_or_else(|| ChecksumError::NonFinite {
                column: field.name.clone(),
                value: v.to_string(),
            })?;
            push_number(buf, number)
        }
        Value::String(v) => push_text(buf, v, &field.data_type),
        Value::Enum(_, v) => push_text(buf, v, &field.data_type),
        Value::Uuid(v) => push(buf, TAG_STRING, v.hyphenated().to_string().as_bytes()),
        Value::Bytes(v) => push(buf, TAG_BYTES, v),
        Value::Json(v) => push(buf, TAG_JSON, v.to_string().as_bytes()),
        Value::Date(v) => push(buf, TAG_DATE, v.format("%Y-%m-%d").to_string().as_bytes()),
        Value::Time(v) => push(buf, TAG_TIME, v.format("%H:%M:%S%.6f").to_string().as_bytes()),
        Value::Timestamp(v) => push(
            buf,
            TAG_TIMESTAMP,
            v.to_rfc3339_opts(SecondsFormat::Micros, true).as_bytes(),
        ),
        Value::StringArray(items) => {
            let mut inner = Vec::new();
            inner.extend_from_slice(&(items.len() as u64).to_le_bytes());
            for item in items {
                push(&mut inner, TAG_STRING, normalize_newlines(item).as_bytes());
            }
            push(buf, TAG_ARRAY, &inner)
        }
        Value::Unsupported(type_name) => {
            return Err(ChecksumError::Unsupported {
                column: field.name.clone(),
                type_name: type_name.clone(),
            });
        }
    }
    Ok(())
}

fn push(buf: &mut Vec<u8>, tag: u8, payload: &[u8]) {
    buf.push(tag);
    buf.extend_from_slice(&(payload.len() as u64).to_le_bytes());
    buf.extend_from_slice(payload);
}

fn push_number(buf: &mut Vec<u8>, number: BigDecimal) {
    let encoded = if number.is_zero() {
        "0e0".to_string()
    } else {
        let (mantissa, scale) = number.normalized().as_bigint_and_exponent();
        format!("{mantissa}e{}", -scale)
    };
    push(buf, TAG_NUMBER, encoded.as_bytes());
}

fn push_text(buf: &mut Vec<u8>, text: &str, data_type: &DataType) {
    let text = normalize_newlines(text);
    let text = if *data_type == DataType::Char {
        text.trim_end_matches(' ')
    } else {
        text.as_str()
    };
    push(buf, TAG_STRING, text.as_bytes());
}

fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n")
}

/// Shortest round-trip representation, so an `f32` widened to `f64` encodes
/// the same as the decimal text another engine printed for it.
fn float_to_decimal(value: f64) -> Option<BigDecimal> {
    if !value.is_finite() {
        return None;
    }
    let mut buffer = ryu::Buffer::new();
    BigDecimal::from_str(buffer.format_finite(value)).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn row(values: Vec<(&str, Value)>) -> RowData {
        values
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect()
    }

    fn customers() -> Vec<RowData> {
        vec![
            row(vec![("id", Value::Int(1)), ("name", Value::String("Ada".into()))]),
            row(vec![("id", Value::Int(2)), ("name", Value::String("Grace".into()))]),
            row(vec![("id", Value::Int(3)), ("name", Value::Null)]),
        ]
    }

    #[test]
    fn digest_is_order_independent() {
        let rows = customers();
        let mut reversed = rows.clone();
        reversed.reverse();
        let mut rotated = rows.clone();
        rotated.rotate_left(1);

        let expected = digest_rows(&rows).unwrap();
        assert_eq!(digest_rows(&reversed).unwrap(), expected);
        assert_eq!(digest_rows(&rotated).unwrap(), expected);
    }

    #[test]
    fn digest_detects_duplicates_and_missing_rows() {
        let rows = customers();
        let mut duplicated = rows.clone();
        duplicated.push(rows[0].clone());
        let truncated = rows[..2].to_vec();

        let expected = digest_rows(&rows).unwrap();
        assert_ne!(digest_rows(&duplicated).unwrap(), expected);
        assert_ne!(digest_rows(&truncated).unwrap(), expected);
    }

    #[test]
    fn digest_detects_changed_content() {
        let rows = customers();
        let mut corrupted = rows.clone();
        corrupted[1] = row(vec![("id", Value::Int(2)), ("name", Value::String("Gr?ce".into()))]);
        assert_ne!(digest_rows(&rows).unwrap(), digest_rows(&corrupted).unwrap());
    }

    #[test]
    fn numeric_widths_and_representations_agree() {
        let mysql = vec![row(vec![
            ("ID", Value::Uint(1000)),
            ("PRICE", Value::Decimal(BigDecimal::from_str("12.50").unwrap())),
            ("ACTIVE", Value::Int(1)),
            ("RATIO", Value::Float(0.1)),
        ])];
        let postgres = vec![row(vec![
            ("id", Value::Int(1000)),
            ("price", Value::Decimal(BigDecimal::from_str("12.5").unwrap())),
            ("active", Value::Boolean(true)),
            ("ratio", Value::Decimal(BigDecimal::from_str("0.1").unwrap())),
        ])];
        assert_eq!(digest_rows(&mysql).unwrap(), digest_rows(&postgres).unwrap());
    }

    #[test]
    fn truncated_precision_is_detected() {
        let source = vec![row(vec![("amount", Value::Decimal(BigDecimal::from_str("19.999").unwrap()))])];
        let target = vec![row(vec![("amount", Value::Decimal(BigDecimal::from_str("20.00").unwrap()))])];
        assert_ne!(digest_rows(&source).unwrap(), digest_rows(&target).unwrap());
    }

    #[test]
    fn text_and_time_normalization() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        let padded = RowData::new(vec![FieldValue {
            name: "code".into(),
            value: Value::String("AB  ".into()),
            data_type: DataType::Char,
        }]);
        let trimmed = row(vec![("code", Value::String("AB".into()))]);
        assert_eq!(digest_rows(&[padded]).unwrap(), digest_rows(&[trimmed]).unwrap());

        let crlf = row(vec![("note", Value::String("a\r\nb".into())), ("at", Value::Timestamp(ts))]);
        let lf = row(vec![("note", Value::String("a\nb".into())), ("at", Value::Timestamp(ts))]);
        assert_eq!(digest_rows(&[crlf]).unwrap(), digest_rows(&[lf]).unwrap());

        let date = row(vec![("d", Value::Date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()))]);
        let text = row(vec![("d", Value::String("2024-03-01".into()))]);
        assert_ne!(digest_rows(&[date]).unwrap(), digest_rows(&[text]).unwrap());
    }

    #[test]
    fn null_and_empty_string_differ() {
        let null = row(vec![("name", Value::Null)]);
        let empty = row(vec![("name", Value::String(String::new()))]);
        assert_ne!(digest_rows(&[null]).unwrap(), digest_rows(&[empty]).unwrap());
    }

    #[test]
    fn unhashable_values_fail() {
        let nan = row(vec![("score", Value::Float(f64::NAN))]);
        assert!(matches!(
            digest_rows(&[nan]),
            Err(ChecksumError::NonFinite { column, .. }) if column == "score"
        ));

        let opaque = row(vec![("shape", Value::Unsupported("GEOGRAPHY".into()))]);
        assert!(matches!(
            digest_rows(&[opaque]),
            Err(ChecksumError::Unsupported { type_name, .. }) if type_name == "GEOGRAPHY"
        ));
    }

    #[test]
    fn empty_result_has_stable_digest() {
        assert_eq!(digest_rows(&[]).unwrap(), digest_rows(&[]).unwrap());
        assert_ne!(
            digest_rows(&[]).unwrap(),
            digest_rows(&[row(vec![("n", Value::Int(0))])]).unwrap()
        );
    }
}
