/// Row conversion and value normalization
///
/// Converts Arrow `RecordBatch` rows into `async_graphql::Value` objects and
/// normalizes GraphQL values into the comparison keys and SQL literals the
/// lookup path needs. ID-like columns (`id`, `*_id`) become strings so they
/// line up with GraphQL `ID` arguments.

use crate::error::{GraphbindError, Result};

use async_graphql::{Name, Value};
use datafusion::arrow::array::*;
use datafusion::arrow::datatypes::DataType as ArrowDataType;
use datafusion::arrow::record_batch::RecordBatch;
use indexmap::IndexMap;

/// Canonical comparison key for a scalar value.
///
/// Lookups must match a raw GraphQL argument (often a `String` ID) against a
/// converted row value (string for ID columns, number otherwise), so both
/// sides are reduced to the same textual key. `None` means the value cannot
/// participate in a lookup (null, or a non-scalar).
pub fn lookup_key(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Boolean(b) => Some(b.to_string()),
        Value::Enum(name) => Some(name.to_string()),
        _ => None,
    }
}

/// Render a scalar as a SQL literal for an `IN` list.
///
/// Strings are single-quoted with embedded quotes doubled; numbers and
/// booleans pass through bare and rely on the engine's implicit coercion
/// against the column type.
pub fn sql_literal(value: &Value) -> String {
    match value {
        Value::Number(n) => n.to_string(),
        Value::Boolean(b) => b.to_string(),
        other => {
            let text = match other {
                Value::String(s) => s.clone(),
                Value::Enum(name) => name.to_string(),
                v => v.to_string(),
            };
            format!("'{}'", text.replace('\'', "''"))
        }
    }
}

fn is_id_column(name: &str) -> bool {
    name == "id" || name.ends_with("_id")
}

/// Convert a single row of a `RecordBatch` into a `Value::Object`.
pub fn record_batch_to_value(batch: &RecordBatch, row_idx: usize) -> Result<Value> {
    let schema = batch.schema();
    let mut object_map = IndexMap::new();

    for (col_idx, field) in schema.fields().iter().enumerate() {
        let column = batch.column(col_idx);

        if column.is_null(row_idx) {
            object_map.insert(Name::new(field.name()), Value::Null);
            continue;
        }

        let value = match column.data_type() {
            ArrowDataType::Int8 => int_value(
                column.as_any().downcast_ref::<Int8Array>().map(|a| a.value(row_idx) as i64),
                field.name(),
            ),
            ArrowDataType::Int16 => int_value(
                column.as_any().downcast_ref::<Int16Array>().map(|a| a.value(row_idx) as i64),
                field.name(),
            ),
            ArrowDataType::Int32 => int_value(
                column.as_any().downcast_ref::<Int32Array>().map(|a| a.value(row_idx) as i64),
                field.name(),
            ),
            ArrowDataType::Int64 => int_value(
                column.as_any().downcast_ref::<Int64Array>().map(|a| a.value(row_idx)),
                field.name(),
            ),
            ArrowDataType::UInt8 => int_value(
                column.as_any().downcast_ref::<UInt8Array>().map(|a| a.value(row_idx) as i64),
                field.name(),
            ),
            ArrowDataType::UInt16 => int_value(
                column.as_any().downcast_ref::<UInt16Array>().map(|a| a.value(row_idx) as i64),
                field.name(),
            ),
            ArrowDataType::UInt32 => int_value(
                column.as_any().downcast_ref::<UInt32Array>().map(|a| a.value(row_idx) as i64),
                field.name(),
            ),
            ArrowDataType::UInt64 => {
                let array = column.as_any().downcast_ref::<UInt64Array>();
                match array.map(|a| a.value(row_idx)) {
                    Some(v) if is_id_column(field.name()) => Value::String(v.to_string()),
                    // u64 beyond i64::MAX does not fit a JSON number
                    Some(v) if v <= i64::MAX as u64 => Value::Number(serde_json::Number::from(v)),
                    Some(v) => Value::String(v.to_string()),
                    None => Value::Null,
                }
            }
            ArrowDataType::Float32 => {
                let array = column.as_any().downcast_ref::<Float32Array>();
                float_value(array.map(|a| a.value(row_idx) as f64))?
            }
            ArrowDataType::Float64 => {
                let array = column.as_any().downcast_ref::<Float64Array>();
                float_value(array.map(|a| a.value(row_idx)))?
            }
            ArrowDataType::Utf8 => {
                let array = column.as_any().downcast_ref::<StringArray>();
                array
                    .map(|a| Value::String(a.value(row_idx).to_string()))
                    .unwrap_or(Value::Null)
            }
            ArrowDataType::LargeUtf8 => {
                let array = column.as_any().downcast_ref::<LargeStringArray>();
                array
                    .map(|a| Value::String(a.value(row_idx).to_string()))
                    .unwrap_or(Value::Null)
            }
            ArrowDataType::Boolean => {
                let array = column.as_any().downcast_ref::<BooleanArray>();
                array
                    .map(|a| Value::Boolean(a.value(row_idx)))
                    .unwrap_or(Value::Null)
            }
            ArrowDataType::Timestamp(unit, _tz) => {
                use datafusion::arrow::datatypes::TimeUnit;
                let timestamp_ns = match unit {
                    TimeUnit::Nanosecond => column
                        .as_any()
                        .downcast_ref::<TimestampNanosecondArray>()
                        .map(|a| a.value(row_idx)),
                    TimeUnit::Microsecond => column
                        .as_any()
                        .downcast_ref::<TimestampMicrosecondArray>()
                        .map(|a| a.value(row_idx) * 1_000),
                    TimeUnit::Millisecond => column
                        .as_any()
                        .downcast_ref::<TimestampMillisecondArray>()
                        .map(|a| a.value(row_idx) * 1_000_000),
                    TimeUnit::Second => column
                        .as_any()
                        .downcast_ref::<TimestampSecondArray>()
                        .map(|a| a.value(row_idx) * 1_000_000_000),
                };
                match timestamp_ns {
                    Some(ns) => timestamp_value(ns)?,
                    None => Value::Null,
                }
            }
            ArrowDataType::Date32 => {
                let array = column.as_any().downcast_ref::<Date32Array>();
                match array.map(|a| a.value(row_idx)) {
                    Some(days) => date_value(chrono::Duration::days(days as i64))?,
                    None => Value::Null,
                }
            }
            ArrowDataType::Date64 => {
                let array = column.as_any().downcast_ref::<Date64Array>();
                match array.map(|a| a.value(row_idx)) {
                    Some(millis) => date_value(chrono::Duration::milliseconds(millis))?,
                    None => Value::Null,
                }
            }
            _ => {
                tracing::warn!(
                    "Unsupported type {:?} for column '{}', returning null",
                    column.data_type(),
                    field.name()
                );
                Value::Null
            }
        };

        object_map.insert(Name::new(field.name()), value);
    }

    Ok(Value::Object(object_map))
}

fn int_value(value: Option<i64>, column: &str) -> Value {
    match value {
        Some(v) if is_id_column(column) => Value::String(v.to_string()),
        Some(v) => Value::Number(v.into()),
        None => Value::Null,
    }
}

fn float_value(value: Option<f64>) -> Result<Value> {
    match value {
        Some(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .ok_or_else(|| GraphbindError::Store("Invalid float value".to_string())),
        None => Ok(Value::Null),
    }
}

fn timestamp_value(timestamp_ns: i64) -> Result<Value> {
    let secs = timestamp_ns / 1_000_000_000;
    let nsecs = (timestamp_ns % 1_000_000_000) as u32;

    use chrono::{DateTime, Utc};
    let datetime = DateTime::<Utc>::from_timestamp(secs, nsecs)
        .ok_or_else(|| GraphbindError::Store(format!("Invalid timestamp: {}", timestamp_ns)))?;
    Ok(Value::String(datetime.to_rfc3339()))
}

fn date_value(offset: chrono::Duration) -> Result<Value> {
    use chrono::NaiveDate;
    let date = NaiveDate::from_ymd_opt(1970, 1, 1)
        .and_then(|epoch| epoch.checked_add_signed(offset))
        .ok_or_else(|| GraphbindError::Store(format!("Invalid date offset: {}", offset)))?;
    Ok(Value::String(date.format("%Y-%m-%d").to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use datafusion::arrow::datatypes::{DataType, Field as ArrowField, Schema as ArrowSchema};
    use std::sync::Arc;

    #[test]
    fn test_lookup_key_normalizes_scalars() {
        assert_eq!(lookup_key(&Value::String("7".into())), Some("7".to_string()));
        assert_eq!(lookup_key(&Value::Number(7.into())), Some("7".to_string()));
        assert_eq!(lookup_key(&Value::Boolean(true)), Some("true".to_string()));
        assert_eq!(lookup_key(&Value::Null), None);
        assert_eq!(lookup_key(&Value::List(vec![])), None);
    }

    #[test]
    fn test_sql_literal_quotes_and_escapes_strings() {
        assert_eq!(sql_literal(&Value::String("o'brien".into())), "'o''brien'");
        assert_eq!(sql_literal(&Value::Number(42.into())), "42");
        assert_eq!(sql_literal(&Value::Boolean(false)), "false");
    }

    #[test]
    fn test_row_conversion_id_columns_become_strings() {
        let schema = Arc::new(ArrowSchema::new(vec![
            ArrowField::new("id", DataType::Int64, false),
            ArrowField::new("company_id", DataType::Int64, false),
            ArrowField::new("age", DataType::Int64, false),
            ArrowField::new("name", DataType::Utf8, false),
        ]));
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Int64Array::from(vec![1])),
                Arc::new(Int64Array::from(vec![9])),
                Arc::new(Int64Array::from(vec![30])),
                Arc::new(StringArray::from(vec!["Alice"])),
            ],
        )
        .unwrap();

        let row = record_batch_to_value(&batch, 0).unwrap();
        let Value::Object(obj) = row else {
            panic!("Expected Value::Object");
        };
        assert_eq!(obj.get("id").unwrap(), &Value::String("1".to_string()));
        assert_eq!(
            obj.get("company_id").unwrap(),
            &Value::String("9".to_string())
        );
        assert_eq!(obj.get("age").unwrap(), &Value::Number(30.into()));
        assert_eq!(obj.get("name").unwrap(), &Value::String("Alice".to_string()));
    }

    #[test]
    fn test_row_conversion_nulls() {
        let schema = Arc::new(ArrowSchema::new(vec![
            ArrowField::new("id", DataType::Int64, false),
            ArrowField::new("nickname", DataType::Utf8, true),
        ]));
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Int64Array::from(vec![1])),
                Arc::new(StringArray::from(vec![None as Option<&str>])),
            ],
        )
        .unwrap();

        let row = record_batch_to_value(&batch, 0).unwrap();
        let Value::Object(obj) = row else {
            panic!("Expected Value::Object");
        };
        assert_eq!(obj.get("nickname").unwrap(), &Value::Null);
    }
}
