//! Firestore typed value encoding.
//!
//! Firestore's REST API wraps every value in a single-key object naming its
//! type (`{"stringValue": "x"}`, `{"integerValue": "3"}`, ...). Documents are
//! plain JSON everywhere else in the storefront; these functions convert at
//! the wire.

use serde_json::{Map, Number, Value, json};

use super::{BackendError, Fields};

/// Encode plain fields as a Firestore `fields` object.
pub fn encode_fields(fields: &Fields) -> Value {
    Value::Object(
        fields
            .iter()
            .map(|(key, value)| (key.clone(), encode_value(value)))
            .collect(),
    )
}

/// Decode a Firestore `fields` object into plain fields.
pub fn decode_fields(fields: &Map<String, Value>) -> Result<Fields, BackendError> {
    fields
        .iter()
        .map(|(key, value)| Ok((key.clone(), decode_value(value)?)))
        .collect()
}

fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        // Firestore carries 64-bit integers as strings
        Value::Number(n) if n.is_i64() || n.is_u64() => json!({ "integerValue": n.to_string() }),
        Value::Number(n) => json!({ "doubleValue": n }),
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            let values: Vec<Value> = items.iter().map(encode_value).collect();
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(map) => json!({ "mapValue": { "fields": encode_fields(map) } }),
    }
}

fn decode_value(value: &Value) -> Result<Value, BackendError> {
    let invalid = || BackendError::InvalidDocument(format!("unsupported value: {value}"));
    let Some((kind, inner)) = value.as_object().and_then(|map| map.iter().next()) else {
        return Err(invalid());
    };

    match kind.as_str() {
        "nullValue" => Ok(Value::Null),
        "booleanValue" => inner.as_bool().map(Value::Bool).ok_or_else(invalid),
        "integerValue" => {
            let n = match inner {
                Value::String(s) => s.parse::<i64>().map_err(|_| invalid())?,
                Value::Number(n) => n.as_i64().ok_or_else(invalid)?,
                _ => return Err(invalid()),
            };
            Ok(Value::Number(n.into()))
        }
        "doubleValue" => inner
            .as_f64()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(invalid),
        "stringValue" | "timestampValue" | "bytesValue" | "referenceValue" => {
            inner.as_str().map(|s| Value::String(s.to_owned())).ok_or_else(invalid)
        }
        "geoPointValue" => Ok(inner.clone()),
        "arrayValue" => {
            let values = inner
                .get("values")
                .and_then(Value::as_array)
                .map_or_else(|| Ok(Vec::new()), |values| {
                    values.iter().map(decode_value).collect::<Result<Vec<_>, _>>()
                })?;
            Ok(Value::Array(values))
        }
        "mapValue" => {
            let fields = inner
                .get("fields")
                .and_then(Value::as_object)
                .map_or_else(|| Ok(Map::new()), decode_fields)?;
            Ok(Value::Object(fields))
        }
        _ => Err(invalid()),
    }
}
