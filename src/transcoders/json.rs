use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;

use crate::errors::ContentError;
use crate::handlers::TextCodec;
use crate::value::Value;

/// JSON codec with type-extension hooks for the non-native kinds: UUIDs
/// marshal as their canonical hyphenated string, timestamps as ISO-8601
/// strings (offset-suffixed iff offset-aware), and byte buffers as
/// standard-alphabet base64 strings.
#[derive(Debug, Default)]
pub struct JsonTranscoder;

impl JsonTranscoder {
    pub fn new() -> Self {
        Self
    }
}

impl TextCodec for JsonTranscoder {
    fn marshal(&self, value: &Value) -> Result<String, ContentError> {
        let json = to_json(value)?;
        serde_json::to_string(&json).map_err(|err| ContentError::Type(err.to_string()))
    }

    fn unmarshal(&self, text: &str) -> Result<Value, ContentError> {
        let json: serde_json::Value = serde_json::from_str(text)
            .map_err(|err| ContentError::Decode(format!("invalid JSON: {err}")))?;
        Ok(from_json(json))
    }
}

fn to_json(value: &Value) -> Result<serde_json::Value, ContentError> {
    match value {
        Value::Null => Ok(serde_json::Value::Null),
        Value::Bool(b) => Ok((*b).into()),
        Value::Integer(i) => {
            if let Ok(v) = i64::try_from(*i) {
                Ok(v.into())
            } else if let Ok(v) = u64::try_from(*i) {
                Ok(v.into())
            } else {
                Err(ContentError::Type(format!(
                    "integer {i} exceeds the 64-bit range"
                )))
            }
        }
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .ok_or_else(|| {
                ContentError::Type(format!("non-finite float {f} has no JSON form"))
            }),
        Value::String(s) => Ok(s.as_str().into()),
        Value::Binary(data) => Ok(BASE64.encode(data).into()),
        Value::Array(items) => items
            .iter()
            .map(to_json)
            .collect::<Result<Vec<_>, _>>()
            .map(serde_json::Value::Array),
        Value::Map(entries) => {
            let mut object = serde_json::Map::with_capacity(entries.len());
            for (key, value) in entries {
                object.insert(key_string(key)?, to_json(value)?);
            }
            Ok(serde_json::Value::Object(object))
        }
        Value::Uuid(uuid) => Ok(uuid.to_string().into()),
        Value::Timestamp(ts) => Ok(ts.iso_string().into()),
    }
}

/// JSON object keys must be strings; scalar keys coerce to their JSON text
/// form, everything else is a type error.
fn key_string(key: &Value) -> Result<String, ContentError> {
    match key {
        Value::String(s) => Ok(s.clone()),
        Value::Integer(i) => Ok(i.to_string()),
        Value::Float(f) => Ok(f.to_string()),
        Value::Bool(true) => Ok("true".to_owned()),
        Value::Bool(false) => Ok("false".to_owned()),
        Value::Null => Ok("null".to_owned()),
        other => Err(ContentError::Type(format!(
            "map key {other:?} cannot index a JSON object"
        ))),
    }
}

fn from_json(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i.into())
            } else if let Some(u) = n.as_u64() {
                Value::Integer(u.into())
            } else {
                Value::Float(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(items) => {
            Value::Array(items.into_iter().map(from_json).collect())
        }
        serde_json::Value::Object(object) => Value::Map(
            object
                .into_iter()
                .map(|(key, value)| (Value::String(key), from_json(value)))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use chrono::{FixedOffset, NaiveDate, TimeZone};
    use uuid::Uuid;

    fn dumps(value: &Value) -> String {
        JsonTranscoder::new().marshal(value).unwrap()
    }

    fn loads(text: &str) -> Value {
        JsonTranscoder::new().unmarshal(text).unwrap()
    }

    #[test]
    fn uuids_marshal_as_strings() {
        let id = Uuid::new_v4();
        let value = Value::Map(vec![(Value::from("id"), Value::Uuid(id))]);
        assert_eq!(dumps(&value), format!("{{\"id\":\"{id}\"}}"));
    }

    #[test]
    fn naive_timestamps_marshal_without_offset() {
        let dt = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let value = Value::Map(vec![(Value::from("now"), Value::from(dt))]);
        assert_eq!(dumps(&value), "{\"now\":\"2024-05-01T10:00:00\"}");
    }

    #[test]
    fn aware_timestamps_marshal_with_offset() {
        let dt = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 5, 1, 10, 0, 0)
            .unwrap();
        let value = Value::Map(vec![(Value::from("now"), Value::from(dt))]);
        assert_eq!(dumps(&value), "{\"now\":\"2024-05-01T10:00:00+00:00\"}");
    }

    #[test]
    fn byte_buffers_marshal_as_base64() {
        let value = Value::Map(vec![(
            Value::from("bin"),
            Value::Binary(Bytes::from_static(b"\x00\x01\x02\xFF")),
        )]);
        assert_eq!(dumps(&value), "{\"bin\":\"AAEC/w==\"}");
    }

    #[test]
    fn non_finite_floats_are_type_errors() {
        let err = JsonTranscoder::new()
            .marshal(&Value::Float(f64::NAN))
            .unwrap_err();
        assert!(matches!(err, ContentError::Type(_)));
    }

    #[test]
    fn oversized_integers_are_type_errors() {
        let err = JsonTranscoder::new()
            .marshal(&Value::Integer(1_i128 << 70))
            .unwrap_err();
        assert!(matches!(err, ContentError::Type(_)));
    }

    #[test]
    fn scalar_map_keys_coerce_to_strings() {
        let value = Value::Map(vec![
            (Value::Integer(1), Value::from("one")),
            (Value::Bool(true), Value::from("yes")),
            (Value::Null, Value::from("none")),
        ]);
        // serde_json objects render keys in sorted order.
        assert_eq!(
            dumps(&value),
            "{\"1\":\"one\",\"null\":\"none\",\"true\":\"yes\"}"
        );
    }

    #[test]
    fn composite_map_keys_are_type_errors() {
        let value = Value::Map(vec![(Value::Array(vec![]), Value::Null)]);
        let err = JsonTranscoder::new().marshal(&value).unwrap_err();
        assert!(matches!(err, ContentError::Type(_)));
    }

    #[test]
    fn unmarshal_has_no_reverse_extension() {
        let id = Uuid::new_v4();
        let loaded = loads(&format!("{{\"id\":\"{id}\"}}"));
        assert_eq!(
            loaded,
            Value::Map(vec![(Value::from("id"), Value::from(id.to_string()))])
        );
    }

    #[test]
    fn unmarshal_maps_numbers() {
        assert_eq!(loads("42"), Value::Integer(42));
        assert_eq!(loads("18446744073709551615"), Value::Integer(u64::MAX.into()));
        assert_eq!(loads("1.5"), Value::Float(1.5));
    }

    #[test]
    fn unmarshal_rejects_garbage() {
        let err = JsonTranscoder::new().unmarshal("{nope").unwrap_err();
        assert!(matches!(err, ContentError::Decode(_)));
    }
}
