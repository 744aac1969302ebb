//! Readers for wrapped attribute values.
//!
//! Change-stream images encode every value as a single-key object naming its
//! type (`{"S": "acme"}`, `{"N": "2020"}`, `{"M": {...}}`, ...). The helpers in
//! this module read such values and also accept plain JSON values, so callers
//! don't need to know which encoding a producer used.

use serde_json::{Map, Number, Value};

use crate::types::change_record::Image;

/// Read a string scalar from a wrapped (`{"S": ..}` / `{"N": ..}`) or plain value.
///
/// Returns `None` for non-string values and for wrapped values of any other type.
pub fn attribute_str(value: &Value) -> Option<&str> {
    match value {
        Value::String(s) => Some(s.as_str()),
        Value::Object(map) if map.len() == 1 => match map.get("S").or_else(|| map.get("N")) {
            Some(Value::String(s)) => Some(s.as_str()),
            _ => None,
        },
        _ => None,
    }
}

/// Read a string attribute from an image by key.
pub fn image_str<'a>(image: &'a Image, key: &str) -> Option<&'a str> {
    image.get(key).and_then(attribute_str)
}

/// Convert a wrapped attribute value into plain JSON.
///
/// Plain values pass through unchanged (objects and arrays are walked so that
/// wrapped values nested inside plain containers are converted too).
pub fn unmarshal_value(value: &Value) -> Value {
    match value {
        Value::Object(map) if map.len() == 1 => {
            let Some((tag, inner)) = map.iter().next() else {
                return Value::Object(Map::new());
            };
            match (tag.as_str(), inner) {
                ("S", Value::String(s)) => Value::String(s.clone()),
                ("N", Value::String(n)) => parse_number(n),
                ("BOOL", Value::Bool(b)) => Value::Bool(*b),
                ("NULL", Value::Bool(true)) => Value::Null,
                ("M", Value::Object(m)) => unmarshal_map(m),
                ("L", Value::Array(items)) => Value::Array(items.iter().map(unmarshal_value).collect()),
                ("SS", Value::Array(items)) => Value::Array(items.clone()),
                ("NS", Value::Array(items)) => Value::Array(
                    items
                        .iter()
                        .map(|item| match item {
                            Value::String(n) => parse_number(n),
                            other => other.clone(),
                        })
                        .collect(),
                ),
                _ => unmarshal_map(map),
            }
        }
        Value::Object(map) => unmarshal_map(map),
        Value::Array(items) => Value::Array(items.iter().map(unmarshal_value).collect()),
        other => other.clone(),
    }
}

/// Convert a whole change-stream image into a plain JSON object.
pub fn unmarshal_image(image: &Image) -> Value {
    unmarshal_map(image)
}

fn unmarshal_map(map: &Map<String, Value>) -> Value {
    Value::Object(
        map.iter()
            .map(|(key, value)| (key.clone(), unmarshal_value(value)))
            .collect(),
    )
}

fn parse_number(raw: &str) -> Value {
    if let Ok(int) = raw.parse::<i64>() {
        return Value::Number(int.into());
    }
    raw.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(raw.to_string()))
}
