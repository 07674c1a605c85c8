//! Model decoding contract.
//!
//! Every response model is built from a parsed [`serde_json::Value`]. A model
//! either decodes completely or not at all: [`Model::from_json`] returns `None`
//! when a required field is missing or has the wrong type. Optional and
//! nested fields go through the `lenient_*` helpers below, which drop
//! malformed data instead of failing the whole model.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// A type that can be constructed from a JSON value.
pub trait Model: Sized {
    /// Decode `value`, returning `None` if a required field is unusable.
    fn from_json(value: &Value) -> Option<Self>;
}

impl<T: DeserializeOwned> Model for T {
    fn from_json(value: &Value) -> Option<Self> {
        T::deserialize(value).ok()
    }
}

/// A model whose identifying field is carried by the enclosing JSON object key.
///
/// Used for payloads like `{"web": ["v1", "primary"], "db": []}` where the
/// service name only appears as the key. Types implementing this trait are
/// deliberately not [`Model`]s, so they can only be built with their key.
pub trait KeyedModel: Sized {
    /// Decode `value` found under `key`.
    fn from_keyed_json(key: &str, value: &Value) -> Option<Self>;
}

/// Short type name used in errors and logs.
pub(crate) fn model_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}

/// Deserialize an optional value, treating a mistyped value as absent.
pub(crate) fn lenient_option<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| T::deserialize(v).ok()))
}

/// Deserialize a string, falling back to an empty string when absent or mistyped.
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = lenient_option(deserializer)?;
    Ok(value.unwrap_or_default())
}

/// Deserialize a `string -> string` object, keeping only string values.
pub(crate) fn lenient_string_map<'de, D>(
    deserializer: D,
) -> Result<HashMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Object(map)) => map
            .into_iter()
            .filter_map(|(key, value)| match value {
                Value::String(s) => Some((key, s)),
                _ => None,
            })
            .collect(),
        _ => HashMap::new(),
    })
}

/// Deserialize an array of strings, skipping non-string entries.
pub(crate) fn lenient_string_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(string_array(value.as_ref()))
}

/// Collect the string entries of a JSON array; anything else yields an empty list.
pub(crate) fn string_array(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
