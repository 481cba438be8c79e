//! JSON column codec.
//!
//! A JSON column is stored as text. Encoding is plain serde serialization;
//! decoding parses the text and then resolves the dynamic slots of the
//! decoded value (see [`crate::dynamic`]).

use sea_orm::sea_query::Value;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::dynamic::{Resolve, resolve};
use crate::error::CodecError;

/// Whether `value` counts as empty for omit-empty columns.
///
/// `null`, `false`, `0`, `""`, `[]` and `{}` are empty, and so is an object
/// whose members are all empty (a zero-valued record).
#[must_use]
pub fn is_empty_json(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => true,
        serde_json::Value::Bool(b) => !b,
        serde_json::Value::Number(n) => n.as_f64().is_some_and(|f| f.abs() < f64::EPSILON),
        serde_json::Value::String(s) => s.is_empty(),
        serde_json::Value::Array(items) => items.is_empty(),
        serde_json::Value::Object(members) => members.values().all(is_empty_json),
    }
}

/// Encode `value` as column text.
///
/// With `omit_empty`, an empty value is stored as the empty string.
///
/// # Errors
/// Returns `CodecError::Encode` if serialization fails.
pub fn to_storage<T: Serialize + ?Sized>(value: &T, omit_empty: bool) -> Result<String, CodecError> {
    if omit_empty {
        let tree = serde_json::to_value(value).map_err(CodecError::Encode)?;
        if is_empty_json(&tree) {
            return Ok(String::new());
        }
    }
    serde_json::to_string(value).map_err(CodecError::Encode)
}

/// [`to_storage`] wrapped as a bindable statement value.
///
/// # Errors
/// Returns `CodecError::Encode` if serialization fails.
pub fn to_storage_value<T: Serialize + ?Sized>(
    value: &T,
    omit_empty: bool,
) -> Result<Value, CodecError> {
    to_storage(value, omit_empty).map(Value::from)
}

/// Decode column text into `dest`.
///
/// Surrounding whitespace is ignored; blank text leaves `dest` untouched.
///
/// # Errors
/// Returns `CodecError::Decode` if the text is not a valid document for `T`.
pub fn from_storage<T: DeserializeOwned + Resolve>(text: &str, dest: &mut T) -> Result<(), CodecError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(());
    }
    *dest = decode(text)?;
    Ok(())
}

/// Parse `text` and resolve its dynamic slots.
///
/// # Errors
/// Returns `CodecError::Decode` if the text is not a valid document for `T`.
pub fn decode<T: DeserializeOwned + Resolve>(text: &str) -> Result<T, CodecError> {
    let mut value: T = serde_json::from_str(text).map_err(|err| CodecError::decode(text, err))?;
    resolve(&mut value)?;
    Ok(value)
}

/// [`decode`] for an already parsed document.
///
/// # Errors
/// Returns `CodecError::Decode` if `value` does not match `T`.
pub fn decode_value<T: DeserializeOwned + Resolve>(
    value: serde_json::Value,
) -> Result<T, CodecError> {
    let mut decoded: T = match T::deserialize(&value) {
        Ok(decoded) => decoded,
        Err(err) => return Err(CodecError::decode(&value.to_string(), err)),
    };
    resolve(&mut decoded)?;
    Ok(decoded)
}
