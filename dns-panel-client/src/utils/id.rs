//! Opaque identifier helpers.
//!
//! The backend issues integer primary keys, but callers treat identifiers as
//! opaque strings. On the way in either JSON form is accepted; on the way out a
//! purely numeric identifier is written back as a number so the backend's
//! integer fields validate.

use serde::{Deserialize, Deserializer, Serializer};

/// Deserialize a JSON number or string into a `String` identifier.
pub fn deserialize<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(i64),
        String(String),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Number(n) => n.to_string(),
        RawId::String(s) => s,
    })
}

/// Serialize an identifier, as a number when it is one.
#[allow(clippy::ptr_arg)]
pub fn serialize<S>(id: &String, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match id.parse::<i64>() {
        Ok(n) => serializer.serialize_i64(n),
        Err(_) => serializer.serialize_str(id),
    }
}
