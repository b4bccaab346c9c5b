pub mod attempt;
pub mod exam;
pub mod question;

use serde::{Deserialize, Deserializer};

/// Identifiers arrive from the surrounding service either as JSON strings or
/// as integer primary keys.
pub(crate) fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Int(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(value) => value.trim().to_string(),
        RawId::Int(value) => value.to_string(),
    })
}
