//! The stage record and its mapping-blob codec.
//!
//! A stage's `stages` mapping lives in a single text column as serialized
//! JSON. It is encoded on every write and decoded on every read.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Key/value mapping carried by a stage (e.g. section name to resource URL).
pub type StageMap = BTreeMap<String, String>;

/// A persisted stage as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stage {
    pub id: i64,
    pub stage_name: String,
    pub stages: StageMap,
}

/// Client-supplied body for create and full-replace update.
///
/// Absent or `null` fields decode to their defaults, and so do `null` values
/// inside the mapping. Any `id` field in the body is ignored; ids come from
/// the database or the request path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StagePayload {
    #[serde(default, deserialize_with = "null_as_default")]
    pub stage_name: String,
    #[serde(default, deserialize_with = "null_tolerant_map")]
    pub stages: StageMap,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_tolerant_map<'de, D>(deserializer: D) -> Result<StageMap, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<BTreeMap<String, Option<String>>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(key, value)| (key, value.unwrap_or_default()))
        .collect())
}

/// Serialize a mapping into its stored text form.
pub fn encode_stages(stages: &StageMap) -> Result<String, serde_json::Error> {
    serde_json::to_string(stages)
}

/// Parse a stored mapping blob. A literal `null` yields an empty mapping.
pub fn decode_stages(blob: &str) -> Result<StageMap, serde_json::Error> {
    Ok(serde_json::from_str::<Option<StageMap>>(blob)?.unwrap_or_default())
}
