// Tidepool wire shapes: the measurement feed entry and the error object

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

/// One entry of the Tidepool data feed.
///
/// Every subtype (smbg, cbg, basal, upload, ...) shares this schema; fields a
/// subtype does not use are simply absent, so everything except `type` is optional.
/// Subtypes also reuse names with other shapes (`units` is an object on
/// `pumpSettings`), so a field whose value does not fit reads as absent instead of
/// failing the whole feed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMeasurement {
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    pub kind: String,
    #[serde(default, deserialize_with = "lenient")]
    pub device_time: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub value: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub units: Option<String>,

    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub guid: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub time: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub upload_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub device_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub conversion_offset: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub timezone_offset: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub timezone: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub computer_time: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub time_processing: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub by_user: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub version: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub payload: Option<MeasurementPayload>,
    #[serde(default, deserialize_with = "lenient")]
    pub annotations: Vec<Annotation>,
    #[serde(default, deserialize_with = "lenient")]
    pub client: Option<ClientInfo>,
    #[serde(default, deserialize_with = "lenient")]
    pub device_manufacturers: Vec<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub device_model: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub device_serial_number: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub device_tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementPayload {
    #[serde(default)]
    pub log_indices: Vec<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    #[serde(default)]
    pub code: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub private: Option<ClientPrivate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientPrivate {
    #[serde(default)]
    pub os: Option<String>,
}

/// Error object Tidepool returns (sometimes with HTTP 200) instead of the feed array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceError {
    #[serde(default)]
    pub status: u16,
    #[serde(default, deserialize_with = "string_or_scalar")]
    pub id: String,
    #[serde(default, deserialize_with = "string_or_scalar")]
    pub code: String,
    #[serde(default, deserialize_with = "string_or_scalar")]
    pub message: String,
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}: {}", self.status, self.code, self.message)
    }
}

/// Off-type values become the field's default.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

/// Tidepool is loose about `id`/`code` types; accept numbers and bools as text.
fn string_or_scalar<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Bool(b) => Ok(b.to_string()),
        serde_json::Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected a scalar, got {}",
            other
        ))),
    }
}
