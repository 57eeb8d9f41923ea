pub mod admin_key;
pub mod cache_control;
pub mod last_modified;
pub mod role_access;

use hyper::Method;
use serde::{Deserialize, Deserializer};

/// Deserialize a list of method names, `"*"` is not accepted.
pub(crate) fn deserialize_methods<'de, D>(deserializer: D) -> Result<Vec<Method>, D::Error>
where
    D: Deserializer<'de>,
{
    let names = Vec::<String>::deserialize(deserializer)?;
    names.iter().map(|name| name.to_ascii_uppercase().parse::<Method>().map_err(serde::de::Error::custom)).collect()
}

/// Read a plugin spec, an absent spec reads as an empty object so every field takes its default.
pub(crate) fn parse_spec<T: serde::de::DeserializeOwned>(spec: serde_json::Value) -> Result<T, campusgate_kernel::BoxError> {
    let spec = if spec.is_null() { serde_json::Value::Object(Default::default()) } else { spec };
    Ok(serde_json::from_value(spec)?)
}
