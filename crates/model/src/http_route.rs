use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A prefix route to a backend service.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct CgHttpRoute {
    pub name: String,
    /// Path prefix, matched segment by segment, e.g. `/Proiect_TW/courses`.
    pub prefix: String,
    /// `lb://<service>` or `http(s)://<host>[:<port>]`
    pub uri: String,
    pub rewrite: CgPathRewrite,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    /// Headers added to the request sent to the backend.
    pub request_headers: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    /// Headers added to the response returned to the client.
    pub response_headers: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Timeout of the backend call in milliseconds, no timeout when absent.
    pub timeout_ms: Option<u64>,
}

/// How the request path is rewritten before being forwarded.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum CgPathRewrite {
    /// Drop the route prefix.
    #[default]
    StripPrefix,
    /// Replace matches of `regex` by `replacement`, `${name}` refers to a named capture group.
    Regex { regex: String, replacement: String },
    /// Forward the path as received.
    Keep,
}
