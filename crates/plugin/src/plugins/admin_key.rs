use hyper::{Method, StatusCode};
use serde::Deserialize;

use campusgate_kernel::{utils::path_matches_prefix, BoxError, CgRequest, CgRequestExt, CgResponse, CgResponseExt};

use crate::{Inner, Plugin, PluginConfig};

fn default_header() -> String {
    "X-Admin-Key".to_string()
}

fn default_prefix() -> String {
    "/Proiect_TW/courses".to_string()
}

fn default_methods() -> Vec<Method> {
    vec![Method::POST, Method::PUT, Method::PATCH, Method::DELETE]
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminKeyGuardConfig {
    /// The shared secret mutating requests must present.
    pub key: String,
    #[serde(default = "default_header")]
    pub header: String,
    #[serde(default = "default_prefix")]
    pub prefix: String,
    #[serde(default = "default_methods", deserialize_with = "super::deserialize_methods")]
    pub methods: Vec<Method>,
}

/// Guards mutating requests on the course catalog with a shared admin key.
///
/// Requests under `prefix` using one of `methods` must carry `header` equal to `key`,
/// anything else is answered with 401 and never reaches the backend.
#[derive(Debug, Clone)]
pub struct AdminKeyGuardPlugin {
    key: String,
    header: hyper::header::HeaderName,
    prefix: String,
    methods: Vec<Method>,
}

impl AdminKeyGuardPlugin {
    fn guards(&self, req: &CgRequest) -> bool {
        self.methods.contains(req.method()) && path_matches_prefix(req.uri().path(), &self.prefix)
    }
}

impl TryFrom<AdminKeyGuardConfig> for AdminKeyGuardPlugin {
    type Error = BoxError;

    fn try_from(config: AdminKeyGuardConfig) -> Result<Self, Self::Error> {
        if config.key.is_empty() {
            return Err("admin key must not be empty".into());
        }
        Ok(Self {
            key: config.key,
            header: config.header.parse()?,
            prefix: config.prefix,
            methods: config.methods,
        })
    }
}

impl Plugin for AdminKeyGuardPlugin {
    const CODE: &'static str = "admin-key-guard";
    const ORDER: i32 = 2;

    async fn call(&self, req: CgRequest, inner: Inner) -> Result<CgResponse, BoxError> {
        if self.guards(&req) && req.header_str(&self.header) != Some(self.key.as_str()) {
            tracing::warn!(method = %req.method(), path = req.uri().path(), route = req.route_name(), "[Cg.Plugin.{}] invalid or missing admin key", Self::CODE);
            return Ok(CgResponse::with_code_message(StatusCode::UNAUTHORIZED, "Unauthorized: Invalid or missing Admin Key"));
        }
        Ok(inner.call(req).await)
    }

    fn create(plugin_config: PluginConfig) -> Result<Self, BoxError> {
        let config = super::parse_spec::<AdminKeyGuardConfig>(plugin_config.spec)?;
        config.try_into()
    }
}
