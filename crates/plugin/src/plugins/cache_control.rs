use hyper::{header::HeaderValue, header::CACHE_CONTROL, Method};
use serde::Deserialize;

use campusgate_kernel::{utils::path_matches_prefix, BoxError, CgRequest, CgResponse};

use crate::{Inner, Plugin, PluginConfig};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheControlConfig {
    pub prefix: String,
    pub value: String,
}

impl Default for CacheControlConfig {
    fn default() -> Self {
        Self {
            prefix: "/Proiect_TW/enrollments".to_string(),
            value: "public, max-age=3600".to_string(),
        }
    }
}

/// Adds a `Cache-Control` header to enrollment reads, unless the backend already set one.
#[derive(Debug, Clone)]
pub struct CacheControlPlugin {
    prefix: String,
    value: HeaderValue,
}

impl Plugin for CacheControlPlugin {
    const CODE: &'static str = "cache-control";
    const ORDER: i32 = i32::MAX;

    async fn call(&self, req: CgRequest, inner: Inner) -> Result<CgResponse, BoxError> {
        let applies = req.method() == Method::GET && path_matches_prefix(req.uri().path(), &self.prefix);
        let mut resp = inner.call(req).await;
        if applies && !resp.headers().contains_key(CACHE_CONTROL) {
            resp.headers_mut().insert(CACHE_CONTROL, self.value.clone());
        }
        Ok(resp)
    }

    fn create(plugin_config: PluginConfig) -> Result<Self, BoxError> {
        let config = super::parse_spec::<CacheControlConfig>(plugin_config.spec)?;
        Ok(Self {
            prefix: config.prefix,
            value: config.value.parse()?,
        })
    }
}
