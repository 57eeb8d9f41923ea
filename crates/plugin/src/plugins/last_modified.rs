use hyper::{header::HeaderValue, header::LAST_MODIFIED, Method};
use serde::Deserialize;

use campusgate_kernel::{extension::FromBackend, utils::path_matches_prefix, BoxError, CgRequest, CgResponse};

use crate::{Inner, Plugin, PluginConfig};

/// RFC 1123 date, as used by http date headers.
pub const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LastModifiedConfig {
    pub prefix: String,
}

impl Default for LastModifiedConfig {
    fn default() -> Self {
        Self {
            prefix: "/Proiect_TW/students".to_string(),
        }
    }
}

/// Stamps student directory reads with the time they were answered.
///
/// Server errors generated by the gateway itself (timeouts, unreachable backends) are left alone.
#[derive(Debug, Clone)]
pub struct LastModifiedPlugin {
    prefix: String,
}

pub fn http_date_now() -> String {
    chrono::Utc::now().format(HTTP_DATE_FORMAT).to_string()
}

impl Plugin for LastModifiedPlugin {
    const CODE: &'static str = "last-modified";
    const ORDER: i32 = i32::MAX - 1;

    async fn call(&self, req: CgRequest, inner: Inner) -> Result<CgResponse, BoxError> {
        let stamp = req.method() == Method::GET && path_matches_prefix(req.uri().path(), &self.prefix);
        let mut resp = inner.call(req).await;
        if !stamp {
            return Ok(resp);
        }
        if resp.status().is_server_error() && resp.extensions().get::<FromBackend>().is_none() {
            tracing::trace!(status = %resp.status(), "[Cg.Plugin.{}] gateway error, not stamped", Self::CODE);
            return Ok(resp);
        }
        resp.headers_mut().insert(LAST_MODIFIED, HeaderValue::from_str(&http_date_now())?);
        Ok(resp)
    }

    fn create(plugin_config: PluginConfig) -> Result<Self, BoxError> {
        let config = super::parse_spec::<LastModifiedConfig>(plugin_config.spec)?;
        Ok(Self { prefix: config.prefix })
    }
}

#[cfg(test)]
mod test {
    use std::convert::Infallible;

    use campusgate_kernel::{backend_service::get_echo_service, ArcHyperService, CgBody, CgResponseExt};
    use chrono::{NaiveDateTime, Utc};
    use hyper::{service::service_fn, Request, StatusCode};

    use super::*;

    fn get(path: &str) -> CgRequest {
        Request::builder().method(Method::GET).uri(path).body(CgBody::empty()).expect("invalid request")
    }

    #[tokio::test]
    async fn test_student_reads_are_stamped() {
        let plugin = LastModifiedPlugin::create_by_spec(serde_json::Value::Null, Default::default()).expect("invalid config");
        let resp = plugin.call(get("/Proiect_TW/students/getAll"), Inner::new(get_echo_service())).await.expect("plugin error");
        let stamp = resp.headers().get(LAST_MODIFIED).and_then(|v| v.to_str().ok()).expect("missing last-modified");
        let parsed = NaiveDateTime::parse_from_str(stamp, HTTP_DATE_FORMAT).expect("not an http date").and_utc();
        let skew = Utc::now().signed_duration_since(parsed).num_seconds().abs();
        assert!(skew <= 5);

        let resp = plugin.call(get("/Proiect_TW/courses/getAll"), Inner::new(get_echo_service())).await.expect("plugin error");
        assert!(!resp.headers().contains_key(LAST_MODIFIED));
    }

    #[tokio::test]
    async fn test_gateway_errors_are_not_stamped() {
        let plugin = LastModifiedPlugin::create_by_spec(serde_json::Value::Null, Default::default()).expect("invalid config");
        let failing = ArcHyperService::new(service_fn(|_req: CgRequest| async { Ok::<_, Infallible>(CgResponse::with_code_message(StatusCode::GATEWAY_TIMEOUT, "timeout")) }));
        let resp = plugin.call(get("/Proiect_TW/students/1"), Inner::new(failing)).await.expect("plugin error");
        assert_eq!(resp.status(), StatusCode::GATEWAY_TIMEOUT);
        assert!(!resp.headers().contains_key(LAST_MODIFIED));
    }
}
