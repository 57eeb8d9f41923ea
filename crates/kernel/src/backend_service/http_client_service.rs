use crate::{BoxError, CgBody};

use hyper::{Request, Response};
use hyper_rustls::HttpsConnector;
use hyper_rustls::{ConfigBuilderExt, HttpsConnectorBuilder};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use std::sync::{Arc, OnceLock};
use tokio_rustls::rustls;

static GLOBAL: OnceLock<CgHttpClient> = OnceLock::new();

/// The shared backend client, created on first use.
///
/// # Panics
/// If no client was installed and the native root certificates can't be loaded.
pub fn get_client() -> CgHttpClient {
    GLOBAL.get_or_init(|| CgHttpClient::with_native_roots().unwrap_or_else(|e| panic!("[Cg.Client] fail to init http client: {e}"))).clone()
}

#[derive(Debug, Clone)]
pub struct CgHttpClient {
    inner: Client<HttpsConnector<HttpConnector>, CgBody>,
}

impl CgHttpClient {
    pub fn new(tls_config: rustls::ClientConfig) -> Self {
        CgHttpClient {
            inner: Client::builder(TokioExecutor::new()).build(HttpsConnectorBuilder::new().with_tls_config(tls_config).https_or_http().enable_http1().build()),
        }
    }
    /// # Errors
    /// If the platform certificates can't be loaded.
    pub fn with_native_roots() -> Result<Self, BoxError> {
        let provider = Arc::new(rustls::crypto::ring::default_provider());
        let config = rustls::ClientConfig::builder_with_provider(provider).with_safe_default_protocol_versions()?.with_native_roots()?.with_no_client_auth();
        Ok(Self::new(config))
    }
    /// # Errors
    /// If the backend can't be reached or answers with a malformed response.
    pub async fn request(&self, req: Request<CgBody>) -> Result<Response<CgBody>, BoxError> {
        let response = self.inner.request(req).await?;
        Ok(response.map(CgBody::new))
    }
}
