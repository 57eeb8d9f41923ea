use std::{convert::Infallible, sync::Arc};

use futures_util::future::BoxFuture;
use hyper::{
    header::HOST,
    service::Service,
    http::uri::{Parts, PathAndQuery},
    Response, StatusCode, Uri,
};
use tower_layer::Layer;
use tracing::Instrument;

use crate::{
    extension::GatewayName,
    helper_layers::timeout::TimeoutLayer,
    service::{
        registry::ServiceRegistry,
        route_table::{Route, Target},
    },
    ArcHyperService, BoxError, CgRequest, CgResponse, CgResponseExt,
};

/// Sends a request matched by `route` to its backend.
///
/// The path is rewritten here, so every filter in front of this service sees the path the client sent.
#[derive(Debug, Clone)]
pub struct ForwardService {
    route: Arc<Route>,
    registry: ServiceRegistry,
    backend: ArcHyperService,
}

impl ForwardService {
    pub fn new(route: Arc<Route>, registry: ServiceRegistry, backend: ArcHyperService) -> Self {
        let backend = match route.timeout {
            Some(timeout) => ArcHyperService::new(TimeoutLayer::new(Some(timeout)).layer(backend)),
            None => backend,
        };
        Self { route, registry, backend }
    }

    fn base_uri(&self, req: &CgRequest) -> Result<Uri, CgResponse> {
        match &self.route.target {
            Target::Direct(uri) => Ok(uri.clone()),
            Target::Balanced(service) => self.registry.pick(service, req).ok_or_else(|| {
                tracing::warn!(%service, "[Cg.Forward] no available instance");
                CgResponse::with_code_message(StatusCode::SERVICE_UNAVAILABLE, format!("[Cg.Forward] no available instance of {service}"))
            }),
        }
    }
}

/// Join the base url of an instance with the rewritten path and the original query.
///
/// # Errors
/// If the result is not a valid uri.
pub fn backend_uri(base: &Uri, path: &str, query: Option<&str>) -> Result<Uri, BoxError> {
    let base_path = base.path().trim_end_matches('/');
    let path = if path.starts_with('/') { format!("{base_path}{path}") } else { format!("{base_path}/{path}") };
    let path_and_query = match query {
        Some(query) => format!("{path}?{query}"),
        None => path,
    };
    let mut parts = Parts::default();
    parts.scheme = base.scheme().cloned();
    parts.authority = base.authority().cloned();
    parts.path_and_query = Some(PathAndQuery::try_from(path_and_query)?);
    Ok(Uri::from_parts(parts)?)
}

impl hyper::service::Service<CgRequest> for ForwardService {
    type Response = CgResponse;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn call(&self, mut req: CgRequest) -> Self::Future {
        let span = tracing::debug_span!("forward", route = %self.route.name);
        let entered = span.enter();
        let base = match self.base_uri(&req) {
            Ok(base) => base,
            Err(resp) => return Box::pin(async move { Ok(resp) }),
        };
        let path = self.route.rewrite_path(req.uri().path());
        let uri = match backend_uri(&base, &path, req.uri().query()) {
            Ok(uri) => uri,
            Err(e) => {
                tracing::warn!("[Cg.Forward] fail to build backend uri: {e}");
                return Box::pin(async move { Ok(CgResponse::with_code_message(StatusCode::BAD_GATEWAY, format!("[Cg.Forward] invalid backend uri: {e}"))) });
            }
        };
        let gateway = req.extensions().get::<GatewayName>().map(|name| name.0.clone()).unwrap_or_else(|| Arc::from("-"));
        tracing::debug!(%uri, %gateway, "[Cg.Forward] forwarding");
        *req.uri_mut() = uri;
        req.headers_mut().remove(HOST);
        for (name, value) in &self.route.request_headers {
            req.headers_mut().append(name, value.clone());
        }
        let route = self.route.clone();
        let fut = self.backend.call(req);
        drop(entered);
        Box::pin(
            async move {
                let mut resp: Response<_> = fut.await?;
                for (name, value) in &route.response_headers {
                    resp.headers_mut().append(name, value.clone());
                }
                Ok(resp)
            }
            .instrument(span),
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_backend_uri() {
        let base = Uri::from_static("http://10.0.0.1:8081");
        let uri = backend_uri(&base, "/getCourseById/3", Some("verbose=true")).expect("valid uri");
        assert_eq!(uri.to_string(), "http://10.0.0.1:8081/getCourseById/3?verbose=true");

        let base = Uri::from_static("http://10.0.0.1:8081/api/");
        let uri = backend_uri(&base, "/all", None).expect("valid uri");
        assert_eq!(uri.to_string(), "http://10.0.0.1:8081/api/all");
    }
}
