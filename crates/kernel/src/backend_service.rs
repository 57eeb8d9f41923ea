use std::convert::Infallible;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use futures_util::Future;
use hyper::{Request, Response, StatusCode};
use tracing::instrument;

use crate::backend_service::http_client_service::get_client;
use crate::extension::FromBackend;
use crate::helper_layers::map_future::MapFuture;
use crate::utils::x_forwarded_for;
use crate::BoxError;
use crate::CgBody;
use crate::CgRequest;
use crate::CgResponse;
use crate::CgResponseExt;

pub mod echo;
pub mod http_client_service;

pub trait SharedHyperService:
    hyper::service::Service<CgRequest, Response = CgResponse, Error = Infallible, Future = BoxFuture<'static, Result<CgResponse, Infallible>>> + Send + Sync + 'static
{
}

impl<T> SharedHyperService for T where
    T: hyper::service::Service<CgRequest, Response = CgResponse, Error = Infallible, Future = BoxFuture<'static, Result<CgResponse, Infallible>>> + Send + Sync + 'static
{
}

/// a service that can be shared between threads
pub struct ArcHyperService {
    pub shared: Arc<dyn SharedHyperService>,
}

impl std::fmt::Debug for ArcHyperService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArcHyperService").finish()
    }
}

impl Clone for ArcHyperService {
    fn clone(&self) -> Self {
        Self { shared: self.shared.clone() }
    }
}

impl ArcHyperService {
    pub fn new<T>(service: T) -> Self
    where
        T: hyper::service::Service<CgRequest, Response = CgResponse, Error = Infallible> + Send + Sync + 'static,
        T::Future: Future<Output = Result<Response<CgBody>, Infallible>> + 'static + Send,
    {
        let map_fut = MapFuture::new(service, |fut| Box::pin(fut) as _);
        Self { shared: Arc::new(map_fut) }
    }
}

impl hyper::service::Service<Request<CgBody>> for ArcHyperService {
    type Response = Response<CgBody>;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    #[inline]
    fn call(&self, req: Request<CgBody>) -> Self::Future {
        Box::pin(self.shared.call(req))
    }
}

/// Http backend service
///
/// The bottom of every route: sends the (already rewritten) request to the uri it carries.
///
/// # Errors
/// 1. The x-forwarded-for header can't be built
/// 2. The backend can't be reached
pub async fn http_backend_service_inner(mut req: Request<CgBody>) -> Result<CgResponse, BoxError> {
    tracing::trace!(elapsed = ?req.extensions().get::<crate::extension::EnterTime>().map(crate::extension::EnterTime::elapsed), "start a backend request");
    if req.extensions().get::<crate::extension::PeerAddr>().is_some() {
        x_forwarded_for(&mut req)?;
    }
    let client = get_client();
    let mut response = client.request(req).await?;
    response.extensions_mut().insert(FromBackend::new());
    Ok(response)
}

#[instrument(skip_all, fields(http.uri =? req.uri()))]
pub async fn http_backend_service(req: Request<CgBody>) -> Result<Response<CgBody>, Infallible> {
    match http_backend_service_inner(req).await {
        Ok(resp) => Ok(resp),
        Err(err) => {
            tracing::warn!("[Cg.Client] backend request failed: {err}");
            Ok(Response::with_code_message(StatusCode::BAD_GATEWAY, format!("[Cg.Client] Client error: {err}")))
        }
    }
}

#[inline]
pub fn get_http_backend_service() -> ArcHyperService {
    ArcHyperService::new(hyper::service::service_fn(http_backend_service))
}

#[cold]
#[inline]
pub fn get_echo_service() -> ArcHyperService {
    ArcHyperService::new(hyper::service::service_fn(echo::echo))
}
