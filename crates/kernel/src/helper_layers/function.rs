use futures_util::future::BoxFuture;
use futures_util::Future;
use hyper::{service::Service, Request, Response};
use std::{convert::Infallible, sync::Arc};
use tower_layer::Layer;

use crate::{ArcHyperService, CgBody};

/// see [`FnLayer`]
pub trait FnLayerMethod: Send + 'static {
    fn call(&self, req: Request<CgBody>, inner: Inner) -> impl Future<Output = Response<CgBody>> + Send;
}

impl<T> FnLayerMethod for Arc<T>
where
    T: FnLayerMethod + std::marker::Sync,
{
    #[inline]
    async fn call(&self, req: Request<CgBody>, inner: Inner) -> Response<CgBody> {
        self.as_ref().call(req, inner).await
    }
}

/// see [`FnLayer`]
#[derive(Debug)]
pub struct Closure<F, Fut>
where
    F: Fn(Request<CgBody>, Inner) -> Fut + Send + Sync + Clone + 'static,
    Fut: Future<Output = Response<CgBody>> + Send + 'static,
{
    pub f: F,
}

impl<F, Fut> Closure<F, Fut>
where
    F: Fn(Request<CgBody>, Inner) -> Fut + Send + Sync + Clone + 'static,
    Fut: Future<Output = Response<CgBody>> + Send + 'static,
{
    pub const fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F, Fut> Clone for Closure<F, Fut>
where
    F: Fn(Request<CgBody>, Inner) -> Fut + Send + Sync + Clone + 'static,
    Fut: Future<Output = Response<CgBody>> + Send + 'static,
{
    fn clone(&self) -> Self {
        Self { f: self.f.clone() }
    }
}

impl<F, Fut> FnLayerMethod for Closure<F, Fut>
where
    F: Fn(Request<CgBody>, Inner) -> Fut + Send + Sync + Clone + 'static,
    Fut: Future<Output = Response<CgBody>> + Send + 'static,
{
    #[inline]
    async fn call(&self, req: Request<CgBody>, inner: Inner) -> Response<CgBody> {
        (self.f)(req, inner).await
    }
}

/// A functional layer.
///
/// A filter decides by what it does with [`Inner`]: calling it continues the chain, returning a
/// response without calling it rejects the request and nothing behind the filter runs.
///
/// ```
/// # use campusgate_kernel::helper_layers::function::FnLayer;
/// # use hyper::http::header::HeaderValue;
/// let layer = FnLayer::new_closure(move |req, inner| {
///    async move {
///        let mut resp = inner.call(req).await;
///        resp.headers_mut().insert("x-gateway", HeaderValue::from_static("campusgate"));
///        resp
///    }
/// });
/// ```
///
/// Or with a struct that implements `FnLayerMethod`:
/// ```
/// # use campusgate_kernel::{helper_layers::function::{FnLayer, FnLayerMethod, Inner}, CgRequest, CgResponse, CgResponseExt};
/// # use hyper::StatusCode;
/// #[derive(Clone)]
/// struct DenyDelete;
/// impl FnLayerMethod for DenyDelete {
///    async fn call(&self, req: CgRequest, inner: Inner) -> CgResponse {
///       if req.method() == hyper::Method::DELETE {
///           return CgResponse::with_code_message(StatusCode::FORBIDDEN, "delete is not allowed");
///       }
///       inner.call(req).await
///    }
/// }
/// let layer = FnLayer::new(DenyDelete);
/// ```
#[derive(Debug, Clone)]
pub struct FnLayer<M> {
    method: M,
}

impl<M> FnLayer<M> {
    pub const fn new(method: M) -> Self {
        Self { method }
    }
}

impl<F, Fut> FnLayer<Closure<F, Fut>>
where
    F: Fn(Request<CgBody>, Inner) -> Fut + Send + Sync + Clone + 'static,
    Fut: Future<Output = Response<CgBody>> + Send + 'static,
{
    pub const fn new_closure(f: F) -> Self {
        Self::new(Closure::new(f))
    }
}

impl<M, S> Layer<S> for FnLayer<M>
where
    M: FnLayerMethod + Clone,
    S: Service<Request<CgBody>, Error = Infallible, Response = Response<CgBody>> + Send + Sync + Clone + 'static,
    <S as Service<Request<CgBody>>>::Future: Future<Output = Result<Response<CgBody>, Infallible>> + 'static + Send,
{
    type Service = FnService<M>;

    fn layer(&self, inner: S) -> Self::Service {
        FnService {
            m: self.method.clone(),
            inner: ArcHyperService::new(inner),
        }
    }
}

/// The corresponded server for [`FnLayer`]
#[derive(Debug, Clone)]
pub struct FnService<M> {
    m: M,
    inner: ArcHyperService,
}

impl<M> Service<Request<CgBody>> for FnService<M>
where
    M: FnLayerMethod + Clone,
{
    type Response = Response<CgBody>;

    type Error = Infallible;

    type Future = BoxFuture<'static, Result<Response<CgBody>, Infallible>>;

    #[inline]
    fn call(&self, req: Request<CgBody>) -> Self::Future {
        let next = Inner { inner: self.inner.clone() };
        let method = self.m.clone();
        Box::pin(async move { Ok(method.call(req, next).await) })
    }
}

/// The rest of the chain behind a [`FnLayer`].
#[derive(Debug, Clone)]
pub struct Inner {
    inner: ArcHyperService,
}

impl Inner {
    #[inline]
    pub fn new(inner: ArcHyperService) -> Self {
        Inner { inner }
    }

    /// Call the inner service and get the response
    #[inline]
    pub async fn call(self, req: Request<CgBody>) -> Response<CgBody> {
        match self.inner.call(req).await {
            Ok(resp) => resp,
            Err(never) => match never {},
        }
    }
}
