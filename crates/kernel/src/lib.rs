//! # Campusgate kernel crate.
//!
//! This crate provides the request pipeline of the gateway: the boxed body and
//! service types, the continuation based layer composition used by every
//! filter, the route table and the backend forwarder.

#![deny(clippy::unwrap_used, clippy::dbg_macro, clippy::unimplemented, clippy::todo, clippy::missing_safety_doc)]
#![warn(
    clippy::missing_errors_doc,
    clippy::indexing_slicing,
    clippy::inline_always,
    clippy::fn_params_excessive_bools,
    missing_debug_implementations
)]
/// http backend service, and the http client used to reach it.
pub mod backend_service;
/// a boxed body
pub mod body;
/// extensions for request and response
pub mod extension;
/// helper layers
pub mod helper_layers;
/// tcp listener
pub mod listener;
/// gateway service, route table and forwarder
pub mod service;
/// util functions and structs
pub mod utils;

pub use backend_service::ArcHyperService;
pub use body::CgBody;
use hyper::{body::Bytes, Request, Response, StatusCode};
use std::{convert::Infallible, fmt};
pub use tokio_util::sync::CancellationToken;
pub use tower_layer::Layer;

use tower_layer::layer_fn;

pub type BoxResult<T> = Result<T, BoxError>;
/// A boxed error.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Alias for a request with a boxed body.
pub type CgRequest = Request<CgBody>;
/// Alias for a response with a boxed body.
pub type CgResponse = Response<CgBody>;

/// Provides extension methods for [`Request`](hyper::Request).
pub trait CgRequestExt {
    /// Get the first value of a header as a string, ignoring values that are not visible ascii.
    fn header_str(&self, name: impl hyper::header::AsHeaderName) -> Option<&str>;
    /// Name of the route the request was matched to, if routing already ran.
    fn route_name(&self) -> Option<&str>;
}

impl CgRequestExt for CgRequest {
    fn header_str(&self, name: impl hyper::header::AsHeaderName) -> Option<&str> {
        self.headers().get(name).and_then(|v| v.to_str().ok())
    }

    fn route_name(&self) -> Option<&str> {
        self.extensions().get::<extension::MatchedRoute>().map(|route| route.name.as_str())
    }
}

/// Provides extension methods for [`Response`](hyper::Response).
pub trait CgResponseExt {
    fn with_code_message(code: StatusCode, message: impl Into<Bytes>) -> Self;
    fn with_code_empty(code: StatusCode) -> Self;
}

impl CgResponseExt for Response<CgBody> {
    fn with_code_message(code: StatusCode, message: impl Into<Bytes>) -> Self {
        let body = CgBody::full(message);
        let mut resp = Response::new(body);
        *resp.status_mut() = code;
        resp
    }
    fn with_code_empty(code: StatusCode) -> Self {
        let mut resp = Response::new(CgBody::empty());
        *resp.status_mut() = code;
        resp
    }
}

/// A boxed [`Layer`] that can be used as a filter layer in gateway.
pub struct BoxLayer {
    boxed: Box<dyn Layer<ArcHyperService, Service = ArcHyperService> + Send + Sync + 'static>,
}

impl BoxLayer {
    /// Create a new [`BoxLayer`].
    pub fn new<L>(inner_layer: L) -> Self
    where
        L: Layer<ArcHyperService> + Send + Sync + 'static,
        L::Service: Clone + hyper::service::Service<Request<CgBody>, Response = Response<CgBody>, Error = Infallible> + Send + Sync + 'static,
        <L::Service as hyper::service::Service<Request<CgBody>>>::Future: Send + 'static,
    {
        let layer = layer_fn(move |inner: ArcHyperService| {
            let out = inner_layer.layer(inner);
            ArcHyperService::new(out)
        });

        Self { boxed: Box::new(layer) }
    }

    /// Wrap an already shared service with this layer.
    #[must_use]
    pub fn layer_shared(&self, inner: ArcHyperService) -> ArcHyperService {
        self.boxed.layer(inner)
    }
}

impl<S> Layer<S> for BoxLayer
where
    S: hyper::service::Service<Request<CgBody>, Response = Response<CgBody>, Error = Infallible> + Clone + Send + Sync + 'static,
    <S as hyper::service::Service<hyper::Request<CgBody>>>::Future: std::marker::Send,
{
    type Service = ArcHyperService;

    fn layer(&self, inner: S) -> Self::Service {
        self.boxed.layer(ArcHyperService::new(inner))
    }
}

impl fmt::Debug for BoxLayer {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.debug_struct("BoxLayer").finish()
    }
}
