use std::convert::Infallible;

use hyper::{Request, Response};
use tower_layer::Layer;

use crate::CgBody;

pub mod add_extension;

#[derive(Debug, Clone)]
pub struct MapRequestLayer<F> {
    map: F,
}

impl<F> MapRequestLayer<F> {
    pub const fn new(map: F) -> Self {
        Self { map }
    }
}

impl<F, S> Layer<S> for MapRequestLayer<F>
where
    F: Fn(Request<CgBody>) -> Request<CgBody> + Clone,
{
    type Service = MapRequest<F, S>;

    fn layer(&self, inner: S) -> Self::Service {
        MapRequest { map: self.map.clone(), inner }
    }
}

#[derive(Debug, Clone)]
pub struct MapRequest<F, S> {
    map: F,
    inner: S,
}

impl<F, S> hyper::service::Service<Request<CgBody>> for MapRequest<F, S>
where
    F: Fn(Request<CgBody>) -> Request<CgBody> + Clone,
    S: hyper::service::Service<Request<CgBody>, Error = Infallible, Response = Response<CgBody>>,
{
    type Response = Response<CgBody>;
    type Error = Infallible;
    type Future = S::Future;

    fn call(&self, request: Request<CgBody>) -> Self::Future {
        self.inner.call((self.map)(request))
    }
}
