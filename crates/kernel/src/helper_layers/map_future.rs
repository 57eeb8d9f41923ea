use hyper::service::Service;

/// Wrap a service and map the future it returns.
#[derive(Clone)]
pub struct MapFuture<S, F> {
    inner: S,
    f: F,
}

impl<S, F> MapFuture<S, F> {
    pub const fn new(inner: S, f: F) -> Self {
        Self { inner, f }
    }
}

impl<S, F> std::fmt::Debug for MapFuture<S, F>
where
    S: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapFuture").field("inner", &self.inner).finish_non_exhaustive()
    }
}

impl<R, S, F, T, E, Fut> Service<R> for MapFuture<S, F>
where
    S: Service<R>,
    F: Fn(S::Future) -> Fut,
    E: From<S::Error>,
    Fut: std::future::Future<Output = Result<T, E>>,
{
    type Response = T;
    type Error = E;
    type Future = Fut;

    fn call(&self, req: R) -> Self::Future {
        (self.f)(self.inner.call(req))
    }
}
