use std::{convert::Infallible, time::Duration};

use futures_util::Future;
use hyper::{Request, Response};
use tower_layer::Layer;

use crate::CgBody;

#[derive(Debug, Clone)]
pub struct TimeoutLayer {
    /// timeout duration, none value means no timeout
    pub timeout: Option<Duration>,
    pub timeout_response: hyper::body::Bytes,
}

impl<S> Layer<S> for TimeoutLayer {
    type Service = Timeout<S>;

    fn layer(&self, inner: S) -> Self::Service {
        Timeout {
            inner,
            timeout: self.timeout,
            timeout_response: self.timeout_response.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Timeout<S> {
    inner: S,
    timeout: Option<Duration>,
    timeout_response: hyper::body::Bytes,
}

impl TimeoutLayer {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self {
            timeout,
            timeout_response: hyper::body::Bytes::from_static(b"[Cg.Client] backend request timeout"),
        }
    }
}

impl<S> Timeout<S> {
    pub fn new(timeout: Option<Duration>, timeout_response: hyper::body::Bytes, inner: S) -> Self {
        Self { inner, timeout, timeout_response }
    }
}

impl<S> hyper::service::Service<Request<CgBody>> for Timeout<S>
where
    S: hyper::service::Service<Request<CgBody>, Response = Response<CgBody>, Error = Infallible> + Send + 'static,
    <S as hyper::service::Service<Request<CgBody>>>::Future: std::marker::Send,
{
    type Response = Response<CgBody>;

    type Error = Infallible;

    type Future = TimeoutFuture<S::Future>;

    fn call(&self, req: Request<CgBody>) -> Self::Future {
        TimeoutFuture {
            inner: self.inner.call(req),
            sleep: self.timeout.map(tokio::time::sleep),
            timeout_response: self.timeout_response.clone(),
        }
    }
}

pin_project_lite::pin_project! {
    pub struct TimeoutFuture<F> {
        #[pin]
        inner: F,
        #[pin]
        sleep: Option<tokio::time::Sleep>,
        timeout_response: hyper::body::Bytes,
    }
}

impl<F> Future for TimeoutFuture<F>
where
    F: Future<Output = Result<Response<CgBody>, Infallible>> + Send + 'static,
{
    type Output = Result<Response<CgBody>, Infallible>;

    fn poll(self: std::pin::Pin<&mut Self>, cx: &mut std::task::Context<'_>) -> std::task::Poll<Self::Output> {
        let this = self.project();
        if let std::task::Poll::Ready(resp) = this.inner.poll(cx) {
            return std::task::Poll::Ready(resp);
        }
        if let Some(sleep) = this.sleep.as_pin_mut() {
            if sleep.poll(cx).is_ready() {
                tracing::warn!("[Cg.Client] backend request timeout");
                let mut response = Response::new(CgBody::full(this.timeout_response.clone()));
                *response.status_mut() = hyper::StatusCode::GATEWAY_TIMEOUT;
                return std::task::Poll::Ready(Ok(response));
            }
        }
        std::task::Poll::Pending
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use hyper::{service::service_fn, service::Service, StatusCode};

    #[tokio::test]
    async fn test_slow_backend_times_out() {
        let slow = service_fn(|_req: Request<CgBody>| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, Infallible>(Response::new(CgBody::empty()))
        });
        let service = TimeoutLayer::new(Some(Duration::from_millis(50))).layer(slow);
        let resp = service.call(Request::new(CgBody::empty())).await.expect("infallible");
        assert_eq!(resp.status(), StatusCode::GATEWAY_TIMEOUT);

        let fast = service_fn(|_req: Request<CgBody>| async { Ok::<_, Infallible>(Response::new(CgBody::empty())) });
        let service = TimeoutLayer::new(None).layer(fast);
        let resp = service.call(Request::new(CgBody::empty())).await.expect("infallible");
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
