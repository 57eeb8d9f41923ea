use std::convert::Infallible;

use hyper::{header::HeaderValue, Request, Response};

use tracing::instrument;

use crate::{extension::FromBackend, CgBody};

#[instrument(skip_all)]
#[cold]
/// Answer with the request body, and echo the request's uri and headers as `x-echo-*` headers.
///
/// Stands in for a real backend in tests.
pub async fn echo(req: Request<CgBody>) -> Result<Response<CgBody>, Infallible> {
    let (parts, body) = req.into_parts();
    let mut resp = Response::new(body);
    if let Ok(uri) = HeaderValue::from_str(&parts.uri.to_string()) {
        resp.headers_mut().insert("x-echo-uri", uri);
    }
    if let Ok(method) = HeaderValue::from_str(parts.method.as_str()) {
        resp.headers_mut().insert("x-echo-method", method);
    }
    for (name, value) in &parts.headers {
        if let Ok(echo_name) = hyper::header::HeaderName::from_bytes(format!("x-echo-{name}").as_bytes()) {
            resp.headers_mut().append(echo_name, value.clone());
        }
    }
    resp.extensions_mut().insert(FromBackend::new());
    Ok(resp)
}
