use crate::CgBody;
use hyper::{header::HeaderValue, Response};

/// Set the content length header for a response whose body is already in memory.
///
/// Streamed bodies keep the headers the backend sent.
pub fn with_length(resp: &mut Response<CgBody>) {
    if let Some(len) = resp.body().get_dumped().map(hyper::body::Bytes::len) {
        resp.headers_mut().remove(hyper::header::TRANSFER_ENCODING);
        resp.headers_mut().insert(hyper::header::CONTENT_LENGTH, HeaderValue::from(len));
    }
}
