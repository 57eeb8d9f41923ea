use hyper::Request;

use crate::CgBody;

/// Create a request mapper that inserts a clone of `extension` into every request.
///
/// When `overwrite` is false, an extension of the same type that is already present is kept.
pub fn add_extension<E>(extension: E, overwrite: bool) -> impl Fn(Request<CgBody>) -> Request<CgBody> + Clone
where
    E: Clone + Send + Sync + 'static,
{
    move |mut req: Request<CgBody>| {
        if overwrite || req.extensions().get::<E>().is_none() {
            req.extensions_mut().insert(extension.clone());
        }
        req
    }
}
