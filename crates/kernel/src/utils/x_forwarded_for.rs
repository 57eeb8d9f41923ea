use hyper::{
    header::{HeaderName, HeaderValue},
    Request,
};

use crate::{extension::PeerAddr, BoxError, CgBody};

pub const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");

/// Add `x-forwarded-for` for request, based on [PeerAddr](`crate::extension::PeerAddr`)
///
/// # Errors
/// If the request has no [`PeerAddr`] extension.
pub fn x_forwarded_for(req: &mut Request<CgBody>) -> Result<(), BoxError> {
    let peer_ip = req.extensions().get::<PeerAddr>().ok_or(BoxError::from("missing peer addr ext"))?.0.ip();
    req.headers_mut().append(X_FORWARDED_FOR, HeaderValue::from_str(&peer_ip.to_string())?);
    Ok(())
}
