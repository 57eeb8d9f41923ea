mod enter_time;
pub use enter_time::*;
mod gateway_name;
pub use gateway_name::*;
mod matched;
pub use matched::*;
mod peer_addr;
pub use peer_addr::*;

/// FromBackend is a marker type to indicate that the response is from backend.
///
/// Responses generated by the gateway itself (rejections, no route, timeouts) never carry it.
#[derive(Debug, Clone, Copy)]
pub struct FromBackend {
    _priv: (),
}

impl FromBackend {
    pub(crate) const fn new() -> Self {
        Self { _priv: () }
    }
}
