/// Pick an instance out of a set, by some policy.
pub mod balancer;

/// Create a function or closure layer.
pub mod function;

/// Map service's future into another future.
pub mod map_future;

/// Map service's request.
pub mod map_request;

/// Routing request to some inner service
pub mod route;

/// Timeout layer based on tokio timer
pub mod timeout;
