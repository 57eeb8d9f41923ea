use std::net::SocketAddr;

/// The address of the client connected to the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct PeerAddr(pub SocketAddr);
