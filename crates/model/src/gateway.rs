use std::net::IpAddr;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_GATEWAY_NAME, DEFAULT_PORT};

/// Gateway represents an instance of the traffic handling process, bound to a set of listeners.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct CgGateway {
    /// Name of the Gateway.
    pub name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    /// Listeners define logical endpoints that are bound on this Gateway’s addresses.
    pub listeners: Vec<CgListener>,
}

impl Default for CgGateway {
    fn default() -> Self {
        Self {
            name: DEFAULT_GATEWAY_NAME.to_string(),
            listeners: vec![CgListener::default()],
        }
    }
}

/// Listener embodies the concept of a logical endpoint where a Gateway accepts network connections.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct CgListener {
    /// Name is the name of the Listener. This name MUST be unique within a Gateway.
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Ip bound to the Listener. Default is 0.0.0.0
    pub ip: Option<IpAddr>,
    /// Port is the network port.
    pub port: u16,
}

impl Default for CgListener {
    fn default() -> Self {
        Self {
            name: "http".to_string(),
            ip: None,
            port: DEFAULT_PORT,
        }
    }
}
