pub mod plugin;
use std::{collections::BTreeMap, fmt::Debug};

pub use plugin::*;

pub mod gateway;
pub use gateway::*;

pub mod http_route;
pub use http_route::*;

pub mod role;
pub use role::*;

pub mod security;
pub use security::*;

use serde::{Deserialize, Serialize};

pub mod constants;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;
pub type BoxResult<T> = Result<T, BoxError>;

/// The whole configuration of a gateway process, loaded once at startup.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub gateway: CgGateway,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub routes: Vec<CgHttpRoute>,
    /// service name to the base urls of its instances, targets of `lb://<service>` routes
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub services: BTreeMap<String, Vec<String>>,
    /// the filter chain, ordered by each plugin's order, then by position here
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub plugins: Vec<PluginConfig>,
    /// absent means every request is permitted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<SecurityConfig>,
}

impl Config {
    pub fn route(&self, name: &str) -> Option<&CgHttpRoute> {
        self.routes.iter().find(|r| r.name == name)
    }
}
