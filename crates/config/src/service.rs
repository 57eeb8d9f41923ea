/// Config file format
pub mod config_format;
/// File system backend
#[cfg(feature = "fs")]
pub mod fs;
/// In-memory backend
pub mod memory;

use futures_util::Future;
use campusgate_model::*;

/// A source the gateway configuration can be read from.
pub trait Retrieve: Sync + Send {
    fn retrieve_config(&self) -> impl Future<Output = Result<Config, BoxError>> + Send;
    fn retrieve_route(&self, name: &str) -> impl Future<Output = Result<Option<CgHttpRoute>, BoxError>> + Send {
        async move { Ok(self.retrieve_config().await?.route(name).cloned()) }
    }
    fn retrieve_plugins_by_code(&self, code: &str) -> impl Future<Output = Result<Vec<PluginConfig>, BoxError>> + Send {
        async move { Ok(self.retrieve_config().await?.plugins.into_iter().filter(|p| p.code() == code).collect()) }
    }
}
