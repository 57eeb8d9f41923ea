//! **The university API gateway**
//!
//! Routes `/Proiect_TW/**` requests to the course, student and enrollment services, behind an
//! ordered filter chain and an optional OpenID Connect login.
//!
//! ## startup
//! ### static config
//! see [`startup_static`]
//! ### by config file
//! see [`startup_file`]
//!
#![warn(clippy::unwrap_used)]

pub use campusgate_auth as auth;
pub use campusgate_config::model;
pub use campusgate_config::model::{BoxError, BoxResult};
use campusgate_config::service::Retrieve;
use campusgate_config::Config;
pub use campusgate_kernel as kernel;
pub use campusgate_plugin as plugin;
pub use hyper;
use tracing::{info, instrument};

pub mod config;
pub mod server;

#[cfg(feature = "fs")]
/// # Startup the gateway by config file
/// The `path` is the path of a `.json` or `.toml` config file.
pub async fn startup_file(path: impl AsRef<std::path::Path>) -> Result<(), BoxError> {
    use campusgate_config::service::fs::AnyFs;
    let config = AnyFs::new(path.as_ref());
    startup(config).await
}

/// # Startup the gateway by static config
/// The `config` is the static config.
pub async fn startup_static(config: Config) -> Result<(), BoxError> {
    use campusgate_config::service::memory::Memory;
    let config = Memory::new(config);
    startup(config).await
}

/// # Startup the gateway
/// The `config` could be any type that implements [`campusgate_config::service::Retrieve`] trait.
///
/// Runs until ctrl-c.
///
/// ## Errors
/// If the config is invalid, it will return a BoxError.
#[instrument(skip(config))]
pub async fn startup<R>(config: R) -> Result<(), BoxError>
where
    R: Retrieve + 'static,
{
    info!("Campusgate Meta Info: {:?}", Meta::new());
    info!("Starting gateway...");
    config::startup_with_shutdown_signal(config, ctrl_c_cancel_token()).await
}

#[derive(Debug, Clone, Copy)]
pub struct Meta {
    pub version: &'static str,
}

impl Meta {
    const DEFAULT: Meta = Self {
        version: env!("CARGO_PKG_VERSION"),
    };
    pub const fn new() -> Self {
        Self::DEFAULT
    }
}

impl Default for Meta {
    fn default() -> Self {
        Self::DEFAULT
    }
}

pub fn ctrl_c_cancel_token() -> tokio_util::sync::CancellationToken {
    let cancel_token = tokio_util::sync::CancellationToken::new();
    {
        let cancel_token = cancel_token.clone();
        tokio::spawn(async move {
            let _ = tokio::signal::ctrl_c().await;
            info!("Received ctrl+c signal, shutting down...");
            cancel_token.cancel();
        });
    }
    cancel_token
}
