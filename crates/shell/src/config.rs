use crate::server::RunningGateway;

pub use campusgate_config::model::*;
pub use campusgate_config::service::*;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub mod convert;

/// Startup the gateway with custom shutdown signal
///
/// Returns once the signal is cancelled and the gateway has shut down.
pub async fn startup_with_shutdown_signal<C>(config: C, shutdown_signal: CancellationToken) -> Result<(), BoxError>
where
    C: Retrieve + 'static,
{
    let config = config.retrieve_config().await?;
    info!(gateway = %config.gateway.name, routes = config.routes.len(), plugins = config.plugins.len(), "[Cg.Config] config loaded");
    let gateway = RunningGateway::create(config, shutdown_signal.child_token())?;
    shutdown_signal.cancelled().await;
    gateway.shutdown().await;
    Ok(())
}
