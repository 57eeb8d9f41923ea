use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    sync::Arc,
    time::Duration,
};

use campusgate_auth::SecurityLayer;
use campusgate_config::Config;
use campusgate_kernel::{listener::CgListen, service::Gateway, ArcHyperService, BoxError};
use campusgate_plugin::PluginRepository;
use tokio::time::timeout;
use tracing::{error, instrument};

use tokio_util::sync::CancellationToken;

use crate::config::convert::{convert_registry, convert_routes};

/// Create the gateway service out of a config: security edge, route table, filter chain and registry.
///
/// # Errors
/// If any part of the config is invalid.
pub fn create_service(config: &Config, plugins: &PluginRepository) -> Result<ArcHyperService, BoxError> {
    let routes = convert_routes(config)?;
    let registry = convert_registry(config)?;
    let chain = plugins.create_chain(config.plugins.iter().cloned())?;
    let mut builder = Gateway::builder(config.gateway.name.clone()).routes(routes).registry(registry).http_plugins(chain);
    if let Some(security) = &config.security {
        tracing::info!(rules = security.access_rules.len(), registrations = security.registrations.len(), "[Cg.Server] security enabled");
        builder = builder.edge_plugin(SecurityLayer::from_config(security)?.into_layer());
    } else {
        tracing::info!("[Cg.Server] no security config, every request is permitted");
    }
    Ok(builder.build().as_service())
}

/// # Gateway
/// A running campusgate gateway instance
///
/// It's created by calling [create](RunningGateway::create).
///
/// And you can use [shutdown](RunningGateway::shutdown) to shutdown it manually.
pub struct RunningGateway {
    pub gateway_name: Arc<str>,
    pub addrs: Vec<SocketAddr>,
    token: CancellationToken,
    handle: tokio::task::JoinHandle<()>,
    shutdown_timeout: Duration,
}

impl std::fmt::Debug for RunningGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunningGateway").field("gateway_name", &self.gateway_name).field("addrs", &self.addrs).field("shutdown_timeout", &self.shutdown_timeout).finish()
    }
}

impl RunningGateway {
    /// Start a gateway, listening on every configured listener
    #[instrument(fields(gateway=%config.gateway.name), skip_all, err)]
    pub fn create(config: Config, cancel_token: CancellationToken) -> Result<Self, BoxError> {
        tracing::info!("[Cg.Server] start gateway");
        let service = create_service(&config, PluginRepository::global())?;
        let gateway = config.gateway;
        if gateway.listeners.is_empty() {
            error!("[Cg.Server] Missing Listeners");
        }

        let gateway_name: Arc<str> = Arc::from(gateway.name.as_str());
        let mut addrs = Vec::with_capacity(gateway.listeners.len());
        let mut listens = Vec::with_capacity(gateway.listeners.len());
        for listener in &gateway.listeners {
            let ip = listener.ip.unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));
            let addr = SocketAddr::new(ip, listener.port);
            tracing::debug!(listener = %listener.name, %addr, "[Cg.Server] add listener");
            addrs.push(addr);
            listens.push(CgListen::new(addr, service.clone(), cancel_token.child_token()));
        }

        let cancel_task = cancel_token.clone().cancelled_owned();
        let handle = {
            let gateway_name = gateway_name.clone();
            tokio::task::spawn(async move {
                let mut join_set = tokio::task::JoinSet::new();
                for listen in listens {
                    join_set.spawn(async move {
                        let id = listen.listener_id.clone();
                        if let Err(e) = listen.listen().await {
                            tracing::error!("[Cg.Server] listen error: {e}")
                        }
                        tracing::info!("[Cg.Server] listener[{id}] quit listening")
                    });
                }
                tracing::info!(gateway = gateway_name.as_ref(), "[Cg.Server] start all listeners");
                cancel_task.await;
                while let Some(result) = join_set.join_next().await {
                    if let Err(e) = result {
                        tracing::warn!("[Cg.Server] listener task failed: {e}");
                    }
                }
                tracing::info!(gateway = gateway_name.as_ref(), "[Cg.Server] cancelled");
            })
        };
        tracing::info!("[Cg.Server] start finished");
        Ok(RunningGateway {
            gateway_name,
            addrs,
            token: cancel_token,
            handle,
            shutdown_timeout: Duration::from_secs(10),
        })
    }

    /// Shutdown this gateway
    pub async fn shutdown(self) {
        self.token.cancel();
        if let Err(e) = timeout(self.shutdown_timeout, self.handle).await {
            tracing::warn!("[Cg.Server] Wait shutdown timeout:{e}");
        }
        tracing::info!("[Cg.Server] Gateway shutdown");
    }
}
