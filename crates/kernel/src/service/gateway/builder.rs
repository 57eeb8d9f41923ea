use std::sync::Arc;

use hyper::{service::service_fn, Response, StatusCode};

use crate::{
    backend_service::get_http_backend_service,
    service::{registry::ServiceRegistry, route_table::RouteTable},
    ArcHyperService, BoxLayer, CgBody, CgResponseExt,
};

use super::Gateway;

#[derive(Debug)]
pub struct GatewayBuilder {
    pub gateway_name: Arc<str>,
    pub routes: RouteTable,
    pub registry: ServiceRegistry,
    pub edge_plugins: Vec<BoxLayer>,
    pub http_plugins: Vec<BoxLayer>,
    pub http_fallback: ArcHyperService,
    pub backend: Option<ArcHyperService>,
}

/// return 404 not found
pub fn default_gateway_route_fallback() -> ArcHyperService {
    ArcHyperService::new(service_fn(|_| async { Ok(Response::<CgBody>::with_code_message(StatusCode::NOT_FOUND, "[Cg.Route] no route")) }))
}

impl GatewayBuilder {
    pub fn new(gateway_name: impl Into<Arc<str>>) -> Self {
        Self {
            gateway_name: gateway_name.into(),
            routes: RouteTable::default(),
            registry: ServiceRegistry::default(),
            edge_plugins: Vec::new(),
            http_plugins: Vec::new(),
            http_fallback: default_gateway_route_fallback(),
            backend: None,
        }
    }
    pub fn routes(mut self, routes: RouteTable) -> Self {
        self.routes = routes;
        self
    }
    pub fn registry(mut self, registry: ServiceRegistry) -> Self {
        self.registry = registry;
        self
    }
    pub fn edge_plugin(mut self, plugin: BoxLayer) -> Self {
        self.edge_plugins.push(plugin);
        self
    }
    pub fn http_plugins(mut self, plugins: impl IntoIterator<Item = BoxLayer>) -> Self {
        self.http_plugins.extend(plugins);
        self
    }
    pub fn http_fallback(mut self, fallback: ArcHyperService) -> Self {
        self.http_fallback = fallback;
        self
    }
    /// Replace the service that finally talks to backends, the shared http client by default.
    pub fn backend(mut self, backend: ArcHyperService) -> Self {
        self.backend = Some(backend);
        self
    }
    pub fn build(self) -> Gateway {
        Gateway {
            gateway_name: self.gateway_name,
            routes: self.routes,
            registry: self.registry,
            edge_plugins: self.edge_plugins,
            http_plugins: self.http_plugins,
            http_fallback: self.http_fallback,
            backend: self.backend.unwrap_or_else(get_http_backend_service),
        }
    }
}
