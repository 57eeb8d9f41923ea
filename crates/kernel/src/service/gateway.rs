pub mod builder;
use std::{ops::Index, sync::Arc};

use crate::{
    backend_service::ArcHyperService,
    extension::GatewayName,
    helper_layers::{
        map_request::{add_extension::add_extension, MapRequestLayer},
        route::RouterService,
    },
    service::{forward::ForwardService, registry::ServiceRegistry, route_table::RouteTable},
    utils::fold_layers,
    BoxLayer,
};

use tower_layer::Layer;

/****************************************************************************************

                                          Gateway

*****************************************************************************************/

pub type HttpRouterService = RouterService<RoutedService, RouteTable, ArcHyperService>;

/// A gateway, composed as
///
/// ```text
/// edge plugins -> route table -> filter chain -> forwarder -> backend
///                      |
///                      +-> fallback (no route)
/// ```
///
/// Everything is built once in [`Gateway::as_service`], afterwards the service is only cloned.
#[derive(Debug)]
pub struct Gateway {
    pub gateway_name: Arc<str>,
    pub routes: RouteTable,
    pub registry: ServiceRegistry,
    /// in front of routing, see every request
    pub edge_plugins: Vec<BoxLayer>,
    /// the filter chain, see requests that matched a route
    pub http_plugins: Vec<BoxLayer>,
    pub http_fallback: ArcHyperService,
    pub backend: ArcHyperService,
}

impl Gateway {
    /// Create a new gateway layer.
    /// # Arguments
    /// * `gateway_name` - The gateway name, this may be used by plugins.
    pub fn builder(gateway_name: impl Into<Arc<str>>) -> builder::GatewayBuilder {
        builder::GatewayBuilder::new(gateway_name)
    }
    pub fn as_service(&self) -> ArcHyperService {
        let gateway_name = GatewayName::new(self.gateway_name.clone());
        let add_gateway_name_layer = MapRequestLayer::new(add_extension(gateway_name, true));
        let router = create_http_router(&self.routes, &self.registry, &self.http_plugins, self.backend.clone(), self.http_fallback.clone());
        let service = fold_layers(self.edge_plugins.iter(), ArcHyperService::new(router));
        ArcHyperService::new(add_gateway_name_layer.layer(service))
    }
}

/// One service per route, in the order of [`RouteTable::routes`].
#[derive(Debug, Clone)]
pub struct RoutedService {
    services: Arc<[ArcHyperService]>,
}

impl Index<usize> for RoutedService {
    type Output = ArcHyperService;
    fn index(&self, index: usize) -> &Self::Output {
        #[allow(clippy::indexing_slicing)]
        &self.services.as_ref()[index]
    }
}

pub fn create_http_router(routes: &RouteTable, registry: &ServiceRegistry, plugins: &[BoxLayer], backend: ArcHyperService, fallback: ArcHyperService) -> HttpRouterService {
    let services = routes
        .routes()
        .iter()
        .map(|route| {
            let forward = ForwardService::new(route.clone(), registry.clone(), backend.clone());
            fold_layers(plugins.iter(), ArcHyperService::new(forward))
        })
        .collect::<Vec<_>>();
    tracing::debug!(routes = services.len(), plugins = plugins.len(), "[Cg.Gateway] http router created");
    RouterService::new(RoutedService { services: services.into() }, routes.clone(), fallback)
}
