/// The forwarding service at the bottom of each route.
pub mod forward;
/// Gateway service, composing routes and filters into one service.
pub mod gateway;
/// Static service name to instances table.
pub mod registry;
/// Prefix based route table.
pub mod route_table;

pub use gateway::Gateway;
