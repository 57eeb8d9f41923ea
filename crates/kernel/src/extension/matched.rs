use crate::service::route_table::Route;
use std::{ops::Deref, sync::Arc};

/// The route resolved for a request, inserted before the filter chain runs.
#[derive(Debug, Clone)]
pub struct MatchedRoute(pub Arc<Route>);

impl Deref for MatchedRoute {
    type Target = Route;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}
