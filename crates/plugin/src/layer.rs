use std::sync::Arc;

use campusgate_kernel::{
    helper_layers::function::{FnLayerMethod, Inner},
    CgBody,
};
use futures_util::future::BoxFuture;
use hyper::{Request, Response};

/// A created plugin instance, as a function of the request and the rest of the chain.
#[derive(Clone)]
pub struct PluginFunction {
    f: Arc<InnerBoxPf>,
}

impl std::fmt::Debug for PluginFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginFunction").finish_non_exhaustive()
    }
}

pub(crate) type InnerBoxPf = Box<dyn Fn(Request<CgBody>, Inner) -> BoxFuture<'static, Response<CgBody>> + Send + Sync + 'static>;

impl PluginFunction {
    pub(crate) fn new(f: InnerBoxPf) -> Self {
        Self { f: Arc::new(f) }
    }
}

impl FnLayerMethod for PluginFunction {
    async fn call(&self, req: Request<CgBody>, inner: Inner) -> Response<CgBody> {
        (self.f)(req, inner).await
    }
}
