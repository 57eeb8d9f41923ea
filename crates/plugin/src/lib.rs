#![deny(clippy::unwrap_used, clippy::dbg_macro, clippy::unimplemented, clippy::todo, clippy::inline_always)]
//! The filter chain of the gateway: the [`Plugin`] trait, a repository of plugin types, and the
//! filters shipped with the gateway.
use std::{
    any::Any,
    borrow::Cow,
    collections::HashMap,
    fmt::Debug,
    sync::{Arc, OnceLock, RwLock},
};

use futures_util::{future::BoxFuture, Future};
use hyper::{Request, Response};
use layer::{InnerBoxPf, PluginFunction};
pub use serde_json;
pub use serde_json::{Error as SerdeJsonError, Value as JsonValue};
pub use campusgate_kernel::helper_layers::function::Inner;
use campusgate_kernel::helper_layers::function::FnLayer;
pub use campusgate_kernel::BoxError;
pub use campusgate_kernel::BoxLayer;
pub use campusgate_kernel::{CgBody, CgRequest, CgRequestExt, CgResponse, CgResponseExt};
pub mod error;
pub mod layer;
pub mod plugins;
pub use error::PluginError;
pub use campusgate_model;
pub use campusgate_model::{PluginConfig, PluginInstanceId, PluginInstanceName};

/// # Plugin Trait
/// It's a easy way to define a filter through this trait.
/// You should give a unique [`code`](Plugin::CODE) for the plugin,
/// and implement the [`call`](Plugin::call) function and the [`create`](Plugin::create) function.
///
/// A plugin rejects a request by returning a response without calling `inner`,
/// and decorates a response by changing what `inner` returned.
///
/// # Example
/// In the follow example, we add a server header for each response.
/// ```rust
/// # use campusgate_plugin::{Plugin, CgRequest, CgResponse, Inner, BoxError, PluginConfig};
/// pub struct ServerHeaderPlugin {
///     header_value: String,
/// }
///
/// impl Plugin for ServerHeaderPlugin {
///     const CODE: &'static str = "server-header";
///     async fn call(&self, req: CgRequest, inner: Inner) -> Result<CgResponse, BoxError> {
///         let mut resp = inner.call(req).await;
///         resp.headers_mut().insert("server", self.header_value.parse()?);
///         Ok(resp)
///     }
///     fn create(plugin_config: PluginConfig) -> Result<Self, BoxError> {
///         let Some(header_value) = plugin_config.spec.get("header_value") else {
///             return Err("missing header_value".into())
///         };
///         Ok(Self {
///            header_value: header_value.as_str().unwrap_or("campusgate").to_string(),
///         })
///     }
/// }
/// ```
pub trait Plugin: Any + Sized + Send + Sync {
    /// Plugin code, it should be unique repository-wise.
    ///
    /// It's **recommended** to use a **kebab-case** string.
    const CODE: &'static str;
    /// Position in the filter chain, lower runs first on the request and last on the response.
    ///
    /// Plugins with the same order keep their configured order.
    const ORDER: i32 = 0;
    /// This function will be called when the plugin is invoked.
    ///
    /// The error will be wrapped with a response with status code 500, and the error message will be response's body.
    ///
    /// A rejection with any other status code is an ordinary response, returned with `Ok`.
    fn call(&self, req: CgRequest, inner: Inner) -> impl Future<Output = Result<CgResponse, BoxError>> + Send;
    fn create(plugin_config: PluginConfig) -> Result<Self, BoxError>;
    fn create_by_spec(spec: JsonValue, name: PluginInstanceName) -> Result<Self, BoxError> {
        Self::create(PluginConfig {
            id: PluginInstanceId { code: Self::CODE.into(), name },
            spec,
        })
    }
    /// Register the plugin to the repository.
    fn register(repo: &PluginRepository) {
        repo.register_custom(PluginDefinitionObject::from_trait::<Self>());
    }
}

/// Plugin Trait Object
pub struct PluginDefinitionObject {
    pub code: Cow<'static, str>,
    pub order: i32,
    pub make_pf: Box<MakePfMethod>,
}

impl Debug for PluginDefinitionObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginDefinitionObject").field("code", &self.code).field("order", &self.order).finish()
    }
}

impl PluginDefinitionObject {
    pub fn from_trait<P: Plugin>() -> Self {
        let constructor = move |config: PluginConfig| {
            let plugin = Arc::new(P::create(config)?);
            let function = move |req: Request<CgBody>, inner: Inner| {
                let plugin = plugin.clone();
                let task = async move {
                    match plugin.call(req, inner).await {
                        Ok(resp) => resp,
                        Err(e) => {
                            tracing::error!("{code} plugin error: {e}", code = P::CODE);
                            PluginError::internal_error::<P>(e).into()
                        }
                    }
                };
                Box::pin(task) as BoxFuture<'static, Response<CgBody>>
            };
            Ok(Box::new(function) as InnerBoxPf)
        };
        let make_pf = Box::new(constructor);
        Self {
            code: P::CODE.into(),
            order: P::ORDER,
            make_pf,
        }
    }
    #[inline]
    pub(crate) fn make_pf(&self, config: PluginConfig) -> Result<InnerBoxPf, BoxError> {
        (self.make_pf)(config)
    }
}

pub type MakePfMethod = dyn Fn(PluginConfig) -> Result<InnerBoxPf, BoxError> + Send + Sync + 'static;

/// # Plugin Repository
/// A repository of plugin definitions, creating filter layers out of plugin configs.
///
/// You can get a global instance through [`PluginRepository::global`].
#[derive(Default, Clone)]
pub struct PluginRepository {
    plugins: Arc<RwLock<HashMap<String, PluginDefinitionObject>>>,
}

impl Debug for PluginRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRepository").field("plugins", &self.plugin_list()).finish()
    }
}

impl PluginRepository {
    /// Get a global instance of this repository.
    ///
    /// Once the repository is initialized, it will register all plugins in this crate.
    pub fn global() -> &'static Self {
        static INIT: OnceLock<PluginRepository> = OnceLock::new();
        INIT.get_or_init(|| {
            let repo = PluginRepository::new();
            repo.register_prelude();
            repo
        })
    }

    /// register all plugins in this crates
    pub fn register_prelude(&self) {
        self.register::<plugins::admin_key::AdminKeyGuardPlugin>();
        self.register::<plugins::role_access::RoleAccessGuardPlugin>();
        self.register::<plugins::last_modified::LastModifiedPlugin>();
        self.register::<plugins::cache_control::CacheControlPlugin>();
    }

    /// create a new empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// register by [`Plugin`] trait
    pub fn register<P: Plugin>(&self) {
        P::register(self)
    }

    /// register a custom plugin
    pub fn register_custom<A: Into<PluginDefinitionObject>>(&self, attr: A) {
        let attr: PluginDefinitionObject = attr.into();
        let mut map = self.plugins.write().expect("CgPluginRepository register error");
        let _old_attr = map.insert(attr.code.to_string(), attr);
    }

    /// The order of a registered plugin code.
    pub fn order_of(&self, code: &str) -> Option<i32> {
        self.plugins.read().expect("CgPluginRepository read error").get(code).map(|attr| attr.order)
    }

    /// create a filter layer out of a plugin config
    ///
    /// # Errors
    /// If the plugin code is not registered, or the plugin rejects its config.
    pub fn create_layer(&self, config: PluginConfig) -> Result<BoxLayer, BoxError> {
        let attr_rg = self.plugins.read().expect("CgPluginRepository read error");
        let code = config.code();
        let Some(attr) = attr_rg.get(code) else {
            return Err(format!("[Cg.Plugin] unregistered plugin type {code}").into());
        };
        let id = config.id.clone();
        let pf = attr.make_pf(config).map_err(|e| format!("[Cg.Plugin] fail to create plugin {id}: {e}"))?;
        tracing::debug!(%id, order = attr.order, "[Cg.Plugin] plugin created");
        Ok(BoxLayer::new(FnLayer::new(PluginFunction::new(pf))))
    }

    /// create the filter chain, ordered by plugin order, ties keep the order of `configs`
    ///
    /// # Errors
    /// If any of the plugins can't be created.
    pub fn create_chain(&self, configs: impl IntoIterator<Item = PluginConfig>) -> Result<Vec<BoxLayer>, BoxError> {
        let mut configs = configs
            .into_iter()
            .map(|config| {
                let order = self.order_of(config.code()).ok_or_else(|| format!("[Cg.Plugin] unregistered plugin type {}", config.code()))?;
                Ok((order, config))
            })
            .collect::<Result<Vec<_>, BoxError>>()?;
        configs.sort_by_key(|(order, _)| *order);
        configs.into_iter().map(|(_, config)| self.create_layer(config)).collect()
    }

    pub fn plugin_list(&self) -> Vec<(String, i32)> {
        let map = self.plugins.read().expect("CgPluginRepository read error");
        let mut list = map.values().map(|attr| (attr.code.to_string(), attr.order)).collect::<Vec<_>>();
        list.sort_by_key(|(_, order)| *order);
        list
    }
}
