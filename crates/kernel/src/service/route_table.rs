use std::{str::FromStr, sync::Arc, time::Duration};

use hyper::{header::HeaderMap, Request, Uri};
use regex::Regex;
use tracing::instrument;

use crate::{extension::MatchedRoute, helper_layers::route::Router, utils::path_matches_prefix, BoxError, CgBody};

/// Where a route sends its requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// `lb://name`, resolved against the service registry for every request.
    Balanced(String),
    /// `http://host:port` or `https://host:port`, used as is.
    Direct(Uri),
}

impl FromStr for Target {
    type Err = BoxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(name) = s.strip_prefix("lb://") {
            let name = name.trim_end_matches('/');
            if name.is_empty() {
                return Err(format!("missing service name in target {s}").into());
            }
            return Ok(Target::Balanced(name.to_string()));
        }
        let uri = Uri::from_str(s)?;
        match uri.scheme_str() {
            Some("http" | "https") if uri.authority().is_some() => Ok(Target::Direct(uri)),
            _ => Err(format!("unsupported target {s}, expect lb://<service> or http(s)://<host>[:<port>]").into()),
        }
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::Balanced(name) => write!(f, "lb://{name}"),
            Target::Direct(uri) => write!(f, "{uri}"),
        }
    }
}

/// How the matched path is rewritten before forwarding.
#[derive(Debug, Clone)]
pub enum PathRewrite {
    /// Drop the route prefix, `/Proiect_TW/courses/7` becomes `/7`.
    StripPrefix,
    /// Replace every match of `regex` by `replacement`, where `${name}` refers to a named group.
    Regex { regex: Regex, replacement: String },
    /// Forward the path unchanged.
    Keep,
}

impl PathRewrite {
    pub fn apply(&self, prefix: &str, path: &str) -> String {
        match self {
            PathRewrite::StripPrefix => {
                let mut rest = path.trim_start_matches('/');
                for segment in prefix.split('/').filter(|s| !s.is_empty()) {
                    rest = rest.strip_prefix(segment).unwrap_or(rest).trim_start_matches('/');
                }
                format!("/{rest}")
            }
            PathRewrite::Regex { regex, replacement } => regex.replace_all(path, replacement.as_str()).into_owned(),
            PathRewrite::Keep => path.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Route {
    pub name: String,
    pub prefix: String,
    pub target: Target,
    pub rewrite: PathRewrite,
    /// added to the request sent to the backend
    pub request_headers: HeaderMap,
    /// added to the response returned to the client
    pub response_headers: HeaderMap,
    /// none value means no timeout
    pub timeout: Option<Duration>,
}

impl Route {
    pub fn new(name: impl Into<String>, prefix: impl Into<String>, target: Target) -> Self {
        Self {
            name: name.into(),
            prefix: prefix.into(),
            target,
            rewrite: PathRewrite::StripPrefix,
            request_headers: HeaderMap::new(),
            response_headers: HeaderMap::new(),
            timeout: None,
        }
    }
    pub fn rewrite(mut self, rewrite: PathRewrite) -> Self {
        self.rewrite = rewrite;
        self
    }
    pub fn request_headers(mut self, headers: HeaderMap) -> Self {
        self.request_headers = headers;
        self
    }
    pub fn response_headers(mut self, headers: HeaderMap) -> Self {
        self.response_headers = headers;
        self
    }
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
    fn depth(&self) -> usize {
        self.prefix.split('/').filter(|s| !s.is_empty()).count()
    }
    pub fn matches(&self, path: &str) -> bool {
        path_matches_prefix(path, &self.prefix)
    }
    pub fn rewrite_path(&self, path: &str) -> String {
        self.rewrite.apply(&self.prefix, path)
    }
}

/// The result of resolving a path against the [`RouteTable`].
#[derive(Debug, Clone)]
pub struct Resolved {
    pub index: usize,
    pub route: Arc<Route>,
}

/// Routes sorted so that the longest prefix is tried first.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Arc<[Arc<Route>]>,
}

impl RouteTable {
    pub fn new(routes: impl IntoIterator<Item = Route>) -> Self {
        let mut routes = routes.into_iter().map(Arc::new).collect::<Vec<_>>();
        // stable, so routes with the same depth keep their configured order
        routes.sort_by_key(|r| std::cmp::Reverse(r.depth()));
        Self { routes: routes.into() }
    }
    pub fn routes(&self) -> &[Arc<Route>] {
        &self.routes
    }
    pub fn resolve(&self, path: &str) -> Option<Resolved> {
        self.routes.iter().enumerate().find(|(_, route)| route.matches(path)).map(|(index, route)| Resolved {
            index,
            route: route.clone(),
        })
    }
}

impl Router for RouteTable {
    type Index = usize;
    #[instrument(skip_all, fields(http.path = req.uri().path()))]
    fn route(&self, req: &mut Request<CgBody>) -> Option<Self::Index> {
        let resolved = self.resolve(req.uri().path());
        match &resolved {
            Some(resolved) => tracing::trace!(route = %resolved.route.name, "matched"),
            None => tracing::debug!("[Cg.Route] no route matched"),
        }
        let resolved = resolved?;
        req.extensions_mut().insert(MatchedRoute(resolved.route));
        Some(resolved.index)
    }
}
