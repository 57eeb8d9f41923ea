use std::{collections::BTreeMap, sync::Arc, time::Duration};

use campusgate_kernel::{
    helper_layers::function::{FnLayer, FnLayerMethod, Inner},
    utils::path_matches_prefix,
    BoxLayer, CgRequest, CgResponse, CgResponseExt,
};
use campusgate_model::SecurityConfig;
use hyper::{
    header::{HeaderValue, COOKIE, LOCATION, SET_COOKIE},
    Method, StatusCode,
};
use tracing::instrument;

use crate::{
    access::{AccessPolicy, Requirement},
    error::{AuthError, AuthResult},
    identity::Principal,
    oidc::OidcClient,
    role_mapper::{map_all, RoleMapper},
    session::SessionStore,
};

/// Starts a login, followed by the registration id.
pub const AUTHORIZATION_PATH: &str = "/oauth2/authorization/";
/// Where the provider sends the browser back, followed by the registration id.
pub const CALLBACK_PATH: &str = "/login/oauth2/code/";

/// Everything the security edge decides with.
#[derive(Debug)]
pub struct SecurityEdge {
    pub clients: BTreeMap<String, OidcClient>,
    pub mappers: Vec<RoleMapper>,
    pub policy: AccessPolicy,
    pub sessions: SessionStore,
    pub session_cookie: String,
    pub secure_cookie: bool,
    pub post_login_redirect: String,
    pub login_entry: String,
}

/// Login and role based authorization in front of the routes.
///
/// `/login/**` and `/oauth2/**` are always reachable. Any other request is checked against the
/// access policy: without a session the browser is sent to the login entry, without a required
/// role the request is answered with 403.
#[derive(Debug, Clone)]
pub struct SecurityLayer {
    edge: Arc<SecurityEdge>,
}

impl SecurityLayer {
    pub fn new(edge: SecurityEdge) -> Self {
        Self { edge: Arc::new(edge) }
    }

    /// # Errors
    /// If a rule, a role mapper or the http client can't be built.
    pub fn from_config(config: &SecurityConfig) -> AuthResult<Self> {
        let http = reqwest::Client::builder().timeout(Duration::from_millis(config.http_timeout_ms)).build()?;
        let clients = config.registrations.iter().map(|(id, registration)| (id.clone(), OidcClient::new(id.clone(), registration.clone(), http.clone()))).collect();
        let mappers = config.role_mappers.iter().cloned().map(|mapper| RoleMapper::from_config(mapper, &http)).collect::<AuthResult<Vec<_>>>()?;
        let edge = SecurityEdge {
            clients,
            mappers,
            policy: AccessPolicy::new(&config.access_rules, &config.default_roles)?,
            sessions: SessionStore::new(Duration::from_secs(config.session_ttl_secs), config.max_pending_logins),
            session_cookie: config.session_cookie.clone(),
            secure_cookie: config.secure_cookie,
            post_login_redirect: config.post_login_redirect.clone(),
            login_entry: config.login_entry(),
        };
        Ok(Self::new(edge))
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.edge.sessions
    }

    pub fn into_layer(self) -> BoxLayer {
        BoxLayer::new(FnLayer::new(self))
    }

    fn principal(&self, req: &CgRequest) -> Option<Arc<Principal>> {
        let cookie = &self.edge.session_cookie;
        req.headers()
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .filter(|(name, _)| *name == cookie.as_str())
            .find_map(|(_, id)| self.edge.sessions.get(id))
    }

    fn authorize(&self, registration: &str) -> AuthResult<CgResponse> {
        let client = self.edge.clients.get(registration).ok_or_else(|| AuthError::UnknownRegistration(registration.to_string()))?;
        let state = self.edge.sessions.begin_login(registration).ok_or(AuthError::TooManyLogins)?;
        let url = client.authorize_url(&state)?;
        Ok(redirect(url.as_str()))
    }

    #[instrument(skip(self, query))]
    async fn callback(&self, registration: &str, query: Option<&str>) -> AuthResult<CgResponse> {
        let client = self.edge.clients.get(registration).ok_or_else(|| AuthError::UnknownRegistration(registration.to_string()))?;
        let params = url::form_urlencoded::parse(query.unwrap_or_default().as_bytes()).into_owned().collect::<BTreeMap<_, _>>();
        if let Some(error) = params.get("error") {
            return Err(AuthError::Provider { status: 400, body: error.clone() });
        }
        let state = params.get("state").ok_or(AuthError::MissingParameter("state"))?;
        if self.edge.sessions.take_login(state).as_deref() != Some(registration) {
            return Err(AuthError::InvalidState);
        }
        let code = params.get("code").ok_or(AuthError::MissingParameter("code"))?;
        let token = client.exchange_code(code).await?;
        let identity = client.fetch_identity(&token.access_token).await?;
        let roles = map_all(&self.edge.mappers, &identity, &token.access_token).await;
        tracing::info!(email = %identity.email, ?roles, "[Cg.Auth] logged in");
        let session = self.edge.sessions.create(Principal {
            identity,
            roles,
            access_token: token.access_token,
        });
        let mut resp = redirect(&self.edge.post_login_redirect);
        let cookie = self.session_cookie(&session);
        resp.headers_mut().insert(SET_COOKIE, HeaderValue::from_str(&cookie).map_err(|e| AuthError::Config(e.to_string()))?);
        Ok(resp)
    }

    fn session_cookie(&self, session: &str) -> String {
        let mut cookie = format!("{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}", self.edge.session_cookie, session, self.edge.sessions.ttl().as_secs());
        if self.edge.secure_cookie {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

fn redirect(location: &str) -> CgResponse {
    match HeaderValue::from_str(location) {
        Ok(location) => {
            let mut resp = CgResponse::with_code_empty(StatusCode::FOUND);
            resp.headers_mut().insert(LOCATION, location);
            resp
        }
        Err(e) => CgResponse::with_code_message(StatusCode::INTERNAL_SERVER_ERROR, format!("[Cg.Auth] invalid redirect location: {e}")),
    }
}

fn login_failed(e: AuthError) -> CgResponse {
    tracing::warn!("[Cg.Auth] login failed: {e}");
    let status = match e {
        AuthError::UnknownRegistration(_) => StatusCode::NOT_FOUND,
        AuthError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        AuthError::TooManyLogins => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::UNAUTHORIZED,
    };
    CgResponse::with_code_message(status, format!("[Cg.Auth] login failed: {e}"))
}

impl FnLayerMethod for SecurityLayer {
    async fn call(&self, mut req: CgRequest, inner: Inner) -> CgResponse {
        let path = req.uri().path();
        if req.method() == Method::GET {
            if let Some(registration) = path.strip_prefix(AUTHORIZATION_PATH).filter(|r| !r.contains('/')) {
                return self.authorize(registration).unwrap_or_else(login_failed);
            }
            if let Some(registration) = path.strip_prefix(CALLBACK_PATH).filter(|r| !r.contains('/')) {
                return self.callback(registration, req.uri().query()).await.unwrap_or_else(login_failed);
            }
        }
        if path_matches_prefix(path, "/login") || path_matches_prefix(path, "/oauth2") {
            return inner.call(req).await;
        }
        let Requirement::AnyRole(roles) = self.edge.policy.requirement(req.method(), path) else {
            return inner.call(req).await;
        };
        match self.principal(&req) {
            None => {
                tracing::debug!(path, "[Cg.Auth] no session, redirect to login");
                redirect(&self.edge.login_entry)
            }
            Some(principal) if principal.has_any_role(roles) => {
                req.extensions_mut().insert(principal);
                inner.call(req).await
            }
            Some(principal) => {
                tracing::warn!(email = %principal.identity.email, method = %req.method(), path = req.uri().path(), "[Cg.Auth] access denied");
                CgResponse::with_code_message(StatusCode::FORBIDDEN, "Forbidden: insufficient role")
            }
        }
    }
}
