use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_AUTH_HTTP_TIMEOUT_MS, DEFAULT_MAX_PENDING_LOGINS, DEFAULT_POLICY_API, DEFAULT_SESSION_COOKIE, DEFAULT_SESSION_TTL_SECS, ROLE_ADMIN, ROLE_STUDENT};

/// Login and authorization in front of the routes.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct SecurityConfig {
    /// OIDC clients, by registration id, e.g. `google`.
    pub registrations: BTreeMap<String, OidcRegistration>,
    /// Where the browser is sent after a successful login.
    pub post_login_redirect: String,
    /// Where unauthenticated requests are sent, `/oauth2/authorization/<first registration>` when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login_entry: Option<String>,
    pub session_cookie: String,
    /// Adds `Secure` to the session cookie, set it when the gateway is served over https.
    pub secure_cookie: bool,
    pub session_ttl_secs: u64,
    /// Logins started but not yet called back, further starts are refused past this.
    pub max_pending_logins: usize,
    /// Evaluated in order, the first rule matching method and path decides.
    pub access_rules: Vec<AccessRule>,
    /// Roles required by requests no rule matched.
    pub default_roles: Vec<String>,
    /// Results of all mappers are unioned.
    pub role_mappers: Vec<RoleMapperConfig>,
    /// Timeout of calls to the identity provider and the policy service.
    pub http_timeout_ms: u64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            registrations: BTreeMap::new(),
            post_login_redirect: "/".to_string(),
            login_entry: None,
            session_cookie: DEFAULT_SESSION_COOKIE.to_string(),
            secure_cookie: false,
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
            max_pending_logins: DEFAULT_MAX_PENDING_LOGINS,
            access_rules: Vec::new(),
            default_roles: vec![ROLE_ADMIN.to_string()],
            role_mappers: Vec::new(),
            http_timeout_ms: DEFAULT_AUTH_HTTP_TIMEOUT_MS,
        }
    }
}

impl SecurityConfig {
    pub fn login_entry(&self) -> String {
        match (&self.login_entry, self.registrations.keys().next()) {
            (Some(entry), _) => entry.clone(),
            (None, Some(registration)) => format!("/oauth2/authorization/{registration}"),
            (None, None) => "/login".to_string(),
        }
    }
}

/// An OAuth2 client registered at an OpenID Connect provider.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct OidcRegistration {
    pub client_id: String,
    pub client_secret: String,
    pub authorization_uri: String,
    pub token_uri: String,
    pub user_info_uri: String,
    pub scopes: Vec<String>,
    /// The callback url registered at the provider, ends with `/login/oauth2/code/<registration>`.
    pub redirect_uri: String,
}

/// Roles allowed for requests matching `method` and `path`.
///
/// `path` segments may be literal, `{var}` for any one segment, or `**` for any remainder.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct AccessRule {
    /// Any method when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    pub path: String,
    /// An empty list permits everyone, authenticated or not.
    pub roles: Vec<String>,
}

/// A strategy deriving application roles from a logged in identity.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum RoleMapperConfig {
    StaticDomain {
        /// ADMIN for these exact addresses.
        #[serde(default)]
        admin_emails: Vec<String>,
        /// ADMIN for addresses ending with one of these, e.g. `@upstarters.ro`.
        #[serde(default)]
        admin_domains: Vec<String>,
        /// STUDENT for addresses ending with one of these.
        #[serde(default)]
        student_domains: Vec<String>,
    },
    PolicyLookup {
        /// The project whose IAM policy is read.
        resource_id: String,
        #[serde(default = "default_policy_api")]
        api_base: String,
        /// Policy role to application role, e.g. `roles/owner` to `ADMIN`.
        #[serde(default = "default_policy_roles")]
        role_table: BTreeMap<String, String>,
        /// Role for bound policy roles missing in the table, none to grant nothing.
        #[serde(default = "default_fallback_role")]
        fallback_role: Option<String>,
    },
}

fn default_policy_api() -> String {
    DEFAULT_POLICY_API.to_string()
}

pub fn default_policy_roles() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("roles/owner".to_string(), ROLE_ADMIN.to_string()),
        ("roles/editor".to_string(), ROLE_ADMIN.to_string()),
        ("roles/viewer".to_string(), ROLE_STUDENT.to_string()),
    ])
}

fn default_fallback_role() -> Option<String> {
    Some(ROLE_STUDENT.to_string())
}
