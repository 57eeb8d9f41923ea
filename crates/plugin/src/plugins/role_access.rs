use hyper::{header::HeaderName, header::HeaderValue, Method, StatusCode};
use serde::Deserialize;

use campusgate_kernel::{utils::path_matches_prefix, BoxError, CgRequest, CgRequestExt, CgResponse, CgResponseExt};
use campusgate_model::Role;

use crate::{Inner, Plugin, PluginConfig};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RoleAccessGuardConfig {
    pub prefix: String,
    /// The header carrying the caller's declared role.
    pub role_header: String,
    /// The header added to admitted requests, carrying the canonical role.
    pub verified_header: String,
    #[serde(deserialize_with = "super::deserialize_methods")]
    pub student_methods: Vec<Method>,
}

impl Default for RoleAccessGuardConfig {
    fn default() -> Self {
        Self {
            prefix: "/Proiect_TW/enrollments".to_string(),
            role_header: "X-User-Role".to_string(),
            verified_header: "X-Verified-Role".to_string(),
            student_methods: vec![Method::GET, Method::POST, Method::PUT],
        }
    }
}

/// Admits enrollment requests by the role the caller declares.
///
/// `ADMIN` may use any method, `STUDENT` only the configured student methods.
/// A missing role, an unknown role or a forbidden method is answered with 403.
#[derive(Debug, Clone)]
pub struct RoleAccessGuardPlugin {
    prefix: String,
    role_header: HeaderName,
    verified_header: HeaderName,
    student_methods: Vec<Method>,
}

/// Why a request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refusal {
    MissingRole,
    UnknownRole,
    MethodNotAllowed,
}

impl Refusal {
    pub const fn message(&self) -> &'static str {
        match self {
            Refusal::MissingRole => "Forbidden: Missing X-User-Role header",
            Refusal::UnknownRole => "Forbidden: Unknown role",
            Refusal::MethodNotAllowed => "Forbidden: Role is not allowed to use this method",
        }
    }
}

impl RoleAccessGuardPlugin {
    /// Decide on a declared role, without looking at the path.
    pub fn admit(&self, method: &Method, declared: Option<&str>) -> Result<Role, Refusal> {
        let declared = declared.filter(|r| !r.is_empty()).ok_or(Refusal::MissingRole)?;
        if declared.eq_ignore_ascii_case(Role::Admin.as_str()) {
            Ok(Role::Admin)
        } else if declared.eq_ignore_ascii_case(Role::Student.as_str()) {
            if self.student_methods.contains(method) {
                Ok(Role::Student)
            } else {
                Err(Refusal::MethodNotAllowed)
            }
        } else {
            Err(Refusal::UnknownRole)
        }
    }
}

impl TryFrom<RoleAccessGuardConfig> for RoleAccessGuardPlugin {
    type Error = BoxError;

    fn try_from(config: RoleAccessGuardConfig) -> Result<Self, Self::Error> {
        Ok(Self {
            prefix: config.prefix,
            role_header: config.role_header.parse()?,
            verified_header: config.verified_header.parse()?,
            student_methods: config.student_methods,
        })
    }
}

impl Plugin for RoleAccessGuardPlugin {
    const CODE: &'static str = "role-access-guard";
    const ORDER: i32 = 3;

    async fn call(&self, mut req: CgRequest, inner: Inner) -> Result<CgResponse, BoxError> {
        if !path_matches_prefix(req.uri().path(), &self.prefix) {
            return Ok(inner.call(req).await);
        }
        let declared = if req.headers().contains_key(&self.role_header) {
            // present but not readable counts as unknown, not missing
            Some(req.header_str(&self.role_header).unwrap_or("?"))
        } else {
            None
        };
        match self.admit(req.method(), declared) {
            Ok(role) => {
                tracing::debug!(%role, "[Cg.Plugin.{}] role admitted", Self::CODE);
                req.headers_mut().insert(self.verified_header.clone(), HeaderValue::from_static(role.as_str()));
                Ok(inner.call(req).await)
            }
            Err(refusal) => {
                tracing::warn!(method = %req.method(), path = req.uri().path(), route = req.route_name(), ?refusal, "[Cg.Plugin.{}] request refused", Self::CODE);
                Ok(CgResponse::with_code_message(StatusCode::FORBIDDEN, refusal.message()))
            }
        }
    }

    fn create(plugin_config: PluginConfig) -> Result<Self, BoxError> {
        super::parse_spec::<RoleAccessGuardConfig>(plugin_config.spec)?.try_into()
    }
}
