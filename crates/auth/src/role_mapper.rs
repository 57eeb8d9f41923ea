//! Deriving application roles from a logged in identity.
use std::{collections::BTreeMap, collections::BTreeSet, sync::Arc};

use campusgate_model::{Role, RoleMapperConfig};
use crate::{
    error::{AuthError, AuthResult},
    identity::Identity,
};

mod policy;
pub use policy::{Binding, CloudResourceManager, Policy, PolicySource};

/// A role mapping strategy, selected by configuration.
#[derive(Debug, Clone)]
pub enum RoleMapper {
    StaticDomain(StaticDomainRule),
    PolicyLookup(PolicyLookup),
}

impl RoleMapper {
    /// Roles granted to `identity`, `credential` is the access token of the login.
    ///
    /// Never fails, a failed lookup grants nothing.
    pub async fn map_roles(&self, identity: &Identity, credential: &str) -> BTreeSet<Role> {
        match self {
            RoleMapper::StaticDomain(rule) => rule.map_roles(identity),
            RoleMapper::PolicyLookup(lookup) => lookup.map_roles(identity, credential).await,
        }
    }

    /// # Errors
    /// If a configured role is unknown.
    pub fn from_config(config: RoleMapperConfig, http: &reqwest::Client) -> AuthResult<Self> {
        match config {
            RoleMapperConfig::StaticDomain {
                admin_emails,
                admin_domains,
                student_domains,
            } => Ok(RoleMapper::StaticDomain(StaticDomainRule::new(admin_emails, admin_domains, student_domains))),
            RoleMapperConfig::PolicyLookup {
                resource_id,
                api_base,
                role_table,
                fallback_role,
            } => {
                let role_table = role_table.into_iter().map(|(policy_role, role)| Ok((policy_role, parse_role(&role)?))).collect::<AuthResult<BTreeMap<_, _>>>()?;
                let fallback = fallback_role.as_deref().map(parse_role).transpose()?;
                let source = CloudResourceManager::new(http.clone(), api_base);
                Ok(RoleMapper::PolicyLookup(PolicyLookup::new(resource_id, Arc::new(source), role_table, fallback)))
            }
        }
    }
}

fn parse_role(role: &str) -> AuthResult<Role> {
    role.parse().map_err(|e| AuthError::Config(format!("{e}")))
}

/// Union of the roles every mapper grants.
pub async fn map_all(mappers: &[RoleMapper], identity: &Identity, credential: &str) -> BTreeSet<Role> {
    let mut roles = BTreeSet::new();
    for mapper in mappers {
        roles.extend(mapper.map_roles(identity, credential).await);
    }
    roles
}

/// Grants by email address and domain, compared case-insensitively.
///
/// Domains match whole: `gmail.com` and `@gmail.com` both match `ana@gmail.com`, neither matches `ana@evilgmail.com`.
#[derive(Debug, Clone, Default)]
pub struct StaticDomainRule {
    admin_emails: Vec<String>,
    admin_domains: Vec<String>,
    student_domains: Vec<String>,
}

impl StaticDomainRule {
    pub fn new(admin_emails: Vec<String>, admin_domains: Vec<String>, student_domains: Vec<String>) -> Self {
        let domains = |v: Vec<String>| {
            v.into_iter()
                .map(|s| {
                    let domain = s.to_ascii_lowercase();
                    if domain.starts_with('@') {
                        domain
                    } else {
                        format!("@{domain}")
                    }
                })
                .collect()
        };
        Self {
            admin_emails: admin_emails.into_iter().map(|s| s.to_ascii_lowercase()).collect(),
            admin_domains: domains(admin_domains),
            student_domains: domains(student_domains),
        }
    }

    pub fn map_roles(&self, identity: &Identity) -> BTreeSet<Role> {
        let email = identity.email.to_ascii_lowercase();
        let mut roles = BTreeSet::new();
        if self.admin_emails.iter().any(|admin| *admin == email) || self.admin_domains.iter().any(|domain| email.ends_with(domain.as_str())) {
            roles.insert(Role::Admin);
        }
        if self.student_domains.iter().any(|domain| email.ends_with(domain.as_str())) {
            roles.insert(Role::Student);
        }
        roles
    }
}

/// Grants by the bindings of an IAM policy that name the identity.
#[derive(Clone)]
pub struct PolicyLookup {
    resource_id: String,
    source: Arc<dyn PolicySource>,
    role_table: BTreeMap<String, Role>,
    fallback: Option<Role>,
}

impl std::fmt::Debug for PolicyLookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolicyLookup").field("resource_id", &self.resource_id).field("role_table", &self.role_table).field("fallback", &self.fallback).finish_non_exhaustive()
    }
}

impl PolicyLookup {
    pub fn new(resource_id: impl Into<String>, source: Arc<dyn PolicySource>, role_table: BTreeMap<String, Role>, fallback: Option<Role>) -> Self {
        Self {
            resource_id: resource_id.into(),
            source,
            role_table,
            fallback,
        }
    }

    pub async fn map_roles(&self, identity: &Identity, credential: &str) -> BTreeSet<Role> {
        match self.source.get_iam_policy(&self.resource_id, credential).await {
            Ok(policy) => self.roles_in(&policy, identity),
            Err(e) => {
                tracing::warn!(email = %identity.email, resource = %self.resource_id, "[Cg.Auth] policy lookup failed, no roles granted: {e}");
                BTreeSet::new()
            }
        }
    }

    pub fn roles_in(&self, policy: &Policy, identity: &Identity) -> BTreeSet<Role> {
        let member = format!("user:{}", identity.email);
        policy
            .bindings
            .iter()
            .filter(|binding| binding.members.iter().any(|m| *m == member))
            .filter_map(|binding| {
                let role = self.role_table.get(&binding.role).copied().or(self.fallback);
                tracing::debug!(policy_role = %binding.role, ?role, "[Cg.Auth] policy binding");
                role
            })
            .collect()
    }
}
