use std::collections::BTreeSet;

use campusgate_model::Role;
use serde::{Deserialize, Serialize};

/// Who logged in, as told by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub email: String,
    /// Every claim of the userinfo response.
    #[serde(default)]
    pub claims: serde_json::Value,
}

impl Identity {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            claims: serde_json::Value::Null,
        }
    }

    /// Build an identity out of a userinfo response, `None` when it carries no email.
    pub fn from_claims(claims: serde_json::Value) -> Option<Self> {
        let email = claims.get("email")?.as_str()?.to_string();
        Some(Self { email, claims })
    }
}

/// An authenticated identity with its roles, kept for the lifetime of a session.
#[derive(Debug, Clone)]
pub struct Principal {
    pub identity: Identity,
    pub roles: BTreeSet<Role>,
    /// The access token the provider issued at login.
    pub access_token: String,
}

impl Principal {
    pub fn has_any_role<'a>(&self, roles: impl IntoIterator<Item = &'a Role>) -> bool {
        roles.into_iter().any(|role| self.roles.contains(role))
    }
}
