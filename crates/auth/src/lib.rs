//! Login through an OpenID Connect provider, application roles, and role based authorization of
//! requests entering the gateway.
#![deny(clippy::unwrap_used, clippy::dbg_macro, clippy::unimplemented, clippy::todo)]
pub mod access;
pub mod edge;
pub mod error;
pub mod identity;
pub mod oidc;
pub mod role_mapper;
pub mod session;

pub use access::{AccessPolicy, PathPattern, Requirement};
pub use edge::{SecurityEdge, SecurityLayer};
pub use error::{AuthError, AuthResult};
pub use identity::{Identity, Principal};
pub use role_mapper::{map_all, PolicyLookup, PolicySource, RoleMapper, StaticDomainRule};
pub use session::SessionStore;
