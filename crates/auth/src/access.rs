//! Which roles a request needs.
use std::collections::BTreeSet;

use campusgate_kernel::utils::PathIter;
use campusgate_model::{AccessRule, Role};
use hyper::Method;

use crate::error::{AuthError, AuthResult};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    /// `{name}`, any single segment
    Var,
    /// `**`, any remainder, including none
    Rest,
}

/// A path pattern like `/Proiect_TW/courses/getCourseById/{courseId}` or `/login/**`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    segments: Vec<Segment>,
}

impl PathPattern {
    pub fn parse(pattern: &str) -> AuthResult<Self> {
        let mut segments = Vec::new();
        for s in PathIter::new(pattern).filter(|s| !s.is_empty()) {
            if matches!(segments.last(), Some(Segment::Rest)) {
                return Err(AuthError::Config(format!("`**` must end the pattern {pattern}")));
            }
            let segment = if s == "**" {
                Segment::Rest
            } else if s.starts_with('{') && s.ends_with('}') && s.len() > 2 {
                Segment::Var
            } else {
                Segment::Literal(s.to_string())
            };
            segments.push(segment);
        }
        Ok(Self { segments })
    }

    pub fn matches(&self, path: &str) -> bool {
        let mut path = PathIter::new(path).filter(|s| !s.is_empty());
        for segment in &self.segments {
            match segment {
                Segment::Rest => return true,
                Segment::Var => {
                    if path.next().is_none() {
                        return false;
                    }
                }
                Segment::Literal(literal) => {
                    if path.next() != Some(literal.as_str()) {
                        return false;
                    }
                }
            }
        }
        path.next().is_none()
    }
}

/// What a request needs to be let through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    PermitAll,
    AnyRole(BTreeSet<Role>),
}

impl Requirement {
    fn from_roles(roles: &[String]) -> AuthResult<Self> {
        if roles.is_empty() {
            return Ok(Requirement::PermitAll);
        }
        let roles = roles.iter().map(|r| r.parse::<Role>().map_err(|e| AuthError::Config(e.to_string()))).collect::<AuthResult<_>>()?;
        Ok(Requirement::AnyRole(roles))
    }
}

#[derive(Debug, Clone)]
struct CompiledRule {
    method: Option<Method>,
    pattern: PathPattern,
    requirement: Requirement,
}

/// Ordered access rules, the first rule matching method and path decides.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    rules: Vec<CompiledRule>,
    default: Requirement,
}

impl AccessPolicy {
    /// # Errors
    /// If a rule has an invalid method, pattern or role.
    pub fn new(rules: &[AccessRule], default_roles: &[String]) -> AuthResult<Self> {
        let rules = rules
            .iter()
            .map(|rule| {
                let method = rule.method.as_deref().map(|m| m.to_ascii_uppercase().parse::<Method>().map_err(|e| AuthError::Config(e.to_string()))).transpose()?;
                Ok(CompiledRule {
                    method,
                    pattern: PathPattern::parse(&rule.path)?,
                    requirement: Requirement::from_roles(&rule.roles)?,
                })
            })
            .collect::<AuthResult<Vec<_>>>()?;
        Ok(Self {
            rules,
            default: Requirement::from_roles(default_roles)?,
        })
    }

    pub fn requirement(&self, method: &Method, path: &str) -> &Requirement {
        self.rules
            .iter()
            .find(|rule| rule.method.as_ref().map_or(true, |m| m == method) && rule.pattern.matches(path))
            .map_or(&self.default, |rule| &rule.requirement)
    }
}
