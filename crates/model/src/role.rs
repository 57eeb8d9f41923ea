use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    constants::{ROLE_ADMIN, ROLE_STUDENT},
    BoxError,
};

/// An application role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// May use every method on every route.
    Admin,
    /// Restricted to reading, creating and updating.
    Student,
}

impl Role {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => ROLE_ADMIN,
            Role::Student => ROLE_STUDENT,
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = BoxError;

    /// Case-insensitive, with or without the `ROLE_` prefix.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let s = s.get(..5).filter(|p| p.eq_ignore_ascii_case("ROLE_")).map_or(s, |_| &s[5..]);
        if s.eq_ignore_ascii_case(ROLE_ADMIN) {
            Ok(Role::Admin)
        } else if s.eq_ignore_ascii_case(ROLE_STUDENT) {
            Ok(Role::Student)
        } else {
            Err(format!("unknown role {s}").into())
        }
    }
}
